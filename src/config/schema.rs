//! Configuration schema types for `unity.toml`
//!
//! Defines the structure and validation rules for unity build configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::build::ArtifactKind;

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required)
    pub name: String,
    /// Base directory for relative source and cache paths
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Unity grouping settings (`[unity]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitySettings {
    /// Directory where aggregate files are written
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Maximum number of sources included by one aggregate file
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
    /// Minimum number of aggregate files to generate (if possible)
    #[serde(default = "default_min_files")]
    pub min_files: usize,
    /// Skip aggregation and hand sources straight to the artifact builder
    #[serde(default)]
    pub disable: bool,
    /// Extension of generated aggregate files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for UnitySettings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            max_sources: default_max_sources(),
            min_files: default_min_files(),
            disable: false,
            extension: default_extension(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".unity")
}

fn default_max_sources() -> usize {
    15
}

/// Defaults to the host's available parallelism.
pub fn default_min_files() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn default_extension() -> String {
    "cpp".to_string()
}

/// A named artifact (`[targets.<name>]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Kind of artifact produced from the sources
    #[serde(default)]
    pub kind: ArtifactKind,
    /// Glob patterns for compilable sources
    pub sources: Vec<String>,
    /// Glob patterns for prebuilt inputs forwarded untouched
    #[serde(default)]
    pub passthrough: Vec<String>,
    /// Output path of the artifact (defaults to the target name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Cache directory for this target only (overrides `[unity].cache_dir`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Arguments forwarded verbatim to the artifact builder
    #[serde(default)]
    pub args: Vec<String>,
}

/// Compiler used by the command artifact builder (`[compiler]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Program to run
    #[serde(default = "default_compiler")]
    pub command: String,
    /// Arguments placed before the per-target ones
    #[serde(default)]
    pub args: Vec<String>,
    /// Archiver used for static libraries
    #[serde(default = "default_archiver")]
    pub archiver: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { command: default_compiler(), args: Vec::new(), archiver: default_archiver() }
    }
}

fn default_compiler() -> String {
    "c++".to_string()
}

fn default_archiver() -> String {
    "ar".to_string()
}

/// Complete unity.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnityConfig {
    /// Project metadata (required)
    pub project: ProjectConfig,
    /// Grouping settings
    #[serde(default)]
    pub unity: UnitySettings,
    /// Named targets, ordered by name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
    /// Compiler command
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "targets.engine.sources")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unity.toml: '{}' {}", self.field, self.message)
    }
}

/// Immutable grouping defaults, resolved once per process.
///
/// Every entry point takes this explicitly; a per-call cache directory
/// can still be supplied on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnityDefaults {
    pub cache_dir: PathBuf,
    pub max_sources: usize,
    pub min_files: usize,
    pub disable: bool,
    pub extension: String,
}

impl Default for UnityDefaults {
    fn default() -> Self {
        UnitySettings::default().into()
    }
}

impl From<UnitySettings> for UnityDefaults {
    fn from(settings: UnitySettings) -> Self {
        Self {
            cache_dir: settings.cache_dir,
            max_sources: settings.max_sources,
            min_files: settings.min_files,
            disable: settings.disable,
            extension: settings.extension,
        }
    }
}

impl UnityDefaults {
    /// Set the cache directory.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Set the maximum sources per aggregate file.
    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = max_sources;
        self
    }

    /// Set the minimum aggregate file count.
    pub fn with_min_files(mut self, min_files: usize) -> Self {
        self.min_files = min_files;
        self
    }

    /// Enable or disable bypass mode.
    pub fn with_disable(mut self, disable: bool) -> Self {
        self.disable = disable;
        self
    }
}

impl UnityConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.name.is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.unity.max_sources == 0 {
            errors.push(ConfigValidationError {
                field: "unity.max_sources".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.unity.min_files == 0 {
            errors.push(ConfigValidationError {
                field: "unity.min_files".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.unity.extension.is_empty() || self.unity.extension.starts_with('.') {
            errors.push(ConfigValidationError {
                field: "unity.extension".to_string(),
                message: "must be a non-empty extension without a leading dot".to_string(),
            });
        }

        for (name, target) in &self.targets {
            if target.sources.is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("targets.{}.sources", name),
                    message: "must contain at least one glob pattern".to_string(),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// The process-wide grouping defaults described by this config.
    pub fn defaults(&self) -> UnityDefaults {
        self.unity.clone().into()
    }

    /// Cache directory for a target (target override or project default).
    pub fn effective_cache_dir(&self, target: &TargetConfig) -> PathBuf {
        target.cache_dir.clone().unwrap_or_else(|| self.unity.cache_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parse() {
        let toml = r#"
[project]
name = "engine"
"#;
        let config: UnityConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.name, "engine");
        assert_eq!(config.project.root, PathBuf::from("."));
        assert_eq!(config.unity.cache_dir, PathBuf::from(".unity"));
        assert_eq!(config.unity.max_sources, 15);
        assert!(config.unity.min_files >= 1);
        assert!(!config.unity.disable);
        assert_eq!(config.unity.extension, "cpp");
        assert!(config.targets.is_empty());
        assert_eq!(config.compiler.command, "c++");
        assert_eq!(config.compiler.archiver, "ar");
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "engine"
root = "code"

[unity]
cache_dir = "build/unity"
max_sources = 8
min_files = 4
disable = true
extension = "cc"

[targets.engine]
kind = "shared-library"
sources = ["src/**/*.cpp", "gen/*.cc"]
passthrough = ["lib/*.o"]
output = "bin/engine"
cache_dir = "build/engine-unity"
args = ["-O2", "-DNDEBUG"]

[compiler]
command = "clang++"
args = ["-std=c++20"]
"#;
        let config: UnityConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.project.root, PathBuf::from("code"));
        assert_eq!(config.unity.cache_dir, PathBuf::from("build/unity"));
        assert_eq!(config.unity.max_sources, 8);
        assert_eq!(config.unity.min_files, 4);
        assert!(config.unity.disable);
        assert_eq!(config.unity.extension, "cc");

        let engine = config.targets.get("engine").unwrap();
        assert_eq!(engine.kind, ArtifactKind::SharedLibrary);
        assert_eq!(engine.sources.len(), 2);
        assert_eq!(engine.passthrough, vec!["lib/*.o".to_string()]);
        assert_eq!(engine.output, Some(PathBuf::from("bin/engine")));
        assert_eq!(engine.args, vec!["-O2".to_string(), "-DNDEBUG".to_string()]);

        assert_eq!(config.compiler.command, "clang++");
        assert_eq!(config.compiler.args, vec!["-std=c++20".to_string()]);
    }

    #[test]
    fn test_validation_empty_name() {
        let config: UnityConfig = toml::from_str("[project]\nname = \"\"").unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "project.name"));
    }

    #[test]
    fn test_validation_zero_group_settings() {
        let toml = r#"
[project]
name = "engine"

[unity]
max_sources = 0
min_files = 0
"#;
        let config: UnityConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "unity.max_sources"));
        assert!(errors.iter().any(|e| e.field == "unity.min_files"));
    }

    #[test]
    fn test_validation_negative_rejected_by_parser() {
        let toml = r#"
[project]
name = "engine"

[unity]
max_sources = -1
"#;
        assert!(toml::from_str::<UnityConfig>(toml).is_err());
    }

    #[test]
    fn test_validation_extension() {
        let toml = r#"
[project]
name = "engine"

[unity]
extension = ".cpp"
"#;
        let config: UnityConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().iter().any(|e| e.field == "unity.extension"));
    }

    #[test]
    fn test_validation_empty_target_sources() {
        let toml = r#"
[project]
name = "engine"

[targets.empty]
sources = []
"#;
        let config: UnityConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "targets.empty.sources"));
    }

    #[test]
    fn test_effective_cache_dir() {
        let toml = r#"
[project]
name = "engine"

[unity]
cache_dir = "shared"

[targets.with_dir]
sources = ["a/*.cpp"]
cache_dir = "own"

[targets.without_dir]
sources = ["b/*.cpp"]
"#;
        let config: UnityConfig = toml::from_str(toml).unwrap();

        let with = config.targets.get("with_dir").unwrap();
        let without = config.targets.get("without_dir").unwrap();

        assert_eq!(config.effective_cache_dir(with), PathBuf::from("own"));
        assert_eq!(config.effective_cache_dir(without), PathBuf::from("shared"));
    }

    #[test]
    fn test_defaults_from_settings() {
        let defaults = UnityDefaults::default();
        assert_eq!(defaults.cache_dir, PathBuf::from(".unity"));
        assert_eq!(defaults.max_sources, 15);
        assert_eq!(defaults.min_files, default_min_files());
        assert!(!defaults.disable);

        let tuned = defaults.with_max_sources(4).with_min_files(2).with_disable(true);
        assert_eq!(tuned.max_sources, 4);
        assert_eq!(tuned.min_files, 2);
        assert!(tuned.disable);
    }
}
