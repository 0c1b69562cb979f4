//! Configuration loading and discovery for `unity.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{CompilerConfig, ProjectConfig, UnityConfig, UnitySettings};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up by [`find_config`].
pub const CONFIG_FILE: &str = "unity.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse unity.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override cache directory
    pub cache_dir: Option<PathBuf>,
    /// Override maximum sources per aggregate
    pub max_sources: Option<usize>,
    /// Override minimum aggregate count
    pub min_files: Option<usize>,
    /// Disable unity builds
    pub disable: Option<bool>,
    /// Number of parallel jobs (used as `min_files` when that is not given)
    pub jobs: Option<usize>,
}

/// Locate the unity.toml that governs the current directory.
///
/// The nearest enclosing project config wins; a user-wide
/// `unity-build/unity.toml` under the XDG config dir is the fallback.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from).or_else(find_xdg_config)
}

/// User-wide grouping defaults: `$XDG_CONFIG_HOME/unity-build/unity.toml`,
/// or `~/.config/unity-build/unity.toml` when the variable is unset.
pub fn find_xdg_config() -> Option<PathBuf> {
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;

    Some(config_home.join("unity-build").join(CONFIG_FILE)).filter(|path| path.is_file())
}

/// The unity.toml in `dir` or its closest ancestor.
pub fn find_config_from(dir: PathBuf) -> Option<PathBuf> {
    dir.ancestors().map(|ancestor| ancestor.join(CONFIG_FILE)).find(|path| path.is_file())
}

/// Load configuration from a unity.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("engine/unity.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<UnityConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<UnityConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: UnityConfig = toml::from_str(&contents)?;
    validate(config)
}

fn validate(config: UnityConfig) -> Result<UnityConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

/// Create a default configuration when no unity.toml is found.
///
/// The project name is taken from the current directory name.
pub fn default_config() -> UnityConfig {
    let project_name = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unnamed".to_string());

    UnityConfig {
        project: ProjectConfig { name: project_name, root: PathBuf::from(".") },
        unity: UnitySettings::default(),
        targets: BTreeMap::new(),
        compiler: CompilerConfig::default(),
    }
}

/// Merge CLI overrides into a configuration, then re-validate it.
///
/// CLI arguments take precedence over config file values. An explicit
/// `min_files` wins over `jobs`.
pub fn merge_cli_overrides(
    mut config: UnityConfig,
    overrides: &CliOverrides,
) -> Result<UnityConfig, ConfigError> {
    if let Some(ref cache_dir) = overrides.cache_dir {
        config.unity.cache_dir = cache_dir.clone();
    }

    if let Some(max_sources) = overrides.max_sources {
        config.unity.max_sources = max_sources;
    }

    match (overrides.min_files, overrides.jobs) {
        (Some(min_files), _) => config.unity.min_files = min_files,
        (None, Some(jobs)) => config.unity.min_files = jobs,
        (None, None) => {}
    }

    if let Some(disable) = overrides.disable {
        config.unity.disable = disable;
    }

    validate(config)
}

/// Get the project root directory for a loaded config.
///
/// `[project].root` is resolved against the directory holding unity.toml.
pub fn project_root(config_path: &Path, config: &UnityConfig) -> PathBuf {
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    resolve_path(base, &config.project.root)
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
