//! Artifact builder that runs an external compiler.
//!
//! Programs and shared libraries are produced with a single compiler call.
//! Static libraries (and plain `library` targets) compile each input to an
//! object file next to the artifact and then archive them.

use crate::build::source::{is_compilable, leaves};
use crate::build::unity::{ArtifactBuilder, ArtifactKind, BuildRequest};
use crate::config::CompilerConfig;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Error running the compiler or archiver.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The program exited unsuccessfully
    #[error("'{program}' exited with {status}")]
    Failed { program: String, status: std::process::ExitStatus },
    /// The output directory could not be created
    #[error("Failed to create {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    fn new(program: &str) -> Self {
        Self { program: program.to_string(), args: Vec::new() }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the invocation to completion.
    pub fn run(&self) -> Result<(), CommandError> {
        tracing::debug!(program = %self.program, args = ?self.args, "running");

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| CommandError::Spawn { program: self.program.clone(), source })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed { program: self.program.clone(), status })
        }
    }
}

/// Builds artifacts by running the configured compiler.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    compiler: CompilerConfig,
}

impl CommandBuilder {
    /// Create a builder for a compiler configuration.
    pub fn new(compiler: CompilerConfig) -> Self {
        Self { compiler }
    }

    /// The invocations needed to build `request`, in execution order.
    pub fn invocations(&self, request: &BuildRequest) -> Vec<Invocation> {
        let inputs = leaves(&request.sources);

        match request.kind {
            ArtifactKind::Program | ArtifactKind::SharedLibrary => {
                let mut link = Invocation::new(&self.compiler.command).args(&self.compiler.args);
                if request.kind == ArtifactKind::SharedLibrary {
                    link = link.arg("-shared");
                }
                let link = link
                    .args(&request.args)
                    .args(inputs)
                    .arg("-o")
                    .arg(&request.target);
                vec![link]
            }
            ArtifactKind::StaticLibrary | ArtifactKind::Library => {
                let mut steps = Vec::new();
                let mut members = Vec::new();

                for (index, input) in inputs.into_iter().enumerate() {
                    if is_compilable(input) {
                        let object = object_path(&request.target, index, input);
                        steps.push(
                            Invocation::new(&self.compiler.command)
                                .args(&self.compiler.args)
                                .args(&request.args)
                                .arg("-c")
                                .arg(input)
                                .arg("-o")
                                .arg(&object),
                        );
                        members.push(object);
                    } else {
                        members.push(input.to_path_buf());
                    }
                }

                steps.push(
                    Invocation::new(&self.compiler.archiver)
                        .arg("rcs")
                        .arg(&request.target)
                        .args(members),
                );
                steps
            }
        }
    }
}

/// Object file for the input at `index`, placed beside the artifact.
///
/// The index prefix keeps inputs that share a file stem apart.
fn object_path(target: &Path, index: usize, source: &Path) -> PathBuf {
    let stem = source.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let dir = target.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}_{}.o", index, stem))
}

impl ArtifactBuilder for CommandBuilder {
    type Output = PathBuf;
    type Error = CommandError;

    fn build(&self, request: BuildRequest) -> Result<PathBuf, CommandError> {
        if let Some(parent) = request.target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| CommandError::OutputDir { path: parent.to_path_buf(), source })?;
        }

        for invocation in self.invocations(&request) {
            invocation.run()?;
        }

        Ok(request.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::source::SourceItem;

    fn request(kind: ArtifactKind, sources: Vec<SourceItem>) -> BuildRequest {
        BuildRequest {
            kind,
            target: PathBuf::from("out/app"),
            sources,
            args: vec!["-O2".to_string()],
        }
    }

    fn strings(invocation: &Invocation) -> Vec<String> {
        invocation.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_program_single_link_step() {
        let builder = CommandBuilder::new(CompilerConfig {
            command: "clang++".to_string(),
            args: vec!["-std=c++20".to_string()],
            archiver: "ar".to_string(),
        });
        let req = request(
            ArtifactKind::Program,
            vec![SourceItem::source(".unity/app_0.cpp"), SourceItem::node("z.o")],
        );

        let steps = builder.invocations(&req);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].program, "clang++");
        assert_eq!(
            strings(&steps[0]),
            ["-std=c++20", "-O2", ".unity/app_0.cpp", "z.o", "-o", "out/app"]
        );
    }

    #[test]
    fn test_shared_library_adds_flag() {
        let builder = CommandBuilder::new(CompilerConfig::default());
        let req = request(ArtifactKind::SharedLibrary, vec![SourceItem::source("a.cpp")]);

        let steps = builder.invocations(&req);
        assert_eq!(strings(&steps[0]), ["-shared", "-O2", "a.cpp", "-o", "out/app"]);
    }

    #[test]
    fn test_static_library_compiles_then_archives() {
        let builder = CommandBuilder::new(CompilerConfig::default());
        let req = request(
            ArtifactKind::StaticLibrary,
            vec![SourceItem::list([SourceItem::source("u/app_0.cpp"), SourceItem::node("pre.o")])],
        );

        let steps = builder.invocations(&req);
        assert_eq!(steps.len(), 2);
        assert_eq!(strings(&steps[0]), ["-O2", "-c", "u/app_0.cpp", "-o", "out/0_app_0.o"]);
        assert_eq!(steps[1].program, "ar");
        assert_eq!(strings(&steps[1]), ["rcs", "out/app", "out/0_app_0.o", "pre.o"]);
    }

    #[test]
    fn test_static_library_same_stem_sources_get_distinct_objects() {
        let builder = CommandBuilder::new(CompilerConfig::default());
        let req = BuildRequest {
            kind: ArtifactKind::StaticLibrary,
            target: PathBuf::from("out/libcore.a"),
            sources: vec![
                SourceItem::source("/src/net/util.cpp"),
                SourceItem::node("/lib/util.o"),
                SourceItem::source("/src/fs/util.cpp"),
            ],
            args: vec![],
        };

        let steps = builder.invocations(&req);
        assert_eq!(steps.len(), 3);
        assert_eq!(strings(&steps[0]), ["-c", "/src/net/util.cpp", "-o", "out/0_util.o"]);
        assert_eq!(strings(&steps[1]), ["-c", "/src/fs/util.cpp", "-o", "out/2_util.o"]);
        assert_ne!(strings(&steps[0])[3], strings(&steps[1])[3]);
        assert_eq!(
            strings(&steps[2]),
            ["rcs", "out/libcore.a", "out/0_util.o", "/lib/util.o", "out/2_util.o"]
        );
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let invocation = Invocation::new("definitely-not-a-real-compiler-binary");
        assert!(matches!(invocation.run(), Err(CommandError::Spawn { .. })));
    }
}
