//! Grouping-aware artifact builders.
//!
//! A [`UnityBuilder`] wraps a base [`ArtifactBuilder`] (the compile + link
//! step) and sits in front of it: it flattens the source list, partitions
//! the compilable sources, writes one aggregate file per group and then
//! calls the base builder once with `aggregates ++ passthrough`.
//!
//! # Example
//!
//! ```ignore
//! use unity_build::build::{ArtifactKind, UnityBuilder, SourceItem};
//! use unity_build::config::UnityDefaults;
//!
//! let builder = UnityBuilder::new(my_compiler, ArtifactKind::Program, UnityDefaults::default());
//! let (artifact, outcome) = builder.build(
//!     Path::new("bin/app"),
//!     vec![SourceItem::source("/src/a.cpp"), SourceItem::node("/lib/z.o")],
//!     vec!["-O2".to_string()],
//!     None,
//! )?;
//! println!("{}", outcome.summary());
//! ```

use crate::build::aggregate::{write_aggregate, AggregateError};
use crate::build::partition::Partitioner;
use crate::build::result::UnityOutcome;
use crate::build::source::{flatten, SourceItem};
use crate::config::UnityDefaults;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Kind of artifact the base builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Executable
    #[default]
    Program,
    /// Library of the toolchain's default linkage
    Library,
    /// Static archive
    StaticLibrary,
    /// Shared object / DLL
    SharedLibrary,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Program => write!(f, "program"),
            ArtifactKind::Library => write!(f, "library"),
            ArtifactKind::StaticLibrary => write!(f, "static-library"),
            ArtifactKind::SharedLibrary => write!(f, "shared-library"),
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "program" => Ok(ArtifactKind::Program),
            "library" => Ok(ArtifactKind::Library),
            "static-library" => Ok(ArtifactKind::StaticLibrary),
            "shared-library" => Ok(ArtifactKind::SharedLibrary),
            other => Err(format!(
                "unknown artifact kind '{}' (expected program, library, static-library, shared-library)",
                other
            )),
        }
    }
}

/// Everything handed to the base artifact builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequest {
    /// Kind of artifact
    pub kind: ArtifactKind,
    /// Artifact path
    pub target: PathBuf,
    /// Sources (aggregate files and passthrough inputs, or the original list)
    pub sources: Vec<SourceItem>,
    /// Extra arguments, forwarded verbatim
    pub args: Vec<String>,
}

/// The compile + link step behind a unity builder.
pub trait ArtifactBuilder {
    /// What a successful build returns
    type Output;
    /// Builder failure
    type Error: std::error::Error + 'static;

    /// Build the artifact described by `request`.
    fn build(&self, request: BuildRequest) -> Result<Self::Output, Self::Error>;
}

impl<F, O, E> ArtifactBuilder for F
where
    F: Fn(BuildRequest) -> Result<O, E>,
    E: std::error::Error + 'static,
{
    type Output = O;
    type Error = E;

    fn build(&self, request: BuildRequest) -> Result<O, E> {
        self(request)
    }
}

/// Error from a unity build.
#[derive(Debug, Error)]
pub enum UnityError<E: std::error::Error + 'static> {
    /// Writing an aggregate file failed; the base builder was not called
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    /// The base builder failed
    #[error("Artifact builder failed: {0}")]
    Builder(#[source] E),
}

/// Wraps a base builder with source grouping.
#[derive(Debug, Clone)]
pub struct UnityBuilder<B> {
    base: B,
    kind: ArtifactKind,
    defaults: UnityDefaults,
}

impl<B: ArtifactBuilder> UnityBuilder<B> {
    /// Create a unity builder in front of `base`.
    pub fn new(base: B, kind: ArtifactKind, defaults: UnityDefaults) -> Self {
        Self { base, kind, defaults }
    }

    /// Unity builder producing an executable.
    pub fn program(base: B, defaults: UnityDefaults) -> Self {
        Self::new(base, ArtifactKind::Program, defaults)
    }

    /// Unity builder producing a library.
    pub fn library(base: B, defaults: UnityDefaults) -> Self {
        Self::new(base, ArtifactKind::Library, defaults)
    }

    /// Unity builder producing a static library.
    pub fn static_library(base: B, defaults: UnityDefaults) -> Self {
        Self::new(base, ArtifactKind::StaticLibrary, defaults)
    }

    /// Unity builder producing a shared library.
    pub fn shared_library(base: B, defaults: UnityDefaults) -> Self {
        Self::new(base, ArtifactKind::SharedLibrary, defaults)
    }

    /// The artifact kind passed to the base builder.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// The grouping defaults.
    pub fn defaults(&self) -> &UnityDefaults {
        &self.defaults
    }

    /// The wrapped base builder.
    pub fn base(&self) -> &B {
        &self.base
    }

    /// Compute groups and the forwarded source list without touching disk.
    ///
    /// `cache_dir` overrides the default cache directory for this call.
    pub fn plan(
        &self,
        target: &Path,
        sources: &[SourceItem],
        cache_dir: Option<&Path>,
    ) -> UnityOutcome {
        if self.defaults.disable {
            tracing::debug!(
                artifact = %target.display(),
                "unity build disabled, forwarding sources unchanged"
            );
            return UnityOutcome::bypass(target.to_path_buf(), sources.to_vec());
        }

        let flat = flatten(sources);
        let cache_dir = cache_dir.unwrap_or(&self.defaults.cache_dir);
        let partitioner =
            Partitioner::new(self.defaults.max_sources, self.defaults.min_files, cache_dir)
                .with_extension(self.defaults.extension.clone());
        let groups = partitioner.partition(&flat.sources, target);

        UnityOutcome::grouped(target.to_path_buf(), groups, flat.passthrough)
    }

    /// Generate the aggregate files and run the base builder once.
    ///
    /// Aggregates are written in group order; if any write fails the base
    /// builder is not called.
    pub fn build(
        &self,
        target: &Path,
        sources: Vec<SourceItem>,
        args: Vec<String>,
        cache_dir: Option<&Path>,
    ) -> Result<(B::Output, UnityOutcome), UnityError<B::Error>> {
        let outcome = self.plan(target, &sources, cache_dir);

        for group in &outcome.groups {
            write_aggregate(&group.sources, &group.output)?;
        }

        if !outcome.passthrough.is_empty() {
            tracing::info!("Excluded {} node(s) from unity build.", outcome.passthrough.len());
        }

        let request = BuildRequest {
            kind: self.kind,
            target: target.to_path_buf(),
            sources: outcome.forwarded.clone(),
            args,
        };
        let output = self.base.build(request).map_err(UnityError::Builder)?;

        Ok((output, outcome))
    }
}
