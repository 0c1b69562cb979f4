//! Build inputs and source list flattening.
//!
//! A source list handed to a unity builder may nest arbitrarily and mixes
//! compilable sources with prebuilt inputs (object files, archives, ...)
//! that have to reach the artifact builder untouched.

use crate::config::loader::resolve_path;
use glob::glob;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions treated as compilable translation units.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "c++", "m", "mm"];

/// One entry of a build source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceItem {
    /// A compilable source file
    Source(PathBuf),
    /// Any other build input, forwarded as-is
    Node(PathBuf),
    /// A nested source list
    List(Vec<SourceItem>),
}

impl SourceItem {
    /// Create a compilable source entry.
    pub fn source(path: impl Into<PathBuf>) -> Self {
        SourceItem::Source(path.into())
    }

    /// Create a passthrough entry.
    pub fn node(path: impl Into<PathBuf>) -> Self {
        SourceItem::Node(path.into())
    }

    /// Create a nested list entry.
    pub fn list(items: impl IntoIterator<Item = SourceItem>) -> Self {
        SourceItem::List(items.into_iter().collect())
    }

    /// Classify a path by extension.
    pub fn classify(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if is_compilable(&path) {
            SourceItem::Source(path)
        } else {
            SourceItem::Node(path)
        }
    }
}

/// Check if a path names a compilable source file.
pub fn is_compilable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SOURCE_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// A source list split into its two ordered sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatSources {
    /// Compilable sources, depth-first left-to-right
    pub sources: Vec<PathBuf>,
    /// Passthrough inputs in their original relative order
    pub passthrough: Vec<PathBuf>,
}

/// Flatten a nested source list depth-first.
///
/// The relative order of sources and of passthrough inputs is preserved.
pub fn flatten(items: &[SourceItem]) -> FlatSources {
    let mut flat = FlatSources::default();
    flatten_into(items, &mut flat);
    flat
}

fn flatten_into(items: &[SourceItem], flat: &mut FlatSources) {
    for item in items {
        match item {
            SourceItem::Source(path) => flat.sources.push(path.clone()),
            SourceItem::Node(path) => flat.passthrough.push(path.clone()),
            SourceItem::List(nested) => flatten_into(nested, flat),
        }
    }
}

/// Every leaf path of a source list, depth-first, sources and passthrough
/// inputs interleaved as given.
pub fn leaves(items: &[SourceItem]) -> Vec<&Path> {
    let mut out = Vec::new();
    for item in items {
        match item {
            SourceItem::Source(path) | SourceItem::Node(path) => out.push(path.as_path()),
            SourceItem::List(nested) => out.extend(leaves(nested)),
        }
    }
    out
}

/// Make every source and passthrough path absolute against `root`.
///
/// Nesting is kept so the result can still be forwarded verbatim.
pub fn absolutize(root: &Path, items: Vec<SourceItem>) -> Vec<SourceItem> {
    items
        .into_iter()
        .map(|item| match item {
            SourceItem::Source(path) => SourceItem::Source(resolve_path(root, &path)),
            SourceItem::Node(path) => SourceItem::Node(resolve_path(root, &path)),
            SourceItem::List(nested) => SourceItem::List(absolutize(root, nested)),
        })
        .collect()
}

/// Error during source discovery.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Discover files matching glob patterns relative to `base_dir`.
///
/// Results are grouped by pattern in the given order, sorted within each
/// pattern, and de-duplicated (first match wins).
pub fn discover_files(base_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, SourceError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let full_pattern = base_dir.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let paths = glob(&pattern_str).map_err(|source| SourceError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

        let mut matched = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => matched.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "error reading path"),
            }
        }

        matched.sort();
        for path in matched {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}
