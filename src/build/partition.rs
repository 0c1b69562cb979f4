//! Partitioning of compilable sources into unity groups.
//!
//! Two limits shape the partition:
//! - `max_sources` caps how many sources one aggregate file includes, which
//!   bounds the compile time and memory of a single translation unit.
//! - `min_files` is the number of aggregate files to aim for, normally the
//!   number of parallel build jobs, so aggregation does not starve workers.
//!
//! The group size is the tighter of the two. Raising `min_files` can only
//! shrink groups; it never adds groups beyond what that size implies.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A contiguous slice of the flattened source sequence assigned to one
/// aggregate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnityGroup {
    /// Position of this group (0-based)
    pub index: usize,
    /// Member sources, in original order
    pub sources: Vec<PathBuf>,
    /// Path of the aggregate file for this group
    pub output: PathBuf,
}

impl UnityGroup {
    /// Number of sources in the group.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the group has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Sources per group: `min(max_sources, ceil(total / min_files))`, never below 1.
///
/// Zero limits are not rejected here; config validation does that. The
/// result is floored at 1 whatever the inputs.
pub fn effective_group_size(total: usize, max_sources: usize, min_files: usize) -> usize {
    let by_count = if min_files == 0 { total } else { total.div_ceil(min_files) };
    by_count.max(1).min(max_sources).max(1)
}

/// Number of groups produced for `total` sources.
pub fn group_count(total: usize, max_sources: usize, min_files: usize) -> usize {
    if total == 0 {
        return 0;
    }
    total.div_ceil(effective_group_size(total, max_sources, min_files))
}

/// Sizes of the groups, in index order.
pub fn group_sizes(total: usize, max_sources: usize, min_files: usize) -> Vec<usize> {
    let size = effective_group_size(total, max_sources, min_files);
    (0..group_count(total, max_sources, min_files))
        .map(|idx| size.min(total - idx * size))
        .collect()
}

/// Path of the aggregate file for group `index`: `{cache_dir}/{base}_{index}.{ext}`.
pub fn aggregate_path(cache_dir: &Path, target_base: &str, index: usize, extension: &str) -> PathBuf {
    cache_dir.join(format!("{}_{}.{}", target_base, index, extension))
}

/// Base name used for aggregate files: the last component of the target path.
pub fn target_base_name(target: &Path) -> String {
    target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.to_string_lossy().into_owned())
}

/// Describes where and how groups are laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitioner {
    max_sources: usize,
    min_files: usize,
    cache_dir: PathBuf,
    extension: String,
}

impl Partitioner {
    /// Create a partitioner writing `.cpp` aggregates into `cache_dir`.
    pub fn new(max_sources: usize, min_files: usize, cache_dir: impl Into<PathBuf>) -> Self {
        Self { max_sources, min_files, cache_dir: cache_dir.into(), extension: "cpp".to_string() }
    }

    /// Set the aggregate file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Split `sources` into ordered groups for the artifact at `target`.
    ///
    /// Every source lands in exactly one group, in its original order, and
    /// no group is empty.
    pub fn partition(&self, sources: &[PathBuf], target: &Path) -> Vec<UnityGroup> {
        if sources.is_empty() {
            return Vec::new();
        }

        let size = effective_group_size(sources.len(), self.max_sources, self.min_files);
        let base = target_base_name(target);

        tracing::debug!(
            total = sources.len(),
            max_sources = self.max_sources,
            min_files = self.min_files,
            group_size = size,
            groups = sources.len().div_ceil(size),
            "partitioned unity sources"
        );

        sources
            .chunks(size)
            .enumerate()
            .map(|(index, chunk)| UnityGroup {
                index,
                sources: chunk.to_vec(),
                output: aggregate_path(&self.cache_dir, &base, index, &self.extension),
            })
            .collect()
    }
}
