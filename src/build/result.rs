//! Unity build outcome types.
//!
//! Describes what a unity builder generated and what it handed on to the
//! artifact builder.

use crate::build::partition::UnityGroup;
use crate::build::source::SourceItem;
use serde::Serialize;
use std::path::PathBuf;

/// Result of grouping one artifact's sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnityOutcome {
    /// Artifact path
    pub target: PathBuf,
    /// Groups, in index order (empty when bypassed)
    pub groups: Vec<UnityGroup>,
    /// Inputs excluded from aggregation, in original order
    pub passthrough: Vec<PathBuf>,
    /// Whether grouping was disabled for this build
    pub bypassed: bool,
    /// Source list given to the artifact builder
    pub forwarded: Vec<SourceItem>,
}

impl UnityOutcome {
    /// Outcome of a grouped build: aggregates first, then passthrough inputs.
    pub fn grouped(target: PathBuf, groups: Vec<UnityGroup>, passthrough: Vec<PathBuf>) -> Self {
        let forwarded = groups
            .iter()
            .map(|g| SourceItem::Source(g.output.clone()))
            .chain(passthrough.iter().cloned().map(SourceItem::Node))
            .collect();

        Self { target, groups, passthrough, bypassed: false, forwarded }
    }

    /// Outcome of a disabled build: the original list, untouched.
    pub fn bypass(target: PathBuf, sources: Vec<SourceItem>) -> Self {
        Self { target, groups: vec![], passthrough: vec![], bypassed: true, forwarded: sources }
    }

    /// Paths of the aggregate files, in group order.
    pub fn aggregates(&self) -> Vec<PathBuf> {
        self.groups.iter().map(|g| g.output.clone()).collect()
    }

    /// Total number of sources included by aggregates.
    pub fn source_count(&self) -> usize {
        self.groups.iter().map(UnityGroup::len).sum()
    }

    /// Format a summary of the outcome.
    pub fn summary(&self) -> String {
        let target = self.target.display();

        if self.bypassed {
            return format!(
                "Unity build disabled for {}: forwarded {} input(s) unchanged",
                target,
                self.forwarded.len()
            );
        }

        let mut lines = vec![format!(
            "Unity build for {}: {} source(s) in {} aggregate file(s)",
            target,
            self.source_count(),
            self.groups.len()
        )];
        for group in &self.groups {
            lines.push(format!("  - {} ({} sources)", group.output.display(), group.len()));
        }
        if !self.passthrough.is_empty() {
            lines.push(format!("Excluded {} node(s) from unity build", self.passthrough.len()));
        }

        lines.join("\n")
    }
}
