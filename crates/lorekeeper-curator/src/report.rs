//! Outcome reporting for merge batches

use lorekeeper_domain::{Category, KnowledgeEntry};
use std::fmt;

/// A group that could not be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFailure {
    /// Canonical name of the group
    pub canonical_name: String,

    /// Category of the group
    pub category: Category,

    /// Human-readable cause
    pub reason: String,
}

impl fmt::Display for MergeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.canonical_name, self.category, self.reason)
    }
}

/// Result of [`MergeEngine::merge_all`](crate::MergeEngine::merge_all)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Entries created by successful merges, in batch order
    pub merged: Vec<KnowledgeEntry>,

    /// Groups that failed; the batch continued past them
    pub failures: Vec<MergeFailure>,

    /// Original entries removed
    pub removed: usize,

    /// Groups left untouched because the batch was stopped
    pub skipped: usize,
}

impl MergeReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every group was merged
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }

    /// Generate a summary of the batch
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Merged {} groups, removed {} originals, {} failed, {} skipped",
            self.merged.len(),
            self.removed,
            self.failures.len(),
            self.skipped
        )];

        for entry in &self.merged {
            lines.push(format!("  + {} [{}]", entry.title, entry.category));
        }
        for failure in &self.failures {
            lines.push(format!("  ! {}", failure));
        }

        lines.join("\n")
    }
}
