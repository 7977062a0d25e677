//! Lorekeeper Curator
//!
//! Finds knowledge entries that describe the same subject and merges them.
//!
//! # Overview
//!
//! - **Duplicate detection**: titles are canonicalized (`"Aria (2)"`,
//!   `"Aria — the healer"` → `"Aria"`) and grouped per category
//! - **Merging**: each group is sent to the text-understanding service, which
//!   returns one consolidated entry
//! - **Batches**: groups are merged one at a time with a delay between
//!   requests; failures are reported and the batch continues
//!
//! # Usage
//!
//! ```
//! use lorekeeper_curator::find_duplicates;
//! use lorekeeper_domain::{Category, KnowledgeEntry};
//!
//! let entries = vec![
//!     KnowledgeEntry::with_content(Category::CharacterProfile, "Aria (2)", vec![], "A healer."),
//!     KnowledgeEntry::with_content(Category::CharacterProfile, "Aria — the healer", vec![], "Born inland."),
//! ];
//!
//! let groups = find_duplicates(&entries);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].canonical_name, "Aria");
//! ```
//!
//! # Configuration
//!
//! ```toml
//! min_canonical_length = 2
//! batch_delay_ms = 2000
//! delete_originals = false
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//! ```

#![warn(missing_docs)]

mod config;
mod duplicates;
mod error;
mod merge;
mod prompt;
mod report;

pub use config::CuratorConfig;
pub use duplicates::{
    canonicalize, find_duplicates, find_duplicates_with, DuplicateGroup,
    DEFAULT_MIN_CANONICAL_LENGTH,
};
pub use error::CuratorError;
pub use merge::{MergeEngine, MergeOptions, MergeOutcome};
pub use prompt::{MergePromptBuilder, MULTIPLE_ACCOUNTS};
pub use report::{MergeFailure, MergeReport};
