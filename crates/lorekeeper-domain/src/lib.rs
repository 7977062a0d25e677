//! Lorekeeper Domain Layer
//!
//! Core vocabulary shared by every other crate: the closed category set with
//! its field schemas, knowledge entries, and the chunk/item types that flow
//! through the extraction pipeline.
//!
//! ## Key Concepts
//!
//! - **Category**: A closed enum; each variant owns an ordered field schema
//! - **KnowledgeEntry**: A stored unit of knowledge with per-field details
//! - **Chunk**: A bounded slice of source text, optionally chapter-labelled
//! - **ExtractionItem**: A validated item parsed from one service response
//!
//! ## Architecture
//!
//! - No I/O and no async code
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod entry;
pub mod extraction;
pub mod traits;

// Re-exports for convenience
pub use category::{Category, FieldSpec};
pub use entry::{EntryId, KnowledgeEntry};
pub use extraction::{merge_keywords, Chunk, ExtractionItem};
