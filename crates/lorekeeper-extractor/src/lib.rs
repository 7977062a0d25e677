//! Lorekeeper Extractor
//!
//! Turns long manuscripts into structured knowledge items.
//!
//! # Architecture
//!
//! ```text
//! Text → Segmenter → Chunks → Pipeline (LLM per chunk → Parser → Normalizer) → Items → EntryStore
//! ```
//!
//! # Key Features
//!
//! - **Segmentation**: chapter-aware chunking with noise filtering
//! - **Resumable runs**: pause, cancel, and resume from a checkpoint
//! - **Retry**: transient service errors are retried with linear backoff
//! - **Consolidation**: same-title results are folded before import
//!
//! # Example Usage
//!
//! ```no_run
//! use lorekeeper_extractor::{ExtractorConfig, Pipeline};
//! use lorekeeper_llm::{CancelSignal, MockProvider};
//!
//! # async fn example() {
//! let pipeline = Pipeline::new(MockProvider::new("[]"), ExtractorConfig::default());
//! let chunks = pipeline.segmenter().segment("Chapter 1\n\n...\n\nChapter 2\n\n...");
//!
//! let mut run = pipeline.run(chunks, 0, CancelSignal::new());
//! while let Some(item) = run.next_item().await {
//!     println!("{}: {}", item.category, item.title);
//! }
//! let outcome = run.finish().await;
//! println!("{}", outcome.status);
//! # }
//! ```

#![warn(missing_docs)]

mod checkpoint;
mod config;
mod consolidate;
mod error;
mod normalizer;
mod parser;
mod pipeline;
mod prompt;
mod segmenter;
mod session;


pub use checkpoint::PipelineCheckpoint;
pub use config::{ExtractorConfig, SegmenterConfig};
pub use consolidate::{consolidate_items, import_items, ImportSummary};
pub use error::ExtractorError;
pub use normalizer::normalize;
pub use parser::parse_extraction_response;
pub use pipeline::{ChunkFailure, ExtractionRun, Pipeline, RunOutcome, RunStatus};
pub use prompt::PromptBuilder;
pub use segmenter::{segment, Segmenter};
pub use session::ImportSession;
