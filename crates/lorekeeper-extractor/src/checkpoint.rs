//! Resumable pipeline state

use crate::error::ExtractorError;
use lorekeeper_domain::{Chunk, ExtractionItem};
use serde::{Deserialize, Serialize};

/// Frozen chunk list, position of the next chunk, and items extracted so far
///
/// `results_so_far` holds exactly the items extracted from chunks
/// `[0, cursor)`. Serialized as `{ chunks, cursor, resultsSoFar }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineCheckpoint {
    /// Chunk sequence for the whole run
    pub chunks: Vec<Chunk>,

    /// Index of the next chunk to process
    pub cursor: usize,

    /// Items extracted from the chunks before `cursor`
    pub results_so_far: Vec<ExtractionItem>,
}

impl PipelineCheckpoint {
    /// Fresh checkpoint at the start of `chunks`
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            cursor: 0,
            results_so_far: Vec::new(),
        }
    }

    /// Number of chunks in the run
    pub fn total(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks still to process
    pub fn remaining(&self) -> usize {
        self.total().saturating_sub(self.cursor)
    }

    /// Every chunk has been processed
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total()
    }

    /// Reject a cursor past the end of the chunk list
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.cursor > self.total() {
            return Err(ExtractorError::InvalidState(format!(
                "checkpoint cursor {} is past the last chunk ({})",
                self.cursor,
                self.total()
            )));
        }
        Ok(())
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String, ExtractorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self, ExtractorError> {
        let checkpoint: Self = serde_json::from_str(json)?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}
