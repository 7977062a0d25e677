//! The extraction pipeline: chunks in, validated items out
//!
//! Chunks are processed strictly in order, one request at a time. A run is a
//! pull-based sequence: [`ExtractionRun::next_item`] only issues a request
//! when the items from the previous chunk have been consumed.

use crate::checkpoint::PipelineCheckpoint;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_extraction_response;
use crate::prompt::PromptBuilder;
use crate::segmenter::Segmenter;
use lorekeeper_domain::{Chunk, ExtractionItem};
use lorekeeper_llm::{complete_with_retry, CancelIntent, CancelSignal, LlmError, LlmProvider};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, error, info, warn};

/// A chunk that produced no items, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFailure {
    /// Position of the chunk in the run
    pub index: usize,

    /// Chapter of the chunk, if known
    pub chapter_label: Option<String>,

    /// Human-readable cause
    pub reason: String,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}", self.index + 1)?;
        if let Some(label) = &self.chapter_label {
            write!(f, " ({})", label)?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Lifecycle state of a run or import session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing started (sessions only)
    Idle,

    /// Chunks remain and no stop was requested
    Running,

    /// Stopped on request before chunk `at`; resumable
    Paused {
        /// Next chunk to process
        at: usize,
    },

    /// Every chunk processed
    Completed,

    /// A request failed after retries; resumable from the failed chunk
    Failed(ChunkFailure),

    /// Hard stop; not resumable
    Cancelled,
}

impl RunStatus {
    /// Whether a checkpoint is kept for this state
    pub fn is_resumable(&self) -> bool {
        matches!(self, RunStatus::Paused { .. } | RunStatus::Failed(_))
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Paused { at } => write!(f, "paused before chunk {}", at + 1),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed(failure) => write!(f, "failed at {}", failure),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Final state of a drained run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Terminal status
    pub status: RunStatus,

    /// Every item emitted, including a resumed prefix
    pub items: Vec<ExtractionItem>,

    /// Present for `Paused` and `Failed`, unless the run started past
    /// chunk 0 without earlier results (see [`Pipeline::run`])
    pub checkpoint: Option<PipelineCheckpoint>,

    /// Chunks whose response could not be parsed (skipped, not fatal)
    pub malformed: Vec<ChunkFailure>,
}

/// Drives chunks through the text-understanding service
pub struct Pipeline<L: LlmProvider> {
    provider: L,
    config: ExtractorConfig,
}

impl<L: LlmProvider> Pipeline<L> {
    /// Create a pipeline
    pub fn new(provider: L, config: ExtractorConfig) -> Self {
        Self { provider, config }
    }

    /// The underlying provider
    pub fn provider(&self) -> &L {
        &self.provider
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Segmenter configured from this pipeline's limits
    pub fn segmenter(&self) -> Segmenter {
        Segmenter::new(self.config.segmenter)
    }

    /// Start a run over `chunks` at `start_index`
    ///
    /// Items from chunks before `start_index` are not known to this run, so a
    /// run with `start_index > 0` keeps no checkpoint when it stops; use
    /// [`Pipeline::resume`] to continue with a previous run's results.
    pub fn run(
        &self,
        chunks: Vec<Chunk>,
        start_index: usize,
        cancel: CancelSignal,
    ) -> ExtractionRun<'_, L> {
        let mut checkpoint = PipelineCheckpoint::new(chunks);
        checkpoint.cursor = start_index.min(checkpoint.total());
        let mut run = ExtractionRun::new(self, checkpoint, cancel);
        run.resumable = run.checkpoint.cursor == 0;
        run
    }

    /// Continue from a checkpoint, reusing its chunks and results
    pub fn resume(
        &self,
        checkpoint: PipelineCheckpoint,
        cancel: CancelSignal,
    ) -> Result<ExtractionRun<'_, L>, ExtractorError> {
        checkpoint.validate()?;
        info!(
            "Resuming at chunk {}/{} with {} items carried over",
            checkpoint.cursor + 1,
            checkpoint.total(),
            checkpoint.results_so_far.len()
        );
        Ok(ExtractionRun::new(self, checkpoint, cancel))
    }

    /// Extract from a short text as a single unlabelled chunk
    ///
    /// No segmentation and no checkpoint; a malformed response is an error.
    pub async fn analyze(
        &self,
        text: &str,
        cancel: &CancelSignal,
    ) -> Result<Vec<ExtractionItem>, ExtractorError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = PromptBuilder::new(text).build();
        let response =
            complete_with_retry(&self.provider, &prompt, &self.config.retry, cancel).await?;
        let items = parse_extraction_response(&response)?;
        info!("Analysis extracted {} items", items.len());
        Ok(items)
    }
}

/// A live, single-use extraction run
pub struct ExtractionRun<'a, L: LlmProvider> {
    pipeline: &'a Pipeline<L>,
    checkpoint: PipelineCheckpoint,
    cancel: CancelSignal,
    buffer: VecDeque<ExtractionItem>,
    status: RunStatus,
    malformed: Vec<ChunkFailure>,
    requests: usize,
    /// Whether `results_so_far` covers every chunk before the cursor
    resumable: bool,
}

impl<'a, L: LlmProvider> ExtractionRun<'a, L> {
    fn new(pipeline: &'a Pipeline<L>, checkpoint: PipelineCheckpoint, cancel: CancelSignal) -> Self {
        let status = if checkpoint.is_complete() {
            RunStatus::Completed
        } else {
            RunStatus::Running
        };
        Self {
            pipeline,
            checkpoint,
            cancel,
            buffer: VecDeque::new(),
            status,
            malformed: Vec::new(),
            requests: 0,
            resumable: true,
        }
    }

    /// Current status; `Running` while chunks remain
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// Progress so far
    pub fn checkpoint(&self) -> &PipelineCheckpoint {
        &self.checkpoint
    }

    /// Next extracted item, or `None` once the run has stopped
    pub async fn next_item(&mut self) -> Option<ExtractionItem> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(item);
            }
            if self.status != RunStatus::Running {
                return None;
            }
            self.process_next_chunk().await;
        }
    }

    /// Drain the run and report how it ended
    pub async fn finish(mut self) -> RunOutcome {
        while self.next_item().await.is_some() {}

        let items = self.checkpoint.results_so_far.clone();
        let checkpoint = (self.resumable && self.status.is_resumable()).then_some(self.checkpoint);
        RunOutcome {
            status: self.status,
            items,
            checkpoint,
            malformed: self.malformed,
        }
    }

    async fn process_next_chunk(&mut self) {
        let index = self.checkpoint.cursor;
        let total = self.checkpoint.total();
        if index >= total {
            self.status = RunStatus::Completed;
            return;
        }

        if self.requests > 0 {
            let delay = self.pipeline.config.inter_request_delay();
            if !delay.is_zero() {
                // A stop during the wait is picked up by the check below.
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        if let Some(intent) = self.cancel.intent() {
            self.stop(intent, index);
            return;
        }

        let chunk = &self.checkpoint.chunks[index];
        let chapter_label = chunk.chapter_label.clone();
        let prompt = PromptBuilder::new(&chunk.text)
            .with_chapter(chunk.chapter_label.as_deref())
            .build();
        info!(
            "Processing chunk {}/{}{}",
            index + 1,
            total,
            chapter_label
                .as_deref()
                .map(|l| format!(" ({})", l))
                .unwrap_or_default()
        );

        self.requests += 1;
        let response = complete_with_retry(
            &self.pipeline.provider,
            &prompt,
            &self.pipeline.config.retry,
            &self.cancel,
        )
        .await;

        match response {
            Ok(text) => {
                match parse_extraction_response(&text) {
                    Ok(items) => {
                        debug!("Chunk {} yielded {} items", index + 1, items.len());
                        self.checkpoint.results_so_far.extend(items.iter().cloned());
                        self.buffer.extend(items);
                    }
                    Err(e) => {
                        warn!("Chunk {}: {}; continuing", index + 1, e);
                        self.malformed.push(ChunkFailure {
                            index,
                            chapter_label,
                            reason: e.to_string(),
                        });
                    }
                }
                self.checkpoint.cursor += 1;
                if self.checkpoint.is_complete() {
                    info!(
                        "Extraction complete: {} items from {} chunks",
                        self.checkpoint.results_so_far.len(),
                        total
                    );
                    self.status = RunStatus::Completed;
                }
            }
            Err(LlmError::Cancelled) => {
                let intent = self.cancel.intent().unwrap_or(CancelIntent::Cancel);
                self.stop(intent, index);
            }
            Err(e) => {
                error!("Chunk {}/{} failed: {}", index + 1, total, e);
                self.status = RunStatus::Failed(ChunkFailure {
                    index,
                    chapter_label,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn stop(&mut self, intent: CancelIntent, index: usize) {
        self.status = match intent {
            CancelIntent::Pause => {
                info!("Paused before chunk {}/{}", index + 1, self.checkpoint.total());
                RunStatus::Paused { at: index }
            }
            CancelIntent::Cancel => {
                info!("Cancelled before chunk {}/{}", index + 1, self.checkpoint.total());
                RunStatus::Cancelled
            }
        };
    }
}
