//! User-facing import state machine across pause/resume/restart

use crate::checkpoint::PipelineCheckpoint;
use crate::error::ExtractorError;
use crate::pipeline::{Pipeline, RunOutcome, RunStatus};
use lorekeeper_domain::ExtractionItem;
use lorekeeper_llm::{CancelSignal, LlmProvider};
use tracing::info;

/// Owns a pipeline, the latest status, and the checkpoint between runs
///
/// `Idle → Running → {Paused, Failed, Completed, Cancelled}`; `Paused`/`Failed`
/// go back to `Running` through [`resume`](Self::resume) or to `Idle`
/// through [`restart`](Self::restart).
pub struct ImportSession<L: LlmProvider> {
    pipeline: Pipeline<L>,
    status: RunStatus,
    checkpoint: Option<PipelineCheckpoint>,
    items: Vec<ExtractionItem>,
}

impl<L: LlmProvider> ImportSession<L> {
    /// New idle session
    pub fn new(pipeline: Pipeline<L>) -> Self {
        Self {
            pipeline,
            status: RunStatus::Idle,
            checkpoint: None,
            items: Vec::new(),
        }
    }

    /// Rebuild a paused session from a persisted checkpoint
    pub fn from_checkpoint(
        pipeline: Pipeline<L>,
        checkpoint: PipelineCheckpoint,
    ) -> Result<Self, ExtractorError> {
        checkpoint.validate()?;
        Ok(Self {
            pipeline,
            status: RunStatus::Paused {
                at: checkpoint.cursor,
            },
            items: checkpoint.results_so_far.clone(),
            checkpoint: Some(checkpoint),
        })
    }

    /// Current status
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// Checkpoint kept for a paused or failed run
    pub fn checkpoint(&self) -> Option<&PipelineCheckpoint> {
        self.checkpoint.as_ref()
    }

    /// Items extracted by the latest run (including any resumed prefix)
    pub fn items(&self) -> &[ExtractionItem] {
        &self.items
    }

    /// The pipeline driving this session
    pub fn pipeline(&self) -> &Pipeline<L> {
        &self.pipeline
    }

    /// Segment `text` and run from the first chunk
    ///
    /// `on_item` sees every item as it is extracted.
    pub async fn begin<F>(
        &mut self,
        text: &str,
        cancel: &CancelSignal,
        on_item: F,
    ) -> Result<RunStatus, ExtractorError>
    where
        F: FnMut(&ExtractionItem),
    {
        if self.status.is_resumable() {
            return Err(ExtractorError::InvalidState(format!(
                "an import is {}; resume or restart it first",
                self.status
            )));
        }
        let chunks = self.pipeline.segmenter().segment(text);
        info!("Starting import of {} chunks", chunks.len());
        self.drive(PipelineCheckpoint::new(chunks), cancel, on_item).await
    }

    /// Continue a paused or failed run from its checkpoint
    pub async fn resume<F>(
        &mut self,
        cancel: &CancelSignal,
        on_item: F,
    ) -> Result<RunStatus, ExtractorError>
    where
        F: FnMut(&ExtractionItem),
    {
        let checkpoint = match (&self.status, self.checkpoint.take()) {
            (status, Some(checkpoint)) if status.is_resumable() => checkpoint,
            (_, checkpoint) => {
                self.checkpoint = checkpoint;
                return Err(ExtractorError::InvalidState(format!(
                    "nothing to resume; the import is {}",
                    self.status
                )));
            }
        };
        self.drive(checkpoint, cancel, on_item).await
    }

    /// Discard a paused or failed run's checkpoint
    pub fn restart(&mut self) -> Result<(), ExtractorError> {
        if !self.status.is_resumable() {
            return Err(ExtractorError::InvalidState(format!(
                "nothing to restart; the import is {}",
                self.status
            )));
        }
        info!("Discarding checkpoint ({})", self.status);
        self.status = RunStatus::Idle;
        self.checkpoint = None;
        self.items.clear();
        Ok(())
    }

    async fn drive<F>(
        &mut self,
        checkpoint: PipelineCheckpoint,
        cancel: &CancelSignal,
        mut on_item: F,
    ) -> Result<RunStatus, ExtractorError>
    where
        F: FnMut(&ExtractionItem),
    {
        let mut run = self.pipeline.resume(checkpoint, cancel.clone())?;
        self.status = RunStatus::Running;
        while let Some(item) = run.next_item().await {
            on_item(&item);
        }
        let RunOutcome {
            status,
            items,
            checkpoint,
            ..
        } = run.finish().await;

        self.status = status.clone();
        self.items = items;
        self.checkpoint = checkpoint;
        Ok(status)
    }
}
