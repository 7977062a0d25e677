//! Import, resume and restart command implementations.

use super::{Context, InterruptGuard, IMPORT_CHECKPOINT_KEY};
use crate::cli::ImportArgs;
use crate::config::OutputFormat;
use crate::document::read_document;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lorekeeper_domain::ExtractionItem;
use lorekeeper_extractor::{
    consolidate_items, import_items, ExtractorConfig, ImportSession, Pipeline, PipelineCheckpoint,
    RunStatus,
};
use lorekeeper_llm::{CancelSignal, LlmProvider};
use lorekeeper_store::SqliteStore;

/// Execute the import command.
pub async fn execute_import(args: ImportArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let text = read_document(&args.file)?;
    let config = ctx.extractor_config(args.max_chunk_length)?;
    let provider = ctx.provider()?;
    let cancel = CancelSignal::new();
    let _guard = InterruptGuard::pause_on_ctrl_c(&cancel);

    if args.dry_run {
        let items = dry_run(provider, config, &text, &cancel, formatter).await?;
        println!("{}", formatter.format_items(&items)?);
        return Ok(());
    }

    let mut store = ctx.open_store()?;
    import_text(provider, config, &text, &mut store, &cancel, formatter).await?;
    Ok(())
}

/// Execute the resume command.
pub async fn execute_resume(ctx: &Context, formatter: &Formatter) -> Result<()> {
    let provider = ctx.provider()?;
    let mut store = ctx.open_store()?;
    let cancel = CancelSignal::new();
    let _guard = InterruptGuard::pause_on_ctrl_c(&cancel);

    resume_import(provider, ctx.extractor_config(None)?, &mut store, &cancel, formatter).await?;
    Ok(())
}

/// Execute the restart command.
pub fn execute_restart(ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut store = ctx.open_store()?;
    if store.clear_checkpoint(IMPORT_CHECKPOINT_KEY)? {
        println!("{}", formatter.success("Discarded the paused import"));
    } else {
        println!("{}", formatter.info("No paused import"));
    }
    Ok(())
}

/// Run a fresh import of `text` and settle the result into `store`.
pub async fn import_text<L: LlmProvider>(
    provider: L,
    config: ExtractorConfig,
    text: &str,
    store: &mut SqliteStore,
    cancel: &CancelSignal,
    formatter: &Formatter,
) -> Result<RunStatus> {
    if store
        .load_checkpoint::<PipelineCheckpoint>(IMPORT_CHECKPOINT_KEY)?
        .is_some()
    {
        return Err(CliError::NotPermitted(
            "an import is paused; run 'resume' or 'restart' first".to_string(),
        ));
    }

    let mut session = ImportSession::new(Pipeline::new(provider, config));
    session
        .begin(text, cancel, |item| report_progress(formatter, item))
        .await?;
    settle(&session, store, formatter)
}

/// Continue the persisted import and settle the result into `store`.
pub async fn resume_import<L: LlmProvider>(
    provider: L,
    config: ExtractorConfig,
    store: &mut SqliteStore,
    cancel: &CancelSignal,
    formatter: &Formatter,
) -> Result<RunStatus> {
    let checkpoint: PipelineCheckpoint = store
        .load_checkpoint(IMPORT_CHECKPOINT_KEY)?
        .ok_or_else(|| CliError::InvalidInput("No paused import to resume".to_string()))?;

    println!(
        "{}",
        formatter.info(&format!(
            "Resuming at chunk {} of {}",
            checkpoint.cursor + 1,
            checkpoint.total()
        ))
    );
    let mut session = ImportSession::from_checkpoint(Pipeline::new(provider, config), checkpoint)?;
    session
        .resume(cancel, |item| report_progress(formatter, item))
        .await?;
    settle(&session, store, formatter)
}

async fn dry_run<L: LlmProvider>(
    provider: L,
    config: ExtractorConfig,
    text: &str,
    cancel: &CancelSignal,
    formatter: &Formatter,
) -> Result<Vec<ExtractionItem>> {
    let mut session = ImportSession::new(Pipeline::new(provider, config));
    let status = session.begin(text, cancel, |_| {}).await?;
    if status != RunStatus::Completed {
        eprintln!("{}", formatter.warning(&format!("Dry run {}", status)));
    }
    Ok(consolidate_items(session.items()))
}

/// Persist what the finished run left behind.
fn settle<L: LlmProvider>(
    session: &ImportSession<L>,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<RunStatus> {
    let status = session.status().clone();
    match &status {
        RunStatus::Completed => {
            let summary = import_items(store, session.items())?;
            store.clear_checkpoint(IMPORT_CHECKPOINT_KEY)?;
            println!(
                "{}",
                formatter.success(&format!(
                    "Import complete: {} entries created, {} updated",
                    summary.created, summary.appended
                ))
            );
        }
        RunStatus::Paused { .. } | RunStatus::Failed(_) => {
            if let Some(checkpoint) = session.checkpoint() {
                store.save_checkpoint(IMPORT_CHECKPOINT_KEY, checkpoint)?;
            }
            println!(
                "{}",
                formatter.warning(&format!(
                    "Import {} with {} items so far. Run 'lorekeeper resume' to continue.",
                    status,
                    session.items().len()
                ))
            );
        }
        RunStatus::Cancelled => {
            store.clear_checkpoint(IMPORT_CHECKPOINT_KEY)?;
            println!("{}", formatter.warning("Import cancelled; nothing was stored"));
        }
        RunStatus::Idle | RunStatus::Running => {}
    }
    Ok(status)
}

fn report_progress(formatter: &Formatter, item: &ExtractionItem) {
    if formatter.format() == OutputFormat::Table {
        println!("  + [{}] {}", item.category, item.title);
    }
}
