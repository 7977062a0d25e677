//! Duplicate listing and merge command implementations.

use super::{Context, InterruptGuard};
use crate::cli::MergeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lorekeeper_curator::{
    find_duplicates_with, CuratorConfig, DuplicateGroup, MergeEngine, MergeOptions, MergeReport,
};
use lorekeeper_domain::traits::EntryStore;
use lorekeeper_llm::{CancelSignal, LlmProvider};
use lorekeeper_store::SqliteStore;

/// Which groups a merge covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeTarget {
    /// One group, numbered from 1 as listed by `duplicates`
    Group(usize),
    /// Every group
    All,
}

impl TryFrom<&MergeArgs> for MergeTarget {
    type Error = CliError;

    fn try_from(args: &MergeArgs) -> Result<Self> {
        match (args.group, args.all) {
            (Some(n), false) => Ok(MergeTarget::Group(n)),
            (None, true) => Ok(MergeTarget::All),
            _ => Err(CliError::InvalidInput(
                "specify exactly one of --group N or --all".to_string(),
            )),
        }
    }
}

/// Execute the duplicates command.
pub fn execute_duplicates(ctx: &Context, formatter: &Formatter) -> Result<()> {
    let store = ctx.open_store()?;
    let groups = duplicate_groups(&store, &ctx.config.curator)?;

    println!("{}", formatter.format_groups(&groups)?);
    Ok(())
}

/// Execute the merge command.
pub async fn execute_merge(args: MergeArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let target = MergeTarget::try_from(&args)?;
    let provider = ctx.provider()?;
    let mut store = ctx.open_store()?;
    let cancel = CancelSignal::new();
    let _guard = InterruptGuard::pause_on_ctrl_c(&cancel);

    let report = merge_groups(
        provider,
        ctx.config.curator.clone(),
        &mut store,
        target,
        args.delete_originals,
        &cancel,
    )
    .await?;

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

fn duplicate_groups(store: &SqliteStore, config: &CuratorConfig) -> Result<Vec<DuplicateGroup>> {
    let entries = store.list_entries()?;
    Ok(find_duplicates_with(&entries, config.min_canonical_length))
}

/// Merge the targeted duplicate groups currently in `store`.
///
/// `delete_originals` adds to the configured setting; it never turns it off.
pub async fn merge_groups<L: LlmProvider>(
    provider: L,
    config: CuratorConfig,
    store: &mut SqliteStore,
    target: MergeTarget,
    delete_originals: bool,
    cancel: &CancelSignal,
) -> Result<MergeReport> {
    let groups = duplicate_groups(store, &config)?;
    let options = MergeOptions {
        delete_originals: delete_originals || config.delete_originals,
    };
    let engine = MergeEngine::new(provider, config);

    match target {
        MergeTarget::All => Ok(engine.merge_all(&groups, store, options, cancel).await),
        MergeTarget::Group(n) => {
            let group = n
                .checked_sub(1)
                .and_then(|i| groups.get(i))
                .ok_or_else(|| {
                    CliError::InvalidInput(format!(
                        "No duplicate group {} ({} found)",
                        n,
                        groups.len()
                    ))
                })?;
            let outcome = engine.merge(group, store, options, cancel).await?;
            let mut report = MergeReport::new();
            report.removed = outcome.removed.len();
            report.merged.push(outcome.entry);
            Ok(report)
        }
    }
}
