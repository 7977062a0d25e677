//! Entries command implementation.

use super::Context;
use crate::cli::EntriesArgs;
use crate::error::Result;
use crate::output::Formatter;
use lorekeeper_domain::traits::EntryStore;

/// Execute the entries command.
pub fn execute_entries(args: EntriesArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let store = ctx.open_store()?;
    let entries = match args.category {
        Some(category) => store.list_by_category(category)?,
        None => store.list_entries()?,
    };

    println!("{}", formatter.format_entries(&entries)?);
    Ok(())
}
