//! Folding extraction results and importing them into an entry store

use lorekeeper_domain::traits::EntryStore;
use lorekeeper_domain::{merge_keywords, ExtractionItem, KnowledgeEntry};
use tracing::{debug, info};

/// Counts from [`import_items`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// New entries created
    pub created: usize,

    /// Existing entries that received appended content
    pub appended: usize,
}

/// Fold items that share `(category, title)`
///
/// Contents are joined by a blank line and keywords unioned; the first
/// occurrence fixes the position in the output.
pub fn consolidate_items(items: &[ExtractionItem]) -> Vec<ExtractionItem> {
    let mut folded: Vec<ExtractionItem> = Vec::new();
    for item in items {
        match folded
            .iter_mut()
            .find(|f| f.category == item.category && f.title == item.title)
        {
            Some(existing) => {
                existing.content.push_str("\n\n");
                existing.content.push_str(&item.content);
                existing.keywords = merge_keywords(&existing.keywords, &item.keywords);
            }
            None => folded.push(item.clone()),
        }
    }
    folded
}

/// Store consolidated items as entries
///
/// An item whose category and title match a stored entry is appended to that
/// entry's first field; anything else becomes a new entry.
pub fn import_items<S: EntryStore>(
    store: &mut S,
    items: &[ExtractionItem],
) -> Result<ImportSummary, S::Error> {
    let items = consolidate_items(items);
    let mut existing = store.list_entries()?;
    let mut summary = ImportSummary::default();

    for item in &items {
        match existing
            .iter_mut()
            .find(|e| e.category == item.category && e.title == item.title)
        {
            Some(entry) => {
                entry.append_content(&item.content);
                entry.add_keywords(&item.keywords);
                store.update_entry(entry)?;
                debug!("Appended to existing entry '{}'", entry.title);
                summary.appended += 1;
            }
            None => {
                let entry = KnowledgeEntry::from_item(item);
                store.insert_entry(entry.clone())?;
                existing.push(entry);
                summary.created += 1;
            }
        }
    }

    info!(
        "Imported {} items: {} created, {} appended",
        items.len(),
        summary.created,
        summary.appended
    );
    Ok(summary)
}
