//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Category, EntryId, KnowledgeEntry};

/// Trait for storing and retrieving knowledge entries
///
/// Implemented by the infrastructure layer (lorekeeper-store). The extraction
/// and merge code receives a store explicitly instead of reaching for shared
/// application state.
pub trait EntryStore {
    /// Error type for store operations
    type Error;

    /// All entries, oldest first
    fn list_entries(&self) -> Result<Vec<KnowledgeEntry>, Self::Error>;

    /// Entries of a single category, oldest first
    fn list_by_category(&self, category: Category) -> Result<Vec<KnowledgeEntry>, Self::Error> {
        Ok(self
            .list_entries()?
            .into_iter()
            .filter(|e| e.category == category)
            .collect())
    }

    /// Get an entry by ID
    fn get_entry(&self, id: EntryId) -> Result<Option<KnowledgeEntry>, Self::Error>;

    /// Insert a new entry
    fn insert_entry(&mut self, entry: KnowledgeEntry) -> Result<EntryId, Self::Error>;

    /// Replace an existing entry (matched by ID)
    fn update_entry(&mut self, entry: &KnowledgeEntry) -> Result<(), Self::Error>;

    /// Remove an entry; returns whether it existed
    fn remove_entry(&mut self, id: EntryId) -> Result<bool, Self::Error>;
}
