//! Knowledge entry module - the stored unit of the knowledge base

use crate::category::{Category, UNREVEALED_STATUS};
use crate::extraction::{merge_keywords, ExtractionItem};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a knowledge entry based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time, which is the order the
/// store lists entries in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u128);

impl EntryId {
    /// Generate a new UUIDv7-based EntryId
    ///
    /// # Examples
    ///
    /// ```
    /// use lorekeeper_domain::EntryId;
    ///
    /// let id = EntryId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an EntryId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an EntryId from its hyphenated string form
    ///
    /// # Examples
    ///
    /// ```
    /// use lorekeeper_domain::EntryId;
    ///
    /// let id = EntryId::new();
    /// let parsed = EntryId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid entry id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the UUIDv7
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EntryId::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// A knowledge entry
///
/// `details` maps field keys of the category's schema to text. Keys outside
/// the schema are tolerated but never rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Unique identifier
    pub id: EntryId,

    /// Category the entry belongs to
    pub category: Category,

    /// Display title
    pub title: String,

    /// Retrieval keywords, ordered and free of duplicates
    pub keywords: Vec<String>,

    /// Field key → text
    pub details: BTreeMap<String, String>,
}

impl KnowledgeEntry {
    /// Create an entry with an empty detail map for its category
    pub fn new(category: Category, title: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            id: EntryId::new(),
            category,
            title: title.into(),
            keywords: merge_keywords(&[], &keywords),
            details: empty_details(category),
        }
    }

    /// Create an entry whose primary field holds `content`
    pub fn with_content(
        category: Category,
        title: impl Into<String>,
        keywords: Vec<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut entry = Self::new(category, title, keywords);
        entry
            .details
            .insert(category.primary_field().key.to_string(), content.into());
        entry
    }

    /// Convert an extraction item into a fresh entry
    pub fn from_item(item: &ExtractionItem) -> Self {
        Self::with_content(
            item.category,
            item.title.clone(),
            item.keywords.clone(),
            item.content.clone(),
        )
    }

    /// Text of the primary field (empty if unset)
    pub fn primary_text(&self) -> &str {
        self.details
            .get(self.category.primary_field().key)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Append text to the primary field, separated by a blank line
    pub fn append_content(&mut self, content: &str) {
        let key = self.category.primary_field().key.to_string();
        let slot = self.details.entry(key).or_default();
        if slot.trim().is_empty() {
            *slot = content.to_string();
        } else {
            slot.push_str("\n\n");
            slot.push_str(content);
        }
    }

    /// Add keywords not already present, keeping order
    pub fn add_keywords(&mut self, keywords: &[String]) {
        self.keywords = merge_keywords(&self.keywords, keywords);
    }

    /// Non-empty fields as `(label, value)` in schema order
    pub fn filled_fields(&self) -> Vec<(&'static str, &str)> {
        self.category
            .fields()
            .iter()
            .filter_map(|f| {
                self.details
                    .get(f.key)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(|v| (f.label, v))
            })
            .collect()
    }

    /// Render non-empty fields as `label: value` lines
    pub fn summary_text(&self) -> String {
        self.filled_fields()
            .into_iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Empty detail map for a category's schema
pub fn empty_details(category: Category) -> BTreeMap<String, String> {
    category
        .fields()
        .iter()
        .map(|f| {
            let initial = if f.key == "status" { UNREVEALED_STATUS } else { "" };
            (f.key.to_string(), initial.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_ordering() {
        let id1 = EntryId::from_value(1000);
        let id2 = EntryId::from_value(2000);
        assert!(id1 < id2);
    }

    #[test]
    fn test_entry_id_chronological() {
        let id1 = EntryId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = EntryId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_entry_id_invalid_string() {
        assert!(EntryId::from_string("not-a-valid-uuid").is_err());
        assert!(EntryId::from_string("").is_err());
    }

    #[test]
    fn test_entry_id_serializes_as_string() {
        let id = EntryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_from_item_fills_primary_field() {
        let item = ExtractionItem {
            category: Category::CharacterProfile,
            title: "Aria".to_string(),
            keywords: vec!["Aria".to_string(), "healer".to_string()],
            content: "A travelling healer.".to_string(),
        };
        let entry = KnowledgeEntry::from_item(&item);

        assert_eq!(entry.category, Category::CharacterProfile);
        assert_eq!(entry.details.get("basicInfo").unwrap(), "A travelling healer.");
        assert_eq!(entry.details.get("biography").unwrap(), "");
        assert_eq!(entry.details.len(), Category::CharacterProfile.fields().len());
    }

    #[test]
    fn test_foreshadowing_status_defaults_to_unrevealed() {
        let entry = KnowledgeEntry::new(Category::Foreshadowing, "The locked door", vec![]);
        assert_eq!(entry.details.get("status").unwrap(), UNREVEALED_STATUS);
    }

    #[test]
    fn test_append_content() {
        let mut entry = KnowledgeEntry::new(Category::Location, "Harbor", vec![]);
        entry.append_content("Foggy at dawn.");
        entry.append_content("Smells of tar.");
        assert_eq!(entry.primary_text(), "Foggy at dawn.\n\nSmells of tar.");
    }

    #[test]
    fn test_summary_text_skips_empty_fields() {
        let mut entry = KnowledgeEntry::with_content(
            Category::Item,
            "Moon blade",
            vec![],
            "Pale and curved.",
        );
        entry.details.insert("owner".to_string(), "Aria".to_string());

        assert_eq!(entry.summary_text(), "Appearance: Pale and curved.\nOwner: Aria");
    }

    #[test]
    fn test_add_keywords_dedupes() {
        let mut entry = KnowledgeEntry::new(
            Category::Item,
            "Moon blade",
            vec!["blade".to_string(), "blade".to_string()],
        );
        entry.add_keywords(&["moon".to_string(), "blade".to_string()]);
        assert_eq!(entry.keywords, vec!["blade", "moon"]);
    }
}
