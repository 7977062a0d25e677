//! Extraction module - chunks of source text and the items extracted from them

use crate::category::Category;
use serde::{Deserialize, Serialize};

/// A bounded, ordered slice of source text
///
/// Produced by the segmenter and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Narrative text of the chunk (non-empty)
    pub text: String,

    /// Heading of the chapter the chunk belongs to, if one was detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_label: Option<String>,
}

impl Chunk {
    /// Create a chunk
    pub fn new(text: impl Into<String>, chapter_label: Option<String>) -> Self {
        Self {
            text: text.into(),
            chapter_label,
        }
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One validated knowledge item extracted from a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionItem {
    /// Normalized category
    pub category: Category,

    /// Non-empty title
    pub title: String,

    /// Ordered keyword set
    pub keywords: Vec<String>,

    /// Non-empty descriptive content
    pub content: String,
}

/// Union of two keyword lists, keeping first-seen order
///
/// Keywords are trimmed; empty strings are dropped.
pub fn merge_keywords(existing: &[String], extra: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + extra.len());
    for keyword in existing.iter().chain(extra) {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !merged.iter().any(|k| k == keyword) {
            merged.push(keyword.to_string());
        }
    }
    merged
}
