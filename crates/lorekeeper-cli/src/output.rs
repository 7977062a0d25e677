//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use lorekeeper_curator::{DuplicateGroup, MergeReport};
use lorekeeper_domain::{Chunk, ExtractionItem, KnowledgeEntry};
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_CHARS: usize = 40;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a segmentation preview.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<_> = chunks
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        json!({
                            "index": i,
                            "chapter_label": c.chapter_label,
                            "length": c.char_len(),
                            "text": c.text,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(chunks.len().to_string()),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("No chunks produced.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Chapter", "Chars", "Preview"]);
                for (i, chunk) in chunks.iter().enumerate() {
                    builder.push_record([
                        (i + 1).to_string(),
                        chunk.chapter_label.clone().unwrap_or_else(|| "-".to_string()),
                        chunk.char_len().to_string(),
                        preview(&chunk.text),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format extracted items (dry runs).
    pub fn format_items(&self, items: &[ExtractionItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
            OutputFormat::Quiet => Ok(items
                .iter()
                .map(|i| i.title.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if items.is_empty() {
                    return Ok(self.colorize("No items extracted.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Category", "Title", "Keywords", "Content"]);
                for item in items {
                    builder.push_record([
                        item.category.label().to_string(),
                        item.title.clone(),
                        item.keywords.join(", "),
                        preview(&item.content),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format stored entries.
    pub fn format_entries(&self, entries: &[KnowledgeEntry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
            OutputFormat::Quiet => Ok(entries
                .iter()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if entries.is_empty() {
                    return Ok(self.colorize("No entries found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Category", "Title", "Keywords", "Content"]);
                for entry in entries {
                    let id = entry.id.to_string();
                    builder.push_record([
                        id.chars().take(8).collect::<String>(),
                        entry.category.label().to_string(),
                        entry.title.clone(),
                        entry.keywords.join(", "),
                        preview(entry.primary_text()),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format duplicate groups, numbered from 1.
    pub fn format_groups(&self, groups: &[DuplicateGroup]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<_> = groups
                    .iter()
                    .enumerate()
                    .map(|(i, g)| {
                        json!({
                            "group": i + 1,
                            "canonical_name": g.canonical_name,
                            "category": g.category,
                            "entries": g.entries,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(groups
                .iter()
                .map(|g| g.canonical_name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if groups.is_empty() {
                    return Ok(self.colorize("No duplicates found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Category", "Subject", "Count", "Titles"]);
                for (i, group) in groups.iter().enumerate() {
                    let titles: Vec<&str> = group.entries.iter().map(|e| e.title.as_str()).collect();
                    builder.push_record([
                        (i + 1).to_string(),
                        group.category.label().to_string(),
                        group.canonical_name.clone(),
                        group.len().to_string(),
                        titles.join(" | "),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a merge batch report.
    pub fn format_report(&self, report: &MergeReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let failures: Vec<_> = report
                    .failures
                    .iter()
                    .map(|f| {
                        json!({
                            "canonical_name": f.canonical_name,
                            "category": f.category,
                            "reason": f.reason,
                        })
                    })
                    .collect();
                let value = json!({
                    "merged": report.merged,
                    "failures": failures,
                    "removed": report.removed,
                    "skipped": report.skipped,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(report
                .merged
                .iter()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if report.is_clean() {
                    Ok(self.success(&report.summary()))
                } else {
                    Ok(self.warning(&report.summary()))
                }
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First characters of `text` on one line.
fn preview(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut)
}
