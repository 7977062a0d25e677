//! Prompt construction for merging a duplicate group

use crate::duplicates::DuplicateGroup;
use lorekeeper_domain::Category;

/// Annotation the service is asked to attach to conflicting statements
pub const MULTIPLE_ACCOUNTS: &str = "(multiple accounts)";

/// Builds the synthesis prompt for one group
pub struct MergePromptBuilder<'a> {
    group: &'a DuplicateGroup,
}

impl<'a> MergePromptBuilder<'a> {
    /// Create a builder for `group`
    pub fn new(group: &'a DuplicateGroup) -> Self {
        Self { group }
    }

    /// Build the complete merge prompt
    pub fn build(&self) -> String {
        let group = self.group;
        let mut prompt = format!(
            "You are a professional editor of fiction reference notes. Merge the following \
             entries about the same subject \"{}\" into one complete, detailed entry.\n\n",
            group.canonical_name
        );
        prompt.push_str(&format!("Category: {}\n", group.category.label()));
        prompt.push_str(&format!("Number of entries: {}\n\n", group.len()));

        prompt.push_str("Requirements:\n");
        prompt.push_str("1. Integrate all information without dropping any detail\n");
        prompt.push_str("2. Remove content that is exactly duplicated; keep unique details\n");
        prompt.push_str(&format!(
            "3. When statements contradict each other, keep all of them and mark them \"{}\"\n",
            MULTIPLE_ACCOUNTS
        ));
        prompt.push_str("4. Organize the content in chronological or logical order\n\n");

        prompt.push_str(structure_hint(group.category));
        prompt.push_str("\n\nOriginal entries:\n");
        prompt.push_str(&self.entries_section());
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT);
        prompt
    }

    fn entries_section(&self) -> String {
        self.group
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mut block = format!(
                    "[Entry {}: {}]\nKeywords: {}",
                    i + 1,
                    entry.title,
                    entry.keywords.join(", ")
                );
                let fields = entry.summary_text();
                if !fields.is_empty() {
                    block.push('\n');
                    block.push_str(&fields);
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

fn structure_hint(category: Category) -> &'static str {
    match category {
        Category::CharacterProfile => {
            "Suggested profile structure:\n\
             - Basic information (name, rank, position)\n\
             - Appearance\n\
             - Personality\n\
             - Abilities\n\
             - Relationships\n\
             - Important experiences, in timeline order\n\
             - Summary of key events"
        }
        Category::WorldSetting => {
            "Suggested setting structure:\n\
             - Concept definition\n\
             - Historical background\n\
             - Rules of operation\n\
             - Related organizations and factions\n\
             - Important details"
        }
        Category::ChapterSummary => {
            "Suggested chapter structure:\n\
             - Chapter range\n\
             - Main events\n\
             - Character interactions\n\
             - Key turning points\n\
             - Foreshadowing and clues"
        }
        _ => {
            "Suggested structure:\n\
             - Core information\n\
             - Detailed description\n\
             - Related content"
        }
    }
}

const OUTPUT_FORMAT: &str = r#"Output format (a single JSON object, no additional text):
{"title": "<concise title>", "keywords": ["<keyword>", "<keyword>"], "content": "<detailed merged content>"}"#;
