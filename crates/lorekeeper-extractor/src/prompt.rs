//! Prompt construction for chunk extraction

use lorekeeper_domain::Category;

/// Builds the extraction prompt for one chunk
pub struct PromptBuilder<'a> {
    text: &'a str,
    chapter_label: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            chapter_label: None,
        }
    }

    /// Add the chapter the text belongs to as context
    pub fn with_chapter(mut self, chapter_label: Option<&'a str>) -> Self {
        self.chapter_label = chapter_label;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\nCategories (use exactly these names):\n");
        for (i, category) in Category::ALL.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {}: {}\n",
                i + 1,
                category.label(),
                category_hint(*category)
            ));
        }
        prompt.push('\n');
        prompt.push_str(OUTPUT_FORMAT);
        prompt.push_str("\n\n");

        if let Some(label) = self.chapter_label {
            prompt.push_str(&format!("Current chapter: {}\n", label));
        }

        prompt.push_str("Text to analyze:\n---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n");
        prompt
    }
}

fn category_hint(category: Category) -> &'static str {
    match category {
        Category::CharacterProfile => {
            "names, appearance, personality, background, relationships, abilities, life events"
        }
        Category::WorldSetting => {
            "world background, history, rules and power systems, factions, geography, terminology"
        }
        Category::PlotSynopsis => "main storyline, core conflicts, major turning points",
        Category::ChapterSummary => "concrete events, scenes and developments of this chapter",
        Category::Foreshadowing => "hints, planted clues, unresolved mysteries, possible payoffs",
        Category::Item => "important props, weapons and tokens",
        Category::Location => "detailed descriptions of important places and scenes",
        Category::Timeline => "events on the story's timeline",
        Category::WritingMaterial => "inspiration, references, reusable passages",
    }
}

const EXTRACTION_INSTRUCTIONS: &str = "You are a professional fiction analyst. Read the following \
excerpt of a novel carefully and extract the knowledge it contains.

Rules:
- Describe each entry in as much detail as the text supports (at least 100 characters of content)
- Keywords should include names, places and terms useful for later retrieval
- Only use the categories listed below";

const OUTPUT_FORMAT: &str = r#"Output format (JSON array only, no additional text):
[{"category": "<category>", "title": "<name>", "keywords": ["<keyword>", "<keyword>"], "content": "<detailed description>"}]
If there is nothing to extract, return an empty array []."#;
