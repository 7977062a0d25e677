//! Category module - the closed set of knowledge categories and their field schemas

use serde::{Deserialize, Serialize};
use std::fmt;

/// One detail field of a category's schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Stable key used in stored detail maps
    pub key: &'static str,

    /// Human-readable label used in prompts and rendering
    pub label: &'static str,
}

const fn field(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { key, label }
}

const CHARACTER_FIELDS: &[FieldSpec] = &[
    field("basicInfo", "Basic info"),
    field("biography", "Biography"),
    field("personality", "Personality"),
    field("abilities", "Abilities"),
    field("relationships", "Relationships"),
    field("notes", "Notes"),
];

const WORLD_FIELDS: &[FieldSpec] = &[
    field("overview", "Overview"),
    field("history", "History"),
    field("rules", "Rules"),
    field("factions", "Factions"),
    field("geography", "Geography"),
    field("glossary", "Glossary"),
];

const PLOT_FIELDS: &[FieldSpec] = &[
    field("summary", "Summary"),
    field("conflict", "Core conflict"),
    field("turningPoints", "Turning points"),
    field("ending", "Ending"),
];

const CHAPTER_FIELDS: &[FieldSpec] = &[
    field("chapterTitle", "Chapter title"),
    field("timeline", "Timeline"),
    field("events", "Events"),
    field("characters", "Characters"),
    field("transition", "Transition"),
];

const FORESHADOWING_FIELDS: &[FieldSpec] = &[
    field("description", "Description"),
    field("location", "Planted at"),
    field("revelation", "Expected payoff"),
    field("clues", "Related clues"),
    field("status", "Status"),
];

const ITEM_FIELDS: &[FieldSpec] = &[
    field("appearance", "Appearance"),
    field("origin", "Origin"),
    field("abilities", "Abilities"),
    field("owner", "Owner"),
    field("significance", "Significance"),
];

const LOCATION_FIELDS: &[FieldSpec] = &[
    field("description", "Description"),
    field("atmosphere", "Atmosphere"),
    field("history", "History"),
    field("inhabitants", "Inhabitants"),
    field("events", "Events"),
];

const TIMELINE_FIELDS: &[FieldSpec] = &[
    field("date", "Date"),
    field("event", "Event"),
    field("characters", "Characters"),
    field("impact", "Impact"),
    field("chapter", "Chapter"),
];

const MATERIAL_FIELDS: &[FieldSpec] = &[
    field("content", "Content"),
    field("source", "Source"),
    field("usage", "Usage"),
    field("tags", "Tags"),
];

/// Initial value of the foreshadowing `status` field
pub const UNREVEALED_STATUS: &str = "unrevealed";

/// Knowledge category
///
/// The set is closed: every value the extraction service returns is mapped onto
/// one of these variants before it is stored. `WritingMaterial` doubles as the
/// fallback for labels nothing else recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// People in the story
    CharacterProfile,

    /// Background, history, rules and factions of the world
    WorldSetting,

    /// Story-wide plot direction
    PlotSynopsis,

    /// Events of a specific chapter
    ChapterSummary,

    /// Hints, mysteries and planted clues
    Foreshadowing,

    /// Props, weapons and tokens
    Item,

    /// Places and scenes
    Location,

    /// Dated events on the story's timeline
    Timeline,

    /// Inspiration, references and loose material
    WritingMaterial,
}

impl Category {
    /// Every category, in presentation order
    pub const ALL: [Category; 9] = [
        Category::CharacterProfile,
        Category::WorldSetting,
        Category::PlotSynopsis,
        Category::ChapterSummary,
        Category::Foreshadowing,
        Category::Item,
        Category::Location,
        Category::Timeline,
        Category::WritingMaterial,
    ];

    /// Canonical human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::CharacterProfile => "character profile",
            Category::WorldSetting => "world setting",
            Category::PlotSynopsis => "plot synopsis",
            Category::ChapterSummary => "chapter summary",
            Category::Foreshadowing => "foreshadowing",
            Category::Item => "item",
            Category::Location => "location",
            Category::Timeline => "timeline",
            Category::WritingMaterial => "writing material",
        }
    }

    /// Wire name used by serde and the store
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CharacterProfile => "character_profile",
            Category::WorldSetting => "world_setting",
            Category::PlotSynopsis => "plot_synopsis",
            Category::ChapterSummary => "chapter_summary",
            Category::Foreshadowing => "foreshadowing",
            Category::Item => "item",
            Category::Location => "location",
            Category::Timeline => "timeline",
            Category::WritingMaterial => "writing_material",
        }
    }

    /// Ordered detail-field schema of this category
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Category::CharacterProfile => CHARACTER_FIELDS,
            Category::WorldSetting => WORLD_FIELDS,
            Category::PlotSynopsis => PLOT_FIELDS,
            Category::ChapterSummary => CHAPTER_FIELDS,
            Category::Foreshadowing => FORESHADOWING_FIELDS,
            Category::Item => ITEM_FIELDS,
            Category::Location => LOCATION_FIELDS,
            Category::Timeline => TIMELINE_FIELDS,
            Category::WritingMaterial => MATERIAL_FIELDS,
        }
    }

    /// Key of the field that receives free-form extracted content
    pub fn primary_field(&self) -> &'static FieldSpec {
        // Every schema is non-empty.
        &self.fields()[0]
    }

    /// Exact match against the canonical label or the wire name
    ///
    /// Case-insensitive; `_` and `-` are treated as spaces. Anything fuzzier
    /// belongs to the extractor's alias table.
    pub fn from_exact(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|c| c.label() == wanted || c.as_str().replace('_', " ") == wanted)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::WritingMaterial
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_exact(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}
