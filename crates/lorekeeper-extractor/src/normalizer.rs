//! Mapping free-form category labels onto the closed category set

use lorekeeper_domain::Category;
use tracing::warn;

/// Synonyms, abbreviations and the Chinese category names
///
/// Keys are stored in lookup form: lowercase, single spaces.
const ALIASES: &[(&str, Category)] = &[
    ("character", Category::CharacterProfile),
    ("characters", Category::CharacterProfile),
    ("character profiles", Category::CharacterProfile),
    ("profile", Category::CharacterProfile),
    ("person", Category::CharacterProfile),
    ("people", Category::CharacterProfile),
    ("人物简介", Category::CharacterProfile),
    ("人物", Category::CharacterProfile),
    ("角色", Category::CharacterProfile),
    ("world", Category::WorldSetting),
    ("worldbuilding", Category::WorldSetting),
    ("world building", Category::WorldSetting),
    ("setting", Category::WorldSetting),
    ("lore", Category::WorldSetting),
    ("世界观", Category::WorldSetting),
    ("设定", Category::WorldSetting),
    ("plot", Category::PlotSynopsis),
    ("synopsis", Category::PlotSynopsis),
    ("main plot", Category::PlotSynopsis),
    ("storyline", Category::PlotSynopsis),
    ("剧情梗概", Category::PlotSynopsis),
    ("剧情", Category::PlotSynopsis),
    ("主线", Category::PlotSynopsis),
    ("chapter", Category::ChapterSummary),
    ("chapter synopsis", Category::ChapterSummary),
    ("chapter outline", Category::ChapterSummary),
    ("章节梗概", Category::ChapterSummary),
    ("章节", Category::ChapterSummary),
    ("foreshadow", Category::Foreshadowing),
    ("hint", Category::Foreshadowing),
    ("hints", Category::Foreshadowing),
    ("clue", Category::Foreshadowing),
    ("clues", Category::Foreshadowing),
    ("mystery", Category::Foreshadowing),
    ("subplot", Category::Foreshadowing),
    ("支线伏笔", Category::Foreshadowing),
    ("伏笔", Category::Foreshadowing),
    ("线索", Category::Foreshadowing),
    ("items", Category::Item),
    ("object", Category::Item),
    ("prop", Category::Item),
    ("props", Category::Item),
    ("weapon", Category::Item),
    ("artifact", Category::Item),
    ("道具物品", Category::Item),
    ("道具", Category::Item),
    ("物品", Category::Item),
    ("place", Category::Location),
    ("places", Category::Location),
    ("locations", Category::Location),
    ("scene", Category::Location),
    ("场景地点", Category::Location),
    ("场景", Category::Location),
    ("地点", Category::Location),
    ("chronology", Category::Timeline),
    ("events", Category::Timeline),
    ("timeline event", Category::Timeline),
    ("时间线", Category::Timeline),
    ("时间轴", Category::Timeline),
    ("material", Category::WritingMaterial),
    ("materials", Category::WritingMaterial),
    ("general material", Category::WritingMaterial),
    ("notes", Category::WritingMaterial),
    ("inspiration", Category::WritingMaterial),
    ("reference", Category::WritingMaterial),
    ("写作素材", Category::WritingMaterial),
    ("素材", Category::WritingMaterial),
];

fn lookup_form(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a label onto a category
///
/// Exact match, then the alias table, then [`Category::WritingMaterial`].
/// Never fails; the fallback is logged.
///
/// # Examples
///
/// ```
/// use lorekeeper_domain::Category;
/// use lorekeeper_extractor::normalize;
///
/// assert_eq!(normalize("Character Profile"), Category::CharacterProfile);
/// assert_eq!(normalize("伏笔"), Category::Foreshadowing);
/// assert_eq!(normalize("recipes"), Category::WritingMaterial);
/// ```
pub fn normalize(label: &str) -> Category {
    if let Some(category) = Category::from_exact(label) {
        return category;
    }
    let key = lookup_form(label);
    if let Some((_, category)) = ALIASES.iter().find(|(alias, _)| *alias == key) {
        return *category;
    }
    warn!(
        "Unknown category '{}', filing under {}",
        label,
        Category::default()
    );
    Category::default()
}
