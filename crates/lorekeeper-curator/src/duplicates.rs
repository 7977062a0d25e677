//! Grouping entries whose titles name the same subject

use lorekeeper_domain::{Category, EntryId, KnowledgeEntry};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Minimum canonical name length (characters) used by [`find_duplicates`]
pub const DEFAULT_MIN_CANONICAL_LENGTH: usize = 2;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern is valid")
}

/// `Aria (2)`, `Aria（3）`
static NUMBERED_SUFFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*[（(]\d+[)）]\s*$"));

/// `Aria (the healer)`
static PAREN_SUFFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*[（(][^)）]+[)）]\s*$"));

/// `Aria — the healer`, `Aria: early years`
static QUALIFIER: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*[-—–:：]\s*.+$"));

/// Entries sharing a category and canonical name
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    /// Title with numbering, parentheticals and qualifiers removed
    pub canonical_name: String,

    /// Category shared by every member
    pub category: Category,

    /// Members in collection order
    pub entries: Vec<KnowledgeEntry>,
}

impl DuplicateGroup {
    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Member IDs in order
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

fn strip_once(title: &str) -> String {
    let name = NUMBERED_SUFFIX.replace(title, "");
    let name = PAREN_SUFFIX.replace(&name, "");
    let name = QUALIFIER.replace(&name, "");
    name.trim().to_string()
}

/// Reduce a title to the subject it names
///
/// Strips a numbered suffix, then a trailing parenthetical, then a
/// separator-introduced qualifier, repeating until nothing changes.
///
/// # Examples
///
/// ```
/// use lorekeeper_curator::canonicalize;
///
/// assert_eq!(canonicalize("Aria (2)"), "Aria");
/// assert_eq!(canonicalize("Aria — the healer"), "Aria");
/// assert_eq!(canonicalize("艾莉亚（回忆）"), "艾莉亚");
/// ```
pub fn canonicalize(title: &str) -> String {
    let mut name = title.trim().to_string();
    loop {
        let next = strip_once(&name);
        if next == name {
            return name;
        }
        name = next;
    }
}

/// Find duplicate groups with the default minimum name length
pub fn find_duplicates(entries: &[KnowledgeEntry]) -> Vec<DuplicateGroup> {
    find_duplicates_with(entries, DEFAULT_MIN_CANONICAL_LENGTH)
}

/// Find groups of two or more entries sharing `(category, canonical name)`
///
/// Largest groups first; equal sizes keep first-appearance order.
pub fn find_duplicates_with(
    entries: &[KnowledgeEntry],
    min_canonical_length: usize,
) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut index: HashMap<(Category, String), usize> = HashMap::new();

    for entry in entries {
        let canonical_name = canonicalize(&entry.title);
        if canonical_name.chars().count() < min_canonical_length {
            debug!("Skipping '{}': canonical name too short", entry.title);
            continue;
        }

        let key = (entry.category, canonical_name);
        match index.get(&key) {
            Some(&slot) => groups[slot].entries.push(entry.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    canonical_name: key.1,
                    category: key.0,
                    entries: vec![entry.clone()],
                });
            }
        }
    }

    groups.retain(|g| g.len() > 1);
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    debug!("Found {} duplicate groups", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(category: Category, title: &str) -> KnowledgeEntry {
        KnowledgeEntry::with_content(category, title, Vec::new(), "text")
    }

    #[test]
    fn test_canonicalize_suffixes() {
        assert_eq!(canonicalize("Aria (2)"), "Aria");
        assert_eq!(canonicalize("Aria（12）"), "Aria");
        assert_eq!(canonicalize("Aria (the healer)"), "Aria");
        assert_eq!(canonicalize("Aria — the healer"), "Aria");
        assert_eq!(canonicalize("Aria - early years"), "Aria");
        assert_eq!(canonicalize("Aria: childhood"), "Aria");
        assert_eq!(canonicalize("艾莉亚：童年"), "艾莉亚");
        assert_eq!(canonicalize("  Aria  "), "Aria");
    }

    #[test]
    fn test_canonicalize_nested_suffixes() {
        assert_eq!(canonicalize("Aria — the healer (2)"), "Aria");
        assert_eq!(canonicalize("Aria (healer) (3)"), "Aria");
    }

    #[test]
    fn test_canonicalize_leaves_plain_titles() {
        assert_eq!(canonicalize("The Silver Harbor"), "The Silver Harbor");
        assert_eq!(canonicalize("Aria -"), "Aria -");
    }

    #[test]
    fn test_aria_group() {
        let entries = vec![
            entry(Category::CharacterProfile, "Aria (2)"),
            entry(Category::CharacterProfile, "Aria — the healer"),
        ];

        let groups = find_duplicates(&entries);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].canonical_name, "Aria");
        assert_eq!(groups[0].category, Category::CharacterProfile);
        assert_eq!(groups[0].ids(), vec![entries[0].id, entries[1].id]);
    }

    #[test]
    fn test_category_separates_groups() {
        let entries = vec![
            entry(Category::CharacterProfile, "Aria"),
            entry(Category::Location, "Aria (2)"),
        ];
        assert!(find_duplicates(&entries).is_empty());
    }

    #[test]
    fn test_short_names_excluded() {
        let entries = vec![
            entry(Category::Item, "X (1)"),
            entry(Category::Item, "X (2)"),
            entry(Category::Item, "- dagger"),
            entry(Category::Item, "- sword"),
        ];
        assert!(find_duplicates(&entries).is_empty());
        assert_eq!(find_duplicates_with(&entries[..2], 1).len(), 1);
    }

    #[test]
    fn test_ordered_by_size_then_first_appearance() {
        let entries = vec![
            entry(Category::Location, "Harbor"),
            entry(Category::Location, "Harbor (2)"),
            entry(Category::CharacterProfile, "Aria"),
            entry(Category::CharacterProfile, "Aria (2)"),
            entry(Category::CharacterProfile, "Aria (3)"),
            entry(Category::Item, "Lamp"),
            entry(Category::Item, "Lamp: brass"),
        ];

        let groups = find_duplicates(&entries);

        let names: Vec<_> = groups.iter().map(|g| g.canonical_name.as_str()).collect();
        assert_eq!(names, vec!["Aria", "Harbor", "Lamp"]);
        assert_eq!(groups[0].len(), 3);
    }

    proptest! {
        #[test]
        fn prop_canonicalize_idempotent(title in "\\PC{0,40}") {
            let once = canonicalize(&title);
            prop_assert_eq!(canonicalize(&once), once);
        }

        #[test]
        fn prop_group_members_share_key(
            titles in prop::collection::vec("(Aria|Bren|Cole)( \\([0-9]\\)| — [a-z]{1,6})?", 0..12)
        ) {
            let entries: Vec<_> = titles
                .iter()
                .map(|t| entry(Category::CharacterProfile, t))
                .collect();

            let groups = find_duplicates(&entries);

            let mut seen = 0;
            for group in &groups {
                prop_assert!(group.len() >= 2);
                for member in &group.entries {
                    prop_assert_eq!(&canonicalize(&member.title), &group.canonical_name);
                }
                seen += group.len();
            }
            // Every entry whose key repeats lands in exactly one group.
            let repeated = entries
                .iter()
                .filter(|e| {
                    let key = canonicalize(&e.title);
                    entries.iter().filter(|o| canonicalize(&o.title) == key).count() > 1
                })
                .count();
            prop_assert_eq!(seen, repeated);
        }
    }
}
