//! Synthesizing one entry from a duplicate group

use crate::config::CuratorConfig;
use crate::duplicates::DuplicateGroup;
use crate::error::CuratorError;
use crate::prompt::MergePromptBuilder;
use crate::report::{MergeFailure, MergeReport};
use lorekeeper_domain::traits::EntryStore;
use lorekeeper_domain::{EntryId, KnowledgeEntry};
use lorekeeper_llm::{complete_with_retry, find_json_object, CancelSignal, LlmProvider};
use serde_json::{Map, Value};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Per-call merge options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Remove the group's members once the merged entry is stored
    pub delete_originals: bool,
}

impl From<&CuratorConfig> for MergeOptions {
    fn from(config: &CuratorConfig) -> Self {
        Self {
            delete_originals: config.delete_originals,
        }
    }
}

/// A stored merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The new entry as inserted
    pub entry: KnowledgeEntry,

    /// Originals removed (empty unless requested)
    pub removed: Vec<EntryId>,
}

/// Merges duplicate groups through the text-understanding service
///
/// # Examples
///
/// ```no_run
/// use lorekeeper_curator::{find_duplicates, CuratorConfig, MergeEngine, MergeOptions};
/// use lorekeeper_domain::traits::EntryStore;
/// use lorekeeper_llm::{CancelSignal, MockProvider};
/// use lorekeeper_store::SqliteStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("lore.db")?;
/// let groups = find_duplicates(&store.list_entries()?);
///
/// let engine = MergeEngine::new(MockProvider::default(), CuratorConfig::default());
/// let report = engine
///     .merge_all(&groups, &mut store, MergeOptions::default(), &CancelSignal::new())
///     .await;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct MergeEngine<L: LlmProvider> {
    provider: L,
    config: CuratorConfig,
}

impl<L: LlmProvider> MergeEngine<L> {
    /// Create a merge engine
    pub fn new(provider: L, config: CuratorConfig) -> Self {
        Self { provider, config }
    }

    /// The underlying provider
    pub fn provider(&self) -> &L {
        &self.provider
    }

    /// Active configuration
    pub fn config(&self) -> &CuratorConfig {
        &self.config
    }

    /// Ask the service for a consolidated entry; nothing is stored
    pub async fn synthesize(
        &self,
        group: &DuplicateGroup,
        cancel: &CancelSignal,
    ) -> Result<KnowledgeEntry, CuratorError> {
        validate_group(group)?;

        let prompt = MergePromptBuilder::new(group).build();
        debug!(
            "Merging {} entries for '{}' ({})",
            group.len(),
            group.canonical_name,
            group.category
        );
        let response =
            complete_with_retry(&self.provider, &prompt, &self.config.retry, cancel).await?;

        let object = find_json_object(&response).ok_or_else(|| {
            CuratorError::MalformedResponse("response contains no JSON object".to_string())
        })?;
        Ok(entry_from_object(group, &object))
    }

    /// Synthesize, insert the result and optionally remove the originals
    ///
    /// The store is untouched when synthesis fails.
    pub async fn merge<S>(
        &self,
        group: &DuplicateGroup,
        store: &mut S,
        options: MergeOptions,
        cancel: &CancelSignal,
    ) -> Result<MergeOutcome, CuratorError>
    where
        S: EntryStore,
        S::Error: Display,
    {
        let entry = self.synthesize(group, cancel).await?;
        store
            .insert_entry(entry.clone())
            .map_err(|e| CuratorError::Store(e.to_string()))?;

        let mut removed = Vec::new();
        if options.delete_originals {
            for id in group.ids() {
                if store
                    .remove_entry(id)
                    .map_err(|e| CuratorError::Store(e.to_string()))?
                {
                    removed.push(id);
                }
            }
        }

        info!(
            "Merged {} entries into '{}' ({} originals removed)",
            group.len(),
            entry.title,
            removed.len()
        );
        Ok(MergeOutcome { entry, removed })
    }

    /// Merge groups one at a time, continuing past individual failures
    ///
    /// A pause or cancel stops the batch; the rest are counted as skipped.
    pub async fn merge_all<S>(
        &self,
        groups: &[DuplicateGroup],
        store: &mut S,
        options: MergeOptions,
        cancel: &CancelSignal,
    ) -> MergeReport
    where
        S: EntryStore,
        S::Error: Display,
    {
        let mut report = MergeReport::new();

        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                let delay = self.config.batch_delay();
                if !delay.is_zero() {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
            if cancel.is_signaled() {
                report.skipped = groups.len() - i;
                info!("Merge batch stopped; {} groups skipped", report.skipped);
                break;
            }

            match self.merge(group, store, options, cancel).await {
                Ok(outcome) => {
                    report.removed += outcome.removed.len();
                    report.merged.push(outcome.entry);
                }
                Err(e) if e.is_cancellation() => {
                    report.skipped = groups.len() - i;
                    info!("Merge batch stopped; {} groups skipped", report.skipped);
                    break;
                }
                Err(e) => {
                    warn!("Merge of '{}' failed: {}", group.canonical_name, e);
                    report.failures.push(MergeFailure {
                        canonical_name: group.canonical_name.clone(),
                        category: group.category,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

fn validate_group(group: &DuplicateGroup) -> Result<(), CuratorError> {
    if group.len() < 2 {
        return Err(CuratorError::InvalidGroup(format!(
            "'{}' has {} entries; at least 2 are needed",
            group.canonical_name,
            group.len()
        )));
    }
    if let Some(stray) = group.entries.iter().find(|e| e.category != group.category) {
        return Err(CuratorError::InvalidGroup(format!(
            "'{}' is {} but the group is {}",
            stray.title, stray.category, group.category
        )));
    }
    Ok(())
}

fn entry_from_object(group: &DuplicateGroup, object: &Map<String, Value>) -> KnowledgeEntry {
    let title = object
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} (merged)", group.canonical_name));

    let keywords: Vec<String> = match object.get("keywords") {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let content = match object.get("content") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    KnowledgeEntry::with_content(group.category, title, keywords, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorekeeper_domain::Category;
    use lorekeeper_llm::MockProvider;
    use serde_json::json;

    fn group() -> DuplicateGroup {
        DuplicateGroup {
            canonical_name: "Aria".to_string(),
            category: Category::CharacterProfile,
            entries: vec![
                KnowledgeEntry::with_content(Category::CharacterProfile, "Aria (2)", Vec::new(), "A"),
                KnowledgeEntry::with_content(Category::CharacterProfile, "Aria: youth", Vec::new(), "B"),
            ],
        }
    }

    fn engine(response: &str) -> MergeEngine<MockProvider> {
        MergeEngine::new(MockProvider::new(response), CuratorConfig::default().without_delays())
    }

    #[tokio::test]
    async fn test_synthesize_builds_entry() {
        let response = json!({
            "title": "Aria",
            "keywords": ["healer", 7, "healer", null],
            "content": "A healer (multiple accounts) born inland."
        });
        let engine = engine(&format!("```json\n{}\n```", response));

        let entry = engine.synthesize(&group(), &CancelSignal::new()).await.unwrap();

        assert_eq!(entry.category, Category::CharacterProfile);
        assert_eq!(entry.title, "Aria");
        assert_eq!(entry.keywords, vec!["healer", "7"]);
        assert_eq!(entry.primary_text(), "A healer (multiple accounts) born inland.");
    }

    #[tokio::test]
    async fn test_missing_title_and_bad_keywords_fall_back() {
        let engine = engine(r#"{"title": "  ", "keywords": "healer", "content": "merged"}"#);

        let entry = engine.synthesize(&group(), &CancelSignal::new()).await.unwrap();

        assert_eq!(entry.title, "Aria (merged)");
        assert!(entry.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_no_object_is_malformed() {
        let engine = engine("I could not merge these.");
        let result = engine.synthesize(&group(), &CancelSignal::new()).await;
        assert!(matches!(result, Err(CuratorError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_invalid_groups_make_no_call() {
        let engine = engine("{}");
        let mut single = group();
        single.entries.truncate(1);
        let result = engine.synthesize(&single, &CancelSignal::new()).await;
        assert!(matches!(result, Err(CuratorError::InvalidGroup(_))));

        let mut mixed = group();
        mixed.entries[1].category = Category::Location;
        let result = engine.synthesize(&mixed, &CancelSignal::new()).await;
        assert!(matches!(result, Err(CuratorError::InvalidGroup(_))));

        assert_eq!(engine.provider().call_count(), 0);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = CuratorConfig::default();
        assert!(!MergeOptions::from(&config).delete_originals);
        config.delete_originals = true;
        assert!(MergeOptions::from(&config).delete_originals);
    }
}
