//! End-to-end import: segment, extract, checkpoint, and store

use lorekeeper_domain::traits::EntryStore;
use lorekeeper_domain::Category;
use lorekeeper_extractor::{
    import_items, ExtractorConfig, ImportSession, Pipeline, PipelineCheckpoint, RunStatus,
};
use lorekeeper_llm::{CancelSignal, MockProvider};
use lorekeeper_store::SqliteStore;
use serde_json::json;

const MANUSCRIPT: &str = "Chapter 1\n\n\
Mira lit the lantern at the top of the tower and watched the grey water below.\n\n\
Chapter 2\n\n\
The harbor at Saltmere was crowded with fishing boats waiting out the season.\n\n\
Chapter 3\n\n\
When the storm broke, Mira climbed the stairs again and kept the light burning.";

fn scripted_provider() -> MockProvider {
    let provider = MockProvider::new("[]");
    provider.add_response(
        "lantern",
        json!([{
            "category": "人物简介",
            "title": "Mira",
            "keywords": ["keeper"],
            "content": "Keeps the lighthouse lantern."
        }])
        .to_string(),
    );
    provider.add_response(
        "harbor",
        json!([{
            "category": "place",
            "title": "Saltmere",
            "keywords": "harbor, boats",
            "content": "A crowded fishing harbor."
        }])
        .to_string(),
    );
    provider.add_response(
        "storm",
        json!([
            {
                "category": "character profile",
                "title": "Mira",
                "keywords": ["storm"],
                "content": "Stays at her post through the storm."
            },
            {
                "category": "timeline",
                "title": "The storm",
                "content": "Breaks over Saltmere."
            }
        ])
        .to_string(),
    );
    provider
}

fn pipeline(provider: MockProvider) -> Pipeline<MockProvider> {
    Pipeline::new(provider, ExtractorConfig::default().without_delays())
}

#[tokio::test]
async fn test_full_import_into_store() {
    let provider = scripted_provider();
    let mut session = ImportSession::new(pipeline(provider.clone()));
    let mut seen = Vec::new();

    let status = session
        .begin(MANUSCRIPT, &CancelSignal::new(), |item| seen.push(item.title.clone()))
        .await
        .unwrap();

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(provider.call_count(), 3);
    assert_eq!(seen, vec!["Mira", "Saltmere", "Mira", "The storm"]);

    let mut store = SqliteStore::new(":memory:").unwrap();
    let summary = import_items(&mut store, session.items()).unwrap();
    assert_eq!(summary.created, 3);
    assert_eq!(summary.appended, 0);

    let mut found = store
        .find_by_title(Category::CharacterProfile, "Mira")
        .unwrap();
    assert_eq!(found.len(), 1);
    let mira = found.remove(0);
    assert!(mira.primary_text().contains("lighthouse lantern"));
    assert!(mira.primary_text().contains("through the storm"));
    assert_eq!(mira.keywords, vec!["keeper", "storm"]);

    let places = store.list_by_category(Category::Location).unwrap();
    assert_eq!(places.len(), 1);
    assert_eq!(places[0].keywords, vec!["harbor", "boats"]);
}

#[tokio::test]
async fn test_second_import_appends_to_existing_entries() {
    let mut session = ImportSession::new(pipeline(scripted_provider()));
    session.begin(MANUSCRIPT, &CancelSignal::new(), |_| {}).await.unwrap();

    let mut store = SqliteStore::new(":memory:").unwrap();
    import_items(&mut store, session.items()).unwrap();
    let summary = import_items(&mut store, session.items()).unwrap();

    assert_eq!(summary.created, 0);
    assert_eq!(summary.appended, 3);
    assert_eq!(store.count_entries().unwrap(), 3);
}

#[tokio::test]
async fn test_paused_import_survives_restart_through_store() {
    let provider = scripted_provider();
    let mut session = ImportSession::new(pipeline(provider.clone()));
    let cancel = CancelSignal::new();
    let pause = cancel.clone();

    let status = session
        .begin(MANUSCRIPT, &cancel, |_| pause.pause())
        .await
        .unwrap();

    assert_eq!(status, RunStatus::Paused { at: 1 });
    assert_eq!(provider.call_count(), 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lore.db");
    {
        let mut store = SqliteStore::new(&path).unwrap();
        store
            .save_checkpoint("import", session.checkpoint().unwrap())
            .unwrap();
    }

    let mut store = SqliteStore::new(&path).unwrap();
    let checkpoint: PipelineCheckpoint = store.load_checkpoint("import").unwrap().unwrap();
    assert_eq!(checkpoint.cursor, 1);
    assert_eq!(checkpoint.results_so_far.len(), 1);

    let fresh = scripted_provider();
    let mut resumed = ImportSession::from_checkpoint(pipeline(fresh.clone()), checkpoint).unwrap();
    let status = resumed.resume(&CancelSignal::new(), |_| {}).await.unwrap();

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(fresh.call_count(), 2);
    assert!(fresh.prompts().iter().all(|p| !p.contains("lantern")));
    assert_eq!(resumed.items().len(), 4);
    assert!(store.clear_checkpoint("import").unwrap());

    let summary = import_items(&mut store, resumed.items()).unwrap();
    assert_eq!(summary.created, 3);
}
