//! Parse service output into validated extraction items

use crate::error::ExtractorError;
use crate::normalizer::normalize;
use lorekeeper_domain::{merge_keywords, ExtractionItem};
use lorekeeper_llm::find_json_array;
use serde_json::{Map, Value};
use tracing::debug;

/// Characters that separate keywords given as a single string
const KEYWORD_DELIMITERS: &[char] = &[',', '，', '、', ';', '；', '|'];

/// Parse a response into extraction items
///
/// Returns `MalformedResponse` when no JSON array can be found. Individual
/// candidates missing a title or content are skipped.
pub fn parse_extraction_response(response: &str) -> Result<Vec<ExtractionItem>, ExtractorError> {
    let candidates = find_json_array(response).ok_or_else(|| {
        let preview: String = response.chars().take(80).collect();
        ExtractorError::MalformedResponse(format!("no JSON array in response: {:?}", preview))
    })?;

    let mut items = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.iter().enumerate() {
        match parse_candidate(candidate) {
            Ok(item) => items.push(item),
            Err(reason) => debug!("Skipping candidate {}: {}", idx, reason),
        }
    }
    Ok(items)
}

fn parse_candidate(value: &Value) -> Result<ExtractionItem, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "candidate is not a JSON object".to_string())?;

    let title = text_field(obj, "title");
    if title.is_empty() {
        return Err("missing title".to_string());
    }
    let content = text_field(obj, "content");
    if content.is_empty() {
        return Err(format!("'{}' has no content", title));
    }

    Ok(ExtractionItem {
        category: normalize(&text_field(obj, "category")),
        title,
        keywords: coerce_keywords(obj.get("keywords")),
        content,
    })
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Accept a list of strings or a delimiter-separated string
pub fn coerce_keywords(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(KEYWORD_DELIMITERS).map(str::to_string).collect(),
        _ => Vec::new(),
    };
    merge_keywords(&[], &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorekeeper_domain::Category;
    use serde_json::json;

    #[test]
    fn test_parse_valid_array() {
        let response = r#"[
            {"category": "character profile", "title": "Aria", "keywords": ["Aria", "healer"], "content": "A travelling healer."},
            {"category": "location", "title": "Harbor", "keywords": [], "content": "Foggy at dawn."}
        ]"#;

        let items = parse_extraction_response(response).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, Category::CharacterProfile);
        assert_eq!(items[0].keywords, vec!["Aria", "healer"]);
        assert_eq!(items[1].category, Category::Location);
    }

    #[test]
    fn test_parse_fenced_response_with_prose() {
        let response = "Here are the entries:\n```json\n[{\"category\": \"人物简介\", \"title\": \"阿丽亚\", \"keywords\": \"医者，旅人\", \"content\": \"一位四处行医的少女。\"}]\n```\nDone.";
        let items = parse_extraction_response(response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, Category::CharacterProfile);
        assert_eq!(items[0].keywords, vec!["医者", "旅人"]);
    }

    #[test]
    fn test_parse_fence_on_one_line() {
        let response = r#"```json [{"category": "item", "title": "Lamp", "content": "Brass."}] ```"#;
        let items = parse_extraction_response(response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Lamp");
    }

    #[test]
    fn test_not_json_is_malformed() {
        let result = parse_extraction_response("not json");
        assert!(matches!(result, Err(ExtractorError::MalformedResponse(_))));
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_extraction_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_candidates_are_skipped() {
        let response = r#"[
            {"category": "item", "title": "", "content": "Untitled"},
            {"category": "item", "title": "Lamp"},
            {"category": "item", "title": "Lamp", "content": "   "},
            "just a string",
            {"category": "item", "title": "Moon blade", "content": "Pale and curved."}
        ]"#;

        let items = parse_extraction_response(response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Moon blade");
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let response = r#"[{"category": "recipes", "title": "Stew", "content": "Thick and brown."}]"#;
        let items = parse_extraction_response(response).unwrap();
        assert_eq!(items[0].category, Category::WritingMaterial);
    }

    #[test]
    fn test_keyword_coercion() {
        assert_eq!(
            coerce_keywords(Some(&json!("a, b;c | a"))),
            vec!["a", "b", "c"]
        );
        assert_eq!(coerce_keywords(Some(&json!(["x", 7, null, "x"]))), vec!["x", "7"]);
        assert!(coerce_keywords(Some(&json!({"k": "v"}))).is_empty());
        assert!(coerce_keywords(None).is_empty());
    }
}
