//! Locating JSON inside free-form generated text
//!
//! Models wrap JSON in markdown fences or surround it with prose. These helpers
//! find the first well-formed array or object anywhere in the text.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// A fence token with its optional language tag
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("static pattern is valid"));

/// Remove markdown code-fence tokens (```` ``` ```` / ```` ```json ````)
///
/// Only the tokens go; a payload sharing a line with its fences is kept.
pub fn strip_code_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// First well-formed JSON array in `text`
///
/// # Examples
///
/// ```
/// use lorekeeper_llm::json::find_json_array;
///
/// let text = "Here you go:\n```json\n[{\"title\": \"Aria\"}]\n```";
/// let array = find_json_array(text).unwrap();
/// assert_eq!(array.len(), 1);
/// ```
pub fn find_json_array(text: &str) -> Option<Vec<Value>> {
    match find_first(text, '[', Value::is_array)? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// First well-formed JSON object in `text`
pub fn find_json_object(text: &str) -> Option<Map<String, Value>> {
    match find_first(text, '{', Value::is_object)? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn find_first(text: &str, open: char, accept: fn(&Value) -> bool) -> Option<Value> {
    let cleaned = strip_code_fences(text);
    for (start, _) in cleaned.match_indices(open) {
        let mut values = serde_json::Deserializer::from_str(&cleaned[start..]).into_iter::<Value>();
        if let Some(Ok(value)) = values.next() {
            if accept(&value) {
                return Some(value);
            }
        }
    }
    None
}
