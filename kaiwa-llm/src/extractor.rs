//! Suggestion extraction from accumulated model text.
//!
//! The model is asked for a JSON array of sentence pairs but nothing
//! guarantees it complies, so extraction degrades to an empty list instead
//! of failing.

use chrono::Utc;
use kaiwa_core::Suggestion;
use serde_json::Value;
use tracing::{debug, warn};

/// Primary field names requested from the model
pub const ENGLISH_FIELD: &str = "englishText";
pub const JAPANESE_FIELD: &str = "japaneseText";

/// Snake-case spellings some responses use instead
pub const ENGLISH_ALIAS: &str = "english_text";
pub const JAPANESE_ALIAS: &str = "japanese_text";

/// Extract suggestions from the full text of one model response.
///
/// Returns an empty list when the text holds no decodable, non-empty array.
pub fn extract(raw_text: &str) -> Vec<Suggestion> {
    extract_at(raw_text, Utc::now().timestamp_millis())
}

/// Same as [`extract`] with an explicit timestamp for the synthesized ids
pub fn extract_at(raw_text: &str, timestamp_ms: i64) -> Vec<Suggestion> {
    let Some(candidate) = bracketed_span(raw_text) else {
        debug!("No bracketed array in model text ({} bytes)", raw_text.len());
        return Vec::new();
    };

    let items = match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) if !items.is_empty() => items,
        Ok(_) => {
            debug!("Model text decoded to something other than a non-empty array");
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to parse suggestions: {}", e);
            return Vec::new();
        }
    };

    // A null element has no fields to read; the whole batch is dropped
    if items.iter().any(Value::is_null) {
        warn!("Failed to parse suggestions: array contains null elements");
        return Vec::new();
    }

    items
        .iter()
        .enumerate()
        .map(|(position, item)| Suggestion {
            id: format!("suggestion-{}-{}", timestamp_ms, position),
            english_text: aliased_text(item, ENGLISH_FIELD, ENGLISH_ALIAS),
            japanese_text: aliased_text(item, JAPANESE_FIELD, JAPANESE_ALIAS),
            index: position + 1,
        })
        .collect()
}

/// Greedy span from the first `[` to the last `]`
fn bracketed_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn aliased_text(item: &Value, primary: &str, alias: &str) -> String {
    item.get(primary)
        .and_then(present_text)
        .or_else(|| item.get(alias).and_then(present_text))
        .unwrap_or_default()
}

/// Text for a field value that counts as present; empty strings, zero,
/// false, null and nested structures fall through to the next name.
fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
