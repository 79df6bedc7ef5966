// Vector codec: turns whatever the store holds into a clean vector or nothing.
//
// Embedding columns in the wild contain JSON arrays, JSON strings wrapping
// JSON arrays, hand-edited text like "0.1, 0.2 0.3", and occasionally junk.
// Decoding never fails loudly: a bad row becomes `None` and the caller skips
// it, so one broken hashtag can't take down a whole recommendation batch.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::db::models::RawEmbedding;

/// Legacy image column format: `["https://a"]["https://b"]`.
static LEGACY_IMAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\["(https?://[^"]+)"\]"#).expect("static regex"));

/// Decode a stored embedding. Returns `None` for null, empty, non-numeric,
/// or non-finite input.
pub fn decode(raw: &RawEmbedding) -> Option<Vec<f64>> {
    match raw {
        RawEmbedding::Null => None,
        RawEmbedding::Values(values) => finite(values.clone()),
        RawEmbedding::Json(value) => decode_json(value, 0),
        RawEmbedding::Text(text) => decode_text(text, 0),
    }
}

fn decode_json(value: &Value, depth: u8) -> Option<Vec<f64>> {
    match value {
        Value::Array(items) => {
            let values = items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()?;
            finite(values)
        }
        // Double-encoded column: a JSON string holding the array.
        Value::String(inner) if depth == 0 => decode_text(inner, depth + 1),
        _ => None,
    }
}

fn decode_text(text: &str, depth: u8) -> Option<Vec<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if matches!(value, Value::Array(_) | Value::String(_)) {
            return decode_json(&value, depth);
        }
    }

    // Loose fallback: strip brackets, split on separators.
    let values = text
        .trim_start_matches(['[', '('])
        .trim_end_matches([']', ')'])
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    finite(values)
}

fn finite(values: Vec<f64>) -> Option<Vec<f64>> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        None
    } else {
        Some(values)
    }
}

/// Decode a place's stored image reference into a list of URLs.
///
/// Accepts a JSON list, a single JSON string, the legacy `["url"]["url"]`
/// concatenation, or comma-separated text. Anything else yields an empty list.
pub fn decode_image_urls(raw: Option<&str>) -> Vec<String> {
    let text = match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Vec::new(),
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => {
            return items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect();
        }
        Ok(Value::String(s)) => return vec![s],
        _ => {}
    }

    let legacy: Vec<String> = LEGACY_IMAGE_URL
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect();
    if !legacy.is_empty() {
        return legacy;
    }

    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
