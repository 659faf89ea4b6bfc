//! JSON output rendering.

use serde::Serialize;

/// Format a serializable value as 2-space pretty-printed JSON.
pub fn render_json<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data)
        .unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Pretty-print a string that may itself be JSON; anything else is
/// returned unchanged.
pub fn render_text(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => render_json(&value),
        Err(_) => text.to_string(),
    }
}
