// 🔤 Name Normalization - display names → lookup keys
//
// "Jane Q Public", "jane  q public", "JANE Q PUBLIC" → "jane_q_public"
//
// Key equality is the only matching rule. No fuzzy matching.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator between name parts inside a key
pub const KEY_SEPARATOR: char = '_';

/// Normalize a display name into a name-key
///
/// - Lowercase
/// - Every whitespace run becomes a single underscore
/// - Leading/trailing whitespace dropped
///
/// Idempotent: normalize(normalize(x)) == normalize(x)
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Split a key at the first and second underscore, capitalizing each part
///
/// Always returns 1 to 3 parts. A key with no underscore comes back as a
/// single part; callers cannot tell first from last in that case.
pub fn split_key(key: &str) -> Vec<String> {
    if !key.contains(KEY_SEPARATOR) {
        debug!("Name key '{}' has no separator, returning it unsplit", key);
    }

    key.splitn(3, KEY_SEPARATOR).map(capitalize).collect()
}

/// Build the key for a (first, last, middle) triple
///
/// Returns None when both first and last are blank.
pub fn compose_key(first: &str, last: &str, middle: &str) -> Option<String> {
    if first.trim().is_empty() && last.trim().is_empty() {
        return None;
    }

    let full = if middle.trim().is_empty() {
        format!("{} {}", first, last)
    } else {
        format!("{} {} {}", first, middle, last)
    };

    Some(normalize(&full))
}

/// Uppercase the first character, lowercase the rest
fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ============================================================================
// PERSON NAME
// ============================================================================

/// Display parts of a name-key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl PersonName {
    /// Derive display parts from a key
    ///
    /// 2 parts → (first, last); 3 parts → (first, middle, last).
    /// A single-part key fills `first` only.
    pub fn from_key(key: &str) -> Self {
        let mut parts = split_key(key).into_iter();
        let first = parts.next().unwrap_or_default();

        match (parts.next(), parts.next()) {
            (Some(last), None) => PersonName {
                first,
                middle: String::new(),
                last,
            },
            (Some(middle), Some(last)) => PersonName { first, middle, last },
            _ => PersonName {
                first,
                ..Default::default()
            },
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
