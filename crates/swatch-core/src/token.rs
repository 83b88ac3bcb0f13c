use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

pub const STYLE_PREFIX: &str = "STYLE_";
pub const VARIABLE_PREFIX: &str = "VARIABLE_";

/// A token extracted from a design file, ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTokenEntry {
    /// Source style or variable id, unique within a file
    pub token_id: String,
    pub name: String,
    /// `STYLE_<type>` or `VARIABLE_<resolvedType>`
    pub category: String,
    /// Category-specific value data
    pub raw_payload: Value,
}

impl NewTokenEntry {
    pub fn is_style(&self) -> bool {
        self.category.starts_with(STYLE_PREFIX)
    }

    pub fn is_variable(&self) -> bool {
        self.category.starts_with(VARIABLE_PREFIX)
    }
}

/// Category for a style, `STYLE_UNKNOWN` when the type is missing
pub fn style_category(style_type: Option<&str>) -> String {
    let style_type = style_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("UNKNOWN");
    format!("{}{}", STYLE_PREFIX, style_type.to_uppercase())
}

/// Category for a variable of the given resolved type
pub fn variable_category(resolved_type: &str) -> String {
    let resolved_type = match resolved_type.trim() {
        "" => "UNKNOWN",
        t => t,
    };
    format!("{}{}", VARIABLE_PREFIX, resolved_type.to_uppercase())
}

/// Drop entries whose token id was already seen; the first one wins
pub fn dedup_by_token_id(entries: Vec<NewTokenEntry>) -> Vec<NewTokenEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.token_id.clone()))
        .collect()
}
