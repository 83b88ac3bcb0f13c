use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A node of a design file's document tree.
///
/// Only the fields needed to resolve style values are kept; everything else
/// in the source payload is ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub node_type: String,
    /// Style references keyed by slot (`fill`, `stroke`, `text`, `effect`, `grid`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Value>,
    /// Text properties (font family, size, weight, line height...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_grids: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty node with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Attach a style reference under `slot`
    pub fn with_style(mut self, slot: impl Into<String>, style_id: impl Into<String>) -> Self {
        self.styles.insert(slot.into(), style_id.into());
        self
    }

    /// Append a child node
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// The `color` of the first fill, if any
    pub fn first_fill_color(&self) -> Option<&Value> {
        self.fills.as_ref()?.get(0)?.get("color")
    }
}
