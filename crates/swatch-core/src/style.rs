use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::EnrichmentError;
use crate::node::Node;
use crate::token::{style_category, NewTokenEntry};

/// Upper bound on style ids requested in one direct node fetch
pub const MAX_FALLBACK_STYLE_IDS: usize = 10;

/// Style metadata as listed in a file's `styles` block (no values)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub name: String,
    /// `FILL`, `TEXT`, `EFFECT` or `GRID`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The place on a node where a style is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleSlot {
    Fill,
    Stroke,
    Text,
    Effect,
    Grid,
}

impl StyleSlot {
    pub const ALL: [StyleSlot; 5] = [
        StyleSlot::Fill,
        StyleSlot::Stroke,
        StyleSlot::Text,
        StyleSlot::Effect,
        StyleSlot::Grid,
    ];

    /// Parse a key of a node's `styles` map
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "fill" | "fills" => Some(StyleSlot::Fill),
            "stroke" | "strokes" => Some(StyleSlot::Stroke),
            "text" => Some(StyleSlot::Text),
            "effect" | "effects" => Some(StyleSlot::Effect),
            "grid" | "grids" => Some(StyleSlot::Grid),
            _ => None,
        }
    }

    /// Slot carrying the value of a style of this type when its node is fetched directly
    pub fn for_style_type(style_type: &str) -> Option<Self> {
        match style_type.to_uppercase().as_str() {
            "FILL" => Some(StyleSlot::Fill),
            "TEXT" => Some(StyleSlot::Text),
            "EFFECT" => Some(StyleSlot::Effect),
            "GRID" => Some(StyleSlot::Grid),
            _ => None,
        }
    }
}

/// A style being enriched with values discovered in the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDefinition {
    pub style_id: String,
    pub name: String,
    pub style_type: Option<String>,
    pub description: Option<String>,
    pub color: Option<Value>,
    pub fills: Option<Value>,
    pub text_style: Option<Value>,
    pub strokes: Option<Value>,
    pub effects: Option<Value>,
    pub grids: Option<Value>,
}

impl StyleDefinition {
    pub fn new(style_id: impl Into<String>, meta: &StyleMeta) -> Self {
        Self {
            style_id: style_id.into(),
            name: meta.name.clone(),
            style_type: meta.style_type.clone(),
            description: meta.description.clone().filter(|d| !d.is_empty()),
            ..Default::default()
        }
    }

    /// Copy the value held by `node` for `slot`. Fields that already hold a
    /// value are left alone. Returns whether anything was set.
    pub fn absorb(&mut self, slot: StyleSlot, node: &Node) -> bool {
        match slot {
            StyleSlot::Fill => {
                let fills = set_once(&mut self.fills, node.fills.as_ref());
                let color = set_once(&mut self.color, node.first_fill_color());
                fills || color
            }
            StyleSlot::Stroke => set_once(&mut self.strokes, node.strokes.as_ref()),
            StyleSlot::Text => set_once(&mut self.text_style, node.style.as_ref()),
            StyleSlot::Effect => set_once(&mut self.effects, node.effects.as_ref()),
            StyleSlot::Grid => set_once(&mut self.grids, node.layout_grids.as_ref()),
        }
    }

    /// Whether a value for this style's own category has been found
    pub fn has_value(&self) -> bool {
        let style_type = self.style_type.as_deref().unwrap_or_default().to_uppercase();
        match style_type.as_str() {
            "FILL" => self.color.is_some() || self.fills.is_some(),
            "TEXT" => self.text_style.is_some(),
            "EFFECT" => self.effects.is_some(),
            "GRID" => self.grids.is_some(),
            _ => {
                self.color.is_some()
                    || self.fills.is_some()
                    || self.text_style.is_some()
                    || self.strokes.is_some()
                    || self.effects.is_some()
                    || self.grids.is_some()
            }
        }
    }

    pub fn category(&self) -> String {
        style_category(self.style_type.as_deref())
    }

    /// Serialized form stored as the token's raw payload
    pub fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("styleId".into(), Value::String(self.style_id.clone()));
        map.insert("name".into(), Value::String(self.name.clone()));
        if let Some(style_type) = &self.style_type {
            map.insert("styleType".into(), Value::String(style_type.clone()));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), Value::String(description.clone()));
        }
        let values = [
            ("color", &self.color),
            ("fills", &self.fills),
            ("textStyle", &self.text_style),
            ("strokes", &self.strokes),
            ("effects", &self.effects),
            ("grids", &self.grids),
        ];
        for (key, value) in values {
            if let Some(value) = value {
                map.insert(key.into(), value.clone());
            }
        }
        Value::Object(map)
    }

    pub fn into_entry(self) -> NewTokenEntry {
        NewTokenEntry {
            raw_payload: self.payload(),
            category: self.category(),
            token_id: self.style_id,
            name: self.name,
        }
    }
}

fn set_once(field: &mut Option<Value>, value: Option<&Value>) -> bool {
    match (field.as_ref(), value) {
        (None, Some(value)) => {
            *field = Some(value.clone());
            true
        }
        _ => false,
    }
}

/// Style definitions of one file, keyed (and ordered) by style id
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    definitions: BTreeMap<String, StyleDefinition>,
}

impl StyleCatalog {
    /// Build the catalog from a file's `styles` block
    pub fn from_metadata(styles: &BTreeMap<String, StyleMeta>) -> Self {
        let definitions = styles
            .iter()
            .map(|(id, meta)| (id.clone(), StyleDefinition::new(id.clone(), meta)))
            .collect();
        Self { definitions }
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, style_id: &str) -> Option<&StyleDefinition> {
        self.definitions.get(style_id)
    }

    /// Fold a node's value for `slot` into the referenced style. Unknown ids are ignored.
    pub fn absorb(&mut self, slot: StyleSlot, style_id: &str, node: &Node) -> bool {
        match self.definitions.get_mut(style_id) {
            Some(definition) => definition.absorb(slot, node),
            None => false,
        }
    }

    /// Number of styles holding a value for their category
    pub fn resolved_count(&self) -> usize {
        self.definitions.values().filter(|d| d.has_value()).count()
    }

    /// True when styles exist but the document tree resolved none of them
    pub fn needs_fallback(&self) -> bool {
        !self.is_empty() && self.resolved_count() == 0
    }

    /// Style ids to fetch directly, at most `limit`
    pub fn fallback_ids(&self, limit: usize) -> Vec<String> {
        self.definitions
            .values()
            .filter(|d| !d.has_value())
            .take(limit)
            .map(|d| d.style_id.clone())
            .collect()
    }

    /// Resolve a style from its directly fetched node (`None` when the source
    /// did not return it).
    pub fn apply_fetched(
        &mut self,
        style_id: &str,
        node: Option<&Node>,
    ) -> Result<(), EnrichmentError> {
        let definition = self
            .definitions
            .get_mut(style_id)
            .ok_or_else(|| EnrichmentError::UnknownStyle(style_id.to_string()))?;
        let node = node.ok_or_else(|| EnrichmentError::NodeMissing(style_id.to_string()))?;

        match definition.style_type.as_deref().and_then(StyleSlot::for_style_type) {
            Some(slot) => {
                definition.absorb(slot, node);
            }
            None => {
                for slot in StyleSlot::ALL {
                    definition.absorb(slot, node);
                }
            }
        }

        if definition.has_value() {
            Ok(())
        } else {
            Err(EnrichmentError::NoValue(style_id.to_string()))
        }
    }

    /// Consume the catalog into token entries, one per style
    pub fn into_entries(self) -> Vec<NewTokenEntry> {
        self.definitions
            .into_values()
            .map(StyleDefinition::into_entry)
            .collect()
    }
}
