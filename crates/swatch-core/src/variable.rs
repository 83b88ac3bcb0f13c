use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::TokenError;
use crate::token::{variable_category, NewTokenEntry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableMode {
    #[serde(default)]
    pub mode_id: String,
    #[serde(default)]
    pub name: String,
}

/// A named group of variables sharing a set of modes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCollection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modes: Vec<VariableMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode_id: Option<String>,
    #[serde(default)]
    pub hidden_from_publishing: bool,
}

/// A typed variable with one value per mode of its collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variable_collection_id: String,
    /// `COLOR`, `FLOAT`, `STRING` or `BOOLEAN`
    #[serde(default)]
    pub resolved_type: String,
    #[serde(default)]
    pub values_by_mode: BTreeMap<String, Value>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub hidden_from_publishing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `meta` block of the local variables endpoint.
///
/// Maps are optional so a missing key can be told apart from an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVariablesMeta {
    #[serde(default)]
    pub variable_collections: Option<BTreeMap<String, VariableCollection>>,
    #[serde(default)]
    pub variables: Option<BTreeMap<String, Variable>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalVariablesResponse {
    #[serde(default)]
    pub status: Option<u16>,
    /// Set by the endpoint when it could not serve the request
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub meta: Option<LocalVariablesMeta>,
}

impl Variable {
    /// Token entry for this variable; `key` is used when the record has no id
    pub fn to_entry(&self, key: &str, collection: Option<&VariableCollection>) -> NewTokenEntry {
        let token_id = if self.id.is_empty() { key } else { self.id.as_str() };
        let modes: BTreeMap<&str, &str> = collection
            .map(|c| {
                c.modes
                    .iter()
                    .filter(|m| !m.mode_id.is_empty())
                    .map(|m| (m.mode_id.as_str(), m.name.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        NewTokenEntry {
            token_id: token_id.to_string(),
            name: self.name.clone(),
            category: variable_category(&self.resolved_type),
            raw_payload: json!({
                "collectionId": self.variable_collection_id,
                "collectionName": collection.map(|c| c.name.as_str()),
                "resolvedType": self.resolved_type,
                "valuesByMode": self.values_by_mode,
                "modes": modes,
                "scopes": self.scopes,
                "hiddenFromPublishing": self.hidden_from_publishing,
                "description": self.description,
            }),
        }
    }
}

fn collect_entries(
    variables: &BTreeMap<String, Variable>,
    collections: &BTreeMap<String, VariableCollection>,
) -> Vec<NewTokenEntry> {
    variables
        .iter()
        .map(|(key, variable)| {
            let collection = collections.get(&variable.variable_collection_id);
            variable.to_entry(key, collection)
        })
        .collect()
}

/// Entries for variables embedded in the file response itself.
///
/// Collections are optional there; without them entries carry no collection name.
pub fn entries_from_inline(
    variables: &BTreeMap<String, Variable>,
    collections: &BTreeMap<String, VariableCollection>,
) -> Vec<NewTokenEntry> {
    collect_entries(variables, collections)
}

/// Entries from the local variables endpoint.
///
/// Both maps present and empty means the file has no variables and yields an
/// empty list. A missing block, a missing map or only one empty map is an error,
/// as is a body flagged with `error: true`.
pub fn entries_from_local(
    response: &LocalVariablesResponse,
) -> Result<Vec<NewTokenEntry>, TokenError> {
    if response.error {
        return Err(TokenError::Reported(response.status));
    }
    let meta = response.meta.as_ref().ok_or(TokenError::MissingMeta)?;
    let collections = meta
        .variable_collections
        .as_ref()
        .ok_or(TokenError::MissingCollections)?;
    let variables = meta.variables.as_ref().ok_or(TokenError::MissingVariables)?;

    match (collections.is_empty(), variables.is_empty()) {
        (true, true) => Ok(Vec::new()),
        (true, false) => Err(TokenError::MissingCollections),
        (false, true) => Err(TokenError::MissingVariables),
        (false, false) => Ok(collect_entries(variables, collections)),
    }
}
