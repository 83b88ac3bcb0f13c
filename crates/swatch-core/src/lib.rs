pub mod error;
pub mod file_key;
pub mod node;
pub mod style;
pub mod token;
pub mod variable;
pub mod walker;

pub use error::{EnrichmentError, TokenError};
pub use file_key::parse_file_key;
pub use node::Node;
pub use style::{StyleCatalog, StyleDefinition, StyleMeta, StyleSlot, MAX_FALLBACK_STYLE_IDS};
pub use token::{dedup_by_token_id, style_category, variable_category, NewTokenEntry};
pub use variable::{
    LocalVariablesMeta, LocalVariablesResponse, Variable, VariableCollection, VariableMode,
};
pub use walker::{walk, WalkStats, MAX_WALK_DEPTH};
