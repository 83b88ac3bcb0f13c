use thiserror::Error;

/// Reasons a variables payload cannot be turned into tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The response carried no `meta` block at all
    #[error("variables response has no meta block")]
    MissingMeta,
    /// `meta.variableCollections` is absent or empty while variables exist
    #[error("no variable collections found in the variables response")]
    MissingCollections,
    /// `meta.variables` is absent or empty while collections exist
    #[error("no variables found in the variables response")]
    MissingVariables,
    /// The endpoint answered with `error: true` in its body
    #[error("variables endpoint reported an error (status {})", .0.map_or_else(|| "unknown".to_string(), |s| s.to_string()))]
    Reported(Option<u16>),
}

/// Outcome of resolving a single style from a directly fetched node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
    #[error("style {0} is not defined in this file")]
    UnknownStyle(String),
    #[error("node for style {0} was not returned by the source")]
    NodeMissing(String),
    #[error("node for style {0} carries no value for its category")]
    NoValue(String),
}
