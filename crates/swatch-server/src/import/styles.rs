use std::collections::BTreeMap;
use swatch_core::{
    walk, EnrichmentError, NewTokenEntry, Node, StyleCatalog, StyleMeta, WalkStats,
    MAX_FALLBACK_STYLE_IDS,
};

use crate::source::{SourceApi, SourceError};

/// What happened with the direct node fetch for unresolved styles
#[derive(Debug)]
pub enum FallbackOutcome {
    /// The document tree already resolved at least one style
    NotNeeded,
    /// Nodes were fetched; one result per requested style
    Fetched {
        requested: Vec<String>,
        results: Vec<(String, Result<(), EnrichmentError>)>,
    },
    /// The node request itself failed
    Failed {
        requested: Vec<String>,
        error: SourceError,
    },
}

#[derive(Debug)]
pub struct StyleEnrichment {
    pub entries: Vec<NewTokenEntry>,
    pub stats: WalkStats,
    pub fallback: FallbackOutcome,
}

/// Turn a file's style metadata into token entries carrying their values.
///
/// Values come from walking `document`. When that resolves no style at all,
/// up to [`MAX_FALLBACK_STYLE_IDS`] style nodes are fetched in one request.
/// A failed fetch is reported in the outcome, never as an error.
pub async fn enrich_styles<A: SourceApi + ?Sized>(
    api: &A,
    file_key: &str,
    credential: &str,
    styles: &BTreeMap<String, StyleMeta>,
    document: &Node,
) -> StyleEnrichment {
    let mut catalog = StyleCatalog::from_metadata(styles);
    let stats = walk(document, &mut catalog);

    let fallback = if catalog.needs_fallback() {
        let requested = catalog.fallback_ids(MAX_FALLBACK_STYLE_IDS);
        match api.get_nodes(file_key, &requested, credential).await {
            Ok(response) => {
                let results = requested
                    .iter()
                    .map(|id| (id.clone(), catalog.apply_fetched(id, response.document(id))))
                    .collect();
                FallbackOutcome::Fetched { requested, results }
            }
            Err(error) => FallbackOutcome::Failed { requested, error },
        }
    } else {
        FallbackOutcome::NotNeeded
    };

    StyleEnrichment {
        entries: catalog.into_entries(),
        stats,
        fallback,
    }
}
