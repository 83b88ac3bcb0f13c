use swatch_core::variable::entries_from_inline;
use swatch_core::{dedup_by_token_id, NewTokenEntry};
use tracing::{debug, info, warn};

use super::styles::{enrich_styles, FallbackOutcome};
use super::variables::{fetch_variables, VariablesError};
use super::ImportError;
use crate::source::{FileResponse, SourceApi};

/// Extract every token of `file`.
///
/// Inline styles and variables come first. Only when they yield nothing is
/// the dedicated variables endpoint queried.
pub async fn extract<A: SourceApi + ?Sized>(
    api: &A,
    file: &FileResponse,
    file_key: &str,
    credential: &str,
) -> Result<Vec<NewTokenEntry>, ImportError> {
    let document = file.document.as_ref().ok_or(ImportError::MalformedResponse)?;

    let styles = enrich_styles(api, file_key, credential, &file.styles, document).await;
    debug!(
        file_key,
        styles = styles.entries.len(),
        visited = styles.stats.visited,
        absorbed = styles.stats.absorbed,
        pruned = styles.stats.pruned,
        "Walked document tree"
    );
    report_fallback(file_key, &styles.fallback);

    let mut entries = styles.entries;
    entries.extend(entries_from_inline(&file.variables, &file.variable_collections));

    if entries.is_empty() {
        info!(file_key, "No inline tokens, reading local variables");
        entries = fetch_variables(api, file_key, credential)
            .await
            .map_err(|e| match e {
                VariablesError::Unauthorized(message) => {
                    warn!(file_key, "Variables endpoint refused the token: {}", message);
                    ImportError::VariablesUnauthorized
                }
                VariablesError::Unavailable(reason) => ImportError::VariablesUnavailable(reason),
            })?;
    }

    if entries.is_empty() {
        return Err(ImportError::NoTokensFound);
    }

    Ok(dedup_by_token_id(entries))
}

fn report_fallback(file_key: &str, outcome: &FallbackOutcome) {
    match outcome {
        FallbackOutcome::NotNeeded => {}
        FallbackOutcome::Fetched { requested, results } => {
            let resolved = results.iter().filter(|(_, r)| r.is_ok()).count();
            info!(
                file_key,
                requested = requested.len(),
                resolved,
                "Fetched style nodes directly"
            );
            for (style_id, result) in results {
                if let Err(e) = result {
                    debug!(file_key, style_id = %style_id, "{}", e);
                }
            }
        }
        FallbackOutcome::Failed { requested, error } => {
            warn!(
                file_key,
                requested = requested.len(),
                "Style node fetch failed, keeping styles without values: {}",
                error
            );
        }
    }
}
