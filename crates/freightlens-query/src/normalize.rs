use crate::filters::{Pagination, SearchQuery};
use freightlens_core::canonical;

/// Stable fingerprint of a query's filter content, used for log correlation.
/// Pagination never affects the fingerprint.
pub fn normalized_query_hash(query: &SearchQuery) -> Result<String, String> {
    let normalized = normalize_query(query);
    let bytes = canonical::stable_json_bytes(&normalized).map_err(|e| e.to_string())?;
    Ok(canonical::stable_hash_hex(&bytes))
}

#[must_use]
pub fn normalize_query(query: &SearchQuery) -> SearchQuery {
    let mut normalized = query.clone();
    normalized.pagination = Pagination::default();
    normalized
}
