use crate::model::{ScopeError, StoreScope, ALL_STORES};
use std::collections::HashSet;

/// Resolves the requested store id against the stores known to the counters.
/// Absent, blank or `"all"` selects the aggregate scope.
pub fn resolve_scope(
    requested: Option<&str>,
    known_stores: &HashSet<String>,
) -> Result<StoreScope, ScopeError> {
    let requested = requested.map(str::trim).unwrap_or_default();
    if requested.is_empty() || requested.eq_ignore_ascii_case(ALL_STORES) {
        return Ok(StoreScope::All);
    }

    if known_stores.contains(requested) {
        Ok(StoreScope::Store(requested.to_string()))
    } else {
        Err(ScopeError::NotFound(requested.to_string()))
    }
}
