//! Client side of the state continuity contract.
//!
//! A record's `state` block names response fields that must be sent back on
//! the next call to the same endpoint. The server keeps no session on behalf
//! of the caller beyond what the handler itself chooses to store.

use crate::models::ApiMetadata;
use serde_json::{Map, Value};

/// Values to re-submit on the next call, keyed by state variable name.
///
/// Only `persist` variables are carried, and only when the response holds a
/// non-null value under the variable's `key`.
pub fn carry_state(api: &ApiMetadata, response: &Map<String, Value>) -> Map<String, Value> {
    api.persisted_state()
        .filter_map(|(name, var)| {
            response
                .get(&var.key)
                .filter(|value| !value.is_null())
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}

/// Folds carried state into the next request. Explicit request fields win.
pub fn merge_state(request: &mut Map<String, Value>, carried: &Map<String, Value>) {
    for (name, value) in carried {
        request
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }
}
