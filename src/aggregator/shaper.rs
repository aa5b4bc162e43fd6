//! Response shaping: reduce upstream payloads to what callers need.
//!
//! Upstream shapes are not validated. Absent or mistyped fields are left
//! out of the projection instead of failing the request.

use serde_json::{Map, Value};

use crate::quoting::TokenDescriptor;

/// Project an upstream token listing to [`TokenDescriptor`]s.
///
/// Non-array bodies yield an empty list; non-object records are skipped.
pub fn project_tokens(body: &Value) -> Vec<TokenDescriptor> {
    body.as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(Value::as_object)
                .map(project_token)
                .collect()
        })
        .unwrap_or_default()
}

pub fn project_token(record: &Map<String, Value>) -> TokenDescriptor {
    let text = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);

    TokenDescriptor {
        address: text("address"),
        symbol: text("symbol"),
        name: text("name"),
        decimals: record
            .get("decimals")
            .and_then(Value::as_u64)
            .and_then(|d| u8::try_from(d).ok()),
        tags: record
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Keep tokens carrying `tag` (case-insensitive), then truncate to `limit`.
pub fn filter_tokens(
    tokens: Vec<TokenDescriptor>,
    tag: Option<&str>,
    limit: Option<usize>,
) -> Vec<TokenDescriptor> {
    let filtered = tokens
        .into_iter()
        .filter(|t| tag.map_or(true, |tag| t.has_tag(tag)));
    match limit {
        Some(limit) => filtered.take(limit).collect(),
        None => filtered.collect(),
    }
}

/// Pull the serialized transaction out of a swap response.
pub fn extract_swap_transaction(body: &Value) -> Option<String> {
    body.get("swapTransaction")
        .and_then(Value::as_str)
        .map(str::to_string)
}
