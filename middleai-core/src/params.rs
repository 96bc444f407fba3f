//! Flattening of nested model parameters into span attributes.
//!
//! Span attributes only hold scalars, so a parameter object such as
//! `{"sampling": {"temperature": 0.7}}` becomes the single attribute
//! `model_params.sampling.temperature = 0.7`.

use std::collections::BTreeMap;

use opentelemetry::{KeyValue, Value};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::telemetry::KEY_MODEL_PARAMS;

/// Flattened parameters keyed by dotted path, ordered by key.
pub type FlatParams = BTreeMap<String, Value>;

/// Flatten `params` under the `model_params` root.
pub fn flatten_params(params: &JsonValue) -> FlatParams {
    flatten_with_root(params, KEY_MODEL_PARAMS)
}

/// Flatten `params` with every key prefixed by `root`.
///
/// Object members and array elements (by index) extend the path; every
/// scalar leaf yields exactly one entry. `null` leaves are skipped since
/// attributes have no null. A scalar passed at the top level is stored under
/// `root` itself. Two paths that spell the same dotted key (e.g. a member
/// literally named `"a.b"` next to `{"a": {"b": ..}}`) collapse into one entry.
pub fn flatten_with_root(params: &JsonValue, root: &str) -> FlatParams {
    let mut flat = FlatParams::new();
    // explicit worklist: nesting depth never grows the call stack
    let mut pending: Vec<(String, &JsonValue)> = vec![(root.to_string(), params)];

    while let Some((path, value)) = pending.pop() {
        match value {
            JsonValue::Object(members) => {
                for (key, child) in members {
                    pending.push((format!("{path}.{key}"), child));
                }
            }
            JsonValue::Array(items) => {
                for (idx, child) in items.iter().enumerate() {
                    pending.push((format!("{path}.{idx}"), child));
                }
            }
            JsonValue::Null => {
                debug!(key = %path, "skipping null model parameter");
            }
            JsonValue::Bool(b) => {
                flat.insert(path, Value::Bool(*b));
            }
            JsonValue::Number(n) => {
                let attr = match n.as_i64() {
                    Some(i) => Value::I64(i),
                    // u64 above i64::MAX and all non-integers
                    None => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
                };
                flat.insert(path, attr);
            }
            JsonValue::String(s) => {
                flat.insert(path, Value::from(s.clone()));
            }
        }
    }

    flat
}

/// Convert flattened parameters into span attributes.
pub fn to_key_values(flat: FlatParams) -> Vec<KeyValue> {
    flat.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect()
}
