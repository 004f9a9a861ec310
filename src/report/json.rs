//! JSON output for stored snapshots and update results.

use serde::Serialize;

pub fn render<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "json serialization failed");
        String::from("{}")
    })
}
