//! Shop price list extraction.
//!
//! The shop answers with json directly: either a bare array of items or an
//! object wrapping the array under `items`. Each item needs a name and a
//! price; `id`/`appid` and `set_size` are optional.

use crate::model::{InventorySnapshot, PriceEntry};
use super::{id_from_value, price_from_value, ExtractResult, Extractor};

pub struct ShopExtractor;

impl Extractor for ShopExtractor {
    fn name(&self) -> &'static str {
        "shop"
    }

    fn extract(&self, body: &str) -> ExtractResult {
        let value: serde_json::Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => return ExtractResult::with_diagnostic(format!("shop response is not valid json: {e}")),
        };

        let items = match &value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(map) => match map.get("items") {
                Some(serde_json::Value::Array(items)) => items,
                _ => return ExtractResult::with_diagnostic("shop response has no items array".to_string()),
            },
            _ => return ExtractResult::with_diagnostic("shop response is not an object or array".to_string()),
        };

        let mut snapshot = InventorySnapshot::new();
        let mut skipped = 0usize;

        for item in items {
            let name = item.get("name").and_then(|n| n.as_str()).map(str::trim).filter(|n| !n.is_empty());
            let price = item.get("price").and_then(price_from_value);

            let (Some(name), Some(price)) = (name, price) else {
                skipped += 1;
                continue;
            };

            let id = item
                .get("id")
                .or_else(|| item.get("appid"))
                .and_then(id_from_value)
                .unwrap_or_default();
            let set_size = item.get("set_size").and_then(price_from_value).unwrap_or(0);

            snapshot.insert(name.to_string(), PriceEntry::new(id, price, set_size));
        }

        let mut diagnostics = Vec::new();
        if skipped > 0 {
            diagnostics.push(format!("skipped {skipped} shop items without name or price"));
        }

        ExtractResult { snapshot, diagnostics }
    }
}
