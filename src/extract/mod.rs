pub mod gameprices;
pub mod inventory;
pub mod shop;

use serde::Deserialize;

use crate::model::InventorySnapshot;

pub struct ExtractResult {
    pub snapshot: InventorySnapshot,
    pub diagnostics: Vec<String>,
}

impl ExtractResult {
    pub fn empty() -> Self {
        ExtractResult {
            snapshot: InventorySnapshot::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostic(message: String) -> Self {
        ExtractResult {
            snapshot: InventorySnapshot::new(),
            diagnostics: vec![message],
        }
    }
}

/// Turns one fetched body into a snapshot. Never fails: bad input comes back
/// as an empty snapshot with a diagnostic explaining why.
pub trait Extractor {
    fn name(&self) -> &'static str;
    fn extract(&self, body: &str) -> ExtractResult;
}

/// Which extractor a configured source feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The marketplace inventory page with the embedded gameprices blob.
    #[default]
    Page,
    /// A shop endpoint returning a json price list.
    Shop,
}

impl SourceKind {
    pub fn extractor(self) -> Box<dyn Extractor> {
        match self {
            SourceKind::Page => Box::new(gameprices::GamePricesExtractor),
            SourceKind::Shop => Box::new(shop::ShopExtractor),
        }
    }
}

/// Integer price from a json value. Whole numbers pass through, decimals are
/// rounded, numeric strings are accepted. Negative or out-of-range values are
/// not prices.
pub(crate) fn price_from_value(value: &serde_json::Value) -> Option<i64> {
    let price = match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_from_float)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(whole_from_float))
        }
        _ => None,
    };
    price.filter(|p| *p >= 0)
}

fn whole_from_float(f: f64) -> Option<i64> {
    let rounded = f.round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    (rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64).then(|| rounded as i64)
}

/// Id as a string whether the json carries it as a number or a string.
pub(crate) fn id_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
