//! Marketplace inventory page extraction.
//!
//! The inventory page embeds its price table as a javascript object
//! (`var gameprices = {...};`) keyed by app id, followed by `var stocklist`.
//! Display names come from the game `<option>` list on the same page, so the
//! snapshot is rekeyed from app id to name and ids without a name are dropped.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{InventorySnapshot, PriceEntry};
use super::{price_from_value, ExtractResult, Extractor};

fn gameprices_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)var\s+gameprices\s*=?.*?(\{.*?\});\s*.*?var\s+stocklist").expect("valid gameprices pattern")
    })
}

fn option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"appid-(\d+)"[^>]*>(.*?)</option>"#).expect("valid option pattern"))
}

/// One fetched inventory page with its lookups precomputed.
pub struct SceDocument {
    prices: Option<serde_json::Map<String, serde_json::Value>>,
    names: HashMap<String, String>,
    ids: HashMap<String, String>,
    diagnostics: Vec<String>,
}

impl SceDocument {
    pub fn parse(body: &str) -> Self {
        let mut diagnostics = Vec::new();

        let prices = match gameprices_re().captures(body) {
            Some(caps) => match serde_json::from_str::<serde_json::Value>(&caps[1]) {
                Ok(serde_json::Value::Object(map)) => Some(map),
                Ok(_) => {
                    diagnostics.push("gameprices is not a json object".to_string());
                    None
                }
                Err(e) => {
                    diagnostics.push(format!("gameprices is not valid json: {e}"));
                    None
                }
            },
            None => {
                diagnostics.push("gameprices blob not found".to_string());
                None
            }
        };

        let mut names = HashMap::new();
        let mut ids = HashMap::new();
        for caps in option_re().captures_iter(body) {
            let id = caps[1].to_string();
            let name = unescape_html(caps[2].trim());
            if name.is_empty() {
                continue;
            }
            // first option wins for both directions
            ids.entry(name.clone()).or_insert_with(|| id.clone());
            names.entry(id).or_insert(name);
        }

        SceDocument {
            prices,
            names,
            ids,
            diagnostics,
        }
    }

    pub fn game_name(&self, app_id: &str) -> Option<&str> {
        self.names.get(app_id).map(String::as_str)
    }

    pub fn app_id(&self, game_name: &str) -> Option<&str> {
        self.ids.get(game_name).map(String::as_str)
    }

    /// Price entry for a display name, if the page lists both the name and a price.
    pub fn price(&self, game_name: &str) -> Option<PriceEntry> {
        let id = self.app_id(game_name)?;
        let value = self.prices.as_ref()?.get(id)?;
        entry_from_value(id, value)
    }

    /// All priced games keyed by display name.
    pub fn snapshot(&self) -> ExtractResult {
        let mut diagnostics = self.diagnostics.clone();
        let Some(prices) = &self.prices else {
            return ExtractResult {
                snapshot: InventorySnapshot::new(),
                diagnostics,
            };
        };

        let mut snapshot = InventorySnapshot::new();
        let mut unnamed = 0usize;
        let mut unpriced = 0usize;

        for (id, value) in prices {
            let Some(entry) = entry_from_value(id, value) else {
                unpriced += 1;
                continue;
            };
            let Some(name) = self.game_name(id) else {
                unnamed += 1;
                continue;
            };
            // a shared name belongs to the app id its first option names
            match self.app_id(name) {
                Some(owner) if owner != id.as_str() => {
                    diagnostics.push(format!("duplicate game name '{name}', keeping app {owner}, dropping app {id}"));
                }
                _ => {
                    snapshot.insert(name.to_string(), entry);
                }
            }
        }

        if unnamed > 0 {
            diagnostics.push(format!("dropped {unnamed} app ids with no game name"));
        }
        if unpriced > 0 {
            diagnostics.push(format!("skipped {unpriced} entries with no usable price"));
        }

        ExtractResult { snapshot, diagnostics }
    }
}

pub struct GamePricesExtractor;

impl Extractor for GamePricesExtractor {
    fn name(&self) -> &'static str {
        "gameprices"
    }

    fn extract(&self, body: &str) -> ExtractResult {
        SceDocument::parse(body).snapshot()
    }
}

/// Accepts `12`, `[12, 9, ...]` or `{"price": 12, "set_size": 9}`.
fn entry_from_value(id: &str, value: &serde_json::Value) -> Option<PriceEntry> {
    use serde_json::Value;

    let (price, set_size) = match value {
        Value::Number(_) | Value::String(_) => (price_from_value(value)?, 0),
        Value::Array(items) => {
            let price = price_from_value(items.first()?)?;
            let set_size = items.get(1).and_then(price_from_value).unwrap_or(0);
            (price, set_size)
        }
        Value::Object(map) => {
            let price = price_from_value(map.get("price")?)?;
            let set_size = map
                .get("set_size")
                .or_else(|| map.get("setsize"))
                .and_then(price_from_value)
                .unwrap_or(0);
            (price, set_size)
        }
        _ => return None,
    };

    Some(PriceEntry::new(id, price, set_size))
}

fn unescape_html(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
