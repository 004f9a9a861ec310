//! Owned inventory reader.
//!
//! Steam's community inventory endpoint returns one page of `assets` plus the
//! `descriptions` they point at. When `more_items` is set, `last_assetid` is the
//! cursor for the next page. `InventoryPages` walks those pages lazily, one
//! request per `next()`, and stops when no cursor comes back.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::InventorySnapshot;
use crate::net::Fetcher;
use super::id_from_value;

pub const DEFAULT_PAGE_SIZE: u32 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    pub asset_id: String,
    pub name: String,
    /// Game the card belongs to, from the description's "Game" tag.
    pub game: Option<String>,
    pub app_id: Option<String>,
    pub amount: u64,
}

#[derive(Debug, Default)]
pub struct InventoryPage {
    pub items: Vec<InventoryItem>,
    pub cursor: Option<String>,
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    assets: Vec<RawAsset>,
    #[serde(default)]
    descriptions: Vec<RawDescription>,
    #[serde(default)]
    more_items: Option<serde_json::Value>,
    #[serde(default)]
    last_assetid: Option<String>,
    #[serde(default)]
    success: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawAsset {
    assetid: String,
    classid: String,
    #[serde(default)]
    instanceid: String,
    #[serde(default)]
    amount: Option<String>,
}

#[derive(Deserialize)]
struct RawDescription {
    classid: String,
    #[serde(default)]
    instanceid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    market_fee_app: Option<serde_json::Value>,
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Deserialize)]
struct RawTag {
    #[serde(default)]
    category: String,
    #[serde(default)]
    localized_tag_name: String,
}

fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Parse one page. `None` when the body is not an inventory page or Steam
/// reports `success: false`; an empty final page is `Some` with no cursor.
pub fn parse_page(body: &str) -> Option<InventoryPage> {
    let raw: RawPage = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "inventory page is not valid json");
            return None;
        }
    };
    if raw.success.as_ref().is_some_and(|s| !truthy(s)) {
        tracing::warn!("inventory endpoint reported failure");
        return None;
    }

    let descriptions: HashMap<(&str, &str), &RawDescription> = raw
        .descriptions
        .iter()
        .map(|d| ((d.classid.as_str(), d.instanceid.as_str()), d))
        .collect();

    let items = raw
        .assets
        .iter()
        .map(|asset| {
            let desc = descriptions.get(&(asset.classid.as_str(), asset.instanceid.as_str()));
            let amount = asset
                .amount
                .as_deref()
                .and_then(|a| a.parse().ok())
                .unwrap_or(1);

            InventoryItem {
                asset_id: asset.assetid.clone(),
                name: desc.map(|d| d.name.clone()).unwrap_or_default(),
                game: desc.and_then(|d| {
                    d.tags
                        .iter()
                        .find(|t| t.category == "Game")
                        .map(|t| t.localized_tag_name.clone())
                }),
                app_id: desc.and_then(|d| d.market_fee_app.as_ref()).and_then(id_from_value),
                amount,
            }
        })
        .collect();

    let more = raw.more_items.as_ref().is_some_and(truthy);
    let cursor = if more { raw.last_assetid.filter(|c| !c.is_empty()) } else { None };

    Some(InventoryPage { items, cursor })
}

/// Lazy page-by-page walk of one inventory.
pub struct InventoryPages<'a> {
    fetcher: &'a dyn Fetcher,
    url: String,
    page_size: u32,
    cursor: Option<String>,
    done: bool,
}

impl<'a> InventoryPages<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, url: impl Into<String>, page_size: u32) -> Self {
        InventoryPages {
            fetcher,
            url: url.into(),
            page_size,
            cursor: None,
            done: false,
        }
    }

    /// Continue from a cursor returned by an earlier walk.
    #[must_use]
    pub fn resume(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Cursor the next page will be requested with, if any.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    fn page_url(&self) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        match &self.cursor {
            Some(cursor) => format!("{}{sep}count={}&start_assetid={cursor}", self.url, self.page_size),
            None => format!("{}{sep}count={}", self.url, self.page_size),
        }
    }
}

impl Iterator for InventoryPages<'_> {
    type Item = Vec<InventoryItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let url = self.page_url();
        let body = match self.fetcher.get(&url) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "inventory page fetch failed, stopping");
                self.done = true;
                return None;
            }
        };

        let Some(page) = parse_page(&body) else {
            // keep the cursor so the walk can be resumed
            tracing::warn!(cursor = ?self.cursor, "inventory page unreadable, stopping");
            self.done = true;
            return None;
        };
        match page.cursor {
            // a cursor that does not advance would loop forever
            Some(next) if self.cursor.as_deref() != Some(next.as_str()) => self.cursor = Some(next),
            _ => {
                self.cursor = None;
                self.done = true;
            }
        }

        Some(page.items)
    }
}

/// Cards held for one game, valued at its stored price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameHolding {
    pub game: String,
    pub cards: u64,
    pub price: Option<i64>,
    pub value: Option<i64>,
}

/// Group items by game and value them against `prices`. Items without a
/// game tag are grouped under their own name.
pub fn holdings(items: &[InventoryItem], prices: &InventorySnapshot) -> Vec<GameHolding> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for item in items {
        let key = item.game.as_deref().unwrap_or(item.name.as_str());
        *counts.entry(key).or_default() += item.amount;
    }

    counts
        .into_iter()
        .map(|(game, cards)| {
            let price = prices.get(game).map(|e| e.price);
            GameHolding {
                game: game.to_string(),
                cards,
                price,
                value: price.map(|p| p.saturating_mul(i64::try_from(cards).unwrap_or(i64::MAX))),
            }
        })
        .collect()
}
