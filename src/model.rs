use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used for `updated_at`, both in the database and in output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label of the single snapshot stream the application maintains.
pub const DEFAULT_LABEL: &str = "prices";

/// One game's price on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Steam app id, kept as a string the way the marketplace emits it.
    pub id: String,
    /// Price in currency minor units.
    pub price: i64,
    #[serde(default)]
    pub set_size: i64,
}

impl PriceEntry {
    pub fn new(id: impl Into<String>, price: i64, set_size: i64) -> Self {
        PriceEntry {
            id: id.into(),
            price,
            set_size,
        }
    }

    /// Placeholder stored as `previous` for a game seen for the first time.
    /// Price 0 means "previously unknown".
    pub fn unknown_from(entry: &PriceEntry) -> Self {
        PriceEntry {
            id: entry.id.clone(),
            price: 0,
            set_size: entry.set_size,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.price == 0
    }
}

/// Game display name -> price. Ordered so output and storage are stable.
pub type InventorySnapshot = BTreeMap<String, PriceEntry>;

/// The persisted current/previous pair for one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub label: String,
    pub current: InventorySnapshot,
    pub previous: InventorySnapshot,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

impl SnapshotRecord {
    pub fn updated_at_display(&self) -> String {
        self.updated_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Previous entry for `key`, if one was ever recorded.
    pub fn previous_of(&self, key: &str) -> Option<&PriceEntry> {
        self.previous.get(key)
    }
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keeps_id_and_set_size() {
        let entry = PriceEntry::new("440", 12, 9);
        let unknown = PriceEntry::unknown_from(&entry);
        assert_eq!(unknown.id, "440");
        assert_eq!(unknown.price, 0);
        assert_eq!(unknown.set_size, 9);
        assert!(unknown.is_unknown());
    }

    #[test]
    fn record_serializes_timestamp_as_text() {
        let updated_at = NaiveDateTime::parse_from_str("2024-03-01 12:30:05", TIMESTAMP_FORMAT).unwrap();
        let record = SnapshotRecord {
            label: DEFAULT_LABEL.to_string(),
            current: InventorySnapshot::new(),
            previous: InventorySnapshot::new(),
            updated_at,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["updated_at"], "2024-03-01 12:30:05");

        let back: SnapshotRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn set_size_defaults_when_missing() {
        let entry: PriceEntry = serde_json::from_str(r#"{"id":"10","price":3}"#).unwrap();
        assert_eq!(entry.set_size, 0);
    }
}
