//! Snapshot updater.
//!
//! Folds a fresh extraction into the persisted current/previous pair:
//! - New game: previous gets the price 0 placeholder
//! - Price moved: previous takes the old current entry
//! - Same price, or missing from the extraction: both sides carried forward
//! - Empty extraction or no changes: nothing is written

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{InventorySnapshot, PriceEntry, SnapshotRecord};
use super::{load_record, save_record, Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    New,
    Rose,
    Fell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceChange {
    pub name: String,
    pub old_price: i64,
    pub new_price: i64,
    pub delta: i64,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub record: SnapshotRecord,
    pub changes: Vec<PriceChange>,
}

/// What one update did to the store.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// The extraction was empty; whatever was stored is untouched.
    NoData { existing: Option<SnapshotRecord> },
    /// Every price matched the stored current map; no write.
    Unchanged { record: SnapshotRecord },
    /// At least one new or moved price; the row was upserted.
    Updated {
        record: SnapshotRecord,
        changes: Vec<PriceChange>,
    },
}

impl UpdateOutcome {
    pub fn record(&self) -> Option<&SnapshotRecord> {
        match self {
            UpdateOutcome::NoData { existing } => existing.as_ref(),
            UpdateOutcome::Unchanged { record } | UpdateOutcome::Updated { record, .. } => Some(record),
        }
    }

    pub fn changes(&self) -> &[PriceChange] {
        match self {
            UpdateOutcome::Updated { changes, .. } => changes,
            _ => &[],
        }
    }
}

/// Compute the next record. Returns `None` for an empty extraction.
///
/// Keys are visited in name order, so `changes` comes back sorted by name.
pub fn compute(
    label: &str,
    new_snapshot: &InventorySnapshot,
    existing: Option<&SnapshotRecord>,
    now: NaiveDateTime,
) -> Option<UpdateResult> {
    if new_snapshot.is_empty() {
        return None;
    }

    let (mut current, mut previous) = match existing {
        Some(rec) => (rec.current.clone(), rec.previous.clone()),
        None => (InventorySnapshot::new(), InventorySnapshot::new()),
    };

    let mut changes = Vec::new();

    for (name, fresh) in new_snapshot {
        match current.get(name) {
            None => {
                previous.insert(name.clone(), PriceEntry::unknown_from(fresh));
                current.insert(name.clone(), fresh.clone());

                changes.push(PriceChange {
                    name: name.clone(),
                    old_price: 0,
                    new_price: fresh.price,
                    delta: fresh.price,
                    kind: ChangeKind::New,
                });
            }
            Some(known) if known.price != fresh.price => {
                let delta = fresh.price.saturating_sub(known.price);
                let kind = if delta > 0 { ChangeKind::Rose } else { ChangeKind::Fell };

                changes.push(PriceChange {
                    name: name.clone(),
                    old_price: known.price,
                    new_price: fresh.price,
                    delta,
                    kind,
                });

                let old = current.insert(name.clone(), fresh.clone());
                if let Some(old) = old {
                    previous.insert(name.clone(), old);
                }
            }
            Some(known) => {
                // rows written before a previous side existed still get one
                if !previous.contains_key(name) {
                    previous.insert(name.clone(), PriceEntry::unknown_from(known));
                }
            }
        }
    }

    Some(UpdateResult {
        record: SnapshotRecord {
            label: label.to_string(),
            current,
            previous,
            updated_at: now,
        },
        changes,
    })
}

/// Read the stored record for `label`, fold `new_snapshot` into it and write
/// it back when anything changed. Storage errors are returned as-is.
pub fn apply(
    store: &mut Store,
    label: &str,
    new_snapshot: &InventorySnapshot,
    now: NaiveDateTime,
) -> Result<UpdateOutcome, StoreError> {
    store.immediate(|conn| {
        let existing = load_record(conn, label)?;

        let Some(result) = compute(label, new_snapshot, existing.as_ref(), now) else {
            tracing::warn!(label, "empty extraction, keeping stored snapshot");
            return Ok(UpdateOutcome::NoData { existing });
        };

        if result.changes.is_empty() {
            tracing::info!(label, entries = new_snapshot.len(), "no price changes");
            // nothing moved, so the stored row (including its timestamp) stays as it was
            let record = existing.unwrap_or(result.record);
            return Ok(UpdateOutcome::Unchanged { record });
        }

        save_record(conn, &result.record)?;
        tracing::info!(
            label,
            changed = result.changes.len(),
            total = result.record.current.len(),
            "snapshot updated"
        );

        Ok(UpdateOutcome::Updated {
            record: result.record,
            changes: result.changes,
        })
    })
}
