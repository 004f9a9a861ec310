//! Terminal table rendering.
//!
//! - Snapshot: one row per game with current, previous and change
//! - Changes: what a single update moved, largest moves first
//! - Holdings: owned cards per game valued at stored prices

use crate::extract::inventory::GameHolding;
use crate::model::SnapshotRecord;
use crate::store::update::{ChangeKind, PriceChange};
use crate::util::{format_delta, format_price, truncate};

const NAME_WIDTH: usize = 40;

pub fn render(record: &SnapshotRecord) -> String {
    if record.current.is_empty() {
        return String::from("No prices stored.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:NAME_WIDTH$} {:>5} {:>10} {:>10} {:>10}\n",
        "Game", "Set", "Current", "Previous", "Change"
    ));
    output.push_str(&"-".repeat(NAME_WIDTH + 39));
    output.push('\n');

    for (name, current) in &record.current {
        let previous = record.previous_of(name).filter(|p| !p.is_unknown());

        let (previous_col, change_col) = match previous {
            Some(p) => (format_price(p.price), format_delta(current.price.saturating_sub(p.price))),
            None => ("-".to_string(), "new".to_string()),
        };

        output.push_str(&format!(
            "{:NAME_WIDTH$} {:>5} {:>10} {:>10} {:>10}\n",
            truncate(name, NAME_WIDTH),
            current.set_size,
            format_price(current.price),
            previous_col,
            change_col
        ));
    }

    output.push_str(&format!(
        "\n{} games, updated {}\n",
        record.current.len(),
        record.updated_at_display()
    ));

    output
}

pub fn render_changes(changes: &[PriceChange]) -> String {
    if changes.is_empty() {
        return String::from("No price changes.\n");
    }

    let mut sorted: Vec<_> = changes.iter().collect();
    sorted.sort_by_key(|c| std::cmp::Reverse(c.delta.unsigned_abs()));

    let mut output = String::new();
    for change in sorted {
        let line = match change.kind {
            ChangeKind::New => format!("  [new] {} listed at {}", change.name, format_price(change.new_price)),
            ChangeKind::Rose => format!(
                "  [+] {} rose {} -> {} ({})",
                change.name,
                format_price(change.old_price),
                format_price(change.new_price),
                format_delta(change.delta)
            ),
            ChangeKind::Fell => format!(
                "  [-] {} fell {} -> {} ({})",
                change.name,
                format_price(change.old_price),
                format_price(change.new_price),
                format_delta(change.delta)
            ),
        };
        output.push_str(&line);
        output.push('\n');
    }

    output
}

pub fn render_holdings(holdings: &[GameHolding]) -> String {
    if holdings.is_empty() {
        return String::from("No cards found.\n");
    }

    let mut output = String::new();
    let mut total: i64 = 0;

    for holding in holdings {
        let value = match holding.value {
            Some(v) => {
                total = total.saturating_add(v);
                format_price(v)
            }
            None => "-".to_string(),
        };
        let name = if holding.game.is_empty() { "(untagged)" } else { holding.game.as_str() };

        output.push_str(&format!(
            "  {:NAME_WIDTH$} {:>6} {:>10}\n",
            truncate(name, NAME_WIDTH),
            holding.cards,
            value
        ));
    }

    output.push_str(&format!("\n{:>58}\n", format!("TOTAL: {}", format_price(total))));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InventorySnapshot, PriceEntry, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;

    fn record() -> SnapshotRecord {
        let mut current = InventorySnapshot::new();
        current.insert("Dota 2".to_string(), PriceEntry::new("570", 35, 9));
        current.insert("Portal".to_string(), PriceEntry::new("400", 6, 8));
        let mut previous = InventorySnapshot::new();
        previous.insert("Dota 2".to_string(), PriceEntry::new("570", 30, 9));
        previous.insert("Portal".to_string(), PriceEntry::new("400", 0, 8));

        SnapshotRecord {
            label: "prices".to_string(),
            current,
            previous,
            updated_at: NaiveDateTime::parse_from_str("2024-06-01 08:00:00", TIMESTAMP_FORMAT).unwrap(),
        }
    }

    #[test]
    fn snapshot_rows() {
        let out = render(&record());
        let dota = out.lines().find(|l| l.starts_with("Dota 2")).unwrap();
        assert!(dota.contains("0.35"));
        assert!(dota.contains("0.30"));
        assert!(dota.contains("+0.05"));

        let portal = out.lines().find(|l| l.starts_with("Portal")).unwrap();
        assert!(portal.contains("new"));
        assert!(out.contains("2 games, updated 2024-06-01 08:00:00"));
    }

    #[test]
    fn extreme_prices_do_not_overflow() {
        let mut rec = record();
        rec.current.insert("Dota 2".to_string(), PriceEntry::new("570", i64::MAX, 9));
        rec.previous.insert("Dota 2".to_string(), PriceEntry::new("570", -5, 9));
        let out = render(&rec);
        let dota = out.lines().find(|l| l.starts_with("Dota 2")).unwrap();
        assert!(dota.contains(&format_delta(i64::MAX)));
    }

    #[test]
    fn empty_snapshot() {
        let mut rec = record();
        rec.current.clear();
        assert_eq!(render(&rec), "No prices stored.\n");
    }

    #[test]
    fn changes_largest_first() {
        let changes = vec![
            PriceChange { name: "a".into(), old_price: 10, new_price: 11, delta: 1, kind: ChangeKind::Rose },
            PriceChange { name: "b".into(), old_price: 50, new_price: 20, delta: -30, kind: ChangeKind::Fell },
            PriceChange { name: "c".into(), old_price: 0, new_price: 5, delta: 5, kind: ChangeKind::New },
        ];
        let out = render_changes(&changes);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].contains("[-] b fell 0.50 -> 0.20 (-0.30)"));
        assert!(lines[1].contains("[new] c listed at 0.05"));
        assert!(lines[2].contains("[+] a rose"));
        assert_eq!(render_changes(&[]), "No price changes.\n");
    }

    #[test]
    fn holdings_total() {
        let holdings = vec![
            GameHolding { game: "Dota 2".into(), cards: 3, price: Some(35), value: Some(105) },
            GameHolding { game: String::new(), cards: 1, price: None, value: None },
        ];
        let out = render_holdings(&holdings);
        assert!(out.contains("(untagged)"));
        assert!(out.contains("TOTAL: 1.05"));
    }
}
