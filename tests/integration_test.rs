use std::cell::RefCell;
use std::time::Duration;

use cardex::config::Config;
use cardex::cycle;
use cardex::extract::SourceKind;
use cardex::model::TIMESTAMP_FORMAT;
use cardex::net::FetchError;
use cardex::schedule;
use cardex::store::update::{ChangeKind, UpdateOutcome};
use cardex::store::Store;
use chrono::NaiveDateTime;

fn page(prices: &[(&str, &str, i64)]) -> String {
    let blob: Vec<String> = prices
        .iter()
        .map(|(id, _, price)| format!("\"{id}\":[{price},9]"))
        .collect();
    let options: String = prices
        .iter()
        .map(|(id, name, _)| format!("<option value=\"appid-{id}\">{name}</option>\n"))
        .collect();

    format!(
        "<html><script>\nvar gameprices = {{{}}};\nvar stocklist = {{}};\n</script>\n<select>\n{options}</select></html>",
        blob.join(",")
    )
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
}

fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        db_path: Some(dir.path().join("cardex.db")),
        interval: Duration::from_secs(180),
        ..Config::default()
    }
}

#[test]
fn update_cycles_track_current_and_previous() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let bodies = RefCell::new(vec![
        page(&[("440", "Team Fortress 2", 12), ("570", "Dota 2", 30)]),
        page(&[("440", "Team Fortress 2", 12), ("570", "Dota 2", 25), ("730", "Counter-Strike", 4)]),
        String::from("<html>down for maintenance</html>"),
        page(&[("440", "Team Fortress 2", 12)]),
    ]);
    let fetcher = |_: &str| -> Result<String, FetchError> { Ok(bodies.borrow_mut().remove(0)) };

    let mut store = Store::open(config.db_path.as_deref()).unwrap();

    // first extraction: everything is new
    let first = cycle::run_at(&config, &fetcher, &mut store, at("2024-08-01 12:00:00")).unwrap();
    assert_eq!(first.outcome.changes().len(), 2);
    assert!(first.outcome.changes().iter().all(|c| c.kind == ChangeKind::New));

    // Dota 2 fell, Counter-Strike appeared, TF2 unchanged
    let second = cycle::run_at(&config, &fetcher, &mut store, at("2024-08-01 12:03:00")).unwrap();
    let kinds: Vec<_> = second.outcome.changes().iter().map(|c| (c.name.as_str(), c.kind)).collect();
    assert_eq!(kinds, vec![("Counter-Strike", ChangeKind::New), ("Dota 2", ChangeKind::Fell)]);

    let stored = store.load("prices").unwrap().unwrap();
    assert_eq!(stored.current["Dota 2"].price, 25);
    assert_eq!(stored.previous["Dota 2"].price, 30);
    assert_eq!(stored.previous["Team Fortress 2"].price, 0);
    assert_eq!(stored.previous["Counter-Strike"].price, 0);

    // broken page: nothing written
    let third = cycle::run_at(&config, &fetcher, &mut store, at("2024-08-01 12:06:00")).unwrap();
    assert!(matches!(third.outcome, UpdateOutcome::NoData { .. }));
    assert_eq!(store.load("prices").unwrap().unwrap(), stored);

    // partial page with unchanged price: no write, other games still present
    let fourth = cycle::run_at(&config, &fetcher, &mut store, at("2024-08-01 12:09:00")).unwrap();
    assert!(matches!(fourth.outcome, UpdateOutcome::Unchanged { .. }));
    let after = store.load("prices").unwrap().unwrap();
    assert_eq!(after.current.len(), 3);
    assert_eq!(after.updated_at, at("2024-08-01 12:03:00"));
}

#[test]
fn reader_sees_writer_through_separate_handles() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let fetcher = |_: &str| -> Result<String, FetchError> { Ok(page(&[("400", "Portal", 6)])) };

    let summary = schedule::watch(&config, &fetcher, Some(1), |_| {});
    assert_eq!(summary.updates, 1);

    let reader = Store::open(config.db_path.as_deref()).unwrap();
    let record = reader.load("prices").unwrap().unwrap();
    assert_eq!(record.current["Portal"].id, "400");
    assert_eq!(record.current["Portal"].set_size, 9);
}

#[test]
fn shop_source_under_its_own_label() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        source_kind: SourceKind::Shop,
        source_url: "http://shop.test/api".to_string(),
        label: "shop".to_string(),
        ..config_in(&dir)
    };
    let fetcher = |url: &str| -> Result<String, FetchError> {
        assert_eq!(url, "http://shop.test/api");
        Ok(r#"{"items":[{"appid":400,"name":"Portal","price":7,"set_size":8}]}"#.to_string())
    };

    let mut store = Store::open(config.db_path.as_deref()).unwrap();
    cycle::run_at(&config, &fetcher, &mut store, at("2024-08-02 00:00:00")).unwrap();

    assert!(store.load("prices").unwrap().is_none());
    assert_eq!(store.load("shop").unwrap().unwrap().current["Portal"].price, 7);
}
