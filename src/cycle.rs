//! One fetch -> extract -> update pass.
//!
//! Fetch and extraction problems are folded into an empty snapshot, which
//! the updater treats as "no data". Only storage errors escape.

use chrono::NaiveDateTime;

use crate::config::Config;
use crate::extract::{ExtractResult, SourceKind};
use crate::net::Fetcher;
use crate::store::update::{self, UpdateOutcome};
use crate::store::{Store, StoreError};

pub struct CycleReport {
    pub extractor: &'static str,
    pub extracted: usize,
    pub diagnostics: Vec<String>,
    pub outcome: UpdateOutcome,
}

/// Fetch `url` and run the extractor for `kind` over the body.
pub fn fetch_snapshot(fetcher: &dyn Fetcher, kind: SourceKind, url: &str) -> (&'static str, ExtractResult) {
    let extractor = kind.extractor();

    let result = match fetcher.get(url) {
        Ok(body) => extractor.extract(&body),
        Err(e) => ExtractResult::with_diagnostic(format!("fetch failed: {e}")),
    };

    for diagnostic in &result.diagnostics {
        tracing::warn!(extractor = extractor.name(), "{diagnostic}");
    }
    tracing::debug!(extractor = extractor.name(), entries = result.snapshot.len(), "extraction finished");

    (extractor.name(), result)
}

pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub fn run(config: &Config, fetcher: &dyn Fetcher, store: &mut Store) -> Result<CycleReport, StoreError> {
    run_at(config, fetcher, store, now())
}

pub fn run_at(
    config: &Config,
    fetcher: &dyn Fetcher,
    store: &mut Store,
    now: NaiveDateTime,
) -> Result<CycleReport, StoreError> {
    let (extractor, result) = fetch_snapshot(fetcher, config.source_kind, &config.source_url);
    let outcome = update::apply(store, &config.label, &result.snapshot, now)?;

    Ok(CycleReport {
        extractor,
        extracted: result.snapshot.len(),
        diagnostics: result.diagnostics,
        outcome,
    })
}
