//! Periodic update loop for the long-lived `watch` process.
//!
//! Each cycle opens its own store handle and runs independently; a failed
//! cycle is logged and the loop carries on with the stored snapshot intact.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::cycle;
use crate::model::TIMESTAMP_FORMAT;
use crate::net::Fetcher;
use crate::store::update::UpdateOutcome;
use crate::store::Store;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchSummary {
    pub cycles: u64,
    pub updates: u64,
    pub failures: u64,
}

/// Run cycles every `config.interval` until `max_cycles` is reached
/// (forever when `None`). `sleep` is called between cycles.
pub fn watch(
    config: &Config,
    fetcher: &dyn Fetcher,
    max_cycles: Option<u64>,
    mut sleep: impl FnMut(Duration),
) -> WatchSummary {
    let mut summary = WatchSummary::default();

    tracing::info!(interval = %humantime::format_duration(config.interval), label = %config.label, "watch started");

    loop {
        let started = Instant::now();
        let now = cycle::now();
        tracing::info!("update ran at {}", now.format(TIMESTAMP_FORMAT));

        let result = Store::open(config.db_path.as_deref())
            .and_then(|mut store| cycle::run_at(config, fetcher, &mut store, now));

        summary.cycles += 1;
        match result {
            Ok(report) => {
                if let UpdateOutcome::Updated { changes, .. } = &report.outcome {
                    summary.updates += 1;
                    tracing::info!(changed = changes.len(), "prices changed");
                }
            }
            Err(e) => {
                summary.failures += 1;
                tracing::error!(error = %e, "update cycle failed");
            }
        }

        if max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }

        sleep(config.interval.saturating_sub(started.elapsed()));
    }

    tracing::info!(cycles = summary.cycles, updates = summary.updates, failures = summary.failures, "watch stopped");
    summary
}
