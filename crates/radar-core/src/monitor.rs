//! Watchlist refresh pipeline
//!
//! [`WatchlistMonitor`] owns the watchlist and drives one refresh cycle:
//! a single batched history fetch, indicator computation, rating for every
//! horizon, then ranking. Per-identifier failures never abort the cycle.
//! Identifiers with no history rows are pruned at once; identifiers whose
//! fetch keeps failing are pruned after `max_consecutive_failures` cycles.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RadarConfig;
use crate::error::{RadarError, Result};
use crate::indicators::IndicatorSet;
use crate::model::Identifier;
use crate::provider::PriceHistoryProvider;
use crate::ranker::{RatingFilter, WatchlistEntry, rank};
use crate::rating::{Horizon, RatingEngine};
use crate::resolver::TickerResolver;
use crate::watchlist::{AddOutcome, InMemoryWatchlist, WatchlistStore};

/// Closes kept per identifier for trend sparklines (about one trading year)
pub const SPARKLINE_DAYS: usize = 240;

/// Latest-day view of one identifier, for renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub indicators: IndicatorSet,
    pub sparkline: Vec<f64>,
    pub as_of: Option<NaiveDate>,
}

/// Outcome of one refresh cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    rankings: HashMap<Horizon, Vec<WatchlistEntry>>,
    /// Keyed by symbol
    pub snapshots: HashMap<String, Snapshot>,
    /// Removed from the watchlist during this cycle
    pub pruned: Vec<Identifier>,
    /// Failed this cycle, retried on the next one
    pub skipped: Vec<Identifier>,
}

impl RefreshReport {
    /// Ranked entries for `horizon`
    pub fn ranking(&self, horizon: Horizon) -> &[WatchlistEntry] {
        self.rankings.get(&horizon).map_or(&[], Vec::as_slice)
    }

    /// Ranked entries for `horizon` with `filter` applied
    pub fn filtered(&self, horizon: Horizon, filter: RatingFilter) -> Vec<WatchlistEntry> {
        filter.apply(self.ranking(horizon).to_vec())
    }

    pub fn snapshot(&self, identifier: &Identifier) -> Option<&Snapshot> {
        self.snapshots.get(&identifier.symbol())
    }

    pub fn is_empty(&self) -> bool {
        self.rankings.values().all(Vec::is_empty)
    }
}

/// Watchlist plus everything needed to refresh it
pub struct WatchlistMonitor {
    resolver: TickerResolver,
    history: Arc<dyn PriceHistoryProvider>,
    engine: RatingEngine,
    watchlist: Box<dyn WatchlistStore>,
    newly_added: Option<Identifier>,
    failures: HashMap<String, u32>,
    config: RadarConfig,
}

impl WatchlistMonitor {
    /// Monitor with an empty in-memory watchlist
    pub fn new(
        resolver: TickerResolver,
        history: Arc<dyn PriceHistoryProvider>,
        config: RadarConfig,
    ) -> Self {
        Self {
            resolver,
            history,
            engine: RatingEngine::new(config.thresholds),
            watchlist: Box::new(InMemoryWatchlist::new()),
            newly_added: None,
            failures: HashMap::new(),
            config,
        }
    }

    pub fn watchlist(&self) -> Vec<Identifier> {
        self.watchlist.list()
    }

    /// Identifier pinned to the top of every ranking
    pub fn newly_added(&self) -> Option<&Identifier> {
        self.newly_added.as_ref()
    }

    /// Resolve `query` and add the result.
    ///
    /// A listing that is already watched is reported as a duplicate and does
    /// not move the pin. If the stored name is still a synthesized placeholder
    /// and the resolution found a real one, the stored name is corrected.
    pub async fn add(&mut self, query: &str) -> Result<AddOutcome> {
        let identifier = self.resolver.resolve(query).await?;

        match self.watchlist.add(identifier.clone()) {
            AddOutcome::Added(added) => {
                info!("Watching {}", added);
                self.failures.remove(&added.symbol());
                self.newly_added = Some(added.clone());
                Ok(AddOutcome::Added(added))
            }
            AddOutcome::Duplicate(mut existing) => {
                if existing.has_placeholder_name() && !identifier.has_placeholder_name() {
                    info!(
                        "Correcting name of {} to {}",
                        existing.symbol(),
                        identifier.display_name
                    );
                    self.watchlist.rename(&existing, &identifier.display_name);
                    existing.display_name = identifier.display_name;
                }
                Ok(AddOutcome::Duplicate(existing))
            }
        }
    }

    /// Remove the watched identifier matching `query` by code, symbol or name
    pub fn remove(&mut self, query: &str) -> Result<Identifier> {
        let query = query.trim();
        let upper = query.to_uppercase();
        let target = self
            .watchlist
            .list()
            .into_iter()
            .find(|id| id.code == upper || id.symbol() == upper || id.display_name == query)
            .ok_or_else(|| RadarError::NotFound(query.to_string()))?;

        self.forget(&target);
        info!("Stopped watching {}", target);
        Ok(target)
    }

    /// Run one refresh cycle over the whole watchlist
    pub async fn refresh(&mut self) -> RefreshReport {
        let watched = self.watchlist.list();
        let mut report = RefreshReport::default();
        if watched.is_empty() {
            return report;
        }

        // the provider bounds each symbol; this bounds the batch as a whole
        let budget = self.config.request_timeout * 2;
        let fetch = self
            .history
            .fetch_history(&watched, self.config.history_lookback_days);
        let outcome = tokio::time::timeout(budget, fetch).await;
        let mut batch = match outcome {
            Ok(Ok(batch)) => batch,
            Ok(Err(e)) => {
                warn!("History batch failed: {}", e);
                for id in watched {
                    self.record_failure(id, &mut report);
                }
                return report;
            }
            Err(_) => {
                warn!("History batch timed out after {:?}", budget);
                for id in watched {
                    self.record_failure(id, &mut report);
                }
                return report;
            }
        };

        let mut rated: HashMap<Horizon, Vec<WatchlistEntry>> = HashMap::new();
        for id in watched {
            let symbol = id.symbol();
            let series = match batch.remove(&symbol) {
                Some(Ok(series)) if series.is_empty() => {
                    info!("No history rows for {}, pruning", id);
                    self.forget(&id);
                    report.pruned.push(id);
                    continue;
                }
                Some(Ok(series)) => series,
                Some(Err(e)) => {
                    warn!("History for {} failed: {}", symbol, e);
                    self.record_failure(id, &mut report);
                    continue;
                }
                None => {
                    warn!("History batch has no result for {}", symbol);
                    self.record_failure(id, &mut report);
                    continue;
                }
            };

            self.failures.remove(&symbol);
            let indicators = match IndicatorSet::compute(&series) {
                Ok(indicators) => indicators,
                Err(e) => {
                    warn!("Indicators for {} failed: {}", symbol, e);
                    self.record_failure(id, &mut report);
                    continue;
                }
            };

            for horizon in Horizon::ALL {
                let rating = self.engine.rate(&indicators, horizon);
                debug!("{} {}: {}", symbol, horizon, rating.label);
                rated
                    .entry(horizon)
                    .or_default()
                    .push(WatchlistEntry::new(id.clone(), rating));
            }
            report.snapshots.insert(
                symbol,
                Snapshot {
                    indicators,
                    sparkline: series.trailing_closes(SPARKLINE_DAYS),
                    as_of: series.last_date(),
                },
            );
        }

        for (horizon, entries) in rated {
            report
                .rankings
                .insert(horizon, rank(entries, self.newly_added.as_ref()));
        }
        report
    }

    fn record_failure(&mut self, id: Identifier, report: &mut RefreshReport) {
        let count = self.failures.entry(id.symbol()).or_insert(0);
        *count += 1;
        if *count >= self.config.max_consecutive_failures {
            info!("{} failed {} cycles in a row, pruning", id, count);
            self.forget(&id);
            report.pruned.push(id);
        } else {
            report.skipped.push(id);
        }
    }

    fn forget(&mut self, id: &Identifier) {
        self.watchlist.remove(id);
        self.failures.remove(&id.symbol());
        if self
            .newly_added
            .as_ref()
            .is_some_and(|pinned| pinned.same_listing(id))
        {
            self.newly_added = None;
        }
    }
}
