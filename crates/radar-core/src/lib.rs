//! Watchlist radar for Taiwan-listed equities
//!
//! This crate turns free-form stock queries into exchange-qualified
//! identifiers and rates every watched identifier on three horizons from its
//! daily price/volume history. It includes:
//!
//! - Ticker resolution through an ordered strategy chain (local dictionary,
//!   remote search, direct probe, quote-page scrape)
//! - Moving averages (20/60/200/240), RSI-14 and volume ratio
//! - Rule-table ratings with score, target price and rationale
//! - Ranking with a pin for the most recently added identifier
//! - A self-healing watchlist that prunes identifiers without data
//!
//! # Architecture
//!
//! Network access goes through the traits in [`provider`]; [`api`] holds the
//! Yahoo implementations and [`cache`] a TTL layer over history. Everything
//! else is pure and synchronous apart from the awaits on those traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use radar_core::{
//!     CachedHistoryProvider, Horizon, RadarConfig, SymbolDictionary, TickerResolver,
//!     WatchlistMonitor, YahooFinanceClient, YahooQuotePage, YahooSearchClient,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RadarConfig::builder().with_env().build()?;
//!     let yahoo = Arc::new(YahooFinanceClient::new(config.request_timeout)?);
//!     let history = Arc::new(CachedHistoryProvider::new(yahoo, config.history_cache_ttl));
//!
//!     let resolver = TickerResolver::standard(
//!         SymbolDictionary::builtin(),
//!         Arc::new(YahooSearchClient::new(config.request_timeout, 30, 10)?),
//!         history.clone(),
//!         Arc::new(YahooQuotePage::new(config.request_timeout)?),
//!         &config,
//!     );
//!
//!     let mut monitor = WatchlistMonitor::new(resolver, history, config);
//!     monitor.add("台積電").await?;
//!     let report = monitor.refresh().await;
//!     for entry in report.ranking(Horizon::Long) {
//!         println!("{} {}", entry.identifier, entry.rating.label);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod model;
pub mod monitor;
pub mod provider;
pub mod ranker;
pub mod rating;
pub mod resolver;
pub mod watchlist;

// Re-export main types for convenience
pub use api::{YahooFinanceClient, YahooQuotePage, YahooSearchClient};
pub use cache::{CachedHistoryProvider, HistoryCache};
pub use config::{RadarConfig, RatingThresholds};
pub use error::{RadarError, Result};
pub use indicators::{IndicatorSet, Trend};
pub use model::{Identifier, Market, PriceBar, PriceSeries};
pub use monitor::{RefreshReport, Snapshot, WatchlistMonitor};
pub use provider::{PriceHistoryProvider, QuotePageSource, SearchCandidate, SymbolSearch};
pub use ranker::{RatingFilter, WatchlistEntry, rank};
pub use rating::{Horizon, Rating, RatingEngine, RatingLabel};
pub use resolver::{ResolveStrategy, SymbolDictionary, TickerResolver};
pub use watchlist::{AddOutcome, InMemoryWatchlist, WatchlistStore};
