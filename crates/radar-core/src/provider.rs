//! Boundaries to external collaborators
//!
//! The core never talks to the network directly; it goes through these
//! traits. Implementations backed by Yahoo live in [`crate::api`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::model::{Identifier, PriceSeries};

/// Per-symbol outcome of a batched history request, keyed by [`Identifier::symbol`].
///
/// An `Ok` series may be empty for unknown or delisted symbols.
pub type HistoryBatch = HashMap<String, Result<PriceSeries>>;

/// Bulk daily price/volume history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch `lookback_days` calendar days for every identifier in one call.
    ///
    /// An outer `Err` means the whole batch failed; per-symbol failures are
    /// reported inside the map.
    async fn fetch_history(
        &self,
        identifiers: &[Identifier],
        lookback_days: u32,
    ) -> Result<HistoryBatch>;
}

/// Candidate returned by a remote autocomplete search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Exchange-qualified symbol, e.g. `2330.TW`
    pub symbol: String,
    pub name: Option<String>,
    /// Exchange code as reported by the search, e.g. `TAI`
    pub exchange: Option<String>,
}

/// Remote name/ticker search
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>>;
}

/// Public quote page used as the last-resort name source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotePageSource: Send + Sync {
    /// Raw markup of the quote page for `identifier`
    async fn fetch_page(&self, identifier: &Identifier) -> Result<String>;
}
