//! Free-form query to canonical identifier
//!
//! Resolution runs an ordered chain of strategies, cheapest and most
//! trustworthy first:
//!
//! 1. [`ExactMatch`]: local dictionary, exact name/symbol/code
//! 2. [`SubstringMatch`]: local dictionary, partial name
//! 3. [`RemoteSearch`]: remote autocomplete restricted to known exchanges
//! 4. [`DirectProbe`]: numeric code with each suffix, minimal history fetch
//! 5. [`PageScrape`]: numeric code, name read off the quote page
//!
//! The first strategy returning an identifier wins. Strategy errors and
//! timeouts are logged and treated as a miss.

pub mod dictionary;
pub mod probe;
pub mod remote;

pub use dictionary::{ExactMatch, SubstringMatch, SymbolDictionary};
pub use probe::{DirectProbe, PageScrape, extract_title_name};
pub use remote::RemoteSearch;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::RadarConfig;
use crate::error::{RadarError, Result};
use crate::model::Identifier;
use crate::provider::{PriceHistoryProvider, QuotePageSource, SymbolSearch};

/// One link of the resolution chain
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// `Ok(None)` passes the query to the next strategy
    async fn resolve(&self, query: &str) -> Result<Option<Identifier>>;
}

/// Ordered strategy chain
pub struct TickerResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
    timeout: Duration,
}

impl TickerResolver {
    /// Chain over `strategies` in the given order
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>, timeout: Duration) -> Self {
        Self {
            strategies,
            timeout,
        }
    }

    /// The five-step chain over the given collaborators
    pub fn standard(
        dictionary: SymbolDictionary,
        search: Arc<dyn SymbolSearch>,
        history: Arc<dyn PriceHistoryProvider>,
        pages: Arc<dyn QuotePageSource>,
        config: &RadarConfig,
    ) -> Self {
        let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(ExactMatch::new(dictionary.clone())),
            Box::new(SubstringMatch::new(dictionary)),
            Box::new(RemoteSearch::new(search, config.accept_foreign)),
            Box::new(DirectProbe::new(history, config.probe_lookback_days)),
            Box::new(PageScrape::new(pages)),
        ];
        // probe and scrape make up to one call per market
        Self::new(strategies, config.request_timeout * 2)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve `query`, or fail with [`RadarError::NotFound`]
    pub async fn resolve(&self, query: &str) -> Result<Identifier> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RadarError::NotFound(query.to_string()));
        }

        for strategy in &self.strategies {
            match tokio::time::timeout(self.timeout, strategy.resolve(query)).await {
                Ok(Ok(Some(identifier))) => {
                    info!(
                        "Resolved {:?} to {} via {}",
                        query,
                        identifier,
                        strategy.name()
                    );
                    return Ok(identifier);
                }
                Ok(Ok(None)) => debug!("{} has no match for {:?}", strategy.name(), query),
                Ok(Err(e)) => warn!("{} failed for {:?}: {}", strategy.name(), query, e),
                Err(_) => warn!(
                    "{} timed out after {:?} for {:?}",
                    strategy.name(),
                    self.timeout,
                    query
                ),
            }
        }

        Err(RadarError::NotFound(query.to_string()))
    }
}
