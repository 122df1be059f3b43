//! Remote autocomplete search strategy

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::ResolveStrategy;
use crate::error::Result;
use crate::model::{Identifier, Market};
use crate::provider::{SearchCandidate, SymbolSearch};

/// Strategy 3: first search candidate listed on a recognized exchange
pub struct RemoteSearch {
    search: Arc<dyn SymbolSearch>,
    accept_foreign: bool,
}

impl RemoteSearch {
    pub fn new(search: Arc<dyn SymbolSearch>, accept_foreign: bool) -> Self {
        Self {
            search,
            accept_foreign,
        }
    }

    fn accept(&self, candidate: &SearchCandidate) -> Option<Identifier> {
        let market = Market::from_exchange_code(candidate.exchange.as_deref()?, self.accept_foreign)?;
        let (code, parsed) = Identifier::parse_symbol(&candidate.symbol)?;
        if parsed != market {
            debug!(
                "Skipping {}: suffix says {:?}, exchange says {:?}",
                candidate.symbol, parsed, market
            );
            return None;
        }
        let display_name = candidate
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| code.clone(), str::to_string);
        Some(Identifier::new(code, market, display_name))
    }
}

#[async_trait]
impl ResolveStrategy for RemoteSearch {
    fn name(&self) -> &'static str {
        "remote-search"
    }

    async fn resolve(&self, query: &str) -> Result<Option<Identifier>> {
        let candidates = self.search.search(query).await?;
        debug!("Search for {:?} returned {} candidates", query, candidates.len());
        Ok(candidates.iter().find_map(|candidate| self.accept(candidate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RadarError;
    use crate::provider::MockSymbolSearch;

    fn candidate(symbol: &str, name: Option<&str>, exchange: Option<&str>) -> SearchCandidate {
        SearchCandidate {
            symbol: symbol.to_string(),
            name: name.map(str::to_string),
            exchange: exchange.map(str::to_string),
        }
    }

    fn strategy(candidates: Vec<SearchCandidate>, accept_foreign: bool) -> RemoteSearch {
        let mut search = MockSymbolSearch::new();
        search
            .expect_search()
            .returning(move |_| Ok(candidates.clone()));
        RemoteSearch::new(Arc::new(search), accept_foreign)
    }

    #[tokio::test]
    async fn test_first_recognized_candidate_wins() {
        let strategy = strategy(
            vec![
                candidate("TSM", Some("Taiwan Semiconductor ADR"), Some("NYQ")),
                candidate("2330.TW", Some("TSMC"), Some("TAI")),
                candidate("6488.TWO", Some("GlobalWafers"), Some("TWO")),
            ],
            false,
        );

        let id = strategy.resolve("tsmc").await.unwrap().unwrap();
        assert_eq!(id.symbol(), "2330.TW");
        assert_eq!(id.display_name, "TSMC");
    }

    #[tokio::test]
    async fn test_foreign_accepted_when_enabled() {
        let strategy = strategy(
            vec![
                candidate("TSM", Some("Taiwan Semiconductor ADR"), Some("NYQ")),
                candidate("2330.TW", Some("TSMC"), Some("TAI")),
            ],
            true,
        );

        let id = strategy.resolve("tsmc").await.unwrap().unwrap();
        assert_eq!(id.market, Market::Foreign);
        assert_eq!(id.symbol(), "TSM");
    }

    #[tokio::test]
    async fn test_missing_name_falls_back_to_code() {
        let strategy = strategy(vec![candidate("8069.TWO", Some("  "), Some("TWO"))], false);
        let id = strategy.resolve("8069").await.unwrap().unwrap();
        assert_eq!(id.display_name, "8069");
        assert_eq!(id.market, Market::Secondary);
    }

    #[tokio::test]
    async fn test_no_recognized_candidate() {
        let strategy = strategy(
            vec![
                candidate("7203.T", Some("Toyota"), Some("JPX")),
                candidate("XYZ", Some("Unknown"), None),
            ],
            true,
        );
        assert!(strategy.resolve("toyota").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_suffix_must_agree_with_exchange() {
        let strategy = strategy(
            vec![
                candidate("2330.TW", Some("TSMC"), Some("TWO")),
                candidate("BRK.B", Some("Berkshire Hathaway"), Some("NYQ")),
                candidate("6488.TWO", Some("GlobalWafers"), Some("TWO")),
            ],
            true,
        );

        let id = strategy.resolve("wafer").await.unwrap().unwrap();
        assert_eq!(id.symbol(), "6488.TWO");
        assert_eq!(id.market, Market::Secondary);
    }

    #[tokio::test]
    async fn test_search_error_propagates_to_chain() {
        let mut search = MockSymbolSearch::new();
        search
            .expect_search()
            .returning(|_| Err(RadarError::transient("search", "status 503")));
        let strategy = RemoteSearch::new(Arc::new(search), false);
        assert!(strategy.resolve("x").await.is_err());
    }
}
