//! Time-bounded reuse of fetched price history

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::model::{Identifier, PriceSeries};
use crate::provider::{HistoryBatch, PriceHistoryProvider};

/// Cache key: symbol plus lookback window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub symbol: String,
    pub lookback_days: u32,
}

impl HistoryKey {
    pub fn new(identifier: &Identifier, lookback_days: u32) -> Self {
        Self {
            symbol: identifier.symbol(),
            lookback_days,
        }
    }
}

/// Thread-safe series cache with a fixed lifespan per entry
pub struct HistoryCache {
    cache: Arc<RwLock<TimedCache<HistoryKey, PriceSeries>>>,
}

impl HistoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &HistoryKey) -> Option<PriceSeries> {
        // cache_get takes &mut self
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: HistoryKey, series: PriceSeries) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, series);
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for HistoryCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Serves cached series and forwards only the misses, still as one batch.
///
/// Only non-empty successful series are cached, so failures and unknown
/// symbols are asked again on the next cycle.
pub struct CachedHistoryProvider {
    inner: Arc<dyn PriceHistoryProvider>,
    cache: HistoryCache,
}

impl CachedHistoryProvider {
    pub fn new(inner: Arc<dyn PriceHistoryProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: HistoryCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }
}

#[async_trait]
impl PriceHistoryProvider for CachedHistoryProvider {
    async fn fetch_history(
        &self,
        identifiers: &[Identifier],
        lookback_days: u32,
    ) -> Result<HistoryBatch> {
        let mut batch = HistoryBatch::new();
        let mut misses = Vec::new();

        for id in identifiers {
            let key = HistoryKey::new(id, lookback_days);
            if let Some(series) = self.cache.get(&key).await {
                debug!("Cache hit for {} ({} days)", key.symbol, lookback_days);
                batch.insert(key.symbol, Ok(series));
            } else {
                misses.push(id.clone());
            }
        }

        if misses.is_empty() {
            return Ok(batch);
        }
        debug!("Cache miss for {} of {} symbols", misses.len(), identifiers.len());

        let fetched = self.inner.fetch_history(&misses, lookback_days).await?;
        for (symbol, result) in fetched {
            if let Some(series) = result.as_ref().ok().filter(|s| !s.is_empty()) {
                let key = HistoryKey {
                    symbol: symbol.clone(),
                    lookback_days,
                };
                self.cache.insert(key, series.clone()).await;
            }
            batch.insert(symbol, result);
        }
        debug!("History cache holds {} series", self.cache.len().await);
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RadarError;
    use crate::model::{Market, PriceBar};
    use crate::provider::MockPriceHistoryProvider;
    use chrono::NaiveDate;

    fn one_row(close: f64) -> PriceSeries {
        PriceSeries::new(vec![PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            close,
            10,
        )])
    }

    #[tokio::test]
    async fn test_cache_keyed_by_symbol_and_lookback() {
        let cache = HistoryCache::new(Duration::from_secs(60));
        let id = Identifier::new("2330", Market::Primary, "台積電");
        let key = HistoryKey::new(&id, 400);

        cache.insert(key.clone(), one_row(1.0)).await;
        assert_eq!(cache.get(&key).await, Some(one_row(1.0)));
        assert!(cache.get(&HistoryKey::new(&id, 7)).await.is_none());

        cache.insert(key.clone(), one_row(2.0)).await;
        assert_eq!(cache.get(&key).await, Some(one_row(2.0)));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_only_misses_are_forwarded() {
        let tsmc = Identifier::new("2330", Market::Primary, "台積電");
        let mtk = Identifier::new("2454", Market::Primary, "聯發科");

        let mut inner = MockPriceHistoryProvider::new();
        let mut seq = mockall::Sequence::new();
        inner
            .expect_fetch_history()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|ids, _| {
                assert_eq!(ids.len(), 2);
                Ok(ids
                    .iter()
                    .map(|id| (id.symbol(), Ok(one_row(100.0))))
                    .collect::<HistoryBatch>())
            });
        inner
            .expect_fetch_history()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|ids, _| {
                assert_eq!(ids.len(), 1);
                assert_eq!(ids[0].code, "1101");
                Ok(ids
                    .iter()
                    .map(|id| (id.symbol(), Ok(PriceSeries::default())))
                    .collect::<HistoryBatch>())
            });

        let provider = CachedHistoryProvider::new(Arc::new(inner), Duration::from_secs(60));
        let first = provider
            .fetch_history(&[tsmc.clone(), mtk.clone()], 400)
            .await
            .unwrap();
        assert_eq!(first.len(), 2);

        let cement = Identifier::new("1101", Market::Primary, "台泥");
        let second = provider
            .fetch_history(&[tsmc, mtk, cement], 400)
            .await
            .unwrap();
        assert_eq!(second.len(), 3);
        assert!(matches!(second.get("1101.TW"), Some(Ok(s)) if s.is_empty()));
        // empty series are not cached
        assert_eq!(provider.cache().len().await, 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let id = Identifier::new("2330", Market::Primary, "台積電");
        let mut inner = MockPriceHistoryProvider::new();
        inner.expect_fetch_history().times(2).returning(|ids, _| {
            Ok(ids
                .iter()
                .map(|id| (id.symbol(), Err(RadarError::transient("yahoo", "status 500"))))
                .collect::<HistoryBatch>())
        });

        let provider = CachedHistoryProvider::new(Arc::new(inner), Duration::from_secs(60));
        for _ in 0..2 {
            let batch = provider.fetch_history(std::slice::from_ref(&id), 400).await.unwrap();
            assert!(batch["2330.TW"].is_err());
        }
        assert!(provider.cache().is_empty().await);
    }
}
