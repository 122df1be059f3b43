//! Last-resort strategies for bare numeric codes

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use super::ResolveStrategy;
use crate::error::Result;
use crate::model::{Identifier, Market};
use crate::provider::{PriceHistoryProvider, QuotePageSource};

#[allow(clippy::unwrap_used)]
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

fn is_numeric_code(query: &str) -> bool {
    !query.is_empty() && query.chars().all(|c| c.is_ascii_digit())
}

/// Candidate listings for a numeric code, in trial order
fn candidates(query: &str) -> impl Iterator<Item = Identifier> + '_ {
    Market::PROBE_ORDER
        .into_iter()
        .map(move |market| Identifier::with_placeholder_name(query, market))
}

/// Display name from a quote page: the `<title>` text before the first parenthesis
pub fn extract_title_name(markup: &str) -> Option<String> {
    let title = TITLE_RE.captures(markup)?.get(1)?.as_str();
    let cut = title.find(['(', '（'])?;
    let name = title[..cut].trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Strategy 4: probe each suffix with a minimal history fetch
pub struct DirectProbe {
    history: Arc<dyn PriceHistoryProvider>,
    lookback_days: u32,
}

impl DirectProbe {
    pub fn new(history: Arc<dyn PriceHistoryProvider>, lookback_days: u32) -> Self {
        Self {
            history,
            lookback_days,
        }
    }
}

#[async_trait]
impl ResolveStrategy for DirectProbe {
    fn name(&self) -> &'static str {
        "direct-probe"
    }

    async fn resolve(&self, query: &str) -> Result<Option<Identifier>> {
        if !is_numeric_code(query) {
            return Ok(None);
        }
        for candidate in candidates(query) {
            let symbol = candidate.symbol();
            let batch = match self
                .history
                .fetch_history(std::slice::from_ref(&candidate), self.lookback_days)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    debug!("Probe of {} failed: {}", symbol, e);
                    continue;
                }
            };
            match batch.get(&symbol) {
                Some(Ok(series)) if !series.is_empty() => return Ok(Some(candidate)),
                Some(Err(e)) => debug!("Probe of {} failed: {}", symbol, e),
                _ => debug!("Probe of {} returned no rows", symbol),
            }
        }
        Ok(None)
    }
}

/// Strategy 5: read the display name off the public quote page
pub struct PageScrape {
    pages: Arc<dyn QuotePageSource>,
}

impl PageScrape {
    pub fn new(pages: Arc<dyn QuotePageSource>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl ResolveStrategy for PageScrape {
    fn name(&self) -> &'static str {
        "page-scrape"
    }

    async fn resolve(&self, query: &str) -> Result<Option<Identifier>> {
        if !is_numeric_code(query) {
            return Ok(None);
        }
        for mut candidate in candidates(query) {
            match self.pages.fetch_page(&candidate).await {
                Ok(markup) => {
                    if let Some(name) = extract_title_name(&markup) {
                        candidate.display_name = name;
                        return Ok(Some(candidate));
                    }
                    debug!("No title name on quote page for {}", candidate.symbol());
                }
                Err(e) => debug!("Quote page for {} failed: {}", candidate.symbol(), e),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RadarError;
    use crate::model::{PriceBar, PriceSeries};
    use crate::provider::{HistoryBatch, MockPriceHistoryProvider, MockQuotePageSource};
    use chrono::NaiveDate;

    fn one_row() -> PriceSeries {
        PriceSeries::new(vec![PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            88.0,
            1_000,
        )])
    }

    #[test]
    fn test_extract_title_name() {
        let page = "<html><head><TITLE>台積電(2330.TW) 走勢圖 - Yahoo奇摩股市</TITLE></head></html>";
        assert_eq!(extract_title_name(page), Some("台積電".to_string()));

        let fullwidth = "<title lang=\"zh\">\n  環球晶（6488.TWO）</title>";
        assert_eq!(extract_title_name(fullwidth), Some("環球晶".to_string()));

        assert_eq!(extract_title_name("<title>Yahoo奇摩股市</title>"), None);
        assert_eq!(extract_title_name("<title>(2330.TW)</title>"), None);
        assert_eq!(extract_title_name("no title here"), None);
    }

    #[tokio::test]
    async fn test_probe_skips_non_numeric() {
        let history = MockPriceHistoryProvider::new();
        let probe = DirectProbe::new(Arc::new(history), 7);
        assert!(probe.resolve("tsmc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_probe_falls_through_to_secondary() {
        let mut history = MockPriceHistoryProvider::new();
        history.expect_fetch_history().times(2).returning(|ids, _| {
            let mut batch = HistoryBatch::new();
            let id = &ids[0];
            let series = if id.market == Market::Secondary {
                one_row()
            } else {
                PriceSeries::default()
            };
            batch.insert(id.symbol(), Ok(series));
            Ok(batch)
        });
        let probe = DirectProbe::new(Arc::new(history), 7);

        let id = probe.resolve("6488").await.unwrap().unwrap();
        assert_eq!(id.symbol(), "6488.TWO");
        assert_eq!(id.display_name, "6488 (TWO)");
    }

    #[tokio::test]
    async fn test_probe_primary_first() {
        let mut history = MockPriceHistoryProvider::new();
        history.expect_fetch_history().times(1).returning(|ids, lookback| {
            assert_eq!(lookback, 7);
            let mut batch = HistoryBatch::new();
            batch.insert(ids[0].symbol(), Ok(one_row()));
            Ok(batch)
        });
        let probe = DirectProbe::new(Arc::new(history), 7);

        let id = probe.resolve("2330").await.unwrap().unwrap();
        assert_eq!(id.market, Market::Primary);
        assert_eq!(id.display_name, "2330 (TW)");
    }

    #[tokio::test]
    async fn test_probe_errors_degrade_to_none() {
        let mut history = MockPriceHistoryProvider::new();
        history
            .expect_fetch_history()
            .returning(|_, _| Err(RadarError::Timeout(std::time::Duration::from_secs(1))));
        let probe = DirectProbe::new(Arc::new(history), 7);
        assert!(probe.resolve("9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scrape_uses_title_name() {
        let mut pages = MockQuotePageSource::new();
        pages.expect_fetch_page().returning(|id| {
            if id.market == Market::Primary {
                Err(RadarError::transient("quote-page", "status 404"))
            } else {
                Ok("<title>鈊象(3293.TWO) 走勢圖</title>".to_string())
            }
        });
        let scrape = PageScrape::new(Arc::new(pages));

        let id = scrape.resolve("3293").await.unwrap().unwrap();
        assert_eq!(id.symbol(), "3293.TWO");
        assert_eq!(id.display_name, "鈊象");
    }

    #[tokio::test]
    async fn test_scrape_without_name_is_none() {
        let mut pages = MockQuotePageSource::new();
        pages
            .expect_fetch_page()
            .times(2)
            .returning(|_| Ok("<title>Yahoo奇摩股市</title>".to_string()));
        let scrape = PageScrape::new(Arc::new(pages));
        assert!(scrape.resolve("1234").await.unwrap().is_none());
    }
}
