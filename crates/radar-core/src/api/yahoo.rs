//! Yahoo Finance daily history

use async_trait::async_trait;
use chrono::{DateTime, Duration as Days, Utc};
use futures::future::join_all;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::error::{RadarError, Result};
use crate::model::{Identifier, PriceBar, PriceSeries};
use crate::provider::{HistoryBatch, PriceHistoryProvider};

/// Price-history provider backed by the Yahoo chart API
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    timeout: Duration,
}

impl YahooFinanceClient {
    /// Create a client whose per-symbol requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| RadarError::YahooFinance(e.to_string()))?;
        Ok(Self { connector, timeout })
    }

    /// Daily rows for one symbol between `start` and `end`
    pub async fn get_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| RadarError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| RadarError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        let response = match self
            .connector
            .get_quote_history(symbol, start_odt, end_odt)
            .await
        {
            Ok(response) => response,
            Err(e) if is_no_data(&e) => {
                debug!("No history for {}: {}", symbol, e);
                return Ok(PriceSeries::default());
            }
            Err(e) => return Err(RadarError::YahooFinance(e.to_string())),
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) if is_no_data(&e) => return Ok(PriceSeries::default()),
            Err(e) => return Err(RadarError::YahooFinance(e.to_string())),
        };

        Ok(quotes
            .iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar::new(date, q.close, q.volume))
            })
            .collect())
    }

    async fn fetch_one(&self, id: &Identifier, lookback_days: u32) -> Result<PriceSeries> {
        let symbol = id.symbol();
        let end = Utc::now();
        let start = end - Days::days(i64::from(lookback_days));
        tokio::time::timeout(self.timeout, self.get_history(&symbol, start, end))
            .await
            .map_err(|_| RadarError::Timeout(self.timeout))?
    }
}

/// Code Yahoo puts in `chart.error` for unknown or delisted symbols
const NOT_FOUND_CODE: &str = "Not Found";

/// Unknown or delisted symbols surface as these rather than as an empty list
fn is_no_data(err: &yahoo::YahooError) -> bool {
    match err {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => true,
        yahoo::YahooError::ApiError(msg) => msg.code.as_deref() == Some(NOT_FOUND_CODE),
        _ => false,
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn fetch_history(
        &self,
        identifiers: &[Identifier],
        lookback_days: u32,
    ) -> Result<HistoryBatch> {
        let results = join_all(
            identifiers
                .iter()
                .map(|id| self.fetch_one(id, lookback_days)),
        )
        .await;

        Ok(identifiers
            .iter()
            .map(Identifier::symbol)
            .zip(results)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Market;
    use serde_json::json;

    fn chart_error(code: &str) -> yahoo::YahooError {
        let response = yahoo::YResponse::from_json(json!({
            "chart": {
                "result": null,
                "error": {
                    "code": code,
                    "description": "No data found, symbol may be delisted"
                }
            }
        }))
        .unwrap();
        yahoo::YahooError::ApiError(response.chart.error.unwrap())
    }

    #[test]
    fn test_not_found_is_no_data() {
        assert!(is_no_data(&chart_error("Not Found")));
        assert!(is_no_data(&yahoo::YahooError::NoQuotes));
        assert!(is_no_data(&yahoo::YahooError::NoResult));
    }

    #[test]
    fn test_other_errors_are_not_no_data() {
        assert!(!is_no_data(&chart_error("Bad Request")));
        assert!(!is_no_data(&yahoo::YahooError::FetchFailed(
            "503".to_string()
        )));
        assert!(!is_no_data(&yahoo::YahooError::DataInconsistency));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_history_batch() {
        let client = YahooFinanceClient::new(Duration::from_secs(10)).unwrap();
        let ids = [
            Identifier::new("2330", Market::Primary, "台積電"),
            Identifier::new("6488", Market::Secondary, "環球晶"),
        ];

        let batch = client.fetch_history(&ids, 400).await.unwrap();
        assert_eq!(batch.len(), 2);

        let tsmc = batch["2330.TW"].as_ref().unwrap();
        assert!(tsmc.len() >= 240);
        assert!(tsmc.closes().iter().all(|c| *c > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol_is_empty() {
        let client = YahooFinanceClient::new(Duration::from_secs(10)).unwrap();
        let ids = [Identifier::new("0001", Market::Secondary, "none")];

        let batch = client.fetch_history(&ids, 7).await.unwrap();
        assert!(batch["0001.TWO"].as_ref().map_or(true, PriceSeries::is_empty));
    }
}
