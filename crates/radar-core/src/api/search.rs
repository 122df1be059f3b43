//! Yahoo Finance autocomplete search

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{RadarError, Result};
use crate::provider::{SearchCandidate, SymbolSearch};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Quote types the watchlist can rate
const RATEABLE_TYPES: [&str; 2] = ["EQUITY", "ETF"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuote {
    symbol: Option<String>,
    #[serde(rename = "shortname")]
    short_name: Option<String>,
    #[serde(rename = "longname")]
    long_name: Option<String>,
    exchange: Option<String>,
    quote_type: Option<String>,
}

/// Remote search client, rate limited per minute
pub struct YahooSearchClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
    limit: usize,
}

impl YahooSearchClient {
    /// Create a search client
    ///
    /// # Arguments
    /// * `timeout` - Per-request timeout
    /// * `rate_limit` - Requests per minute
    /// * `limit` - Candidates requested per query
    pub fn new(timeout: Duration, rate_limit: u32, limit: usize) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            limit,
        })
    }
}

/// Keep rateable quotes that carry a symbol, in response order
fn parse_candidates(body: &str) -> Result<Vec<SearchCandidate>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .quotes
        .into_iter()
        .filter(|q| {
            q.quote_type
                .as_deref()
                .is_some_and(|t| RATEABLE_TYPES.contains(&t))
        })
        .filter_map(|q| {
            let symbol = q.symbol?;
            Some(SearchCandidate {
                symbol,
                name: q.long_name.or(q.short_name),
                exchange: q.exchange,
            })
        })
        .collect())
}

#[async_trait]
impl SymbolSearch for YahooSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>> {
        self.rate_limiter.until_ready().await;

        let count = self.limit.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", query),
                ("quotesCount", count.as_str()),
                ("newsCount", "0"),
                ("lang", "zh-Hant-TW"),
                ("region", "TW"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RadarError::transient("yahoo-search", format!("status {status}")));
        }

        let body = response.text().await?;
        let candidates = parse_candidates(&body)?;
        debug!("Search {:?}: {} rateable candidates", query, candidates.len());
        Ok(candidates)
    }
}
