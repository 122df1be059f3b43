//! Public quote page fetcher

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::search::USER_AGENT;
use crate::error::{RadarError, Result};
use crate::model::Identifier;
use crate::provider::QuotePageSource;

const QUOTE_PAGE_URL: &str = "https://tw.stock.yahoo.com/quote";

/// Fetches `tw.stock.yahoo.com/quote/<symbol>` markup
pub struct YahooQuotePage {
    client: Client,
    base_url: String,
}

impl YahooQuotePage {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: QUOTE_PAGE_URL.to_string(),
        })
    }

    /// Point the fetcher at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn page_url(&self, identifier: &Identifier) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            identifier.symbol()
        )
    }
}

#[async_trait]
impl QuotePageSource for YahooQuotePage {
    async fn fetch_page(&self, identifier: &Identifier) -> Result<String> {
        let response = self.client.get(self.page_url(identifier)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RadarError::transient("quote-page", format!("status {status}")));
        }

        Ok(response.text().await?)
    }
}
