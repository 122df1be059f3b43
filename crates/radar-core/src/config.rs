//! Configuration for resolution, history retrieval and rating

use crate::error::{RadarError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Empirical rating thresholds, in percent (bias) or raw units (RSI, volume ratio)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingThresholds {
    /// Short horizon: minimum bias over MA20 for a strong buy
    pub short_strong_bias: f64,
    /// Short horizon: minimum volume ratio confirming a strong buy
    pub short_volume_surge: f64,
    /// Medium horizon: bias over MA60 at which a strong buy becomes a hold
    pub medium_overheat_bias: f64,
    /// Long horizon: bias over MA240 above which the move is overextended
    pub long_overextended_bias: f64,
    /// Long horizon: lower edge of the basing band around MA240
    pub long_base_lower: f64,
    /// Long horizon: upper edge of the basing band around MA240
    pub long_base_upper: f64,
    /// Long horizon: RSI separating a buy point from basing
    pub long_rsi_buy: f64,
    /// Long horizon: RSI below which a deep discount is oversold
    pub long_rsi_oversold: f64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            short_strong_bias: 5.0,
            short_volume_surge: 1.2,
            medium_overheat_bias: 10.0,
            long_overextended_bias: 30.0,
            long_base_lower: -5.0,
            long_base_upper: 10.0,
            long_rsi_buy: 45.0,
            long_rsi_oversold: 30.0,
        }
    }
}

impl RatingThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.long_base_lower >= self.long_base_upper {
            return Err(RadarError::Config(
                "long_base_lower must be below long_base_upper".to_string(),
            ));
        }
        if self.long_base_upper > self.long_overextended_bias {
            return Err(RadarError::Config(
                "long_base_upper must not exceed long_overextended_bias".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.long_rsi_buy)
            || !(0.0..=100.0).contains(&self.long_rsi_oversold)
        {
            return Err(RadarError::Config(
                "RSI thresholds must lie within 0..=100".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the watchlist radar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarConfig {
    /// Upper bound for any single external call
    pub request_timeout: Duration,

    /// Calendar days of history requested per refresh (must cover 240 trading days)
    pub history_lookback_days: u32,

    /// Calendar days requested when probing whether a bare code exists.
    /// Must span the Lunar New Year market closure.
    pub probe_lookback_days: u32,

    /// How long a fetched series is reused before hitting the provider again
    pub history_cache_ttl: Duration,

    /// Remote search requests allowed per minute
    pub search_rate_limit: u32,

    /// Candidates requested from the remote search
    pub search_limit: usize,

    /// Accept US listings from the remote search
    pub accept_foreign: bool,

    /// Consecutive transient failures before an identifier is pruned
    pub max_consecutive_failures: u32,

    /// Rating thresholds
    pub thresholds: RatingThresholds,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            history_lookback_days: 400,
            probe_lookback_days: 14,
            history_cache_ttl: Duration::from_secs(600),  // 10 minutes
            search_rate_limit: 30,
            search_limit: 10,
            accept_foreign: false,
            max_consecutive_failures: 3,
            thresholds: RatingThresholds::default(),
        }
    }
}

impl RadarConfig {
    /// Create a new configuration builder
    pub fn builder() -> RadarConfigBuilder {
        RadarConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // 240 trading days need roughly 350 calendar days
        if self.history_lookback_days < 350 {
            return Err(RadarError::Config(
                "history_lookback_days must cover at least 240 trading days (>= 350)".to_string(),
            ));
        }

        if self.probe_lookback_days == 0 {
            return Err(RadarError::Config(
                "probe_lookback_days must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(RadarError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.search_rate_limit == 0 || self.search_limit == 0 {
            return Err(RadarError::Config(
                "search limits must be greater than 0".to_string(),
            ));
        }

        if self.max_consecutive_failures == 0 {
            return Err(RadarError::Config(
                "max_consecutive_failures must be greater than 0".to_string(),
            ));
        }

        self.thresholds.validate()
    }
}

/// Builder for RadarConfig
#[derive(Debug, Default)]
pub struct RadarConfigBuilder {
    request_timeout: Option<Duration>,
    history_lookback_days: Option<u32>,
    probe_lookback_days: Option<u32>,
    history_cache_ttl: Option<Duration>,
    search_rate_limit: Option<u32>,
    search_limit: Option<usize>,
    accept_foreign: Option<bool>,
    max_consecutive_failures: Option<u32>,
    thresholds: Option<RatingThresholds>,
}

impl RadarConfigBuilder {
    /// Set the per-call timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the refresh lookback in calendar days
    pub fn history_lookback_days(mut self, days: u32) -> Self {
        self.history_lookback_days = Some(days);
        self
    }

    /// Set the probe lookback in calendar days
    pub fn probe_lookback_days(mut self, days: u32) -> Self {
        self.probe_lookback_days = Some(days);
        self
    }

    /// Set the history cache TTL
    pub fn history_cache_ttl(mut self, duration: Duration) -> Self {
        self.history_cache_ttl = Some(duration);
        self
    }

    /// Set search requests per minute
    pub fn search_rate_limit(mut self, per_minute: u32) -> Self {
        self.search_rate_limit = Some(per_minute);
        self
    }

    /// Set the number of search candidates requested
    pub fn search_limit(mut self, limit: usize) -> Self {
        self.search_limit = Some(limit);
        self
    }

    /// Accept or reject US listings from search
    pub fn accept_foreign(mut self, accept: bool) -> Self {
        self.accept_foreign = Some(accept);
        self
    }

    /// Set the failure count that triggers pruning
    pub fn max_consecutive_failures(mut self, count: u32) -> Self {
        self.max_consecutive_failures = Some(count);
        self
    }

    /// Override the rating thresholds
    pub fn thresholds(mut self, thresholds: RatingThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Read `RADAR_REQUEST_TIMEOUT_SECS`, `RADAR_ACCEPT_FOREIGN` and
    /// `RADAR_HISTORY_LOOKBACK_DAYS`. Unparseable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Some(secs) = env_parse::<u64>("RADAR_REQUEST_TIMEOUT_SECS") {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(accept) = env_parse::<bool>("RADAR_ACCEPT_FOREIGN") {
            self.accept_foreign = Some(accept);
        }
        if let Some(days) = env_parse::<u32>("RADAR_HISTORY_LOOKBACK_DAYS") {
            self.history_lookback_days = Some(days);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RadarConfig> {
        let defaults = RadarConfig::default();

        let config = RadarConfig {
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            history_lookback_days: self
                .history_lookback_days
                .unwrap_or(defaults.history_lookback_days),
            probe_lookback_days: self
                .probe_lookback_days
                .unwrap_or(defaults.probe_lookback_days),
            history_cache_ttl: self.history_cache_ttl.unwrap_or(defaults.history_cache_ttl),
            search_rate_limit: self.search_rate_limit.unwrap_or(defaults.search_rate_limit),
            search_limit: self.search_limit.unwrap_or(defaults.search_limit),
            accept_foreign: self.accept_foreign.unwrap_or(defaults.accept_foreign),
            max_consecutive_failures: self
                .max_consecutive_failures
                .unwrap_or(defaults.max_consecutive_failures),
            thresholds: self.thresholds.unwrap_or(defaults.thresholds),
        };

        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}
