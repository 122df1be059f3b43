//! Multi-horizon technical rating
//!
//! Each horizon is a fixed decision table evaluated top to bottom; the first
//! matching row produces the rating. Every table ends in a catch-all row, so
//! [`RatingEngine::rate`] is total over all indicator combinations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::RatingThresholds;
use crate::error::RadarError;
use crate::indicators::IndicatorSet;

/// Analysis timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Short,
    Medium,
    Long,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Short, Horizon::Medium, Horizon::Long];

    pub fn as_str(self) -> &'static str {
        match self {
            Horizon::Short => "short",
            Horizon::Medium => "medium",
            Horizon::Long => "long",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "s" | "短線" => Ok(Horizon::Short),
            "medium" | "mid" | "m" | "中線" => Ok(Horizon::Medium),
            "long" | "l" | "長線" => Ok(Horizon::Long),
            other => Err(RadarError::Config(format!("Unknown horizon: {other}"))),
        }
    }
}

/// Classification produced by a decision-table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatingLabel {
    Neutral,
    StrongBuy,
    Buy,
    Avoid,
    Sell,
    Observe,
    InsufficientData,
    Hold,
    AccumulateOnDip,
    Bearish,
    OverextendedRisk,
    LongBuyPoint,
    BasingWatch,
    OversoldBounce,
    LongBearish,
    LongBullHold,
}

impl RatingLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            RatingLabel::Neutral => "neutral",
            RatingLabel::StrongBuy => "strong-buy",
            RatingLabel::Buy => "buy",
            RatingLabel::Avoid => "avoid",
            RatingLabel::Sell => "sell",
            RatingLabel::Observe => "observe",
            RatingLabel::InsufficientData => "insufficient-data",
            RatingLabel::Hold => "hold",
            RatingLabel::AccumulateOnDip => "accumulate-on-dip",
            RatingLabel::Bearish => "bearish",
            RatingLabel::OverextendedRisk => "overextended-risk",
            RatingLabel::LongBuyPoint => "long-buy-point",
            RatingLabel::BasingWatch => "basing-watch",
            RatingLabel::OversoldBounce => "oversold-bounce",
            RatingLabel::LongBearish => "long-bearish",
            RatingLabel::LongBullHold => "long-bull-hold",
        }
    }

    /// Top-bucket buy signals, used by the strong-only filter
    pub fn is_strong(self) -> bool {
        matches!(self, RatingLabel::StrongBuy | RatingLabel::LongBuyPoint)
    }
}

impl fmt::Display for RatingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating for one identifier at one horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub label: RatingLabel,
    pub score: u8,
    /// Ordering key for the ranker; equals `score` unless the row overrides it
    pub sort_priority: f64,
    pub target_price: f64,
    pub rationale: String,
}

impl Rating {
    fn new(label: RatingLabel, score: u8, target_price: f64, rationale: String) -> Self {
        Self {
            label,
            score,
            sort_priority: f64::from(score),
            target_price,
            rationale,
        }
    }

    fn with_sort_priority(mut self, sort_priority: f64) -> Self {
        self.sort_priority = sort_priority;
        self
    }
}

/// Percentage deviation of `price` from `ma`
pub fn bias(price: f64, ma: f64) -> f64 {
    if ma == 0.0 {
        0.0
    } else {
        (price - ma) / ma * 100.0
    }
}

/// Deterministic rule-based rating engine
#[derive(Debug, Clone, Default)]
pub struct RatingEngine {
    thresholds: RatingThresholds,
}

impl RatingEngine {
    pub fn new(thresholds: RatingThresholds) -> Self {
        Self { thresholds }
    }

    /// Rate one indicator snapshot at one horizon
    pub fn rate(&self, indicators: &IndicatorSet, horizon: Horizon) -> Rating {
        match horizon {
            Horizon::Short => self.rate_short(indicators),
            Horizon::Medium => self.rate_medium(indicators),
            Horizon::Long => self.rate_long(indicators),
        }
    }

    fn rate_short(&self, ind: &IndicatorSet) -> Rating {
        let t = &self.thresholds;
        let price = ind.current_price;

        let (Some(ma20), Some(ma60)) = (ind.ma20, ind.ma60) else {
            return Rating::new(
                RatingLabel::Neutral,
                40,
                price,
                format!("Not enough history for MA60; holding neutral at {price:.2}"),
            );
        };
        let bias20 = bias(price, ma20);
        let volume_confirms = !ind.volume_available || ind.volume_ratio > t.short_volume_surge;

        if price > ma20 && price > ma60 && bias20 > t.short_strong_bias && volume_confirms {
            let volume = if ind.volume_available {
                format!("volume ratio {:.2}x", ind.volume_ratio)
            } else {
                "volume not available".to_string()
            };
            Rating::new(
                RatingLabel::StrongBuy,
                90,
                price * 1.10,
                format!(
                    "Price {price:.2} above MA20 {ma20:.2} and MA60 {ma60:.2}; bias20 {bias20:+.2}% > {:.0}%, {volume}",
                    t.short_strong_bias
                ),
            )
        } else if price > ma20 && bias20 > 0.0 {
            Rating::new(
                RatingLabel::Buy,
                70,
                price * 1.05,
                format!("Price {price:.2} above MA20 {ma20:.2}; bias20 {bias20:+.2}%"),
            )
        } else if price < ma20 && price < ma60 {
            Rating::new(
                RatingLabel::Avoid,
                10,
                price * 0.95,
                format!("Price {price:.2} below MA20 {ma20:.2} and MA60 {ma60:.2}"),
            )
        } else if price < ma20 {
            Rating::new(
                RatingLabel::Sell,
                30,
                price * 0.98,
                format!("Price {price:.2} below MA20 {ma20:.2}; bias20 {bias20:+.2}%"),
            )
        } else {
            Rating::new(
                RatingLabel::Observe,
                50,
                price * 1.02,
                format!("Price {price:.2} flat against MA20 {ma20:.2}"),
            )
        }
    }

    fn rate_medium(&self, ind: &IndicatorSet) -> Rating {
        let t = &self.thresholds;
        let price = ind.current_price;

        let (Some(ma60), Some(ma200)) = (ind.ma60, ind.ma200) else {
            return Rating::new(
                RatingLabel::InsufficientData,
                0,
                price,
                "Not enough history for MA200".to_string(),
            );
        };
        let bias60 = bias(price, ma60);

        if price > ma200 && ma60 > ma200 && bias60 < t.medium_overheat_bias {
            Rating::new(
                RatingLabel::StrongBuy,
                95,
                price * 1.15,
                format!(
                    "Price {price:.2} above MA200 {ma200:.2} with MA60 {ma60:.2} leading; bias60 {bias60:+.2}% < {:.0}%",
                    t.medium_overheat_bias
                ),
            )
        } else if price > ma200 && ma60 > ma200 {
            Rating::new(
                RatingLabel::Hold,
                80,
                price * 1.05,
                format!(
                    "Uptrend over MA200 {ma200:.2} but bias60 {bias60:+.2}% >= {:.0}%; hold",
                    t.medium_overheat_bias
                ),
            )
        } else if price > ma200 && price < ma60 {
            Rating::new(
                RatingLabel::AccumulateOnDip,
                85,
                ma60,
                format!(
                    "Price {price:.2} dipped below MA60 {ma60:.2} while above MA200 {ma200:.2}; target MA60"
                ),
            )
            .with_sort_priority(3.5)
        } else if price < ma200 {
            Rating::new(
                RatingLabel::Bearish,
                20,
                price * 0.90,
                format!(
                    "Price {price:.2} below MA200 {ma200:.2}; bias200 {:+.2}%",
                    bias(price, ma200)
                ),
            )
        } else {
            Rating::new(
                RatingLabel::Observe,
                50,
                price,
                format!("Price {price:.2} undecided around MA60 {ma60:.2} and MA200 {ma200:.2}"),
            )
        }
    }

    fn rate_long(&self, ind: &IndicatorSet) -> Rating {
        let t = &self.thresholds;
        let price = ind.current_price;

        let (Some(ma240), Some(rsi)) = (ind.ma240, ind.rsi14) else {
            return Rating::new(
                RatingLabel::InsufficientData,
                0,
                price,
                "Not enough history for MA240".to_string(),
            );
        };
        let bias240 = bias(price, ma240);
        let in_base = t.long_base_lower < bias240 && bias240 < t.long_base_upper;

        if bias240 > t.long_overextended_bias {
            Rating::new(
                RatingLabel::OverextendedRisk,
                40,
                price * 0.90,
                format!(
                    "Bias240 {bias240:+.2}% over MA240 {ma240:.2} exceeds {:.0}%; overextended",
                    t.long_overextended_bias
                ),
            )
        } else if in_base && rsi >= t.long_rsi_buy {
            Rating::new(
                RatingLabel::LongBuyPoint,
                95,
                ma240 * 1.30,
                format!(
                    "Price {price:.2} near MA240 {ma240:.2} (bias240 {bias240:+.2}%) with RSI {rsi:.1} >= {:.0}",
                    t.long_rsi_buy
                ),
            )
        } else if in_base {
            Rating::new(
                RatingLabel::BasingWatch,
                70,
                ma240 * 1.20,
                format!(
                    "Price {price:.2} basing near MA240 {ma240:.2} (bias240 {bias240:+.2}%); RSI {rsi:.1} < {:.0}",
                    t.long_rsi_buy
                ),
            )
        } else if bias240 < t.long_base_lower && rsi < t.long_rsi_oversold {
            Rating::new(
                RatingLabel::OversoldBounce,
                60,
                ma240,
                format!(
                    "Bias240 {bias240:+.2}% under MA240 {ma240:.2} with RSI {rsi:.1} < {:.0}; rebound toward MA240",
                    t.long_rsi_oversold
                ),
            )
        } else if bias240 < t.long_base_lower {
            Rating::new(
                RatingLabel::LongBearish,
                10,
                price * 0.80,
                format!(
                    "Bias240 {bias240:+.2}% under MA240 {ma240:.2} with RSI {rsi:.1} >= {:.0}",
                    t.long_rsi_oversold
                ),
            )
        } else if bias240 >= t.long_base_upper {
            Rating::new(
                RatingLabel::LongBullHold,
                80,
                price * 1.10,
                format!("Bias240 {bias240:+.2}% above MA240 {ma240:.2}; long-term uptrend intact"),
            )
        } else {
            Rating::new(
                RatingLabel::Observe,
                50,
                price,
                format!("Bias240 {bias240:+.2}% at the edge of the MA240 {ma240:.2} band"),
            )
        }
    }
}
