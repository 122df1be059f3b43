//! Security identifiers and price series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listing venue of a security
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Taiwan Stock Exchange (`.TW`)
    Primary,
    /// Taipei Exchange / OTC (`.TWO`)
    Secondary,
    /// Major US exchanges, no suffix
    Foreign,
}

impl Market {
    /// Markets tried, in order, when probing a bare numeric code
    pub const PROBE_ORDER: [Market; 2] = [Market::Primary, Market::Secondary];

    /// Yahoo symbol suffix, including the dot
    pub fn suffix(self) -> &'static str {
        match self {
            Market::Primary => ".TW",
            Market::Secondary => ".TWO",
            Market::Foreign => "",
        }
    }

    /// Suffix without the leading dot, used in synthesized names
    pub fn tag(self) -> &'static str {
        self.suffix().trim_start_matches('.')
    }

    /// Map a search exchange code onto a recognized market
    pub fn from_exchange_code(code: &str, accept_foreign: bool) -> Option<Self> {
        match code {
            "TAI" => Some(Market::Primary),
            "TWO" => Some(Market::Secondary),
            "NMS" | "NYQ" | "NGM" | "NCM" | "ASE" | "PCX" | "BTS" if accept_foreign => {
                Some(Market::Foreign)
            }
            _ => None,
        }
    }
}

/// Canonical, exchange-qualified security reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub code: String,
    pub market: Market,
    pub display_name: String,
}

impl Identifier {
    pub fn new(code: impl Into<String>, market: Market, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            market,
            display_name: display_name.into(),
        }
    }

    /// Stable key: code plus suffix, e.g. `2330.TW`
    pub fn symbol(&self) -> String {
        format!("{}{}", self.code, self.market.suffix())
    }

    /// Identifier whose display name is synthesized from the code, e.g. `2330 (TW)`
    pub fn with_placeholder_name(code: impl Into<String>, market: Market) -> Self {
        let code = code.into();
        let display_name = format!("{code} ({})", market.tag());
        Self::new(code, market, display_name)
    }

    /// Whether the display name is still the synthesized placeholder
    pub fn has_placeholder_name(&self) -> bool {
        self.display_name == format!("{} ({})", self.code, self.market.tag())
    }

    /// Whether two identifiers refer to the same listing, ignoring display names
    pub fn same_listing(&self, other: &Identifier) -> bool {
        self.code == other.code && self.market == other.market
    }

    /// Split a Yahoo symbol into code and market.
    ///
    /// `2330.TW` and `6488.TWO` map to the Taiwan markets; anything without a
    /// dot is treated as a foreign listing. Other suffixes are rejected.
    pub fn parse_symbol(symbol: &str) -> Option<(String, Market)> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return None;
        }
        let upper = symbol.to_uppercase();
        if let Some(code) = upper.strip_suffix(".TWO") {
            return (!code.is_empty()).then(|| (code.to_string(), Market::Secondary));
        }
        if let Some(code) = upper.strip_suffix(".TW") {
            return (!code.is_empty()).then(|| (code.to_string(), Market::Primary));
        }
        (!upper.contains('.')).then(|| (upper, Market::Foreign))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.display_name)
    }
}

/// One trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }
}

/// Chronological daily history for one identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, ordering rows by date. Duplicate dates keep the last row.
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        bars.dedup_by(|later, earlier| {
            if later.date == earlier.date {
                *earlier = *later;
                true
            } else {
                false
            }
        });
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.volume as f64).collect()
    }

    /// The last `n` closes, oldest first. Renderers use this for trend sparklines.
    pub fn trailing_closes(&self, n: usize) -> Vec<f64> {
        let start = self.bars.len().saturating_sub(n);
        self.bars[start..].iter().map(|bar| bar.close).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }
}

impl FromIterator<PriceBar> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PriceBar>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
