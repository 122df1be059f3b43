//! Indicator snapshot for the latest day of a price series

use serde::{Deserialize, Serialize};
use ta::{Next, indicators::SimpleMovingAverage};

use crate::error::{RadarError, Result};
use crate::model::PriceSeries;

/// Moving-average windows used by the rating horizons
pub const MA_WINDOWS: [usize; 4] = [20, 60, 200, 240];

/// RSI lookback in deltas
pub const RSI_PERIOD: usize = 14;

/// Volume points averaged for the volume ratio
pub const VOLUME_WINDOW: usize = 5;

/// Direction of the latest daily move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Indicators at the latest day of one series.
///
/// `None` means the lookback exceeds the available history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub current_price: f64,
    pub prev_price: f64,
    pub day_change_pct: f64,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub ma200: Option<f64>,
    pub ma240: Option<f64>,
    pub rsi14: Option<f64>,
    pub volume_ratio: f64,
    /// False when `volume_ratio` is the neutral default rather than measured
    pub volume_available: bool,
}

impl IndicatorSet {
    /// Compute the snapshot. Fails only on an empty series.
    pub fn compute(series: &PriceSeries) -> Result<Self> {
        compute(series)
    }

    pub fn trend(&self) -> Trend {
        if self.day_change_pct > 0.0 {
            Trend::Up
        } else if self.day_change_pct < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

/// Compute the indicator snapshot for `series`
pub fn compute(series: &PriceSeries) -> Result<IndicatorSet> {
    let closes = series.closes();
    let Some(&current_price) = closes.last() else {
        return Err(RadarError::InvalidSeries("empty price series".to_string()));
    };
    let prev_price = if closes.len() >= 2 {
        closes[closes.len() - 2]
    } else {
        current_price
    };

    let day_change_pct = if prev_price == 0.0 {
        0.0
    } else {
        (current_price - prev_price) / prev_price * 100.0
    };

    let (volume_ratio, volume_available) = volume_ratio(&series.volumes());

    Ok(IndicatorSet {
        current_price,
        prev_price,
        day_change_pct,
        ma20: simple_moving_average(&closes, 20),
        ma60: simple_moving_average(&closes, 60),
        ma200: simple_moving_average(&closes, 200),
        ma240: simple_moving_average(&closes, 240),
        rsi14: relative_strength_index(&closes, RSI_PERIOD),
        volume_ratio,
        volume_available,
    })
}

/// Mean of the last `window` closes, or `None` with fewer closes
pub fn simple_moving_average(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let mut sma = SimpleMovingAverage::new(window).ok()?;
    let mut value = None;
    for &close in &closes[closes.len() - window..] {
        value = Some(sma.next(close));
    }
    value
}

/// RSI over the last `period` close-to-close deltas.
///
/// Gains and losses are plain means over the window. A zero loss mean is an
/// infinite RS and maps to 100.
pub fn relative_strength_index(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let window = &closes[closes.len() - (period + 1)..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), delta| {
            if delta > 0.0 {
                (gains + delta, losses)
            } else {
                (gains, losses - delta)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Latest volume over the mean of the last five, with a neutral 1.0 default
fn volume_ratio(volumes: &[f64]) -> (f64, bool) {
    if volumes.len() < VOLUME_WINDOW {
        return (1.0, false);
    }
    let recent = &volumes[volumes.len() - VOLUME_WINDOW..];
    let mean = recent.iter().sum::<f64>() / VOLUME_WINDOW as f64;
    match recent.last() {
        Some(&latest) if mean > 0.0 => (latest / mean, true),
        _ => (1.0, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PriceBar;
    use chrono::{Duration, NaiveDate};

    fn series_from(closes: &[f64], volumes: &[u64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let volume = volumes.get(i).copied().unwrap_or(1_000);
                PriceBar::new(start + Duration::days(i as i64), close, volume)
            })
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_series_is_invalid() {
        let err = compute(&PriceSeries::default()).unwrap_err();
        assert!(matches!(err, RadarError::InvalidSeries(_)));
    }

    #[test]
    fn test_single_row_has_zero_change() {
        let set = compute(&series_from(&[42.0], &[10])).unwrap();
        assert_close(set.current_price, 42.0);
        assert_close(set.prev_price, 42.0);
        assert_close(set.day_change_pct, 0.0);
        assert_eq!(set.trend(), Trend::Flat);
        assert!(set.ma20.is_none());
        assert!(set.rsi14.is_none());
        assert_close(set.volume_ratio, 1.0);
        assert!(!set.volume_available);
    }

    #[test]
    fn test_day_change_is_signed() {
        let set = compute(&series_from(&[100.0, 95.0], &[])).unwrap();
        assert_close(set.day_change_pct, -5.0);
        assert_eq!(set.trend(), Trend::Down);
    }

    #[test]
    fn test_moving_average_unavailable_below_window() {
        for len in [1_usize, 19, 59, 199, 239] {
            let closes: Vec<f64> = (0..len).map(|i| 50.0 + i as f64).collect();
            let set = compute(&series_from(&closes, &[])).unwrap();
            for (window, value) in MA_WINDOWS.iter().zip([set.ma20, set.ma60, set.ma200, set.ma240]) {
                assert_eq!(
                    value.is_some(),
                    len >= *window,
                    "len {len}, window {window}"
                );
            }
        }
    }

    #[test]
    fn test_moving_average_uses_last_window() {
        let closes: Vec<f64> = (1..=25).map(f64::from).collect();
        // last 20 closes are 6..=25
        assert_close(simple_moving_average(&closes, 20).unwrap(), 15.5);
        assert_close(simple_moving_average(&closes, 25).unwrap(), 13.0);
        assert!(simple_moving_average(&closes, 26).is_none());
        assert!(simple_moving_average(&closes, 0).is_none());
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..15).map(|i| 10.0 + i as f64).collect();
        assert_close(relative_strength_index(&closes, 14).unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        assert_close(relative_strength_index(&closes, 14).unwrap(), 0.0);
    }

    #[test]
    fn test_rsi_balanced_is_50() {
        let closes: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 10.0 } else { 11.0 })
            .collect();
        assert_close(relative_strength_index(&closes, 14).unwrap(), 50.0);
    }

    #[test]
    fn test_rsi_needs_fifteen_closes() {
        let closes = vec![1.0; 14];
        assert!(relative_strength_index(&closes, 14).is_none());
    }

    #[test]
    fn test_rsi_monotonic_in_up_days() {
        let mut previous = -1.0;
        for ups in 0..=14 {
            let mut closes = vec![100.0];
            for step in 0..14 {
                let last = *closes.last().unwrap();
                closes.push(if step < ups { last + 1.0 } else { last - 1.0 });
            }
            let rsi = relative_strength_index(&closes, 14).unwrap();
            assert!(rsi >= previous, "{ups} up days gave {rsi} < {previous}");
            previous = rsi;
        }
    }

    #[test]
    fn test_volume_ratio() {
        let closes = vec![10.0; 6];
        let set = compute(&series_from(&closes, &[999, 100, 100, 100, 100, 600])).unwrap();
        // mean of last five = 200
        assert_close(set.volume_ratio, 3.0);
        assert!(set.volume_available);

        let set = compute(&series_from(&[10.0; 4], &[100, 100, 100, 400])).unwrap();
        assert_close(set.volume_ratio, 1.0);
        assert!(!set.volume_available);

        let set = compute(&series_from(&[10.0; 5], &[0, 0, 0, 0, 0])).unwrap();
        assert_close(set.volume_ratio, 1.0);
        assert!(!set.volume_available);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let closes: Vec<f64> = (0..260).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let series = series_from(&closes, &[]);
        assert_eq!(compute(&series).unwrap(), compute(&series).unwrap());
    }
}
