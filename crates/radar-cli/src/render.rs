//! Terminal tables for rankings and the watchlist

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use radar_core::{Horizon, Identifier, RefreshReport, Trend, WatchlistEntry};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Columns used for the trend sparkline
pub const SPARK_WIDTH: usize = 24;

/// Compress `values` into at most `width` block characters
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let chunk = values.len().div_ceil(width);
    let points: Vec<f64> = values
        .chunks(chunk)
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect();

    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = max - min;
    let top = (SPARK_LEVELS.len() - 1) as f64;

    points
        .iter()
        .map(|&v| {
            let level = if span > 0.0 {
                ((v - min) / span * top).round() as usize
            } else {
                SPARK_LEVELS.len() / 2
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

/// Taiwan convention: red up, green down
fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Up => Color::Red,
        Trend::Down => Color::Green,
        Trend::Flat => Color::Reset,
    }
}

fn horizon_title(horizon: Horizon) -> &'static str {
    match horizon {
        Horizon::Short => "短線 Short",
        Horizon::Medium => "中線 Medium",
        Horizon::Long => "長線 Long",
    }
}

/// Ranked entries for one horizon
pub fn ranking_table(
    horizon: Horizon,
    entries: &[WatchlistEntry],
    report: &RefreshReport,
    pinned: Option<&Identifier>,
) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "#",
            horizon_title(horizon),
            "價格",
            "漲跌%",
            "評等",
            "分數",
            "目標價",
            "走勢",
            "理由",
        ]);

    for (rank, entry) in entries.iter().enumerate() {
        let mut name = entry.identifier.to_string();
        if pinned.is_some_and(|p| p.same_listing(&entry.identifier)) {
            name.push_str(" *");
        }

        let (price, change, spark) = match report.snapshot(&entry.identifier) {
            Some(snapshot) => {
                let color = trend_color(snapshot.indicators.trend());
                (
                    Cell::new(format!("{:.2}", snapshot.indicators.current_price)).fg(color),
                    Cell::new(format!("{:+.2}", snapshot.indicators.day_change_pct)).fg(color),
                    sparkline(&snapshot.sparkline, SPARK_WIDTH),
                )
            }
            None => (Cell::new("-"), Cell::new("-"), String::new()),
        };

        let rating = &entry.rating;
        let label = Cell::new(rating.label.as_str());
        let label = if rating.label.is_strong() {
            label.fg(Color::Red)
        } else {
            label
        };

        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(name),
            price,
            change,
            label,
            Cell::new(rating.score),
            Cell::new(format!("{:.2}", rating.target_price)),
            Cell::new(spark),
            Cell::new(&rating.rationale),
        ]);
    }
    table
}

/// Plain list of watched identifiers in insertion order
pub fn watchlist_table(watchlist: &[Identifier], pinned: Option<&Identifier>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["代號", "名稱", "市場", ""]);

    for id in watchlist {
        let marker = if pinned.is_some_and(|p| p.same_listing(id)) {
            "newly added"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(id.symbol()),
            Cell::new(&id.display_name),
            Cell::new(format!("{:?}", id.market).to_lowercase()),
            Cell::new(marker),
        ]);
    }
    table
}

/// One line per pruned or skipped identifier, if any
pub fn refresh_notes(report: &RefreshReport) -> Vec<String> {
    let pruned = report
        .pruned
        .iter()
        .map(|id| format!("removed {id}: no price history"));
    let skipped = report
        .skipped
        .iter()
        .map(|id| format!("skipped {id}: fetch failed, retrying next refresh"));
    pruned.chain(skipped).collect()
}
