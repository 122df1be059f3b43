//! Ordering of rated watchlist entries

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::Identifier;
use crate::rating::Rating;

/// One rated identifier, the unit that is ranked and displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub identifier: Identifier,
    pub rating: Rating,
}

impl WatchlistEntry {
    pub fn new(identifier: Identifier, rating: Rating) -> Self {
        Self { identifier, rating }
    }
}

/// Row filter applied after ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingFilter {
    #[default]
    All,
    /// Only strong-buy class labels
    StrongOnly,
}

impl RatingFilter {
    pub fn apply(self, entries: Vec<WatchlistEntry>) -> Vec<WatchlistEntry> {
        match self {
            RatingFilter::All => entries,
            RatingFilter::StrongOnly => entries
                .into_iter()
                .filter(|entry| entry.rating.label.is_strong())
                .collect(),
        }
    }
}

/// Order entries by descending `sort_priority`.
///
/// The sort is stable, so equal priorities keep their input order. When
/// `newly_added` is among the entries it is placed first regardless of its
/// rating.
pub fn rank(
    mut entries: Vec<WatchlistEntry>,
    newly_added: Option<&Identifier>,
) -> Vec<WatchlistEntry> {
    let effective = |entry: &WatchlistEntry| match newly_added {
        Some(pinned) if entry.identifier.same_listing(pinned) => f64::INFINITY,
        _ => entry.rating.sort_priority,
    };
    entries.sort_by(|a, b| {
        effective(b)
            .partial_cmp(&effective(a))
            .unwrap_or(Ordering::Equal)
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Market;
    use crate::rating::RatingLabel;

    fn entry(code: &str, priority: f64) -> WatchlistEntry {
        WatchlistEntry::new(
            Identifier::new(code, Market::Primary, code),
            Rating {
                label: if priority >= 90.0 {
                    RatingLabel::StrongBuy
                } else {
                    RatingLabel::Observe
                },
                score: priority as u8,
                sort_priority: priority,
                target_price: 1.0,
                rationale: String::new(),
            },
        )
    }

    fn codes(entries: &[WatchlistEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.identifier.code.as_str()).collect()
    }

    #[test]
    fn test_descending_priority() {
        let ranked = rank(vec![entry("B", 50.0), entry("A", 90.0), entry("C", 10.0)], None);
        assert_eq!(codes(&ranked), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_pin_newly_added() {
        let entries = vec![entry("A", 90.0), entry("B", 50.0), entry("C", 10.0)];
        let pinned = Identifier::new("C", Market::Primary, "renamed");
        let ranked = rank(entries, Some(&pinned));
        assert_eq!(codes(&ranked), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_pin_absent_identifier_is_ignored() {
        let entries = vec![entry("B", 50.0), entry("A", 90.0)];
        let pinned = Identifier::new("Z", Market::Primary, "Z");
        let ranked = rank(entries, Some(&pinned));
        assert_eq!(codes(&ranked), vec!["A", "B"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let entries = vec![
            entry("X", 70.0),
            entry("Y", 95.0),
            entry("Z", 70.0),
            entry("W", 70.0),
        ];
        let ranked = rank(entries, None);
        assert_eq!(codes(&ranked), vec!["Y", "X", "Z", "W"]);
    }

    #[test]
    fn test_rank_does_not_touch_ratings() {
        let entries = vec![entry("A", 90.0), entry("C", 10.0)];
        let before = entries.clone();
        let pinned = Identifier::new("C", Market::Primary, "C");
        let ranked = rank(entries, Some(&pinned));
        assert_eq!(ranked[0], before[1]);
        assert_eq!(ranked[1], before[0]);
    }

    #[test]
    fn test_strong_only_filter() {
        let entries = vec![entry("A", 90.0), entry("B", 50.0)];
        let filtered = RatingFilter::StrongOnly.apply(entries.clone());
        assert_eq!(codes(&filtered), vec!["A"]);
        assert_eq!(RatingFilter::All.apply(entries).len(), 2);
    }
}
