//! In-memory watchlist store

use serde::{Deserialize, Serialize};

use crate::model::Identifier;

/// Result of adding an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddOutcome {
    Added(Identifier),
    /// Already watched; carries the stored entry
    Duplicate(Identifier),
}

impl AddOutcome {
    pub fn identifier(&self) -> &Identifier {
        match self {
            AddOutcome::Added(id) | AddOutcome::Duplicate(id) => id,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, AddOutcome::Duplicate(_))
    }
}

/// Watchlist storage boundary. Entries are unique by listing (code + market).
pub trait WatchlistStore: Send + Sync {
    fn add(&mut self, identifier: Identifier) -> AddOutcome;
    fn remove(&mut self, identifier: &Identifier) -> bool;
    fn list(&self) -> Vec<Identifier>;
    /// Correct the display name of a watched listing
    fn rename(&mut self, identifier: &Identifier, display_name: &str) -> bool;

    fn contains(&self, identifier: &Identifier) -> bool {
        self.list().iter().any(|id| id.same_listing(identifier))
    }

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered watchlist held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryWatchlist {
    entries: Vec<Identifier>,
}

impl InMemoryWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, identifier: &Identifier) -> Option<usize> {
        self.entries.iter().position(|id| id.same_listing(identifier))
    }
}

impl WatchlistStore for InMemoryWatchlist {
    fn add(&mut self, identifier: Identifier) -> AddOutcome {
        match self.position(&identifier) {
            Some(pos) => AddOutcome::Duplicate(self.entries[pos].clone()),
            None => {
                self.entries.push(identifier.clone());
                AddOutcome::Added(identifier)
            }
        }
    }

    fn remove(&mut self, identifier: &Identifier) -> bool {
        if let Some(pos) = self.position(identifier) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    fn list(&self) -> Vec<Identifier> {
        self.entries.clone()
    }

    fn rename(&mut self, identifier: &Identifier, display_name: &str) -> bool {
        match self.position(identifier) {
            Some(pos) => {
                self.entries[pos].display_name = display_name.to_string();
                true
            }
            None => false,
        }
    }

    fn contains(&self, identifier: &Identifier) -> bool {
        self.position(identifier).is_some()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
