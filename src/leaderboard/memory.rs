use std::collections::HashSet;

use parking_lot::RwLock;
use time::OffsetDateTime;

use super::{LeaderboardEntry, ScoreStore};
use crate::error::StoreError;

/// An in-process store. Used when no hosted backend is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    entries: RwLock<Vec<LeaderboardEntry>>,
    participants: RwLock<HashSet<String>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let store = Self::new();
        store.entries.write().extend(entries);
        store
    }

    /// Records a participant, as the registration flow would.
    pub fn register(&self, username: &str) {
        self.participants.write().insert(username.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn save_score(&self, username: &str, score: u32) -> Result<LeaderboardEntry, StoreError> {
        let entry = LeaderboardEntry {
            username: username.to_string(),
            score,
            created_at: Some(OffsetDateTime::now_utc()),
        };
        self.entries.write().push(entry.clone());
        Ok(entry)
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries = self.entries.read().clone();
        // Ties go to whoever got there first
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.created_at.cmp(&b.created_at)));
        entries.truncate(limit);
        Ok(entries)
    }

    fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.participants.read().contains(&username.to_lowercase()))
    }
}
