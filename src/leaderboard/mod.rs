//! Score submission and the post-game leaderboard.
//!
//! Scores live in an external [`ScoreStore`]. Gameplay code only talks to the
//! [`Leaderboard`] wrapper, which turns every store failure into a status the
//! player can read.

pub mod memory;
pub mod rest;

use std::fmt;
use std::sync::Arc;

use bevy_ecs::resource::Resource;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::constants::leaderboard::{DISPLAY_ROWS, PLACEHOLDER_SCORE, PLACEHOLDER_USERNAME};
use crate::error::StoreError;
use crate::identity::Identity;

pub use memory::MemoryScoreStore;
pub use rest::RestScoreStore;

/// A persisted score. Entries never change once saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

/// A place scores are kept.
///
/// Calls are blocking and made at most once per session end, so implementations
/// don't retry.
pub trait ScoreStore: Send + Sync {
    /// Persists a score and returns the stored entry.
    fn save_score(&self, username: &str, score: u32) -> Result<LeaderboardEntry, StoreError>;

    /// Up to `limit` entries, highest score first.
    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Whether a participant already registered under `username`.
    ///
    /// Usernames compare case-insensitively: `Alice` and `alice` are the same participant.
    fn username_exists(&self, username: &str) -> Result<bool, StoreError>;
}

/// Why a score was not submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Anonymous,
    NoScore,
}

/// Result of a score submission, as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(LeaderboardEntry),
    Skipped(SkipReason),
    Failed(String),
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOutcome::Saved(_) => f.write_str("Score saved!"),
            SaveOutcome::Skipped(SkipReason::Anonymous) => f.write_str("Register to save your score"),
            SaveOutcome::Skipped(SkipReason::NoScore) => f.write_str("No score to save"),
            SaveOutcome::Failed(error) => write!(f, "Could not save score: {error}"),
        }
    }
}

/// Username availability. Store failures are kept apart from a genuine clash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameCheck {
    Available,
    Taken,
    Unavailable(String),
}

/// One line of the leaderboard display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub username: String,
    pub score: String,
}

/// Pads `entries` to exactly [`DISPLAY_ROWS`] rows, filling gaps with placeholders.
pub fn pad_rows(entries: &[LeaderboardEntry]) -> Vec<LeaderboardRow> {
    (0..DISPLAY_ROWS)
        .map(|index| match entries.get(index) {
            Some(entry) => LeaderboardRow {
                rank: index + 1,
                username: entry.username.clone(),
                score: entry.score.to_string(),
            },
            None => LeaderboardRow {
                rank: index + 1,
                username: PLACEHOLDER_USERNAME.to_string(),
                score: PLACEHOLDER_SCORE.to_string(),
            },
        })
        .collect()
}

/// Everything the end-of-session screen shows. Always produced, even when the store failed.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardView {
    pub final_score: u32,
    pub save_status: SaveOutcome,
    pub rows: Vec<LeaderboardRow>,
    /// Inline error shown instead of live rows when the top scores couldn't be fetched.
    pub error: Option<String>,
}

/// Session-facing wrapper around a [`ScoreStore`].
#[derive(Resource, Clone)]
pub struct Leaderboard {
    store: Arc<dyn ScoreStore>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// Submits a final score. Only registered players with a positive score are submitted.
    pub fn save_score(&self, player: Option<&Identity>, score: u32) -> SaveOutcome {
        let Some(player) = player else {
            return SaveOutcome::Skipped(SkipReason::Anonymous);
        };
        if score == 0 {
            return SaveOutcome::Skipped(SkipReason::NoScore);
        }

        match self.store.save_score(player.username(), score) {
            Ok(entry) => {
                info!(username = player.username(), score, "Score saved");
                SaveOutcome::Saved(entry)
            }
            Err(error) => {
                warn!(username = player.username(), score, %error, "Failed to save score");
                SaveOutcome::Failed(error.to_string())
            }
        }
    }

    /// Up to `limit` best entries, or a readable error.
    pub fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, String> {
        self.store.top_scores(limit).map_err(|error| {
            warn!(limit, %error, "Failed to fetch top scores");
            error.to_string()
        })
    }

    pub fn check_username(&self, username: &str) -> UsernameCheck {
        match self.store.username_exists(username) {
            Ok(true) => UsernameCheck::Taken,
            Ok(false) => UsernameCheck::Available,
            Err(error) => {
                warn!(username, %error, "Username check failed");
                UsernameCheck::Unavailable(error.to_string())
            }
        }
    }

    /// Saves the final score, then fetches the top of the board.
    pub fn close_session(&self, player: Option<&Identity>, score: u32) -> LeaderboardView {
        let save_status = self.save_score(player, score);
        let (rows, error) = match self.top_scores(DISPLAY_ROWS) {
            Ok(entries) => (pad_rows(&entries), None),
            Err(error) => (pad_rows(&[]), Some(format!("Could not load leaderboard: {error}"))),
        };

        LeaderboardView {
            final_score: score,
            save_status,
            rows,
            error,
        }
    }
}
