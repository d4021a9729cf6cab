//! Centralized error types for the game.
//!
//! This module defines the error types used throughout the crate. Errors from
//! the score store never reach gameplay code; the leaderboard converts them
//! into statuses (see [`crate::leaderboard::Leaderboard`]).

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Score store error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Error type for map parsing operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character in board: {0:?}")]
    UnknownCharacter(char),
    #[error("Board must have exactly one player start, found {0}")]
    InvalidPlayerStartCount(usize),
    #[error("Board must have exactly {expected} ghost spawns, found {found}")]
    InvalidGhostSpawnCount { expected: usize, found: usize },
    #[error("Board must have zero or two tunnel ends, found {0}")]
    InvalidTunnelCount(usize),
    #[error("Map parsing failed: {0}")]
    ParseFailed(String),
}

/// Errors raised by a [`crate::leaderboard::ScoreStore`].
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Store responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Reasons an identity record is rejected.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Username is empty")]
    Empty,
    #[error("Username is longer than {max} characters")]
    TooLong { max: usize },
    #[error("Username contains an invalid character: {0:?}")]
    InvalidCharacter(char),
    #[error("Identity payload is not a {{ \"username\": ... }} record")]
    MalformedPayload,
}

impl From<figment::Error> for GameError {
    fn from(error: figment::Error) -> Self {
        GameError::Config(Box::new(error))
    }
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
