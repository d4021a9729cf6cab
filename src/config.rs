//! Runtime configuration, read from `PACMAN_*` environment variables.

use std::time::Duration;

use bevy_ecs::resource::Resource;
use figment::{providers::Env, Figment};
use serde::{Deserialize, Deserializer};

use crate::constants::timing;
use crate::error::GameResult;

/// Tunable gameplay values.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub game_duration: Duration,
    pub scared_duration: Duration,
    pub retreat_duration: Duration,
    pub patrol_phase: Duration,
    pub chase_phase: Duration,
    /// Lives beyond the first; 0 ends the session on the first fatal hit.
    pub starting_lives: u8,
    pub death_animation_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_duration: timing::GAME_DURATION,
            scared_duration: timing::SCARED_DURATION,
            retreat_duration: timing::RETREAT_DURATION,
            patrol_phase: timing::PATROL_PHASE,
            chase_phase: timing::CHASE_PHASE,
            starting_lives: 0,
            death_animation_ticks: timing::DEATH_ANIMATION_TICKS,
        }
    }
}

/// Hosted score store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the hosted backend, without the `/rest/v1` suffix
    pub url: String,
    pub api_key: String,
    pub scores_table: String,
    pub participants_table: String,
    pub timeout: Duration,
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    pub game: GameConfig,
    /// Hosted score store - if None, scores are kept in memory for the process lifetime
    pub store: Option<StoreConfig>,
    /// Registered player name - if None, the session is anonymous
    pub username: Option<String>,
    /// Seed for ghost steering - if None, seeded from the OS
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            store: None,
            username: None,
            seed: None,
        }
    }
}

/// Raw configuration loaded directly from environment variables
/// This is an intermediate representation that gets validated and converted to Config
#[derive(Debug, Deserialize)]
struct RawConfig {
    // Gameplay
    #[serde(default = "default_game_duration_ms")]
    game_duration_ms: u64,
    #[serde(default = "default_scared_duration_ms")]
    scared_duration_ms: u64,
    #[serde(default = "default_retreat_duration_ms")]
    retreat_duration_ms: u64,
    #[serde(default = "default_patrol_phase_ms")]
    patrol_phase_ms: u64,
    #[serde(default = "default_chase_phase_ms")]
    chase_phase_ms: u64,
    #[serde(default)]
    starting_lives: u8,
    #[serde(default = "default_death_animation_ticks")]
    death_animation_ticks: u32,

    // Score store
    store_url: Option<String>,
    store_api_key: Option<String>,
    #[serde(default = "default_scores_table")]
    store_scores_table: String,
    #[serde(default = "default_participants_table")]
    store_participants_table: String,
    #[serde(default = "default_store_timeout_seconds")]
    store_timeout_seconds: u64,

    // Session
    #[serde(default, deserialize_with = "deserialize_optional_string_from_any")]
    username: Option<String>,
    seed: Option<u64>,
}

impl TryFrom<RawConfig> for Config {
    type Error = String;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let durations = [
            ("PACMAN_GAME_DURATION_MS", raw.game_duration_ms),
            ("PACMAN_SCARED_DURATION_MS", raw.scared_duration_ms),
            ("PACMAN_RETREAT_DURATION_MS", raw.retreat_duration_ms),
            ("PACMAN_PATROL_PHASE_MS", raw.patrol_phase_ms),
            ("PACMAN_CHASE_PHASE_MS", raw.chase_phase_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(format!("{name} must be greater than zero"));
        }

        // Store config - if any field is set, all must be set
        let store = match (raw.store_url, raw.store_api_key) {
            (None, None) => None,
            (Some(url), Some(api_key)) => Some(StoreConfig {
                url: url.trim_end_matches('/').to_string(),
                api_key,
                scores_table: raw.store_scores_table,
                participants_table: raw.store_participants_table,
                timeout: Duration::from_secs(raw.store_timeout_seconds),
            }),
            (url, _) => {
                let missing = if url.is_none() { "PACMAN_STORE_URL" } else { "PACMAN_STORE_API_KEY" };
                return Err(format!(
                    "Score store configuration is incomplete: {missing} is missing. \
                     Either set both PACMAN_STORE_URL and PACMAN_STORE_API_KEY or neither."
                ));
            }
        };

        Ok(Config {
            game: GameConfig {
                game_duration: Duration::from_millis(raw.game_duration_ms),
                scared_duration: Duration::from_millis(raw.scared_duration_ms),
                retreat_duration: Duration::from_millis(raw.retreat_duration_ms),
                patrol_phase: Duration::from_millis(raw.patrol_phase_ms),
                chase_phase: Duration::from_millis(raw.chase_phase_ms),
                starting_lives: raw.starting_lives,
                death_animation_ticks: raw.death_animation_ticks,
            },
            store,
            username: raw.username.filter(|name| !name.trim().is_empty()),
            seed: raw.seed,
        })
    }
}

fn default_game_duration_ms() -> u64 {
    timing::GAME_DURATION.as_millis() as u64
}

fn default_scared_duration_ms() -> u64 {
    timing::SCARED_DURATION.as_millis() as u64
}

fn default_retreat_duration_ms() -> u64 {
    timing::RETREAT_DURATION.as_millis() as u64
}

fn default_patrol_phase_ms() -> u64 {
    timing::PATROL_PHASE.as_millis() as u64
}

fn default_chase_phase_ms() -> u64 {
    timing::CHASE_PHASE.as_millis() as u64
}

fn default_death_animation_ticks() -> u32 {
    timing::DEATH_ANIMATION_TICKS
}

fn default_scores_table() -> String {
    "scores".to_string()
}

fn default_participants_table() -> String {
    "participants".to_string()
}

fn default_store_timeout_seconds() -> u64 {
    5
}

fn deserialize_optional_string_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Null) | None => Ok(None),
        _ => Err(serde::de::Error::custom("Expected string, number, or null")),
    }
}

/// The configuration sources, in priority order.
pub fn figment() -> Figment {
    Figment::new().merge(Env::prefixed("PACMAN_"))
}

pub fn load_config() -> GameResult<Config> {
    Ok(figment().extract()?)
}
