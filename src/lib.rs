//! Pac-Man promo mini-game library crate.

#[cfg(feature = "desktop")]
pub mod app;
pub mod audio;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod game;
pub mod hud;
pub mod identity;
pub mod input;
pub mod leaderboard;
pub mod logging;
pub mod map;
#[cfg(feature = "desktop")]
pub mod platform;
pub mod render;
pub mod systems;
pub mod timer;
