//! This module contains all the constants used in the game.

use std::time::Duration;

use glam::UVec2;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The length of one maze tile, in logical pixels.
///
/// Every radius and speed in the game is a fixed fraction or multiple of this value.
pub const TILE_SIZE: u32 = 32;
/// [`TILE_SIZE`] as a float, for geometry.
pub const TILE_LENGTH: f32 = TILE_SIZE as f32;
/// The size of the game board, in cells.
pub const BOARD_CELL_SIZE: UVec2 = UVec2::new(28, 31);
/// The size of the canvas, in logical pixels.
pub const CANVAS_SIZE: UVec2 = UVec2::new(BOARD_CELL_SIZE.x * TILE_SIZE, BOARD_CELL_SIZE.y * TILE_SIZE);

/// An enum representing the different types of tiles on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTile {
    /// An empty tile.
    Empty,
    /// A wall tile.
    Wall,
    /// A regular pellet.
    Pellet,
    /// A power-up pellet.
    PowerUp,
    /// A tunnel tile, wrapping around the horizontal edges of the board.
    Tunnel,
}

/// The raw layout of the game board, as a 2D array of characters.
///
/// `P` marks the player's start, `G` marks the ghost spawns (in roster order).
pub const RAW_BOARD: [&str; BOARD_CELL_SIZE.y as usize] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "     #.##### ## #####.#     ",
    "     #.##  G    G  ##.#     ",
    "     #.## ######## ##.#     ",
    "######.## ######## ##.######",
    "T     .   ########   .     T",
    "######.## ######## ##.######",
    "     #.## ######## ##.#     ",
    "     #.##  G    G  ##.#     ",
    "     #.## ######## ##.#     ",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

/// Movement speeds, in logical pixels per frame.
pub mod mechanics {
    use super::TILE_LENGTH;

    /// The player's speed.
    pub const PLAYER_SPEED: f32 = TILE_LENGTH / 8.0;
    /// The unit every ghost speed is a multiple of.
    pub const GHOST_BASE_SPEED: f32 = TILE_LENGTH / 16.0;
    pub const GHOST_PATROL_MULTIPLIER: f32 = 1.5;
    pub const GHOST_CHASE_MULTIPLIER: f32 = 1.75;
    pub const GHOST_SCARED_MULTIPLIER: f32 = 1.0;
    pub const GHOST_RETREAT_MULTIPLIER: f32 = 3.0;
}

/// Collision radii, in logical pixels.
pub mod collider {
    use super::TILE_LENGTH;

    pub const PLAYER_RADIUS: f32 = TILE_LENGTH * 0.375;
    pub const GHOST_RADIUS: f32 = TILE_LENGTH * 0.375;
    pub const PELLET_RADIUS: f32 = TILE_LENGTH * 0.09375;
    /// Power-ups pulse between these two radii.
    pub const POWER_UP_MIN_RADIUS: f32 = TILE_LENGTH * 0.1875;
    pub const POWER_UP_MAX_RADIUS: f32 = TILE_LENGTH * 0.3125;
    /// Radius change per frame while pulsing.
    pub const POWER_UP_PULSE_RATE: f32 = 0.25;
}

/// Default timer durations.
pub mod timing {
    use std::time::Duration;

    pub const GAME_DURATION: Duration = Duration::from_millis(60_000);
    pub const SCARED_DURATION: Duration = Duration::from_millis(7_000);
    pub const RETREAT_DURATION: Duration = Duration::from_millis(3_000);
    /// Length of a patrol phase in the ghost behaviour cycle.
    pub const PATROL_PHASE: Duration = Duration::from_millis(7_000);
    /// Length of a chase phase in the ghost behaviour cycle.
    pub const CHASE_PHASE: Duration = Duration::from_millis(20_000);
    /// Frames spent on the death animation before the life is resolved.
    pub const DEATH_ANIMATION_TICKS: u32 = 45;
}

/// Score values.
pub mod score {
    pub const PELLET: u32 = 10;
    pub const POWER_UP: u32 = 50;
    /// Points for the first ghost caught in a power-up window; doubles for each consecutive catch.
    pub const GHOST_BASE: u32 = 200;
}

/// Player avatar animation.
pub mod animation {
    /// Widest mouth opening, in radians either side of the heading.
    pub const MOUTH_MAX_OPENING: f32 = 0.75;
    /// Mouth opening change per frame, in radians.
    pub const MOUTH_RATE: f32 = 0.12;
}

/// Input handling.
pub mod input {
    use std::time::Duration;

    /// Minimum time between two gamepad-driven direction changes.
    pub const GAMEPAD_DEBOUNCE: Duration = Duration::from_millis(100);
    /// Analog stick deflection ignored on each axis.
    pub const GAMEPAD_DEAD_ZONE: f32 = 0.3;
}

/// Leaderboard presentation.
pub mod leaderboard {
    /// Number of rows the leaderboard view always shows.
    pub const DISPLAY_ROWS: usize = 5;
    pub const PLACEHOLDER_SCORE: &str = "--";
    pub const PLACEHOLDER_USERNAME: &str = "---";
}
