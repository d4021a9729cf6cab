use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::Vec2;
use rand::{rngs::SmallRng, SeedableRng};
use strum_macros::{AsRefStr, EnumIter};
use time::OffsetDateTime;

use crate::{
    constants::{animation, score},
    identity::Identity,
    map::direction::Direction,
    render::Color,
    systems::ghost::{GhostSprite, GhostState},
    timer::PausableTimer,
};

/// A tag component for entities that are controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// Canvas position of an entity's center, in logical pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

/// Heading and speed of a moving entity. No heading means standing still.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub direction: Option<Direction>,
    /// Pixels per frame.
    pub speed: f32,
}

impl Velocity {
    /// Displacement applied per frame.
    pub fn vector(&self) -> Vec2 {
        self.direction.map_or(Vec2::ZERO, |direction| direction.as_vec2() * self.speed)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub radius: f32,
}

/// Where an actor returns to whenever the board is reset.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub direction: Option<Direction>,
}

/// Lives the player may still lose before the session ends.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lives(pub u8);

/// Chomping animation state of the player avatar.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Mouth {
    /// Half-angle of the mouth wedge, in radians.
    pub opening: f32,
    pub closing: bool,
    /// Last heading the player moved in; kept while standing still.
    pub facing: Direction,
}

impl Default for Mouth {
    fn default() -> Self {
        Self {
            opening: animation::MOUTH_MAX_OPENING,
            closing: true,
            facing: Direction::Right,
        }
    }
}

impl Mouth {
    /// Advances the chomp by one frame.
    pub fn animate(&mut self) {
        if self.closing {
            self.opening -= animation::MOUTH_RATE;
            if self.opening <= 0.0 {
                self.opening = 0.0;
                self.closing = false;
            }
        } else {
            self.opening += animation::MOUTH_RATE;
            if self.opening >= animation::MOUTH_MAX_OPENING {
                self.opening = animation::MOUTH_MAX_OPENING;
                self.closing = true;
            }
        }
    }
}

/// The four ghosts of the roster.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Ghost {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl Ghost {
    /// Heading the ghost leaves its spawn with.
    pub fn initial_direction(self) -> Direction {
        match self {
            Ghost::Blinky | Ghost::Inky => Direction::Left,
            Ghost::Pinky | Ghost::Clyde => Direction::Right,
        }
    }

    /// Body colour while not scared.
    pub fn color(self) -> Color {
        match self {
            Ghost::Blinky => Color::rgb(255, 0, 0),
            Ghost::Pinky => Color::rgb(255, 184, 255),
            Ghost::Inky => Color::rgb(0, 255, 255),
            Ghost::Clyde => Color::rgb(255, 184, 82),
        }
    }
}

/// Per-ghost countdown until a retreating ghost is back in play.
#[derive(Component, Debug, Clone)]
pub struct RetreatTimer(pub PausableTimer);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collectible {
    Pellet,
    PowerUp,
}

impl Collectible {
    pub fn score_value(self) -> u32 {
        match self {
            Collectible::Pellet => score::PELLET,
            Collectible::PowerUp => score::POWER_UP,
        }
    }
}

/// Whether a collectible has been consumed in the current board.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eaten(pub bool);

/// Radius oscillation of a power-up.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pulse {
    pub growing: bool,
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub velocity: Velocity,
    pub collider: Collider,
    pub lives: Lives,
    pub mouth: Mouth,
    pub spawn: SpawnPoint,
}

#[derive(Bundle)]
pub struct GhostBundle {
    pub ghost: Ghost,
    pub position: Position,
    pub velocity: Velocity,
    pub collider: Collider,
    pub state: GhostState,
    pub sprite: GhostSprite,
    pub retreat_timer: RetreatTimer,
    pub spawn: SpawnPoint,
}

#[derive(Bundle)]
pub struct CollectibleBundle {
    pub collectible: Collectible,
    pub position: Position,
    pub collider: Collider,
    pub eaten: Eaten,
}

#[derive(Resource)]
pub struct GlobalState {
    pub exit: bool,
}

/// Session-wide gameplay variables.
#[derive(Resource, Debug, Clone)]
pub struct GameVariables {
    pub score: u32,
    /// Ghosts caught since the last power-up (or life).
    pub kill_count: u32,
    /// Most recent direction requested by the player.
    pub last_key: Option<Direction>,
    /// Manual pause, toggled by the player.
    pub is_game_paused: bool,
    pub is_window_visible: bool,
    /// Frames simulated since the session started.
    pub frame: u64,
    pub player: Option<Identity>,
    pub start_time: Option<OffsetDateTime>,
}

impl GameVariables {
    pub fn new(player: Option<Identity>) -> Self {
        Self {
            score: 0,
            kill_count: 0,
            last_key: None,
            is_game_paused: false,
            is_window_visible: true,
            frame: 0,
            player,
            start_time: None,
        }
    }

    /// Whether the simulation is frozen. A manual pause holds regardless of visibility.
    pub fn paused(&self) -> bool {
        self.is_game_paused || !self.is_window_visible
    }

    /// Clears everything tied to the finished session. Identity and window
    /// visibility describe the surroundings, not the session, and are kept.
    pub fn reset(&mut self) {
        *self = Self {
            is_window_visible: self.is_window_visible,
            ..Self::new(self.player.take())
        };
    }
}

/// Random source for ghost steering.
#[derive(Resource)]
pub struct GhostRng(pub SmallRng);

impl GhostRng {
    /// Deterministic when seeded, otherwise drawn from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_os_rng()),
        }
    }
}
