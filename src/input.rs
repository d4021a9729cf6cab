//! Device-independent input: keyboard bindings and gamepad polling.
//!
//! Front-ends translate their native key codes into [`Key`] and sample controllers
//! into a [`GamepadState`]; everything here just turns those into [`GameCommand`]s.

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec2;
use tracing::trace;

use crate::constants::input::{GAMEPAD_DEAD_ZONE, GAMEPAD_DEBOUNCE};
use crate::events::GameCommand;
use crate::map::direction::Direction;

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Escape,
    M,
    Q,
}

#[derive(Debug, Clone)]
pub struct Bindings {
    key_bindings: HashMap<Key, GameCommand>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        // Player movement
        key_bindings.insert(Key::Up, GameCommand::MovePlayer(Direction::Up));
        key_bindings.insert(Key::W, GameCommand::MovePlayer(Direction::Up));
        key_bindings.insert(Key::Down, GameCommand::MovePlayer(Direction::Down));
        key_bindings.insert(Key::S, GameCommand::MovePlayer(Direction::Down));
        key_bindings.insert(Key::Left, GameCommand::MovePlayer(Direction::Left));
        key_bindings.insert(Key::A, GameCommand::MovePlayer(Direction::Left));
        key_bindings.insert(Key::Right, GameCommand::MovePlayer(Direction::Right));
        key_bindings.insert(Key::D, GameCommand::MovePlayer(Direction::Right));

        // Game actions
        key_bindings.insert(Key::Escape, GameCommand::TogglePause);
        key_bindings.insert(Key::M, GameCommand::ToggleMute);
        key_bindings.insert(Key::Q, GameCommand::Exit);

        Self { key_bindings }
    }
}

impl Bindings {
    pub fn command_for(&self, key: Key) -> Option<GameCommand> {
        self.key_bindings.get(&key).copied()
    }

    /// Rebinds `key`, replacing whatever it did before.
    pub fn bind(&mut self, key: Key, command: GameCommand) {
        self.key_bindings.insert(key, command);
    }
}

/// A snapshot of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadState {
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,
    /// Left stick deflection, each axis in `-1.0..=1.0`; negative `y` is up.
    pub left_stick: Vec2,
}

impl GamepadState {
    /// The direction the controller is asking for.
    ///
    /// The D-pad wins over the stick. On the stick, deflection inside `dead_zone`
    /// is ignored per axis and the stronger axis decides.
    pub fn direction(&self, dead_zone: f32) -> Option<Direction> {
        if self.dpad_up {
            return Some(Direction::Up);
        }
        if self.dpad_down {
            return Some(Direction::Down);
        }
        if self.dpad_left {
            return Some(Direction::Left);
        }
        if self.dpad_right {
            return Some(Direction::Right);
        }

        let stick = Vec2::new(
            if self.left_stick.x.abs() > dead_zone { self.left_stick.x } else { 0.0 },
            if self.left_stick.y.abs() > dead_zone { self.left_stick.y } else { 0.0 },
        );

        if stick == Vec2::ZERO {
            None
        } else if stick.x.abs() >= stick.y.abs() {
            Some(if stick.x < 0.0 { Direction::Left } else { Direction::Right })
        } else {
            Some(if stick.y < 0.0 { Direction::Up } else { Direction::Down })
        }
    }
}

/// Turns controller snapshots into movement commands, at most one per debounce window.
#[derive(Debug, Clone)]
pub struct GamepadPoller {
    debounce: Duration,
    dead_zone: f32,
    last_emitted_at: Option<Duration>,
}

impl Default for GamepadPoller {
    fn default() -> Self {
        Self::new(GAMEPAD_DEBOUNCE, GAMEPAD_DEAD_ZONE)
    }
}

impl GamepadPoller {
    pub fn new(debounce: Duration, dead_zone: f32) -> Self {
        Self {
            debounce,
            dead_zone,
            last_emitted_at: None,
        }
    }

    /// Samples `state` at clock reading `now`.
    pub fn poll(&mut self, state: &GamepadState, now: Duration) -> Option<GameCommand> {
        let direction = state.direction(self.dead_zone)?;

        if let Some(last) = self.last_emitted_at {
            if now.saturating_sub(last) < self.debounce {
                return None;
            }
        }

        trace!(?direction, "Gamepad direction");
        self.last_emitted_at = Some(now);
        Some(GameCommand::MovePlayer(direction))
    }
}
