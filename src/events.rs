use bevy_ecs::prelude::*;

use crate::map::direction::Direction;
use crate::systems::components::Ghost;

/// Requests coming from the player or the host window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    Exit,
    MovePlayer(Direction),
    ToggleMute,
    TogglePause,
    /// The window (or browser tab) was hidden or shown.
    SetVisibility(bool),
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
    /// A normal ghost touched the player.
    PlayerKilled { ghost: Ghost },
    /// A scared ghost was caught for `points`.
    GhostCaught { ghost: Ghost, points: u32 },
    /// The game timer ran out.
    TimeUp,
    /// Every collectible on the board has been eaten.
    BoardCleared,
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}
