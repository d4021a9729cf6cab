use bevy_ecs::{
    component::Component,
    query::{With, Without},
    system::{Query, Res, ResMut},
};
use glam::IVec2;
use rand::seq::IndexedRandom;
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    constants::mechanics,
    map::{direction::Direction, Board},
    systems::{
        components::{Ghost, GhostRng, PlayerControlled, Position, RetreatTimer, SpawnPoint, Velocity},
        movement::{advance, centered_cell},
    },
};

/// Behaviour state of a ghost.
///
/// Scared and retreating are separate variants, so a ghost can never be both.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostState {
    /// Roaming the maze; `chasing` follows the current phase of the behaviour cycle.
    Normal { chasing: bool },
    /// Vulnerable after a power-up.
    Scared,
    /// Caught by the player, heading back to its spawn.
    Retreating,
}

impl Default for GhostState {
    fn default() -> Self {
        GhostState::Normal { chasing: false }
    }
}

/// An event-driven change of [`GhostState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostTransition {
    /// A power-up was consumed.
    Frighten,
    /// The scared window ended.
    Calm { chasing: bool },
    /// The player caught the ghost.
    Capture,
    /// The retreat timer ran out.
    Revive { chasing: bool },
    /// The behaviour cycle switched phase.
    Chase(bool),
}

impl GhostState {
    /// The state reached by applying `transition`, or `None` if it doesn't apply here.
    pub fn apply(self, transition: GhostTransition) -> Option<GhostState> {
        match (self, transition) {
            (GhostState::Normal { .. }, GhostTransition::Frighten) => Some(GhostState::Scared),
            (GhostState::Normal { chasing }, GhostTransition::Chase(next)) if chasing != next => {
                Some(GhostState::Normal { chasing: next })
            }
            (GhostState::Scared, GhostTransition::Calm { chasing }) => Some(GhostState::Normal { chasing }),
            (GhostState::Scared, GhostTransition::Capture) => Some(GhostState::Retreating),
            (GhostState::Retreating, GhostTransition::Revive { chasing }) => Some(GhostState::Normal { chasing }),
            _ => None,
        }
    }

    /// Movement speed for this state, in pixels per frame.
    pub fn speed(self) -> f32 {
        let multiplier = match self {
            GhostState::Normal { chasing: false } => mechanics::GHOST_PATROL_MULTIPLIER,
            GhostState::Normal { chasing: true } => mechanics::GHOST_CHASE_MULTIPLIER,
            GhostState::Scared => mechanics::GHOST_SCARED_MULTIPLIER,
            GhostState::Retreating => mechanics::GHOST_RETREAT_MULTIPLIER,
        };
        mechanics::GHOST_BASE_SPEED * multiplier
    }
}

/// Which body a ghost is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostLook {
    /// Coloured body with eyes.
    Body,
    /// Blue, vulnerable body.
    Scared,
    /// Just the eyes, travelling home.
    Eyes,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostSprite {
    pub look: GhostLook,
    pub facing: Direction,
}

impl GhostSprite {
    pub fn new(facing: Direction) -> Self {
        Self {
            look: GhostLook::Body,
            facing,
        }
    }
}

/// Recomputes speed from state. Safe to call any number of times.
pub fn sync_speed(state: GhostState, velocity: &mut Velocity) {
    velocity.speed = state.speed();
}

/// Picks the sprite for the current state and heading.
///
/// A stationary ghost keeps whichever way it was facing.
pub fn assign_sprite(state: GhostState, velocity: &Velocity, sprite: &mut GhostSprite) {
    sprite.look = match state {
        GhostState::Retreating => GhostLook::Eyes,
        GhostState::Scared => GhostLook::Scared,
        GhostState::Normal { .. } => GhostLook::Body,
    };
    if let Some(facing) = Direction::from_vector(velocity.vector()) {
        sprite.facing = facing;
    }
}

/// Applies a transition and re-derives speed and sprite. Returns whether the state changed.
pub fn transition_ghost(
    state: &mut GhostState,
    velocity: &mut Velocity,
    sprite: &mut GhostSprite,
    transition: GhostTransition,
) -> bool {
    let Some(next) = state.apply(transition) else {
        return false;
    };

    trace!(from = ?*state, to = ?next, ?transition, "Ghost state transition");
    *state = next;
    sync_speed(next, velocity);
    assign_sprite(next, velocity, sprite);
    true
}

/// Puts a ghost back at its spawn, patrolling, with its retreat timer cleared.
pub fn reset_ghost(
    spawn: &SpawnPoint,
    position: &mut Position,
    velocity: &mut Velocity,
    state: &mut GhostState,
    sprite: &mut GhostSprite,
    retreat_timer: &mut RetreatTimer,
) {
    position.0 = spawn.position;
    velocity.direction = spawn.direction;
    *state = GhostState::default();
    retreat_timer.0.reset();
    sync_speed(*state, velocity);
    assign_sprite(*state, velocity, sprite);
}

/// Chooses a heading for a ghost standing on the center of `cell`.
///
/// Ghosts never turn back unless the corridor is a dead end. `None` means the
/// ghost should hold still.
pub fn choose_direction(
    board: &Board,
    cell: IVec2,
    current: Option<Direction>,
    state: GhostState,
    spawn_cell: IVec2,
    player_cell: Option<IVec2>,
    rng: &mut GhostRng,
) -> Option<Direction> {
    let open = board.open_directions(cell);
    let forward: SmallVec<[Direction; 4]> = open
        .iter()
        .copied()
        .filter(|direction| Some(direction.opposite()) != current)
        .collect();
    let options = if forward.is_empty() { open } else { forward };

    let target = match state {
        GhostState::Retreating if cell == spawn_cell => return None,
        GhostState::Retreating => Some(spawn_cell),
        GhostState::Normal { chasing: true } => player_cell,
        GhostState::Normal { chasing: false } | GhostState::Scared => None,
    };

    match target {
        Some(target) => options
            .iter()
            .copied()
            .min_by_key(|direction| (cell + direction.as_ivec2() - target).length_squared()),
        None => options.choose(&mut rng.0).copied(),
    }
}

/// Steers every ghost at tile centers, then moves it one frame along its heading.
pub fn ghost_movement_system(
    board: Res<Board>,
    mut rng: ResMut<GhostRng>,
    player: Query<&Position, With<PlayerControlled>>,
    mut ghosts: Query<
        (
            &Ghost,
            &GhostState,
            &SpawnPoint,
            &mut Position,
            &mut Velocity,
            &mut GhostSprite,
        ),
        Without<PlayerControlled>,
    >,
) {
    let player_cell = player.single().ok().map(|position| Board::cell_at(position.0));

    for (ghost, state, spawn, mut position, mut velocity, mut sprite) in ghosts.iter_mut() {
        if let Some(cell) = centered_cell(position.0, velocity.speed) {
            let next = choose_direction(
                &board,
                cell,
                velocity.direction,
                *state,
                Board::cell_at(spawn.position),
                player_cell,
                &mut rng,
            );

            if next != velocity.direction {
                trace!(ghost = ghost.as_ref(), ?cell, from = ?velocity.direction, to = ?next, "Ghost turned");
                position.0 = Board::tile_center(cell);
                velocity.direction = next;
            }
        }

        advance(&mut position, &velocity);
        assign_sprite(*state, &velocity, &mut sprite);
    }
}
