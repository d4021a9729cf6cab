use bevy_ecs::{
    query::With,
    system::{Query, Res},
};
use glam::{IVec2, Vec2};
use tracing::trace;

use crate::{
    map::Board,
    systems::components::{GameVariables, Mouth, PlayerControlled, Position, Velocity},
};

/// The cell whose center `position` is close enough to for a turn at `speed`.
///
/// The window is half a step wide on each side, so an entity moving at `speed`
/// lands in it at least once per tile.
pub fn centered_cell(position: Vec2, speed: f32) -> Option<IVec2> {
    let cell = Board::cell_at(position);
    let offset = (position - Board::tile_center(cell)).abs();
    (offset.max_element() <= speed / 2.0).then_some(cell)
}

/// Moves an entity one frame along its heading, wrapping through the tunnel.
pub fn advance(position: &mut Position, velocity: &Velocity) {
    position.0 = Board::wrap_position(position.0 + velocity.vector());
}

/// Applies the requested direction to the player and stops it at walls.
///
/// Reversing is allowed anywhere; any other turn waits for a tile center with an
/// open neighbour in the requested direction.
pub fn player_steering_system(
    board: Res<Board>,
    vars: Res<GameVariables>,
    mut player: Query<(&mut Position, &mut Velocity), With<PlayerControlled>>,
) {
    let Ok((mut position, mut velocity)) = player.single_mut() else {
        return;
    };

    if let Some(requested) = vars.last_key {
        let reversing = velocity.direction.is_some_and(|current| current.opposite() == requested);
        if reversing {
            velocity.direction = Some(requested);
        } else if velocity.direction != Some(requested) {
            if let Some(cell) = centered_cell(position.0, velocity.speed) {
                if board.is_walkable(cell + requested.as_ivec2()) {
                    trace!(?cell, ?requested, "Player turned");
                    position.0 = Board::tile_center(cell);
                    velocity.direction = Some(requested);
                }
            }
        }
    }

    if let Some(current) = velocity.direction {
        if let Some(cell) = centered_cell(position.0, velocity.speed) {
            if !board.is_walkable(cell + current.as_ivec2()) {
                trace!(?cell, ?current, "Player stopped at wall");
                position.0 = Board::tile_center(cell);
                velocity.direction = None;
            }
        }
    }
}

/// Moves the player and animates its mouth while it travels.
pub fn player_movement_system(mut player: Query<(&mut Position, &Velocity, &mut Mouth), With<PlayerControlled>>) {
    let Ok((mut position, velocity, mut mouth)) = player.single_mut() else {
        return;
    };

    let Some(direction) = velocity.direction else {
        return;
    };

    advance(&mut position, velocity);
    mouth.facing = direction;
    mouth.animate();
}
