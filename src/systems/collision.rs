use bevy_ecs::{
    event::EventWriter,
    query::{With, Without},
    system::{Query, ResMut},
};
use glam::Vec2;
use tracing::{debug, info};

use crate::{
    audio::Sound,
    constants::score,
    events::GameEvent,
    systems::{
        audio::AudioEvent,
        components::{Collider, GameVariables, Ghost, PlayerControlled, Position, RetreatTimer, Velocity},
        ghost::{transition_ghost, GhostSprite, GhostState, GhostTransition},
    },
};

/// Axis-aligned overlap of two entities' radius-expanded bounds. Touching edges count.
pub fn boxes_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    (a.x - b.x).abs() <= reach && (a.y - b.y).abs() <= reach
}

/// Circular overlap, used for collectibles.
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// Points for catching a scared ghost after `kill_count` earlier catches in the same window.
pub fn capture_points(kill_count: u32) -> u32 {
    score::GHOST_BASE.saturating_mul(2u32.saturating_pow(kill_count))
}

/// Resolves contact between the player and every ghost.
///
/// Normal ghosts are fatal, scared ghosts are captured, retreating ghosts are ignored.
/// Processing stops at the first fatal hit.
pub fn ghost_collision_system(
    mut vars: ResMut<GameVariables>,
    player: Query<(&Position, &Collider), With<PlayerControlled>>,
    mut ghosts: Query<
        (
            &Ghost,
            &Position,
            &Collider,
            &mut GhostState,
            &mut Velocity,
            &mut GhostSprite,
            &mut RetreatTimer,
        ),
        Without<PlayerControlled>,
    >,
    mut events: EventWriter<GameEvent>,
    mut audio: EventWriter<AudioEvent>,
) {
    let Ok((player_position, player_collider)) = player.single() else {
        return;
    };

    for (ghost, position, collider, mut state, mut velocity, mut sprite, mut retreat) in ghosts.iter_mut() {
        if !boxes_overlap(player_position.0, player_collider.radius, position.0, collider.radius) {
            continue;
        }

        match *state {
            GhostState::Normal { .. } => {
                info!(ghost = ghost.as_ref(), score = vars.score, "Player caught by ghost");
                events.write(GameEvent::PlayerKilled { ghost: *ghost });
                return;
            }
            GhostState::Scared => {
                let points = capture_points(vars.kill_count);
                vars.score = vars.score.saturating_add(points);
                vars.kill_count += 1;
                transition_ghost(&mut state, &mut velocity, &mut sprite, GhostTransition::Capture);
                retreat.0.start();

                debug!(ghost = ghost.as_ref(), points, kill_count = vars.kill_count, "Ghost captured");
                events.write(GameEvent::GhostCaught { ghost: *ghost, points });
                audio.write(AudioEvent::Play(Sound::EatGhost));
            }
            GhostState::Retreating => {}
        }
    }
}
