use bevy_ecs::{
    event::EventWriter,
    query::{With, Without},
    system::{Query, ResMut},
};
use tracing::{debug, info, trace};

use crate::{
    audio::Sound,
    constants::collider,
    events::GameEvent,
    systems::{
        audio::AudioEvent,
        collision::circles_overlap,
        components::{Collectible, Collider, Eaten, GameVariables, PlayerControlled, Position, Pulse, Velocity},
        ghost::{transition_ghost, GhostSprite, GhostState, GhostTransition},
        timers::GameTimers,
    },
};

/// Eats every pellet the player is touching.
pub fn pellet_system(
    mut vars: ResMut<GameVariables>,
    player: Query<(&Position, &Collider), With<PlayerControlled>>,
    mut items: Query<(&Collectible, &Position, &Collider, &mut Eaten), Without<PlayerControlled>>,
    mut audio: EventWriter<AudioEvent>,
) {
    let Ok((player_position, player_collider)) = player.single() else {
        return;
    };

    for (collectible, position, collider, mut eaten) in items.iter_mut() {
        if *collectible != Collectible::Pellet || eaten.0 {
            continue;
        }
        if circles_overlap(player_position.0, player_collider.radius, position.0, collider.radius) {
            eaten.0 = true;
            vars.score = vars.score.saturating_add(collectible.score_value());
            trace!(score = vars.score, "Pellet eaten");
            audio.write(AudioEvent::Play(Sound::Waka));
        }
    }
}

/// Eats power-ups the player is touching and opens (or extends) the scared window.
pub fn power_up_system(
    mut vars: ResMut<GameVariables>,
    mut timers: ResMut<GameTimers>,
    player: Query<(&Position, &Collider), With<PlayerControlled>>,
    mut items: Query<(&Collectible, &Position, &Collider, &mut Eaten), Without<PlayerControlled>>,
    mut ghosts: Query<(&mut GhostState, &mut Velocity, &mut GhostSprite), Without<PlayerControlled>>,
    mut audio: EventWriter<AudioEvent>,
) {
    let Ok((player_position, player_collider)) = player.single() else {
        return;
    };

    for (collectible, position, collider, mut eaten) in items.iter_mut() {
        if *collectible != Collectible::PowerUp || eaten.0 {
            continue;
        }
        if !circles_overlap(player_position.0, player_collider.radius, position.0, collider.radius) {
            continue;
        }

        eaten.0 = true;
        vars.score = vars.score.saturating_add(collectible.score_value());
        vars.kill_count = 0;
        timers.scared.start();

        let mut frightened = 0;
        for (mut state, mut velocity, mut sprite) in ghosts.iter_mut() {
            if transition_ghost(&mut state, &mut velocity, &mut sprite, GhostTransition::Frighten) {
                frightened += 1;
            }
        }
        debug!(score = vars.score, frightened, "Power-up eaten");

        audio.write(AudioEvent::Play(Sound::PowerUp));
        audio.write(AudioEvent::Stop(Sound::Siren));
        audio.write(AudioEvent::Play(Sound::ScaredSiren));
    }
}

/// Oscillates the radius of uneaten power-ups.
pub fn pulse_system(mut items: Query<(&mut Pulse, &mut Collider, &Eaten)>) {
    for (mut pulse, mut shape, eaten) in items.iter_mut() {
        if eaten.0 {
            continue;
        }

        if pulse.growing {
            shape.radius += collider::POWER_UP_PULSE_RATE;
            if shape.radius >= collider::POWER_UP_MAX_RADIUS {
                shape.radius = collider::POWER_UP_MAX_RADIUS;
                pulse.growing = false;
            }
        } else {
            shape.radius -= collider::POWER_UP_PULSE_RATE;
            if shape.radius <= collider::POWER_UP_MIN_RADIUS {
                shape.radius = collider::POWER_UP_MIN_RADIUS;
                pulse.growing = true;
            }
        }
    }
}

/// Refills the board once every collectible has been eaten.
pub fn board_refill_system(mut items: Query<&mut Eaten>, mut events: EventWriter<GameEvent>) {
    if items.is_empty() || items.iter().any(|eaten| !eaten.0) {
        return;
    }

    for mut eaten in items.iter_mut() {
        eaten.0 = false;
    }
    info!("Board cleared, refilling collectibles");
    events.write(GameEvent::BoardCleared);
}
