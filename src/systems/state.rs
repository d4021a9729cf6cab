use bevy_ecs::{
    event::{EventReader, EventWriter},
    query::{With, Without},
    resource::Resource,
    system::{Query, Res, ResMut},
};
use tracing::{debug, info};

use crate::{
    audio::Sound,
    config::GameConfig,
    events::{GameCommand, GameEvent},
    systems::{
        audio::{AudioEvent, AudioState},
        components::{GameVariables, GlobalState, Lives, Mouth, PlayerControlled, Position, RetreatTimer, SpawnPoint, Velocity},
        ghost::{reset_ghost, transition_ghost, GhostSprite, GhostState, GhostTransition},
        timers::{set_timers_paused, GameTimers},
    },
};

/// A resource to track the overall stage of the game from a high-level perspective.
#[derive(Resource, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum GameStage {
    /// Entities are in place, waiting for the session to start.
    #[default]
    Setup,
    /// The main gameplay loop is active.
    Playing,
    /// The player has been caught and the death animation is running.
    Dying {
        remaining_ticks: u32,
        /// Decided on impact, applied once the animation ends.
        outcome: LifeOutcome,
    },
    /// The session has ended.
    GameOver(GameOverReason),
}

/// What happens after a death animation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LifeOutcome {
    /// A life was spent; play resumes from the spawn points.
    Continue,
    GameOver,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameOverReason {
    TimeUp,
    OutOfLives,
}

/// Applies player and window commands.
///
/// Whenever the effective pause flag flips during play, every countdown and the
/// audio are paused or resumed together. A manual pause stays in force whatever
/// the window visibility does.
#[allow(clippy::too_many_arguments)]
pub fn command_system(
    mut events: EventReader<GameEvent>,
    stage: Res<GameStage>,
    mut vars: ResMut<GameVariables>,
    mut timers: ResMut<GameTimers>,
    mut retreat_timers: Query<&mut RetreatTimer>,
    mut audio_state: ResMut<AudioState>,
    mut global: ResMut<GlobalState>,
    mut audio: EventWriter<AudioEvent>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = *event else {
            continue;
        };

        let was_paused = vars.paused();
        match command {
            GameCommand::MovePlayer(direction) => {
                if *stage == GameStage::Playing {
                    vars.last_key = Some(direction);
                }
            }
            GameCommand::TogglePause => {
                if matches!(*stage, GameStage::Setup | GameStage::GameOver(_)) {
                    debug!(stage = ?*stage, "Ignoring pause outside of a session");
                    continue;
                }
                vars.is_game_paused = !vars.is_game_paused;
                info!(paused = vars.is_game_paused, "Pause toggled");
            }
            GameCommand::SetVisibility(visible) => {
                vars.is_window_visible = visible;
                debug!(visible, "Window visibility changed");
            }
            GameCommand::ToggleMute => {
                audio_state.muted = !audio_state.muted;
                info!(muted = audio_state.muted, "Mute toggled");
            }
            GameCommand::Exit => {
                info!("Exit requested");
                global.exit = true;
            }
        }

        let paused = vars.paused();
        if paused != was_paused && *stage == GameStage::Playing {
            set_timers_paused(&mut timers, retreat_timers.iter_mut(), paused);
            audio.write(if paused { AudioEvent::Pause } else { AudioEvent::Resume });
        }
    }
}

/// Puts the player back at its spawn, standing still.
pub fn reset_player(spawn: &SpawnPoint, position: &mut Position, velocity: &mut Velocity, mouth: &mut Mouth) {
    position.0 = spawn.position;
    velocity.direction = spawn.direction;
    *mouth = Mouth::default();
}

/// Drives the stage machine: deaths, lives, the death animation and the end of the session.
#[allow(clippy::too_many_arguments)]
pub fn stage_system(
    config: Res<GameConfig>,
    mut stage: ResMut<GameStage>,
    mut vars: ResMut<GameVariables>,
    mut timers: ResMut<GameTimers>,
    mut events: EventReader<GameEvent>,
    mut audio: EventWriter<AudioEvent>,
    mut player: Query<(&SpawnPoint, &mut Position, &mut Velocity, &mut Lives, &mut Mouth), With<PlayerControlled>>,
    mut ghosts: Query<
        (
            &SpawnPoint,
            &mut Position,
            &mut Velocity,
            &mut GhostState,
            &mut GhostSprite,
            &mut RetreatTimer,
        ),
        Without<PlayerControlled>,
    >,
) {
    if let GameStage::Dying {
        remaining_ticks,
        outcome,
    } = *stage
    {
        if remaining_ticks > 1 {
            *stage = GameStage::Dying {
                remaining_ticks: remaining_ticks - 1,
                outcome,
            };
        } else {
            match outcome {
                LifeOutcome::Continue => {
                    if let Ok((spawn, mut position, mut velocity, _, mut mouth)) = player.single_mut() {
                        reset_player(spawn, &mut position, &mut velocity, &mut mouth);
                    }

                    let chasing = timers.chasing();
                    for (spawn, mut position, mut velocity, mut state, mut sprite, mut retreat) in ghosts.iter_mut() {
                        reset_ghost(spawn, &mut position, &mut velocity, &mut state, &mut sprite, &mut retreat);
                        transition_ghost(&mut state, &mut velocity, &mut sprite, GhostTransition::Chase(chasing));
                    }

                    vars.kill_count = 0;
                    vars.last_key = None;
                    timers.scared.reset();
                    timers.resume_all();

                    info!(remaining_time = %timers.game.formatted(), "Life lost, play resumes");
                    audio.write(AudioEvent::Play(Sound::Siren));
                    *stage = GameStage::Playing;
                }
                LifeOutcome::GameOver => {
                    info!(score = vars.score, "Out of lives");
                    audio.write(AudioEvent::Play(Sound::GameOver));
                    *stage = GameStage::GameOver(GameOverReason::OutOfLives);
                }
            }
        }
    }

    for event in events.read() {
        match *event {
            GameEvent::PlayerKilled { ghost } if *stage == GameStage::Playing => {
                set_timers_paused(&mut timers, ghosts.iter_mut().map(|(.., retreat)| retreat), true);

                let outcome = match player.single_mut() {
                    Ok((.., mut lives, _)) if lives.0 > 0 => {
                        lives.0 -= 1;
                        LifeOutcome::Continue
                    }
                    _ => LifeOutcome::GameOver,
                };
                info!(ghost = ghost.as_ref(), ?outcome, "Player died");

                audio.write(AudioEvent::Stop(Sound::Siren));
                audio.write(AudioEvent::Stop(Sound::ScaredSiren));
                audio.write(AudioEvent::Play(Sound::Death));
                *stage = GameStage::Dying {
                    remaining_ticks: config.death_animation_ticks,
                    outcome,
                };
            }
            GameEvent::TimeUp if matches!(*stage, GameStage::Playing | GameStage::Dying { .. }) => {
                set_timers_paused(&mut timers, ghosts.iter_mut().map(|(.., retreat)| retreat), true);
                info!(score = vars.score, "Time is up");

                audio.write(AudioEvent::StopAll);
                audio.write(AudioEvent::Play(Sound::GameOver));
                *stage = GameStage::GameOver(GameOverReason::TimeUp);
            }
            GameEvent::BoardCleared => {
                debug!(score = vars.score, "Board refilled");
            }
            _ => {}
        }
    }
}

/// Counts simulated frames.
pub fn frame_system(mut vars: ResMut<GameVariables>) {
    vars.frame += 1;
}
