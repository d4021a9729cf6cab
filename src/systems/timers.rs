use std::time::Duration;

use bevy_ecs::{
    change_detection::Mut,
    event::EventWriter,
    query::Without,
    resource::Resource,
    system::{Query, ResMut},
};
use tracing::{debug, info};

use crate::{
    audio::Sound,
    clock::SharedClock,
    config::GameConfig,
    events::GameEvent,
    systems::{
        audio::AudioEvent,
        components::{Ghost, PlayerControlled, RetreatTimer, Velocity},
        ghost::{transition_ghost, GhostSprite, GhostState, GhostTransition},
    },
    timer::PausableTimer,
};

/// The phase of the ghost behaviour cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Patrol,
    Chase,
}

/// Session-wide countdowns.
#[derive(Resource, Debug, Clone)]
pub struct GameTimers {
    /// Time left in the session.
    pub game: PausableTimer,
    /// Time left before scared ghosts calm down.
    pub scared: PausableTimer,
    /// Time left in the current behaviour phase.
    pub cycle: PausableTimer,
    pub phase: CyclePhase,
    patrol_phase: Duration,
    chase_phase: Duration,
}

impl GameTimers {
    pub fn new(clock: &SharedClock, config: &GameConfig) -> Self {
        Self {
            game: PausableTimer::new(clock.clone(), config.game_duration),
            scared: PausableTimer::new(clock.clone(), config.scared_duration),
            cycle: PausableTimer::new(clock.clone(), config.patrol_phase),
            phase: CyclePhase::Patrol,
            patrol_phase: config.patrol_phase,
            chase_phase: config.chase_phase,
        }
    }

    /// Whether ghosts that return to normal should chase.
    pub fn chasing(&self) -> bool {
        self.phase == CyclePhase::Chase
    }

    /// Moves the behaviour cycle to its next phase and starts timing it.
    pub fn advance_phase(&mut self) -> CyclePhase {
        let (phase, duration) = match self.phase {
            CyclePhase::Patrol => (CyclePhase::Chase, self.chase_phase),
            CyclePhase::Chase => (CyclePhase::Patrol, self.patrol_phase),
        };
        self.phase = phase;
        self.cycle.set_duration(duration);
        self.cycle.start();
        phase
    }

    pub fn pause_all(&mut self) {
        self.game.pause();
        self.scared.pause();
        self.cycle.pause();
    }

    /// Resumes only the countdowns a pause actually stopped.
    pub fn resume_all(&mut self) {
        for timer in [&mut self.game, &mut self.scared, &mut self.cycle] {
            if timer.is_paused() {
                timer.resume();
            }
        }
    }

    /// Back to the state of a fresh session: nothing running, patrol phase first.
    pub fn reset_all(&mut self) {
        self.phase = CyclePhase::Patrol;
        self.cycle.set_duration(self.patrol_phase);
        self.game.reset();
        self.scared.reset();
        self.cycle.reset();
    }
}

/// Polls every countdown and applies whatever expired.
pub fn timer_system(
    mut timers: ResMut<GameTimers>,
    mut ghosts: Query<
        (
            &Ghost,
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
    if timers.game.poll() {
        info!("Game timer expired");
        events.write(GameEvent::TimeUp);
    }

    if timers.cycle.poll() {
        let phase = timers.advance_phase();
        let chasing = phase == CyclePhase::Chase;
        debug!(?phase, "Ghost behaviour phase changed");
        for (_, mut state, mut velocity, mut sprite, _) in ghosts.iter_mut() {
            transition_ghost(&mut state, &mut velocity, &mut sprite, GhostTransition::Chase(chasing));
        }
    }

    let chasing = timers.chasing();

    if timers.scared.poll() {
        debug!("Scared window ended");
        for (_, mut state, mut velocity, mut sprite, _) in ghosts.iter_mut() {
            transition_ghost(&mut state, &mut velocity, &mut sprite, GhostTransition::Calm { chasing });
        }
        audio.write(AudioEvent::Stop(Sound::ScaredSiren));
        audio.write(AudioEvent::Play(Sound::Siren));
    }

    for (ghost, mut state, mut velocity, mut sprite, mut retreat) in ghosts.iter_mut() {
        if retreat.0.poll() && transition_ghost(&mut state, &mut velocity, &mut sprite, GhostTransition::Revive { chasing }) {
            debug!(ghost = ghost.as_ref(), "Ghost revived");
        }
    }
}

/// Pauses or resumes every running countdown, including each ghost's retreat timer.
pub fn set_timers_paused<'a>(
    timers: &mut GameTimers,
    retreat_timers: impl Iterator<Item = Mut<'a, RetreatTimer>>,
    paused: bool,
) {
    if paused {
        timers.pause_all();
    } else {
        timers.resume_all();
    }

    for mut retreat in retreat_timers {
        if paused {
            retreat.0.pause();
        } else if retreat.0.is_paused() {
            retreat.0.resume();
        }
    }
}
