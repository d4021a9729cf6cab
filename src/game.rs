//! The session orchestrator: owns the ECS world and drives it one frame at a time.

use std::sync::Arc;

use bevy_ecs::{
    event::{EventRegistry, Events},
    query::{With, Without},
    schedule::{IntoScheduleConfigs, Schedule, SystemSet},
    system::Res,
    world::World,
};
use strum::IntoEnumIterator;
use time::OffsetDateTime;
use tracing::{debug, info, trace, warn};

use crate::{
    audio::{AudioSink, Sound},
    clock::SharedClock,
    config::{Config, GameConfig},
    constants::{
        collider::{GHOST_RADIUS, PELLET_RADIUS, PLAYER_RADIUS, POWER_UP_MIN_RADIUS},
        mechanics::PLAYER_SPEED,
        MapTile,
    },
    error::{GameError, GameResult},
    events::{GameCommand, GameEvent},
    hud,
    identity::Identity,
    leaderboard::{Leaderboard, LeaderboardView, ScoreStore},
    map::Board,
    render::{draw_world, RenderSurface},
    systems::{
        audio::{audio_system, AudioEvent, AudioResource, AudioState},
        collision::ghost_collision_system,
        components::{
            Collectible, CollectibleBundle, Collider, Eaten, GameVariables, Ghost, GhostBundle, GhostRng, GlobalState,
            Lives, Mouth, PlayerBundle, PlayerControlled, Position, Pulse, RetreatTimer, SpawnPoint, Velocity,
        },
        ghost::{ghost_movement_system, reset_ghost, GhostSprite, GhostState},
        item::{board_refill_system, pellet_system, power_up_system, pulse_system},
        movement::{player_movement_system, player_steering_system},
        state::{command_system, frame_system, reset_player, stage_system, GameStage},
        timers::{timer_system, GameTimers},
    },
    timer::PausableTimer,
};

/// System set for all gameplay systems to ensure they run after input processing
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Commands from the player and the host window
    Input,
    /// The physics/collision step, only while playing and unpaused
    Update,
    /// Stage transitions in response to gameplay events
    Respond,
    /// Forwarding sound requests to the sink
    Output,
}

/// External collaborators a session needs.
pub struct Services {
    pub clock: SharedClock,
    pub store: Arc<dyn ScoreStore>,
    pub audio: Box<dyn AudioSink>,
    /// The registered player, if any. Anonymous sessions are never saved.
    pub player: Option<Identity>,
}

/// Core game state manager built on the Bevy ECS architecture.
///
/// All session state lives in `world`; `schedule` holds the per-frame systems.
/// The front-end calls [`Game::tick`] once per frame and [`Game::draw`] after it.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
}

impl Game {
    /// Builds a session in the `Setup` stage, with every actor at its spawn.
    ///
    /// # Errors
    ///
    /// Returns `GameError::MapParse` if the built-in board layout is invalid.
    pub fn new(config: &Config, services: Services) -> GameResult<Game> {
        let mut world = World::default();
        let mut schedule = Schedule::default();

        let board = Board::new()?;

        EventRegistry::register_event::<GameEvent>(&mut world);
        EventRegistry::register_event::<AudioEvent>(&mut world);

        world.insert_resource(GameTimers::new(&services.clock, &config.game));
        world.insert_resource(GameVariables::new(services.player));
        world.insert_resource(GhostRng::new(config.seed));
        world.insert_resource(Leaderboard::new(services.store));
        world.insert_resource(config.game.clone());
        world.insert_resource(GameStage::default());
        world.insert_resource(GlobalState { exit: false });
        world.insert_resource(AudioState::default());
        world.insert_non_send_resource(AudioResource(services.audio));

        Self::spawn_player(&mut world, &board, &config.game);
        Self::spawn_ghosts(&mut world, &board, &services.clock, &config.game);
        Self::spawn_collectibles(&mut world, &board);
        world.insert_resource(board);

        Self::configure_schedule(&mut schedule);

        info!(
            seeded = config.seed.is_some(),
            starting_lives = config.game.starting_lives,
            "Game session created"
        );
        Ok(Game { world, schedule })
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule
            .add_systems((
                command_system.in_set(GameplaySet::Input),
                (
                    frame_system,
                    timer_system,
                    player_steering_system,
                    pellet_system,
                    power_up_system,
                    pulse_system,
                    board_refill_system,
                    ghost_movement_system,
                    ghost_collision_system,
                    player_movement_system,
                )
                    .chain()
                    .in_set(GameplaySet::Update),
                stage_system.in_set(GameplaySet::Respond),
                audio_system.in_set(GameplaySet::Output),
            ))
            .configure_sets(
                (
                    GameplaySet::Input,
                    GameplaySet::Update.run_if(|stage: Res<GameStage>, vars: Res<GameVariables>| {
                        *stage == GameStage::Playing && !vars.paused()
                    }),
                    GameplaySet::Respond.run_if(|vars: Res<GameVariables>| !vars.paused()),
                    GameplaySet::Output,
                )
                    .chain(),
            );
    }

    fn spawn_player(world: &mut World, board: &Board, config: &GameConfig) {
        let start = Board::tile_center(board.player_start());
        let player = world
            .spawn(PlayerBundle {
                player: PlayerControlled,
                position: Position(start),
                velocity: Velocity {
                    direction: None,
                    speed: PLAYER_SPEED,
                },
                collider: Collider { radius: PLAYER_RADIUS },
                lives: Lives(config.starting_lives),
                mouth: Mouth::default(),
                spawn: SpawnPoint {
                    position: start,
                    direction: None,
                },
            })
            .id();
        trace!(entity = ?player, ?start, "Spawned player");
    }

    fn spawn_ghosts(world: &mut World, board: &Board, clock: &SharedClock, config: &GameConfig) {
        for (ghost, cell) in Ghost::iter().zip(board.ghost_spawns()) {
            let position = Board::tile_center(cell);
            let direction = ghost.initial_direction();
            let state = GhostState::default();

            let entity = world
                .spawn(GhostBundle {
                    ghost,
                    position: Position(position),
                    velocity: Velocity {
                        direction: Some(direction),
                        speed: state.speed(),
                    },
                    collider: Collider { radius: GHOST_RADIUS },
                    state,
                    sprite: GhostSprite::new(direction),
                    retreat_timer: RetreatTimer(PausableTimer::new(clock.clone(), config.retreat_duration)),
                    spawn: SpawnPoint {
                        position,
                        direction: Some(direction),
                    },
                })
                .id();
            trace!(ghost = ghost.as_ref(), ?entity, ?cell, "Spawned ghost");
        }
    }

    fn spawn_collectibles(world: &mut World, board: &Board) {
        let pellets: Vec<_> = board.cells_of(MapTile::Pellet).collect();
        let power_ups: Vec<_> = board.cells_of(MapTile::PowerUp).collect();
        info!(pellets = pellets.len(), power_ups = power_ups.len(), "Spawning collectibles");

        for cell in pellets {
            world.spawn(CollectibleBundle {
                collectible: Collectible::Pellet,
                position: Position(Board::tile_center(cell)),
                collider: Collider { radius: PELLET_RADIUS },
                eaten: Eaten(false),
            });
        }

        for cell in power_ups {
            world.spawn((
                CollectibleBundle {
                    collectible: Collectible::PowerUp,
                    position: Position(Board::tile_center(cell)),
                    collider: Collider {
                        radius: POWER_UP_MIN_RADIUS,
                    },
                    eaten: Eaten(false),
                },
                Pulse { growing: true },
            ));
        }
    }

    /// Begins play: Setup → Playing.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` when the session is not in `Setup`.
    pub fn start(&mut self) -> GameResult<()> {
        let stage = self.stage();
        if stage != GameStage::Setup {
            return Err(GameError::InvalidState(format!("cannot start a session from {stage:?}")));
        }

        let paused = {
            let mut vars = self.world.resource_mut::<GameVariables>();
            vars.start_time = Some(OffsetDateTime::now_utc());
            vars.paused()
        };
        {
            let mut timers = self.world.resource_mut::<GameTimers>();
            timers.game.start();
            timers.cycle.start();
            // Retreat timers are all idle at the start of a session
            if paused {
                timers.pause_all();
            }
        }
        self.world.insert_resource(GameStage::Playing);
        self.world.send_event(AudioEvent::Play(Sound::GameStart));
        self.world.send_event(AudioEvent::Play(Sound::Siren));
        if paused {
            debug!("Session starts paused while the window is hidden");
            self.world.send_event(AudioEvent::Pause);
        }

        info!(
            player = self.world.resource::<GameVariables>().player.as_ref().map(Identity::username),
            "Session started"
        );
        Ok(())
    }

    /// Starts a fresh session after the previous one ended.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` unless the session is over.
    pub fn restart(&mut self) -> GameResult<()> {
        let stage = self.stage();
        if !matches!(stage, GameStage::GameOver(_)) {
            return Err(GameError::InvalidState(format!("cannot restart a session from {stage:?}")));
        }

        self.world.remove_resource::<LeaderboardView>();
        self.world.insert_resource(GameStage::Setup);
        debug!("Restarting session");
        self.start()
    }

    /// Queues a command for the next tick.
    pub fn send(&mut self, command: GameCommand) {
        self.world.send_event(GameEvent::Command(command));
    }

    /// Runs one frame. Returns whether the front-end should exit.
    pub fn tick(&mut self) -> bool {
        self.schedule.run(&mut self.world);

        if matches!(self.stage(), GameStage::GameOver(_)) && !self.world.contains_resource::<LeaderboardView>() {
            self.finish_session();
        }

        self.world.resource_mut::<Events<GameEvent>>().update();
        self.world.resource_mut::<Events<AudioEvent>>().update();

        self.world.get_resource::<GlobalState>().is_some_and(|state| state.exit)
    }

    /// Submits the score, builds the leaderboard view and resets every actor,
    /// timer and variable for the next session.
    fn finish_session(&mut self) {
        let (player, score) = {
            let vars = self.world.resource::<GameVariables>();
            (vars.player.clone(), vars.score)
        };
        info!(score, anonymous = player.is_none(), "Session over");

        let view = self.world.resource::<Leaderboard>().close_session(player.as_ref(), score);
        if let Some(error) = &view.error {
            warn!(%error, "Leaderboard shown without live rows");
        }
        self.world.insert_resource(view);

        let starting_lives = self.world.resource::<GameConfig>().starting_lives;

        let mut players = self
            .world
            .query_filtered::<(&SpawnPoint, &mut Position, &mut Velocity, &mut Lives, &mut Mouth), With<PlayerControlled>>();
        for (spawn, mut position, mut velocity, mut lives, mut mouth) in players.iter_mut(&mut self.world) {
            reset_player(spawn, &mut position, &mut velocity, &mut mouth);
            lives.0 = starting_lives;
        }

        let mut ghosts = self.world.query_filtered::<(
            &SpawnPoint,
            &mut Position,
            &mut Velocity,
            &mut GhostState,
            &mut GhostSprite,
            &mut RetreatTimer,
        ), Without<PlayerControlled>>();
        for (spawn, mut position, mut velocity, mut state, mut sprite, mut retreat) in ghosts.iter_mut(&mut self.world) {
            reset_ghost(spawn, &mut position, &mut velocity, &mut state, &mut sprite, &mut retreat);
        }

        let mut items = self.world.query::<(&mut Eaten, &mut Collider, Option<&mut Pulse>)>();
        for (mut eaten, mut collider, pulse) in items.iter_mut(&mut self.world) {
            eaten.0 = false;
            if let Some(mut pulse) = pulse {
                collider.radius = POWER_UP_MIN_RADIUS;
                pulse.growing = true;
            }
        }

        self.world.resource_mut::<GameTimers>().reset_all();
        self.world.resource_mut::<GameVariables>().reset();
    }

    /// Draws the current frame onto `surface`.
    pub fn draw(&mut self, surface: &mut dyn RenderSurface) {
        draw_world(&mut self.world, surface);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn stage(&self) -> GameStage {
        self.world.get_resource::<GameStage>().copied().unwrap_or_default()
    }

    /// The end-of-session view, once the session is over.
    pub fn leaderboard_view(&self) -> Option<&LeaderboardView> {
        self.world.get_resource::<LeaderboardView>()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        self.world.resource::<Leaderboard>()
    }

    /// Score, time left and stage, as one line of text.
    pub fn status_line(&self) -> String {
        let vars = self.world.resource::<GameVariables>();
        let timers = self.world.resource::<GameTimers>();
        let score = match self.leaderboard_view() {
            Some(view) => view.final_score,
            None => vars.score,
        };
        hud::status_line(score, timers.game.remaining(), self.stage(), vars.paused())
    }
}
