#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    query::With,
    world::World,
};
use glam::Vec2;
use mockall::mock;
use pacman_promo::{
    audio::SilentAudio,
    clock::ManualClock,
    config::{Config, GameConfig},
    error::StoreError,
    events::GameEvent,
    game::{Game, Services},
    identity::Identity,
    leaderboard::{LeaderboardEntry, MemoryScoreStore, ScoreStore},
    map::Board,
    systems::{
        audio::AudioEvent,
        components::{
            Collectible, CollectibleBundle, Collider, Eaten, GameVariables, Ghost, GhostBundle, GhostRng, Lives, Mouth,
            PlayerBundle, PlayerControlled, Position, RetreatTimer, SpawnPoint, Velocity,
        },
        ghost::{GhostSprite, GhostState},
        timers::GameTimers,
    },
    timer::PausableTimer,
};

mock! {
    pub Store {}

    impl ScoreStore for Store {
        fn save_score(&self, username: &str, score: u32) -> Result<LeaderboardEntry, StoreError>;
        fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
        fn username_exists(&self, username: &str) -> Result<bool, StoreError>;
    }
}

pub const PLAYER_RADIUS: f32 = 12.0;
pub const GHOST_RADIUS: f32 = 12.0;

pub fn entry(username: &str, score: u32) -> LeaderboardEntry {
    LeaderboardEntry {
        username: username.to_string(),
        score,
        created_at: None,
    }
}

/// A seeded configuration with a short death animation.
pub fn test_config() -> Config {
    Config {
        game: GameConfig {
            death_animation_ticks: 3,
            ..GameConfig::default()
        },
        seed: Some(7),
        ..Config::default()
    }
}

/// A session on a manual clock, silent, with the given store and player.
pub fn create_game(config: &Config, store: Arc<dyn ScoreStore>, player: Option<Identity>) -> (Game, ManualClock) {
    let clock = ManualClock::new();
    let services = Services {
        clock: clock.shared(),
        store,
        audio: Box::new(SilentAudio::default()),
        player,
    };
    let game = Game::new(config, services).expect("game should build");
    (game, clock)
}

/// A started anonymous session backed by an in-memory store.
pub fn started_game() -> (Game, ManualClock, Arc<MemoryScoreStore>) {
    let store = Arc::new(MemoryScoreStore::new());
    let (mut game, clock) = create_game(&test_config(), store.clone(), None);
    game.start().expect("session should start");
    (game, clock, store)
}

pub fn player_entity(world: &mut World) -> Entity {
    world
        .query_filtered::<Entity, With<PlayerControlled>>()
        .single(world)
        .expect("exactly one player")
}

pub fn ghost_entity(world: &mut World, ghost: Ghost) -> Entity {
    world
        .query::<(Entity, &Ghost)>()
        .iter(world)
        .find(|(_, g)| **g == ghost)
        .map(|(entity, _)| entity)
        .expect("ghost should exist")
}

pub fn player_position(world: &mut World) -> Vec2 {
    let player = player_entity(world);
    world.get::<Position>(player).expect("player has a position").0
}

/// Moves `ghost` onto the player and freezes it there.
pub fn put_ghost_on_player(world: &mut World, ghost: Ghost) {
    let target = player_position(world);
    let entity = ghost_entity(world, ghost);
    world.get_mut::<Position>(entity).expect("ghost has a position").0 = target;
    world.get_mut::<Velocity>(entity).expect("ghost has a velocity").direction = None;
}

/// Moves every ghost far away from the player, into the top-left corridor.
pub fn park_ghosts(world: &mut World) {
    let mut ghosts = world.query_filtered::<(&mut Position, &mut Velocity), With<Ghost>>();
    for (mut position, mut velocity) in ghosts.iter_mut(world) {
        position.0 = Board::tile_center(glam::IVec2::new(1, 1));
        velocity.direction = None;
    }
}

pub fn ghost_state(world: &mut World, ghost: Ghost) -> GhostState {
    let entity = ghost_entity(world, ghost);
    *world.get::<GhostState>(entity).expect("ghost has a state")
}

pub fn set_ghost_state(world: &mut World, ghost: Ghost, state: GhostState) {
    let entity = ghost_entity(world, ghost);
    *world.get_mut::<GhostState>(entity).expect("ghost has a state") = state;
}

pub fn tick_until(game: &mut Game, limit: usize, mut done: impl FnMut(&Game) -> bool) -> usize {
    for ticks in 0..limit {
        if done(game) {
            return ticks;
        }
        game.tick();
    }
    assert!(done(game), "condition not reached within {limit} ticks");
    limit
}

/// A bare world with the resources gameplay systems expect, for running systems in isolation.
pub fn create_test_world(clock: &ManualClock) -> World {
    let mut world = World::new();
    EventRegistry::register_event::<GameEvent>(&mut world);
    EventRegistry::register_event::<AudioEvent>(&mut world);

    let config = GameConfig::default();
    world.insert_resource(GameTimers::new(&clock.shared(), &config));
    world.insert_resource(config);
    world.insert_resource(GameVariables::new(None));
    world.insert_resource(GhostRng::new(Some(1)));
    world.insert_resource(Board::new().expect("standard board parses"));
    world
}

pub fn spawn_test_player(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn(PlayerBundle {
            player: PlayerControlled,
            position: Position(position),
            velocity: Velocity {
                direction: None,
                speed: 4.0,
            },
            collider: Collider { radius: PLAYER_RADIUS },
            lives: Lives(0),
            mouth: Mouth::default(),
            spawn: SpawnPoint {
                position,
                direction: None,
            },
        })
        .id()
}

pub fn spawn_test_ghost(world: &mut World, clock: &ManualClock, ghost: Ghost, position: Vec2, state: GhostState) -> Entity {
    let direction = ghost.initial_direction();
    world
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
            retreat_timer: RetreatTimer(PausableTimer::new(clock.shared(), Duration::from_millis(3_000))),
            spawn: SpawnPoint {
                position,
                direction: Some(direction),
            },
        })
        .id()
}

pub fn spawn_test_item(world: &mut World, collectible: Collectible, position: Vec2) -> Entity {
    world
        .spawn(CollectibleBundle {
            collectible,
            position: Position(position),
            collider: Collider { radius: 3.0 },
            eaten: Eaten(false),
        })
        .id()
}

/// Gameplay events written since the last update.
pub fn game_events(world: &World) -> Vec<GameEvent> {
    world
        .resource::<Events<GameEvent>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

pub fn audio_events(world: &World) -> Vec<AudioEvent> {
    world
        .resource::<Events<AudioEvent>>()
        .iter_current_update_events()
        .copied()
        .collect()
}
