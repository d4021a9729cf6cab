use std::sync::Arc;
use std::time::Duration;

use pacman_promo::{
    config::{Config, GameConfig},
    constants::leaderboard::{DISPLAY_ROWS, PLACEHOLDER_USERNAME},
    error::{GameError, StoreError},
    events::GameCommand,
    identity::Identity,
    leaderboard::{MemoryScoreStore, SaveOutcome, SkipReason},
    map::direction::Direction,
    systems::{
        audio::AudioState,
        components::{Eaten, GameVariables, Ghost, Lives, Position},
        ghost::GhostState,
        state::{GameOverReason, GameStage, LifeOutcome},
        timers::GameTimers,
    },
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn is_over(game: &pacman_promo::game::Game) -> bool {
    matches!(game.stage(), GameStage::GameOver(_))
}

/// Puts Blinky on the player and runs the frame in which it is caught.
fn kill_player(game: &mut pacman_promo::game::Game) {
    common::park_ghosts(game.world_mut());
    common::put_ghost_on_player(game.world_mut(), Ghost::Blinky);
    game.tick();
}

fn variables(game: &pacman_promo::game::Game) -> &GameVariables {
    game.world().resource::<GameVariables>()
}

fn timers(game: &pacman_promo::game::Game) -> &GameTimers {
    game.world().resource::<GameTimers>()
}

#[test]
fn test_new_session_waits_in_setup() {
    let (mut game, _clock) = common::create_game(&common::test_config(), Arc::new(MemoryScoreStore::new()), None);

    assert_that(&game.stage()).is_equal_to(GameStage::Setup);
    assert_that(&timers(&game).game.is_running()).is_false();

    game.tick();
    assert_that(&variables(&game).frame).is_equal_to(0);
    assert_eq!(game.status_line(), "SCORE 0   TIME 01:00   READY!");
}

#[test]
fn test_start_only_from_setup() {
    let (mut game, _clock, _store) = common::started_game();

    assert_that(&game.stage()).is_equal_to(GameStage::Playing);
    assert_that(&timers(&game).game.is_running()).is_true();
    assert_that(&timers(&game).cycle.is_running()).is_true();
    assert_that(&variables(&game).start_time).is_some();

    assert!(matches!(game.start(), Err(GameError::InvalidState(_))));
    assert!(matches!(game.restart(), Err(GameError::InvalidState(_))));
}

#[test]
fn test_fatal_hit_without_lives_ends_session() {
    let (mut game, _clock, store) = common::started_game();
    game.tick();

    kill_player(&mut game);
    assert!(matches!(
        game.stage(),
        GameStage::Dying {
            outcome: LifeOutcome::GameOver,
            ..
        }
    ));
    assert_that(&game.leaderboard_view()).is_none();

    common::tick_until(&mut game, 10, is_over);
    assert_that(&game.stage()).is_equal_to(GameStage::GameOver(GameOverReason::OutOfLives));

    let view = game.leaderboard_view().expect("view is built on game over");
    assert_that(&view.save_status).is_equal_to(SaveOutcome::Skipped(SkipReason::Anonymous));
    assert_that(&view.rows).has_length(DISPLAY_ROWS);
    assert_that(&view.error).is_none();
    assert_that(&store.is_empty()).is_true();
}

#[test]
fn test_registered_player_without_score_is_not_saved() {
    let store = Arc::new(MemoryScoreStore::new());
    let player = Identity::new("alice").unwrap();
    let (mut game, _clock) = common::create_game(&common::test_config(), store.clone(), Some(player));
    game.start().unwrap();

    kill_player(&mut game);
    common::tick_until(&mut game, 10, is_over);

    let view = game.leaderboard_view().unwrap();
    assert_that(&view.save_status).is_equal_to(SaveOutcome::Skipped(SkipReason::NoScore));
    assert_that(&store.is_empty()).is_true();
}

#[test]
fn test_final_score_is_saved_once() {
    let mut store = common::MockStore::new();
    store
        .expect_save_score()
        .withf(|username, score| username == "alice" && *score == 500)
        .times(1)
        .returning(|username, score| Ok(common::entry(username, score)));
    store
        .expect_top_scores()
        .times(1)
        .returning(|_| Ok(vec![common::entry("alice", 500), common::entry("bob", 120)]));

    let player = Identity::new("alice").unwrap();
    let (mut game, _clock) = common::create_game(&common::test_config(), Arc::new(store), Some(player));
    game.start().unwrap();
    game.world_mut().resource_mut::<GameVariables>().score = 500;

    kill_player(&mut game);
    common::tick_until(&mut game, 10, is_over);
    // Further frames must not submit again
    for _ in 0..5 {
        game.tick();
    }

    let view = game.leaderboard_view().unwrap();
    assert_that(&view.final_score).is_equal_to(500);
    assert_that(&view.save_status).is_equal_to(SaveOutcome::Saved(common::entry("alice", 500)));
    assert_eq!(view.rows[0].username, "alice");
    assert_eq!(view.rows[1].score, "120");
    assert_eq!(view.rows[2].username, PLACEHOLDER_USERNAME);
    assert_eq!(game.status_line(), "SCORE 500   TIME 01:00   GAME OVER");
}

#[test]
fn test_store_failures_still_produce_a_view() {
    let mut store = common::MockStore::new();
    store
        .expect_save_score()
        .returning(|_, _| Err(StoreError::Unavailable("offline".into())));
    store
        .expect_top_scores()
        .returning(|_| Err(StoreError::Status {
            status: 503,
            body: "maintenance".into(),
        }));

    let player = Identity::new("alice").unwrap();
    let (mut game, _clock) = common::create_game(&common::test_config(), Arc::new(store), Some(player));
    game.start().unwrap();
    game.world_mut().resource_mut::<GameVariables>().score = 90;

    kill_player(&mut game);
    common::tick_until(&mut game, 10, is_over);

    let view = game.leaderboard_view().unwrap();
    assert!(matches!(&view.save_status, SaveOutcome::Failed(error) if error.contains("offline")));
    assert!(view.error.as_deref().is_some_and(|error| error.contains("maintenance")));
    assert!(view.rows.iter().all(|row| row.username == PLACEHOLDER_USERNAME));
}

#[test]
fn test_spare_life_resumes_play_from_spawn() {
    let config = Config {
        game: GameConfig {
            starting_lives: 1,
            death_animation_ticks: 3,
            ..GameConfig::default()
        },
        seed: Some(7),
        ..Config::default()
    };
    let (mut game, clock) = common::create_game(&config, Arc::new(MemoryScoreStore::new()), None);
    game.start().unwrap();
    game.world_mut().resource_mut::<GameVariables>().kill_count = 2;

    for _ in 0..10 {
        game.tick();
    }
    let spawn = common::player_position(game.world_mut());

    kill_player(&mut game);
    assert!(matches!(
        game.stage(),
        GameStage::Dying {
            outcome: LifeOutcome::Continue,
            ..
        }
    ));
    assert_that(&timers(&game).game.is_paused()).is_true();

    // The clock does not run down while dying
    clock.advance_ms(1_000);
    common::tick_until(&mut game, 10, |game| game.stage() == GameStage::Playing);

    let world = game.world_mut();
    let player = common::player_entity(world);
    assert_that(&world.get::<Lives>(player).unwrap().0).is_equal_to(0);
    assert_that(&common::player_position(world)).is_equal_to(spawn);
    assert_that(&common::ghost_state(world, Ghost::Blinky)).is_equal_to(GhostState::Normal { chasing: false });
    assert_that(&world.resource::<GameVariables>().kill_count).is_equal_to(0);

    let timers = world.resource::<GameTimers>();
    assert_that(&timers.game.is_paused()).is_false();
    assert_that(&timers.game.remaining()).is_equal_to(Duration::from_secs(60));
}

#[test]
fn test_time_up_ends_session() {
    let (mut game, clock, _store) = common::started_game();
    common::park_ghosts(game.world_mut());

    clock.advance(Duration::from_secs(60));
    game.tick();

    assert_that(&game.stage()).is_equal_to(GameStage::GameOver(GameOverReason::TimeUp));
    assert_that(&game.leaderboard_view()).is_some();
}

#[test]
fn test_restart_begins_fresh_session() {
    let (mut game, clock, _store) = common::started_game();
    game.send(GameCommand::MovePlayer(Direction::Left));
    common::tick_until(&mut game, 30, |game| variables(game).score > 0);

    clock.advance(Duration::from_secs(60));
    game.tick();
    assert!(is_over(&game));
    let final_score = game.leaderboard_view().unwrap().final_score;
    assert_that(&final_score).is_greater_than(0);

    game.restart().unwrap();

    assert_that(&game.stage()).is_equal_to(GameStage::Playing);
    assert_that(&game.leaderboard_view()).is_none();
    assert_that(&variables(&game).score).is_equal_to(0);
    assert_that(&variables(&game).last_key).is_none();
    assert_that(&timers(&game).game.remaining()).is_equal_to(Duration::from_secs(60));

    let world = game.world_mut();
    let uneaten = world.query::<&Eaten>().iter(world).all(|eaten| !eaten.0);
    assert_that(&uneaten).is_true();
}

#[test]
fn test_move_player_only_while_playing() {
    let (mut game, _clock) = common::create_game(&common::test_config(), Arc::new(MemoryScoreStore::new()), None);
    game.send(GameCommand::MovePlayer(Direction::Left));
    game.tick();
    assert_that(&variables(&game).last_key).is_none();

    game.start().unwrap();
    let start = common::player_position(game.world_mut());
    game.send(GameCommand::MovePlayer(Direction::Left));
    game.tick();

    assert_that(&variables(&game).last_key).is_equal_to(Some(Direction::Left));
    assert_that(&common::player_position(game.world_mut()).x).is_less_than(start.x);
}

#[test]
fn test_pause_freezes_the_session() {
    let (mut game, clock, _store) = common::started_game();
    common::park_ghosts(game.world_mut());
    game.tick();
    let frame = variables(&game).frame;

    game.send(GameCommand::TogglePause);
    game.tick();
    assert_that(&variables(&game).paused()).is_true();
    assert_that(&timers(&game).game.is_paused()).is_true();

    clock.advance(Duration::from_secs(90));
    game.tick();
    assert_that(&variables(&game).frame).is_equal_to(frame);
    assert_that(&game.stage()).is_equal_to(GameStage::Playing);
    assert_that(&timers(&game).game.remaining()).is_equal_to(Duration::from_secs(60));
    assert!(game.status_line().ends_with("PAUSED"));

    game.send(GameCommand::TogglePause);
    game.tick();
    assert_that(&variables(&game).frame).is_equal_to(frame + 1);
    assert_that(&timers(&game).game.is_paused()).is_false();
}

#[test]
fn test_visibility_never_lifts_manual_pause() {
    let (mut game, _clock, _store) = common::started_game();

    game.send(GameCommand::TogglePause);
    game.send(GameCommand::SetVisibility(false));
    game.tick();
    game.send(GameCommand::SetVisibility(true));
    game.tick();

    assert_that(&variables(&game).paused()).is_true();
    assert_that(&timers(&game).game.is_paused()).is_true();
}

#[test]
fn test_hidden_window_pauses_until_shown() {
    let (mut game, _clock, _store) = common::started_game();

    game.send(GameCommand::SetVisibility(false));
    game.tick();
    assert_that(&timers(&game).game.is_paused()).is_true();

    game.send(GameCommand::SetVisibility(true));
    game.tick();
    assert_that(&variables(&game).paused()).is_false();
    assert_that(&timers(&game).game.is_paused()).is_false();
}

#[test]
fn test_session_started_while_hidden_waits_for_the_window() {
    let (mut game, clock) = common::create_game(&common::test_config(), Arc::new(MemoryScoreStore::new()), None);
    game.send(GameCommand::SetVisibility(false));
    game.tick();

    game.start().unwrap();
    assert_that(&timers(&game).game.is_paused()).is_true();
    assert_that(&timers(&game).cycle.is_paused()).is_true();

    clock.advance(Duration::from_secs(60));
    game.send(GameCommand::SetVisibility(true));
    game.tick();

    assert_that(&game.stage()).is_equal_to(GameStage::Playing);
    assert_that(&variables(&game).frame).is_equal_to(1);
    assert_that(&timers(&game).game.remaining()).is_equal_to(Duration::from_secs(60));
}

#[test]
fn test_unpausing_leaves_idle_countdowns_alone() {
    let (mut game, _clock, _store) = common::started_game();

    game.send(GameCommand::TogglePause);
    game.tick();
    game.send(GameCommand::TogglePause);
    game.tick();

    assert_that(&timers(&game).game.is_running()).is_true();
    assert_that(&timers(&game).scared.is_running()).is_false();
}

#[test]
fn test_pause_holds_death_animation() {
    let (mut game, _clock, _store) = common::started_game();
    kill_player(&mut game);
    let dying = game.stage();

    game.send(GameCommand::TogglePause);
    for _ in 0..10 {
        game.tick();
    }
    assert_that(&game.stage()).is_equal_to(dying);

    // Lifting the pause mid-animation leaves the countdowns frozen
    game.send(GameCommand::TogglePause);
    game.tick();
    assert_that(&timers(&game).game.is_paused()).is_true();

    common::tick_until(&mut game, 10, is_over);
    assert_that(&game.stage()).is_equal_to(GameStage::GameOver(GameOverReason::OutOfLives));
}

#[test]
fn test_pause_is_ignored_outside_a_session() {
    let (mut game, _clock) = common::create_game(&common::test_config(), Arc::new(MemoryScoreStore::new()), None);
    game.send(GameCommand::TogglePause);
    game.tick();

    assert_that(&variables(&game).is_game_paused).is_false();
}

#[test]
fn test_mute_and_exit() {
    let (mut game, _clock, _store) = common::started_game();

    game.send(GameCommand::ToggleMute);
    assert_that(&game.tick()).is_false();
    assert_that(&game.world().resource::<AudioState>().muted).is_true();

    game.send(GameCommand::Exit);
    assert_that(&game.tick()).is_true();
}

#[test]
fn test_ghosts_leave_their_spawns() {
    let (mut game, _clock, _store) = common::started_game();
    let world = game.world_mut();
    let blinky = common::ghost_entity(world, Ghost::Blinky);
    let spawn = world.get::<Position>(blinky).unwrap().0;

    for _ in 0..5 {
        game.tick();
    }

    let moved = game.world().get::<Position>(blinky).unwrap().0;
    assert_that(&moved).is_not_equal_to(spawn);
}
