use std::time::Duration;

use glam::Vec2;
use pacman_promo::{
    events::GameCommand,
    input::{Bindings, GamepadPoller, GamepadState, Key},
    map::direction::Direction,
};
use speculoos::prelude::*;

const DEAD_ZONE: f32 = 0.3;

fn stick(x: f32, y: f32) -> GamepadState {
    GamepadState {
        left_stick: Vec2::new(x, y),
        ..GamepadState::default()
    }
}

#[test]
fn test_default_bindings() {
    let bindings = Bindings::default();

    assert_that(&bindings.command_for(Key::Up)).is_equal_to(Some(GameCommand::MovePlayer(Direction::Up)));
    assert_that(&bindings.command_for(Key::A)).is_equal_to(Some(GameCommand::MovePlayer(Direction::Left)));
    assert_that(&bindings.command_for(Key::Escape)).is_equal_to(Some(GameCommand::TogglePause));
    assert_that(&bindings.command_for(Key::M)).is_equal_to(Some(GameCommand::ToggleMute));
    assert_that(&bindings.command_for(Key::Q)).is_equal_to(Some(GameCommand::Exit));
}

#[test]
fn test_rebinding_replaces_command() {
    let mut bindings = Bindings::default();
    bindings.bind(Key::Q, GameCommand::TogglePause);

    assert_that(&bindings.command_for(Key::Q)).is_equal_to(Some(GameCommand::TogglePause));
}

#[test]
fn test_dpad_wins_over_stick() {
    let state = GamepadState {
        dpad_left: true,
        left_stick: Vec2::new(1.0, 0.0),
        ..GamepadState::default()
    };

    assert_that(&state.direction(DEAD_ZONE)).is_equal_to(Some(Direction::Left));
}

#[test]
fn test_stick_dead_zone() {
    assert_that(&stick(0.25, -0.29).direction(DEAD_ZONE)).is_none();
    assert_that(&stick(0.0, -0.31).direction(DEAD_ZONE)).is_equal_to(Some(Direction::Up));
    // Only the axis outside the dead zone counts
    assert_that(&stick(0.2, 0.5).direction(DEAD_ZONE)).is_equal_to(Some(Direction::Down));
}

#[test]
fn test_stick_stronger_axis_decides() {
    assert_that(&stick(-0.9, 0.6).direction(DEAD_ZONE)).is_equal_to(Some(Direction::Left));
    assert_that(&stick(0.5, -0.8).direction(DEAD_ZONE)).is_equal_to(Some(Direction::Up));
}

#[test]
fn test_poller_debounces() {
    let mut poller = GamepadPoller::new(Duration::from_millis(100), DEAD_ZONE);
    let right = stick(1.0, 0.0);

    let at = Duration::from_millis;
    assert_that(&poller.poll(&right, at(1_000))).is_equal_to(Some(GameCommand::MovePlayer(Direction::Right)));
    assert_that(&poller.poll(&right, at(1_050))).is_none();
    assert_that(&poller.poll(&right, at(1_100))).is_some();
}

#[test]
fn test_idle_controller_does_not_consume_window() {
    let mut poller = GamepadPoller::new(Duration::from_millis(100), DEAD_ZONE);

    assert_that(&poller.poll(&GamepadState::default(), Duration::from_millis(10))).is_none();
    assert_that(&poller.poll(&stick(0.0, 1.0), Duration::from_millis(20)))
        .is_equal_to(Some(GameCommand::MovePlayer(Direction::Down)));
}
