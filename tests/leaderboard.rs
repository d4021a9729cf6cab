use std::sync::Arc;

use pacman_promo::{
    constants::leaderboard::{DISPLAY_ROWS, PLACEHOLDER_SCORE, PLACEHOLDER_USERNAME},
    error::StoreError,
    identity::Identity,
    leaderboard::{pad_rows, Leaderboard, MemoryScoreStore, SaveOutcome, ScoreStore, SkipReason, UsernameCheck},
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn alice() -> Identity {
    Identity::new("alice").unwrap()
}

#[test]
fn test_pad_rows_fills_with_placeholders() {
    let rows = pad_rows(&[common::entry("blinky", 3_000), common::entry("pinky", 1_200)]);

    assert_that(&rows).has_length(DISPLAY_ROWS);
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[0].username, "blinky");
    assert_eq!(rows[1].score, "1200");
    for (index, row) in rows.iter().enumerate().skip(2) {
        assert_eq!(row.rank, index + 1);
        assert_eq!(row.username, PLACEHOLDER_USERNAME);
        assert_eq!(row.score, PLACEHOLDER_SCORE);
    }
}

#[test]
fn test_pad_rows_truncates_long_lists() {
    let entries: Vec<_> = (0..8).map(|i| common::entry(&format!("p{i}"), 100 - i)).collect();
    let rows = pad_rows(&entries);

    assert_that(&rows).has_length(DISPLAY_ROWS);
    assert_eq!(rows[DISPLAY_ROWS - 1].username, format!("p{}", DISPLAY_ROWS - 1));
}

#[test]
fn test_anonymous_and_zero_scores_skip_the_store() {
    let mut store = common::MockStore::new();
    store.expect_save_score().never();
    let leaderboard = Leaderboard::new(Arc::new(store));

    assert_that(&leaderboard.save_score(None, 900)).is_equal_to(SaveOutcome::Skipped(SkipReason::Anonymous));
    assert_that(&leaderboard.save_score(Some(&alice()), 0)).is_equal_to(SaveOutcome::Skipped(SkipReason::NoScore));
}

#[test]
fn test_save_failure_is_reported() {
    let mut store = common::MockStore::new();
    store.expect_save_score().times(1).returning(|_, _| {
        Err(StoreError::Status {
            status: 401,
            body: "Invalid API key".into(),
        })
    });
    let leaderboard = Leaderboard::new(Arc::new(store));

    let outcome = leaderboard.save_score(Some(&alice()), 300);
    assert!(matches!(&outcome, SaveOutcome::Failed(error) if error.contains("401")));
    assert!(outcome.to_string().starts_with("Could not save score"));
}

#[test]
fn test_check_username() {
    let mut store = common::MockStore::new();
    store
        .expect_username_exists()
        .withf(|username| username == "taken")
        .returning(|_| Ok(true));
    store
        .expect_username_exists()
        .withf(|username| username == "fresh")
        .returning(|_| Ok(false));
    store
        .expect_username_exists()
        .withf(|username| username == "other")
        .returning(|_| Err(StoreError::Unavailable("timeout".into())));
    let leaderboard = Leaderboard::new(Arc::new(store));

    assert_that(&leaderboard.check_username("taken")).is_equal_to(UsernameCheck::Taken);
    assert_that(&leaderboard.check_username("fresh")).is_equal_to(UsernameCheck::Available);
    assert!(matches!(
        leaderboard.check_username("other"),
        UsernameCheck::Unavailable(error) if error.contains("timeout")
    ));
}

#[test]
fn test_close_session_with_fetch_error() {
    let mut store = common::MockStore::new();
    store
        .expect_save_score()
        .returning(|username, score| Ok(common::entry(username, score)));
    store
        .expect_top_scores()
        .withf(|limit| *limit == DISPLAY_ROWS)
        .returning(|_| Err(StoreError::Unavailable("connection refused".into())));
    let leaderboard = Leaderboard::new(Arc::new(store));

    let view = leaderboard.close_session(Some(&alice()), 740);

    assert_that(&view.final_score).is_equal_to(740);
    assert_that(&view.save_status).is_equal_to(SaveOutcome::Saved(common::entry("alice", 740)));
    assert_that(&view.rows).is_equal_to(pad_rows(&[]));
    assert!(view.error.as_deref().is_some_and(|error| error.contains("connection refused")));
}

#[test]
fn test_memory_store_orders_by_score() {
    let store = MemoryScoreStore::new();
    for (username, score) in [("clyde", 50), ("inky", 900), ("sue", 900), ("pinky", 300)] {
        store.save_score(username, score).unwrap();
    }

    let top: Vec<_> = store
        .top_scores(3)
        .unwrap()
        .into_iter()
        .map(|entry| (entry.username, entry.score))
        .collect();

    // Equal scores keep submission order
    assert_eq!(
        top,
        vec![("inky".to_string(), 900), ("sue".to_string(), 900), ("pinky".to_string(), 300)]
    );
    assert_that(&store.len()).is_equal_to(4);
}

#[test]
fn test_memory_store_usernames_ignore_case() {
    let store = MemoryScoreStore::new();
    store.register("Alice");

    assert_that(&store.username_exists("alice").unwrap()).is_true();
    assert_that(&store.username_exists("bob").unwrap()).is_false();
}

#[test]
fn test_leaderboard_over_memory_store() {
    let store = Arc::new(MemoryScoreStore::with_entries([common::entry("blinky", 2_000)]));
    let leaderboard = Leaderboard::new(store.clone());

    let view = leaderboard.close_session(Some(&alice()), 2_500);

    assert_eq!(view.rows[0].username, "alice");
    assert_eq!(view.rows[1].username, "blinky");
    assert_that(&view.error).is_none();
    assert_that(&store.len()).is_equal_to(2);
}
