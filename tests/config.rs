use std::time::Duration;

use figment::Jail;
use pacman_promo::config::{figment, Config, GameConfig};
use pretty_assertions::assert_eq;

#[test]
fn test_defaults_without_environment() {
    Jail::expect_with(|_jail| {
        let config: Config = figment().extract()?;

        assert_eq!(config, Config::default());
        assert_eq!(config.game.game_duration, Duration::from_secs(60));
        assert_eq!(config.game.starting_lives, 0);
        Ok(())
    });
}

#[test]
fn test_environment_overrides() {
    Jail::expect_with(|jail| {
        jail.set_env("PACMAN_GAME_DURATION_MS", "30000");
        jail.set_env("PACMAN_STARTING_LIVES", "2");
        jail.set_env("PACMAN_SEED", "42");
        jail.set_env("PACMAN_USERNAME", "alice");

        let config: Config = figment().extract()?;

        assert_eq!(
            config.game,
            GameConfig {
                game_duration: Duration::from_secs(30),
                starting_lives: 2,
                ..GameConfig::default()
            }
        );
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.store, None);
        Ok(())
    });
}

#[test]
fn test_numeric_username_is_kept_as_text() {
    Jail::expect_with(|jail| {
        jail.set_env("PACMAN_USERNAME", "1337");

        let config: Config = figment().extract()?;
        assert_eq!(config.username.as_deref(), Some("1337"));
        Ok(())
    });
}

#[test]
fn test_store_configuration() {
    Jail::expect_with(|jail| {
        jail.set_env("PACMAN_STORE_URL", "https://example.supabase.co/");
        jail.set_env("PACMAN_STORE_API_KEY", "anon-key");
        jail.set_env("PACMAN_STORE_TIMEOUT_SECONDS", "2");

        let config: Config = figment().extract()?;
        let store = config.store.expect("store is configured");

        assert_eq!(store.url, "https://example.supabase.co");
        assert_eq!(store.api_key, "anon-key");
        assert_eq!(store.scores_table, "scores");
        assert_eq!(store.participants_table, "participants");
        assert_eq!(store.timeout, Duration::from_secs(2));
        Ok(())
    });
}

#[test]
fn test_half_configured_store_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("PACMAN_STORE_URL", "https://example.supabase.co");

        let error = figment().extract::<Config>().unwrap_err().to_string();
        assert!(error.contains("PACMAN_STORE_API_KEY is missing"), "{error}");
        Ok(())
    });
}

#[test]
fn test_zero_duration_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("PACMAN_SCARED_DURATION_MS", "0");

        let error = figment().extract::<Config>().unwrap_err().to_string();
        assert!(error.contains("PACMAN_SCARED_DURATION_MS must be greater than zero"), "{error}");
        Ok(())
    });
}
