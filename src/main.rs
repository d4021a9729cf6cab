use anyhow::Result;
use tracing::info;

use pacman_promo::{app::App, config::load_config, constants::LOOP_TIME, logging::setup_logging};

/// The main entry point of the application.
///
/// Loads configuration from the environment (and a `.env` file, if present),
/// opens the window and runs the game loop until exit is requested.
pub fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    setup_logging();
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = load_config()?;
    let mut app = App::new(&config)?;

    info!(loop_time = ?LOOP_TIME, "Starting game loop");
    while app.run() {}

    info!("Exiting");
    Ok(())
}
