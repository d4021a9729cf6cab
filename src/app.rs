use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::{AudioSubsystem, EventPump, Sdl};
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SharedClock, SystemClock},
    config::Config,
    constants::{CANVAS_SIZE, LOOP_TIME},
    events::GameCommand,
    game::{Game, Services},
    hud,
    identity::Identity,
    input::{Bindings, GamepadPoller, Key},
    leaderboard::{MemoryScoreStore, RestScoreStore, ScoreStore},
    platform::{self, Gamepads, MixerAudio, SdlSurface, SOUND_DIRECTORY},
    systems::state::GameStage,
};

/// Main application wrapper that manages SDL initialization, window lifecycle, and the game loop.
pub struct App {
    pub game: Game,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    gamepads: Gamepads,
    poller: GamepadPoller,
    bindings: Bindings,
    clock: SharedClock,
    focused: bool,
    title: String,
    leaderboard_shown: bool,
    // Keep SDL alive for the app lifetime so subsystems (audio) are not shut down
    _sdl_context: Sdl,
    _audio_subsystem: AudioSubsystem,
}

fn map_keycode(keycode: Keycode) -> Option<Key> {
    Some(match keycode {
        Keycode::Up => Key::Up,
        Keycode::Down => Key::Down,
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        Keycode::W => Key::W,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::D => Key::D,
        Keycode::Escape => Key::Escape,
        Keycode::M => Key::M,
        Keycode::Q => Key::Q,
        _ => return None,
    })
}

/// Picks the hosted store when configured, falling back to an in-process one.
fn build_store(config: &Config) -> Arc<dyn ScoreStore> {
    match &config.store {
        Some(store_config) => match RestScoreStore::new(store_config) {
            Ok(store) => {
                info!(url = %store_config.url, "Using hosted score store");
                Arc::new(store)
            }
            Err(error) => {
                warn!(%error, "Could not create hosted score store, scores will be kept in memory");
                Arc::new(MemoryScoreStore::new())
            }
        },
        None => {
            info!("No score store configured, scores will be kept in memory");
            Arc::new(MemoryScoreStore::new())
        }
    }
}

fn build_identity(config: &Config) -> Option<Identity> {
    let username = config.username.as_deref()?;
    match Identity::new(username) {
        Ok(identity) => Some(identity),
        Err(error) => {
            warn!(%error, "Ignoring configured username, playing anonymously");
            None
        }
    }
}

impl App {
    /// Initializes SDL subsystems, creates the game window and starts a session.
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing SDL2 application");
        let sdl_context = sdl2::init().map_err(|e| anyhow!(e))?;
        let video_subsystem = sdl_context.video().map_err(|e| anyhow!(e))?;
        let audio_subsystem = sdl_context.audio().map_err(|e| anyhow!(e))?;
        let controller_subsystem = sdl_context.game_controller().map_err(|e| anyhow!(e))?;
        let event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;

        let window = video_subsystem
            .window("Pac-Man", CANVAS_SIZE.x, CANVAS_SIZE.y)
            .resizable()
            .position_centered()
            .build()?;

        let mut canvas = window.into_canvas().accelerated().build()?;
        canvas.set_logical_size(CANVAS_SIZE.x, CANVAS_SIZE.y)?;
        debug!(renderer_info = ?canvas.info(), "Canvas renderer initialized");

        let clock = SystemClock::shared();
        let services = Services {
            clock: clock.clone(),
            store: build_store(config),
            audio: Box::new(MixerAudio::new(SOUND_DIRECTORY)),
            player: build_identity(config),
        };

        let mut game = Game::new(config, services)?;
        game.start()?;

        Ok(Self {
            game,
            canvas,
            event_pump,
            gamepads: Gamepads::new(controller_subsystem),
            poller: GamepadPoller::default(),
            bindings: Bindings::default(),
            clock,
            focused: true,
            title: String::new(),
            leaderboard_shown: false,
            _sdl_context: sdl_context,
            _audio_subsystem: audio_subsystem,
        })
    }

    fn handle_events(&mut self) {
        let events: Vec<Event> = self.event_pump.poll_iter().collect();
        for event in events {
            match event {
                Event::Quit { .. } => self.game.send(GameCommand::Exit),
                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::Hidden | WindowEvent::Minimized => {
                        debug!("Window hidden");
                        self.game.send(GameCommand::SetVisibility(false));
                    }
                    WindowEvent::Shown | WindowEvent::Restored => {
                        debug!("Window shown");
                        self.game.send(GameCommand::SetVisibility(true));
                    }
                    WindowEvent::FocusGained => self.focused = true,
                    WindowEvent::FocusLost => self.focused = false,
                    _ => {}
                },
                Event::ControllerDeviceAdded { .. } | Event::ControllerDeviceRemoved { .. } => {
                    self.gamepads.refresh();
                }
                Event::KeyDown {
                    keycode: Some(Keycode::R),
                    repeat: false,
                    ..
                } if matches!(self.game.stage(), GameStage::GameOver(_)) => {
                    if let Err(error) = self.game.restart() {
                        warn!(%error, "Restart failed");
                    }
                }
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    if let Some(command) = map_keycode(keycode).and_then(|key| self.bindings.command_for(key)) {
                        self.game.send(command);
                    }
                }
                _ => {}
            }
        }

        if let Some(state) = self.gamepads.state() {
            if let Some(command) = self.poller.poll(&state, self.clock.now()) {
                self.game.send(command);
            }
        }
    }

    fn present(&mut self) {
        self.game.draw(&mut SdlSurface::new(&mut self.canvas));
        self.canvas.present();

        let title = format!("Pac-Man  |  {}", self.game.status_line());
        if title != self.title {
            if let Err(error) = self.canvas.window_mut().set_title(&title) {
                debug!(%error, "Could not update window title");
            }
            self.title = title;
        }

        // Printed once per finished session
        let view = self.game.leaderboard_view();
        if let Some(view) = view.filter(|_| !self.leaderboard_shown) {
            for line in hud::leaderboard_lines(view) {
                info!("{line}");
            }
            info!("Press R to play again");
        }
        self.leaderboard_shown = view.is_some();
    }

    /// Executes a single frame of the game loop with consistent timing.
    ///
    /// Returns `false` once the game requested exit.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        self.handle_events();
        if self.game.tick() {
            return false;
        }
        self.present();

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                platform::sleep(time, self.focused);
            }
        } else {
            debug!(behind = ?(start.elapsed() - LOOP_TIME), "Game loop behind schedule");
        }

        true
    }
}
