//! Desktop platform implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use glam::Vec2;
use sdl2::{
    controller::{Axis, Button, GameController},
    gfx::primitives::DrawRenderer,
    mixer::{self, Channel, Chunk, InitFlag, AUDIO_S16LSB},
    pixels,
    render::Canvas,
    video::Window,
    GameControllerSubsystem,
};
use strum::IntoEnumIterator;
use tracing::{debug, info, trace, warn};

use crate::{
    audio::{AudioSink, Sound},
    input::GamepadState,
    render::{Color, RenderSurface},
};

const AUDIO_FREQUENCY: i32 = 44_100;
const AUDIO_CHANNELS: i32 = 8;
const AUDIO_CHUNK_SIZE: i32 = 256;
const DEFAULT_VOLUME: u8 = 32;

/// Directory sound files are loaded from, relative to the working directory.
pub const SOUND_DIRECTORY: &str = "assets/sounds";

/// Sleeps until the next frame. Spins when focused for accurate pacing.
pub fn sleep(duration: Duration, focused: bool) {
    if focused {
        spin_sleep::sleep(duration);
    } else {
        std::thread::sleep(duration);
    }
}

impl From<Color> for pixels::Color {
    fn from(color: Color) -> Self {
        pixels::Color::RGB(color.r, color.g, color.b)
    }
}

/// Draws onto an SDL canvas with SDL2_gfx primitives.
///
/// Primitive failures are logged and skipped; a frame is never aborted over one shape.
pub struct SdlSurface<'a> {
    canvas: &'a mut Canvas<Window>,
}

impl<'a> SdlSurface<'a> {
    pub fn new(canvas: &'a mut Canvas<Window>) -> Self {
        Self { canvas }
    }

    fn check(result: Result<(), String>, primitive: &'static str) {
        if let Err(error) = result {
            trace!(primitive, %error, "Draw call failed");
        }
    }
}

impl RenderSurface for SdlSurface<'_> {
    fn clear(&mut self, color: Color) {
        self.canvas.set_draw_color(pixels::Color::from(color));
        self.canvas.clear();
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let end = origin + size - Vec2::ONE;
        let result = self.canvas.box_(
            origin.x as i16,
            origin.y as i16,
            end.x as i16,
            end.y as i16,
            pixels::Color::from(color),
        );
        Self::check(result, "box");
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let result = self.canvas.filled_circle(
            center.x as i16,
            center.y as i16,
            radius.round() as i16,
            pixels::Color::from(color),
        );
        Self::check(result, "circle");
    }

    fn fill_pie(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color) {
        // SDL2_gfx angles are degrees, clockwise on a y-down canvas
        let result = self.canvas.filled_pie(
            center.x as i16,
            center.y as i16,
            radius.round() as i16,
            start.to_degrees().round() as i16,
            end.to_degrees().round() as i16,
            pixels::Color::from(color),
        );
        Self::check(result, "pie");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MixerState {
    Enabled { volume: u8 },
    Muted { previous_volume: u8 },
    Disabled,
}

/// SDL2_mixer playback of the game's sounds.
///
/// If the device or every sound fails to load, audio is disabled and all calls
/// silently do nothing. Muting only zeroes the volume, so loops keep their place.
pub struct MixerAudio {
    _mixer_context: Option<mixer::Sdl2MixerContext>,
    sounds: HashMap<Sound, Chunk>,
    channels: HashMap<Sound, Channel>,
    state: MixerState,
}

impl MixerAudio {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        match Self::try_new(directory.as_ref()) {
            Ok(audio) => audio,
            Err(error) => {
                warn!(%error, "Failed to initialize audio, audio will be disabled");
                Self {
                    _mixer_context: None,
                    sounds: HashMap::new(),
                    channels: HashMap::new(),
                    state: MixerState::Disabled,
                }
            }
        }
    }

    fn try_new(directory: &Path) -> Result<Self> {
        mixer::open_audio(AUDIO_FREQUENCY, AUDIO_S16LSB, 2, AUDIO_CHUNK_SIZE)
            .map_err(|e| anyhow!("Failed to open audio: {e}"))?;
        mixer::allocate_channels(AUDIO_CHANNELS);
        Channel::all().set_volume(DEFAULT_VOLUME as i32);

        let mixer_context = mixer::init(InitFlag::OGG).map_err(|e| anyhow!("Failed to initialize SDL2_mixer: {e}"))?;

        let sounds: HashMap<Sound, Chunk> = Sound::iter()
            .filter_map(|sound| {
                let path: PathBuf = directory.join(sound.file_name());
                match Chunk::from_file(&path) {
                    Ok(chunk) => Some((sound, chunk)),
                    Err(error) => {
                        warn!(sound = sound.as_ref(), path = %path.display(), %error, "Failed to load sound");
                        None
                    }
                }
            })
            .collect();

        if sounds.is_empty() {
            return Err(anyhow!("No sounds loaded from {}", directory.display()));
        }
        info!(loaded = sounds.len(), "Audio initialized");

        Ok(Self {
            _mixer_context: Some(mixer_context),
            sounds,
            channels: HashMap::new(),
            state: MixerState::Enabled { volume: DEFAULT_VOLUME },
        })
    }
}

impl AudioSink for MixerAudio {
    fn play(&mut self, sound: Sound) {
        if self.state == MixerState::Disabled {
            return;
        }
        let Some(chunk) = self.sounds.get(&sound) else {
            return;
        };

        if sound.is_looping() && self.channels.get(&sound).is_some_and(|channel| channel.is_playing()) {
            return;
        }

        let loops = if sound.is_looping() { -1 } else { 0 };
        match Channel::all().play(chunk, loops) {
            Ok(channel) => {
                trace!(sound = sound.as_ref(), ?channel, "Playing sound");
                self.channels.insert(sound, channel);
            }
            Err(error) => debug!(sound = sound.as_ref(), %error, "Could not play sound"),
        }
    }

    fn stop(&mut self, sound: Sound) {
        if let Some(channel) = self.channels.remove(&sound) {
            channel.halt();
        }
    }

    fn stop_all(&mut self) {
        if self.state != MixerState::Disabled {
            Channel::all().halt();
        }
        self.channels.clear();
    }

    fn pause_all(&mut self) {
        if self.state != MixerState::Disabled {
            Channel::all().pause();
        }
    }

    fn resume_all(&mut self) {
        if self.state != MixerState::Disabled {
            Channel::all().resume();
        }
    }

    fn set_muted(&mut self, muted: bool) {
        match (muted, self.state) {
            (true, MixerState::Enabled { volume }) => {
                self.state = MixerState::Muted { previous_volume: volume };
                Channel::all().set_volume(0);
            }
            (false, MixerState::Muted { previous_volume }) => {
                self.state = MixerState::Enabled { volume: previous_volume };
                Channel::all().set_volume(previous_volume as i32);
            }
            _ => {}
        }
    }

    fn is_muted(&self) -> bool {
        matches!(self.state, MixerState::Muted { .. })
    }
}

/// The first attached game controller, opened lazily.
pub struct Gamepads {
    subsystem: GameControllerSubsystem,
    active: Option<GameController>,
}

impl Gamepads {
    pub fn new(subsystem: GameControllerSubsystem) -> Self {
        let mut gamepads = Self { subsystem, active: None };
        gamepads.refresh();
        gamepads
    }

    /// Opens the first available controller if none is open. Call on device hot-plug.
    pub fn refresh(&mut self) {
        if self.active.as_ref().is_some_and(GameController::attached) {
            return;
        }
        self.active = None;

        let count = match self.subsystem.num_joysticks() {
            Ok(count) => count,
            Err(error) => {
                warn!(%error, "Could not enumerate joysticks");
                return;
            }
        };

        for index in (0..count).filter(|&index| self.subsystem.is_game_controller(index)) {
            match self.subsystem.open(index) {
                Ok(controller) => {
                    info!(name = controller.name(), "Game controller connected");
                    self.active = Some(controller);
                    return;
                }
                Err(error) => warn!(index, %error, "Could not open game controller"),
            }
        }
    }

    /// Snapshot of the active controller, if any.
    pub fn state(&self) -> Option<GamepadState> {
        let controller = self.active.as_ref()?;
        let axis = |axis: Axis| controller.axis(axis) as f32 / i16::MAX as f32;

        Some(GamepadState {
            dpad_up: controller.button(Button::DPadUp),
            dpad_down: controller.button(Button::DPadDown),
            dpad_left: controller.button(Button::DPadLeft),
            dpad_right: controller.button(Button::DPadRight),
            left_stick: Vec2::new(axis(Axis::LeftX), axis(Axis::LeftY)).clamp(Vec2::NEG_ONE, Vec2::ONE),
        })
    }
}
