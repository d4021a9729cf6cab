//! Sound catalogue and the playback seam used by the game.
//!
//! The game core never talks to an audio device. It emits [`AudioEvent`](crate::systems::audio::AudioEvent)s
//! and a front-end supplies an [`AudioSink`] that turns them into sound.

use strum_macros::{AsRefStr, EnumIter};
use tracing::trace;

/// Every sound the game can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Sound {
    GameStart,
    Waka,
    PowerUp,
    Siren,
    ScaredSiren,
    EatGhost,
    Death,
    GameOver,
}

impl Sound {
    /// Background loops keep playing until stopped.
    pub fn is_looping(self) -> bool {
        matches!(self, Sound::Siren | Sound::ScaredSiren)
    }

    /// Asset file name, e.g. `scared_siren.ogg`.
    pub fn file_name(self) -> String {
        format!("{}.ogg", self.as_ref())
    }
}

/// A device that plays [`Sound`]s.
///
/// Sinks degrade to silence when they cannot play something; they never fail the frame.
pub trait AudioSink {
    fn play(&mut self, sound: Sound);
    fn stop(&mut self, sound: Sound);
    fn stop_all(&mut self);
    fn pause_all(&mut self);
    fn resume_all(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
}

/// A sink that plays nothing. Used headless and when no audio device is available.
#[derive(Debug, Default)]
pub struct SilentAudio {
    muted: bool,
}

impl AudioSink for SilentAudio {
    fn play(&mut self, sound: Sound) {
        trace!(sound = sound.as_ref(), "Silent play");
    }

    fn stop(&mut self, sound: Sound) {
        trace!(sound = sound.as_ref(), "Silent stop");
    }

    fn stop_all(&mut self) {}

    fn pause_all(&mut self) {}

    fn resume_all(&mut self) {}

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}
