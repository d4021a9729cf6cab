//! Audio system forwarding gameplay sound requests to the session's [`AudioSink`].
//!
//! Sinks may wrap thread-bound device handles (SDL2_mixer is main-thread only), so the
//! sink lives in a `NonSend` resource.

use bevy_ecs::{
    event::{Event, EventReader},
    resource::Resource,
    system::{NonSendMut, Res},
};
use tracing::{debug, trace};

use crate::audio::{AudioSink, Sound};

/// Resource for tracking audio state
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioState {
    /// Whether audio is currently muted
    pub muted: bool,
}

/// Sound requests raised by gameplay.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    Play(Sound),
    Stop(Sound),
    StopAll,
    Pause,
    Resume,
}

/// Non-send resource holding the session's sink.
pub struct AudioResource(pub Box<dyn AudioSink>);

/// System that processes audio events and drives the sink
pub fn audio_system(mut audio: NonSendMut<AudioResource>, state: Res<AudioState>, mut events: EventReader<AudioEvent>) {
    if audio.0.is_muted() != state.muted {
        debug!(muted = state.muted, "Audio mute state changed");
        audio.0.set_muted(state.muted);
    }

    for event in events.read() {
        match *event {
            AudioEvent::Play(sound) => {
                // The sink handles muting itself; loops must still start while muted
                trace!(sound = sound.as_ref(), muted = state.muted, "Playing sound");
                audio.0.play(sound);
            }
            AudioEvent::Stop(sound) => audio.0.stop(sound),
            AudioEvent::StopAll => {
                debug!("Stopping all audio");
                audio.0.stop_all();
            }
            AudioEvent::Pause => {
                debug!("Pausing all audio");
                audio.0.pause_all();
            }
            AudioEvent::Resume => {
                debug!("Resuming all audio");
                audio.0.resume_all();
            }
        }
    }
}
