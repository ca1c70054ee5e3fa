//! Fire-and-forget sound playback owned by the host session.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::UserSettings;

/// Named sound cues games can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    Click,
    Success,
    Fail,
    Pop,
    Explode,
}

impl Sound {
    pub const ALL: [Sound; 5] = [
        Sound::Click,
        Sound::Success,
        Sound::Fail,
        Sound::Pop,
        Sound::Explode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sound::Click => "click",
            Sound::Success => "success",
            Sound::Fail => "fail",
            Sound::Pop => "pop",
            Sound::Explode => "explode",
        }
    }

    /// Asset path the platform player loads for this cue.
    pub fn asset_path(self) -> String {
        format!("/assets/audio/{}.mp3", self.name())
    }
}

/// Failure reported by an [`AudioSink`]. Never surfaced past [`AudioContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    Unavailable,
    Playback(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Unavailable => write!(f, "audio output unavailable"),
            AudioError::Playback(e) => write!(f, "playback failed: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Platform audio output.
pub trait AudioSink: Send {
    fn play(&mut self, sound: Sound) -> Result<(), AudioError>;
    fn stop(&mut self) {}
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _sound: Sound) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Records cues into a shared log so tests can inspect what was played.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    played: Arc<Mutex<Vec<Sound>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every `play` fails after recording the attempt.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Handle onto the log that survives moving the sink into a context.
    pub fn log(&self) -> Arc<Mutex<Vec<Sound>>> {
        Arc::clone(&self.played)
    }

    pub fn played(&self) -> Vec<Sound> {
        self.played.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, sound: Sound) -> Result<(), AudioError> {
        if let Ok(mut log) = self.played.lock() {
            log.push(sound);
        }
        if self.fail {
            return Err(AudioError::Unavailable);
        }
        Ok(())
    }
}

/// Explicit audio state for one host lifetime.
pub struct AudioContext {
    sound_enabled: bool,
    music_enabled: bool,
    sink: Option<Box<dyn AudioSink>>,
}

impl fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioContext")
            .field("sound_enabled", &self.sound_enabled)
            .field("music_enabled", &self.music_enabled)
            .field("active", &self.sink.is_some())
            .finish()
    }
}

impl AudioContext {
    /// Open a context on `sink`, honouring the stored toggles.
    pub fn init(sink: Box<dyn AudioSink>, settings: &UserSettings) -> Self {
        Self {
            sound_enabled: settings.sound,
            music_enabled: settings.music,
            sink: Some(sink),
        }
    }

    /// A context that never plays anything.
    pub fn silent() -> Self {
        Self {
            sound_enabled: false,
            music_enabled: false,
            sink: None,
        }
    }

    /// Stop output and release the sink. Later `play` calls do nothing.
    pub fn teardown(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.stop();
        }
    }

    pub fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
    }

    /// Play `sound` if enabled. Sink errors are logged and swallowed.
    pub fn play(&mut self, sound: Sound) {
        if !self.sound_enabled {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.play(sound) {
            debug!(sound = sound.name(), error = %e, "sound playback failed");
        }
    }
}
