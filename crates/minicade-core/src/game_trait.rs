use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::Sound;
use crate::board::Side;
use crate::input::PointerEvent;
use crate::surface::Surface;

pub use crate::clock::EffectId;

/// Host callback invoked with the new score on every score update.
pub type ScoreListener = Box<dyn FnMut(u32) + Send>;

/// Core trait that every minicade game implements.
///
/// The host owns the clock, persistence and audio; the game only handles
/// its own rules, input mapping and drawing.
pub trait GameInstance: Send {
    fn metadata(&self) -> GameMetadata;

    /// Reset to a fresh playable state with score 0. Safe to call repeatedly.
    fn init(&mut self);

    /// Advance by one tick. Terminal games return nothing and change nothing.
    fn update(&mut self) -> Vec<GameEvent> {
        Vec::new()
    }

    /// Render the current state. Must not mutate the simulation.
    fn draw(&self, surface: &mut dyn Surface);

    fn on_input_start(&mut self, _event: &PointerEvent) -> Vec<GameEvent> {
        Vec::new()
    }

    fn on_input_move(&mut self, _event: &PointerEvent) -> Vec<GameEvent> {
        Vec::new()
    }

    fn on_input_end(&mut self, _event: &PointerEvent) -> Vec<GameEvent> {
        Vec::new()
    }

    /// Apply a named assist. Unknown actions do nothing.
    fn cheat(&mut self, action: &str) -> Vec<GameEvent>;

    /// Persistable snapshot: `score` plus game-specific fields.
    fn get_state(&self) -> GameSnapshot;

    /// The host cancels its clock before calling this.
    fn restart(&mut self) {
        self.init();
    }

    /// Fixed tick interval for real-time games; `None` for input-driven ones.
    fn tick_interval(&self) -> Option<Duration> {
        None
    }

    /// Run a deferred effect previously requested with [`GameEvent::Schedule`].
    fn fire_effect(&mut self, _effect: EffectId) -> Vec<GameEvent> {
        Vec::new()
    }

    /// Whether a game-over or win state has been reached.
    fn is_terminal(&self) -> bool;

    fn score(&self) -> u32;

    fn set_score_listener(&mut self, listener: ScoreListener);
}

/// Game metadata shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
}

impl GameMetadata {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
    Winner(Side),
    Draw,
}

/// Requests a game hands back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Play a sound cue.
    Sound(Sound),
    /// Call [`GameInstance::fire_effect`] with `effect` after `delay`.
    Schedule { delay: Duration, effect: EffectId },
    /// The tick interval changed; restart the ticker with the new one.
    RescheduleClock,
    GameOver(Outcome),
}

/// The single path every score change goes through.
#[derive(Default)]
pub struct ScoreKeeper {
    score: u32,
    listener: Option<ScoreListener>,
}

impl fmt::Debug for ScoreKeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreKeeper")
            .field("score", &self.score)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ScoreKeeper {
    pub fn get(&self) -> u32 {
        self.score
    }

    /// Store `score` and notify the host.
    pub fn update(&mut self, score: u32) {
        self.score = score;
        if let Some(listener) = self.listener.as_mut() {
            listener(score);
        }
    }

    pub fn add(&mut self, points: u32) {
        self.update(self.score.saturating_add(points));
    }

    pub fn reset(&mut self) {
        self.update(0);
    }

    pub fn set_listener(&mut self, listener: ScoreListener) {
        self.listener = Some(listener);
    }
}

/// Flat persistable state: `{ "score": n, ...extra }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub score: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GameSnapshot {
    pub fn new(score: u32) -> Self {
        Self {
            score,
            extra: serde_json::Map::new(),
        }
    }

    /// Add a game-specific field. Values that fail to serialize are skipped.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.extra.insert(key.to_string(), v);
            },
            Err(e) => debug!(key, error = %e, "snapshot field skipped"),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

/// Generates `score` and `set_score_listener` for a struct with a
/// `score: ScoreKeeper` field, and optionally `is_terminal` from a bool field.
#[macro_export]
macro_rules! impl_score_keeping {
    () => {
        fn score(&self) -> u32 {
            self.score.get()
        }

        fn set_score_listener(&mut self, listener: $crate::game_trait::ScoreListener) {
            self.score.set_listener(listener);
        }
    };
    (terminal: $flag:ident) => {
        $crate::impl_score_keeping!();

        fn is_terminal(&self) -> bool {
            self.$flag
        }
    };
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn score_keeper_notifies_on_every_update() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut keeper = ScoreKeeper::default();
        keeper.set_listener(Box::new(move |s| sink.lock().unwrap().push(s)));
        keeper.add(10);
        keeper.add(5);
        keeper.reset();
        assert_eq!(*seen.lock().unwrap(), vec![10, 15, 0]);
        assert_eq!(keeper.get(), 0);
    }

    #[test]
    fn score_keeper_saturates() {
        let mut keeper = ScoreKeeper::default();
        keeper.update(u32::MAX - 1);
        keeper.add(10);
        assert_eq!(keeper.get(), u32::MAX);
    }

    #[test]
    fn snapshot_serializes_flat() {
        let snap = GameSnapshot::new(40).with("lives", 2).with("level", "hard");
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json, serde_json::json!({"score": 40, "lives": 2, "level": "hard"}));
        let back: GameSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&Outcome::Winner(Side::Second)).unwrap();
        assert_eq!(json, r#"{"winner":"Second"}"#);
    }
}
