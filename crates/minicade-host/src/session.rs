use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use minicade_core::audio::{AudioContext, AudioSink, Sound};
use minicade_core::catalog;
use minicade_core::clock::{ClockFire, SimulationClock};
use minicade_core::game_trait::{GameEvent, GameInstance, GameSnapshot, Outcome};
use minicade_core::input::{InputPhase, PointerEvent};
use minicade_core::store::{GameStore, StoreError};
use minicade_core::surface::Surface;

use crate::placeholder::UnderConstruction;
use crate::registry::GameRegistry;

/// What the host shell should reflect after a session call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ScoreChanged(u32),
    GameOver(Outcome),
}

/// Latest score reported by the game's listener, picked up after each call.
#[derive(Debug, Default)]
struct ScoreFeed {
    latest: AtomicU32,
    dirty: AtomicBool,
}

impl ScoreFeed {
    fn take(&self) -> Option<u32> {
        self.dirty
            .swap(false, Ordering::AcqRel)
            .then(|| self.latest.load(Ordering::Acquire))
    }
}

/// One running game plus everything the host owns on its behalf.
///
/// All timing goes through the session's [`SimulationClock`], so restarting
/// cancels every tick and deferred effect from the previous run.
pub struct GameSession {
    id: String,
    game: Box<dyn GameInstance>,
    playable: bool,
    clock: SimulationClock,
    store: Box<dyn GameStore>,
    audio: AudioContext,
    favorite: bool,
    feed: Arc<ScoreFeed>,
    outcome: Option<Outcome>,
}

impl GameSession {
    /// Build a session for `id`. Ids with no registered game get the placeholder.
    pub fn open(
        registry: &GameRegistry,
        id: &str,
        (width, height): (f32, f32),
        store: Box<dyn GameStore>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        let (mut game, playable) = match registry.create(id, width, height) {
            Some(game) => (game, true),
            None => {
                warn!(game_id = id, "no game registered, showing placeholder");
                let title = catalog::find(id).map_or(id, |info| info.name);
                (Box::new(UnderConstruction::new(title)) as Box<dyn GameInstance>, false)
            },
        };

        let feed = Arc::new(ScoreFeed::default());
        let listener_feed = Arc::clone(&feed);
        game.set_score_listener(Box::new(move |score| {
            listener_feed.latest.store(score, Ordering::Release);
            listener_feed.dirty.store(true, Ordering::Release);
        }));

        let audio = AudioContext::init(sink, &store.settings());
        let favorite = store.is_favorite(id);
        Self {
            id: id.to_string(),
            game,
            playable,
            clock: SimulationClock::new(),
            store,
            audio,
            favorite,
            feed,
            outcome: None,
        }
    }

    /// Begin the run: drop anything left on the clock and start ticking if the game is real-time.
    pub fn start(&mut self) {
        self.clock.cancel_all();
        self.feed.take();
        if self.playable
            && let Some(interval) = self.game.tick_interval()
        {
            self.clock.start_ticker(interval);
        }
        info!(
            game_id = %self.id,
            tick_ms = self.clock.ticker_interval().map(|d| d.as_millis() as u64),
            "session started"
        );
    }

    /// Move the clock forward by `elapsed` and run every tick and effect that fell due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        self.clock.advance(elapsed);
        let mut out = Vec::new();
        while let Some(fire) = self.clock.poll() {
            let events = match fire {
                ClockFire::Tick => self.game.update(),
                ClockFire::Effect(effect) => self.game.fire_effect(effect),
            };
            out.extend(self.dispatch(events));
        }
        out
    }

    pub fn input(&mut self, phase: InputPhase, event: &PointerEvent) -> Vec<SessionEvent> {
        if !self.playable {
            debug!(game_id = %self.id, ?phase, "input ignored by placeholder");
            return Vec::new();
        }
        let events = match phase {
            InputPhase::Start => self.game.on_input_start(event),
            InputPhase::Move => self.game.on_input_move(event),
            InputPhase::End => self.game.on_input_end(event),
        };
        self.dispatch(events)
    }

    /// Apply a cheat. The shell acknowledges every cheat with the success cue.
    pub fn cheat(&mut self, action: &str) -> Vec<SessionEvent> {
        if !self.playable {
            debug!(game_id = %self.id, action, "cheat ignored by placeholder");
            return Vec::new();
        }
        debug!(game_id = %self.id, action, "cheat");
        self.audio.play(Sound::Success);
        let events = self.game.cheat(action);
        self.dispatch(events)
    }

    pub fn restart(&mut self) -> Vec<SessionEvent> {
        self.clock.cancel_all();
        self.game.restart();
        self.outcome = None;
        self.start();
        vec![SessionEvent::ScoreChanged(self.game.score())]
    }

    /// Flip the favorite flag in the store. Returns the resulting state.
    pub fn toggle_favorite(&mut self) -> bool {
        let result = if self.favorite {
            self.store.remove_favorite(&self.id)
        } else {
            self.store.add_favorite(&self.id)
        };
        match result {
            Ok(()) => self.favorite = !self.favorite,
            Err(e) => warn!(game_id = %self.id, error = %e, "failed to update favorites"),
        }
        self.favorite
    }

    /// Flip sound effects on or off and persist the setting. Returns the new state.
    pub fn toggle_sound(&mut self) -> bool {
        let enabled = !self.audio.sound_enabled();
        self.audio.set_sound_enabled(enabled);
        let mut settings = self.store.settings();
        settings.sound = enabled;
        if let Err(e) = self.store.set_settings(settings) {
            warn!(error = %e, "failed to persist sound setting");
        }
        enabled
    }

    /// Save the current snapshot and record the score if it is a new best.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.playable {
            return Ok(());
        }
        let snapshot = self.game.get_state();
        self.store.save_game(&self.id, &snapshot)?;
        if self.store.update_high_score(&self.id, snapshot.score)? {
            info!(game_id = %self.id, score = snapshot.score, "new high score");
        }
        Ok(())
    }

    /// Final flush, then stop the clock and release audio. Returns the last snapshot.
    pub fn close(&mut self) -> GameSnapshot {
        if let Err(e) = self.flush() {
            warn!(game_id = %self.id, error = %e, "failed to save on close");
        }
        self.clock.cancel_all();
        self.audio.teardown();
        info!(game_id = %self.id, score = self.game.score(), "session closed");
        self.game.get_state()
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        self.game.draw(surface);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn score(&self) -> u32 {
        self.game.score()
    }

    pub fn high_score(&self) -> u32 {
        self.store.high_score(&self.id)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.get_state()
    }

    pub fn is_playable(&self) -> bool {
        self.playable
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    pub fn sound_enabled(&self) -> bool {
        self.audio.sound_enabled()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn store(&self) -> &dyn GameStore {
        self.store.as_ref()
    }

    /// Carry out what the game asked for, then report score and game-over changes.
    fn dispatch(&mut self, events: Vec<GameEvent>) -> Vec<SessionEvent> {
        let mut finished = None;
        for event in events {
            match event {
                GameEvent::Sound(sound) => self.audio.play(sound),
                GameEvent::Schedule { delay, effect } => self.clock.schedule(delay, effect),
                GameEvent::RescheduleClock => {
                    if self.outcome.is_some() {
                        continue;
                    }
                    match self.game.tick_interval() {
                        Some(interval) => self.clock.start_ticker(interval),
                        None => self.clock.stop_ticker(),
                    }
                },
                GameEvent::GameOver(outcome) => finished = Some(outcome),
            }
        }

        let mut out = Vec::new();
        if let Some(score) = self.feed.take() {
            out.push(SessionEvent::ScoreChanged(score));
        }
        if let Some(outcome) = finished {
            self.finish(outcome);
            out.push(SessionEvent::GameOver(outcome));
        }
        out
    }

    fn finish(&mut self, outcome: Outcome) {
        info!(game_id = %self.id, ?outcome, score = self.game.score(), "game over");
        self.outcome = Some(outcome);
        self.clock.stop_ticker();
        if let Err(e) = self.flush() {
            warn!(game_id = %self.id, error = %e, "failed to save finished game");
        }
    }
}
