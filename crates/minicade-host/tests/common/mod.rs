use std::path::PathBuf;
use std::time::Duration;

use minicade_core::audio::{AudioSink, NullSink};
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::impl_score_keeping;
use minicade_core::input::PointerEvent;
use minicade_core::store::{GameStore, MemoryStore};
use minicade_core::surface::{Color, Surface};

use minicade_host::registry::GameRegistry;
use minicade_host::session::GameSession;

pub const PROBE_ID: &str = "probe_001";
pub const PROBE_TICK: Duration = Duration::from_millis(10);
pub const PROBE_FAST_TICK: Duration = Duration::from_millis(5);
pub const PROBE_EFFECT_DELAY: Duration = Duration::from_millis(100);
pub const PROBE_EFFECT_POINTS: u32 = 5;
const PROBE_EFFECT: u32 = 7;

/// Minimal real-time game that records what the host did to it.
///
/// - every tick bumps `ticks`
/// - releasing the pointer schedules an effect worth 5 points
/// - `cheat("end")` wins, `cheat("speed")` halves the tick interval
pub struct ProbeGame {
    ticks: u32,
    fired: u32,
    fast: bool,
    over: bool,
    score: ScoreKeeper,
}

impl ProbeGame {
    pub fn new(_width: f32, _height: f32) -> Self {
        let mut game = Self {
            ticks: 0,
            fired: 0,
            fast: false,
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }
}

impl GameInstance for ProbeGame {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Probe", "Test double")
    }

    fn init(&mut self) {
        self.ticks = 0;
        self.fired = 0;
        self.fast = false;
        self.over = false;
        self.score.reset();
    }

    fn update(&mut self) -> Vec<GameEvent> {
        if !self.over {
            self.ticks += 1;
        }
        Vec::new()
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_text(&format!("ticks {}", self.ticks), 10.0, 10.0, 12.0, Color::WHITE);
    }

    fn on_input_end(&mut self, _event: &PointerEvent) -> Vec<GameEvent> {
        vec![GameEvent::Schedule {
            delay: PROBE_EFFECT_DELAY,
            effect: PROBE_EFFECT,
        }]
    }

    fn fire_effect(&mut self, effect: u32) -> Vec<GameEvent> {
        if effect == PROBE_EFFECT && !self.over {
            self.fired += 1;
            self.score.add(PROBE_EFFECT_POINTS);
        }
        Vec::new()
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        match action {
            "end" if !self.over => {
                self.over = true;
                vec![GameEvent::GameOver(Outcome::Won)]
            },
            "speed" => {
                self.fast = true;
                vec![GameEvent::RescheduleClock]
            },
            _ => Vec::new(),
        }
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("ticks", self.ticks)
            .with("fired", self.fired)
    }

    fn tick_interval(&self) -> Option<Duration> {
        Some(if self.fast { PROBE_FAST_TICK } else { PROBE_TICK })
    }

    impl_score_keeping!(terminal: over);
}

pub fn probe_registry() -> GameRegistry {
    let mut registry = GameRegistry::empty();
    registry.register(PROBE_ID, |w, h| Box::new(ProbeGame::new(w, h)));
    registry
}

pub fn open(registry: &GameRegistry, id: &str) -> GameSession {
    open_with(registry, id, Box::new(MemoryStore::new()), Box::new(NullSink))
}

pub fn open_with(
    registry: &GameRegistry,
    id: &str,
    store: Box<dyn GameStore>,
    sink: Box<dyn AudioSink>,
) -> GameSession {
    GameSession::open(registry, id, (375.0, 500.0), store, sink)
}

pub fn probe_session() -> GameSession {
    let mut session = open(&probe_registry(), PROBE_ID);
    session.start();
    session
}

/// A numeric field of the session's snapshot.
pub fn field(session: &GameSession, key: &str) -> u64 {
    session
        .snapshot()
        .get(key)
        .and_then(serde_json::Value::as_u64)
        .unwrap_or_else(|| panic!("snapshot has no numeric {key}"))
}

pub fn temp_store_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("minicade-host-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("store.json")
}
