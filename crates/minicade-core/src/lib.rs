pub mod audio;
pub mod board;
pub mod catalog;
pub mod clock;
pub mod connectivity;
pub mod game_trait;
pub mod generation;
pub mod grid;
pub mod input;
pub mod physics;
pub mod store;
pub mod surface;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use crate::game_trait::{GameEvent, GameInstance, ScoreListener};
    use crate::input::PointerEvent;
    use crate::surface::{DEFAULT_VIEWPORT, DrawList};

    pub const WIDTH: f32 = DEFAULT_VIEWPORT.0;
    pub const HEIGHT: f32 = DEFAULT_VIEWPORT.1;

    /// A score listener plus the shared log of every value it received.
    pub fn score_probe() -> (ScoreListener, Arc<Mutex<Vec<u32>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let listener: ScoreListener = Box::new(move |score| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(score);
            }
        });
        (listener, log)
    }

    /// Press and release at the same point.
    pub fn tap(game: &mut dyn GameInstance, x: f32, y: f32) -> Vec<GameEvent> {
        let mut events = game.on_input_start(&PointerEvent::at(x, y));
        events.extend(game.on_input_end(&PointerEvent::at(x, y).with_start(x, y)));
        events
    }

    /// Press at `from`, drag and release at `to`.
    pub fn swipe(game: &mut dyn GameInstance, from: (f32, f32), to: (f32, f32)) -> Vec<GameEvent> {
        let mut events = game.on_input_start(&PointerEvent::at(from.0, from.1));
        events.extend(game.on_input_move(&PointerEvent::at(to.0, to.1)));
        events.extend(game.on_input_end(&PointerEvent::at(to.0, to.1).with_start(from.0, from.1)));
        events
    }

    /// Run `n` ticks, returning all accumulated events.
    pub fn run_ticks(game: &mut dyn GameInstance, n: usize) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update());
        }
        all_events
    }

    /// Draw into a fresh recording surface of the default viewport.
    pub fn render(game: &dyn GameInstance) -> DrawList {
        let mut list = DrawList::new(WIDTH, HEIGHT);
        game.draw(&mut list);
        list
    }

    pub fn has_game_over(events: &[GameEvent]) -> bool {
        events.iter().any(|e| matches!(e, GameEvent::GameOver(_)))
    }

    // ================================================================
    // GameInstance contract tests
    // ================================================================
    // Every game crate runs these from its own #[cfg(test)] module with a
    // freshly constructed instance.

    /// init() must reset the score to 0 and report it through the listener.
    pub fn contract_init_reports_zero_score(game: &mut dyn GameInstance) {
        let (listener, log) = score_probe();
        game.set_score_listener(listener);
        game.init();
        assert_eq!(game.score(), 0, "score must be 0 after init");
        assert_eq!(game.get_state().score, 0);
        assert_eq!(
            log.lock().unwrap().last().copied(),
            Some(0),
            "init must notify the host of the reset score"
        );
        assert!(!game.is_terminal(), "a fresh game must be playable");
    }

    /// Unrecognized cheat actions must be no-ops.
    pub fn contract_unknown_cheat_is_noop(game: &mut dyn GameInstance) {
        game.init();
        let before = game.get_state();
        let events = game.cheat("no-such-cheat");
        assert!(events.is_empty(), "unknown cheat must not emit events");
        assert_eq!(before, game.get_state(), "unknown cheat must not change state");
    }

    /// Pointer events outside the playfield never score and never panic.
    pub fn contract_out_of_bounds_input_is_ignored(game: &mut dyn GameInstance) {
        game.init();
        let before = game.score();
        for (x, y) in [
            (-500.0, -500.0),
            (WIDTH * 10.0, HEIGHT * 10.0),
            (f32::NAN, 10.0),
            (10.0, f32::INFINITY),
        ] {
            tap(game, x, y);
            swipe(game, (x, y), (x - 100.0, y + 100.0));
        }
        assert_eq!(before, game.score(), "out-of-bounds input must not score");
    }

    /// restart() twice in a row leaves the same fresh state as once.
    pub fn contract_restart_is_idempotent(game: &mut dyn GameInstance) {
        game.init();
        game.restart();
        game.restart();
        assert_eq!(game.score(), 0);
        assert!(!game.is_terminal());
        assert_eq!(game.get_state().score, 0);
    }

    /// draw() must not change state and must emit something.
    pub fn contract_draw_is_pure(game: &mut dyn GameInstance) {
        game.init();
        let before = game.get_state();
        let first = render(game);
        let second = render(game);
        assert!(!first.commands().is_empty(), "draw must render something");
        assert_eq!(first, second, "draw must be a pure function of state");
        assert_eq!(before, game.get_state(), "draw must not mutate state");
    }

    /// get_state() serializes to a flat JSON object with a numeric score.
    pub fn contract_snapshot_is_flat(game: &mut dyn GameInstance) {
        game.init();
        let json = serde_json::to_value(game.get_state()).unwrap();
        let object = json.as_object().expect("snapshot must be a JSON object");
        assert!(object.get("score").is_some_and(|s| s.is_u64()));
    }

    /// Once `finish` has ended the game, ticks and deferred effects change
    /// nothing and never report a second game over. restart() revives it.
    pub fn contract_terminal_state_is_frozen<G: GameInstance>(game: &mut G, finish: impl FnOnce(&mut G)) {
        finish(&mut *game);
        assert!(game.is_terminal(), "finish must end the game");
        let before = game.get_state();

        let mut events = run_ticks(game, 10);
        for effect in 0..4 {
            events.extend(game.fire_effect(effect));
        }
        assert!(!has_game_over(&events), "a finished game must not end again");
        assert_eq!(before, game.get_state(), "a finished game must not change");
        assert!(game.is_terminal());

        game.restart();
        assert!(!game.is_terminal(), "restart must make the game playable");
        assert_eq!(game.score(), 0);
    }

    /// Run every contract above against `make()`'s instances.
    pub fn run_contract_suite(make: impl Fn() -> Box<dyn GameInstance>) {
        contract_init_reports_zero_score(make().as_mut());
        contract_unknown_cheat_is_noop(make().as_mut());
        contract_out_of_bounds_input_is_ignored(make().as_mut());
        contract_restart_is_idempotent(make().as_mut());
        contract_draw_is_pure(make().as_mut());
        contract_snapshot_is_flat(make().as_mut());
    }
}
