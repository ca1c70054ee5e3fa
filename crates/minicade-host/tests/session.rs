//! Session lifecycle: clock driving, cancellation, persistence and audio.

#[allow(dead_code)]
mod common;

use std::time::Duration;

use minicade_core::audio::{RecordingSink, Sound};
use minicade_core::game_trait::Outcome;
use minicade_core::input::{InputPhase, PointerEvent};
use minicade_core::store::{GameStore, JsonFileStore, MemoryStore};
use minicade_core::surface::DrawList;
use minicade_host::placeholder::MESSAGE;
use minicade_host::registry::GameRegistry;
use minicade_host::session::SessionEvent;

use common::{
    PROBE_EFFECT_POINTS, PROBE_FAST_TICK, PROBE_ID, PROBE_TICK, field, open, open_with, probe_registry,
    probe_session, temp_store_path,
};

fn release(session: &mut minicade_host::session::GameSession) -> Vec<SessionEvent> {
    let end = PointerEvent::at(100.0, 100.0).with_start(100.0, 100.0);
    session.input(InputPhase::End, &end)
}

#[test]
fn ticks_follow_the_game_interval() {
    let mut s = probe_session();
    assert_eq!(s.clock().ticker_interval(), Some(PROBE_TICK));
    s.advance(Duration::from_millis(35));
    assert_eq!(field(&s, "ticks"), 3);
}

#[test]
fn scheduled_effect_fires_after_its_delay() {
    let mut s = probe_session();
    assert!(release(&mut s).is_empty());
    assert_eq!(s.clock().pending_effects(), 1);

    s.advance(Duration::from_millis(99));
    assert_eq!(field(&s, "fired"), 0);

    let events = s.advance(Duration::from_millis(1));
    assert_eq!(events, vec![SessionEvent::ScoreChanged(PROBE_EFFECT_POINTS)]);
    assert_eq!(field(&s, "fired"), 1);
}

#[test]
fn restart_cancels_pending_effects() {
    let mut s = probe_session();
    release(&mut s);
    s.advance(Duration::from_millis(30));

    let events = s.restart();
    assert_eq!(events, vec![SessionEvent::ScoreChanged(0)]);
    assert_eq!(s.clock().pending_effects(), 0);
    assert_eq!(field(&s, "ticks"), 0);

    s.advance(Duration::from_millis(200));
    assert_eq!(field(&s, "fired"), 0, "effect from the previous run must not fire");
    assert_eq!(s.score(), 0);
}

#[test]
fn reschedule_request_restarts_the_ticker() {
    let mut s = probe_session();
    assert!(s.cheat("speed").is_empty());
    assert_eq!(s.clock().ticker_interval(), Some(PROBE_FAST_TICK));
    s.advance(Duration::from_millis(20));
    assert_eq!(field(&s, "ticks"), 4);
}

#[test]
fn game_over_stops_the_clock_and_saves() {
    let mut s = probe_session();
    s.advance(Duration::from_millis(20));

    let events = s.cheat("end");
    assert_eq!(events, vec![SessionEvent::GameOver(Outcome::Won)]);
    assert_eq!(s.outcome(), Some(Outcome::Won));
    assert!(!s.clock().has_ticker());

    let saved = s.store().load_game(PROBE_ID).expect("finished game is saved");
    assert_eq!(saved.snapshot.get("ticks").and_then(|v| v.as_u64()), Some(2));

    s.advance(Duration::from_secs(1));
    assert_eq!(field(&s, "ticks"), 2);

    s.cheat("speed");
    assert!(!s.clock().has_ticker(), "a finished game stays stopped");
}

#[test]
fn restart_after_game_over_resumes_ticking() {
    let mut s = probe_session();
    s.cheat("end");
    s.restart();
    assert_eq!(s.outcome(), None);
    assert_eq!(s.clock().ticker_interval(), Some(PROBE_TICK));
    s.advance(Duration::from_millis(10));
    assert_eq!(field(&s, "ticks"), 1);
}

#[test]
fn double_restart_keeps_a_single_ticker() {
    let mut s = probe_session();
    s.advance(Duration::from_millis(25));
    s.restart();
    s.restart();
    assert_eq!(s.clock().ticker_interval(), Some(PROBE_TICK));
    assert_eq!(field(&s, "ticks"), 0);

    s.advance(PROBE_TICK * 4);
    assert_eq!(field(&s, "ticks"), 4, "one update per interval after two restarts");
}

#[test]
fn flush_keeps_the_best_score() {
    let mut s = probe_session();
    release(&mut s);
    s.advance(Duration::from_millis(100));
    s.flush().unwrap();
    assert_eq!(s.high_score(), PROBE_EFFECT_POINTS);

    s.restart();
    s.flush().unwrap();
    assert_eq!(s.high_score(), PROBE_EFFECT_POINTS);
    assert_eq!(s.store().load_game(PROBE_ID).map(|g| g.snapshot.score), Some(0));
}

#[test]
fn unknown_game_shows_placeholder() {
    let sink = RecordingSink::new();
    let log = sink.log();
    let mut s = open_with(&GameRegistry::new(), "arcade_002", Box::new(MemoryStore::new()), Box::new(sink));
    s.start();

    assert!(!s.is_playable());
    assert!(!s.clock().has_ticker());
    assert!(release(&mut s).is_empty());
    assert!(s.cheat("win").is_empty());
    assert!(log.lock().unwrap().is_empty());

    let mut list = DrawList::new(375.0, 500.0);
    s.draw(&mut list);
    assert!(list.contains_text(MESSAGE));
    assert!(list.contains_text("Tetris"));

    s.flush().unwrap();
    assert!(s.store().load_game("arcade_002").is_none());
}

#[test]
fn cheat_plays_success_cue() {
    let sink = RecordingSink::new();
    let log = sink.log();
    let mut s = open_with(&GameRegistry::new(), "casual_005", Box::new(MemoryStore::new()), Box::new(sink));
    s.start();

    let events = s.cheat("clear");
    assert_eq!(
        events,
        vec![SessionEvent::ScoreChanged(100), SessionEvent::GameOver(Outcome::Won)]
    );
    assert_eq!(log.lock().unwrap().first(), Some(&Sound::Success));
    assert_eq!(s.high_score(), 100);
}

#[test]
fn muted_session_plays_nothing() {
    let sink = RecordingSink::new();
    let log = sink.log();
    let mut s = open_with(&probe_registry(), PROBE_ID, Box::new(MemoryStore::new()), Box::new(sink));
    assert!(s.sound_enabled());
    assert!(!s.toggle_sound());
    assert!(!s.store().settings().sound);

    s.cheat("speed");
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn favorite_toggle_round_trips_through_store() {
    let mut s = open(&probe_registry(), PROBE_ID);
    assert!(!s.is_favorite());
    assert!(s.toggle_favorite());
    assert!(s.store().is_favorite(PROBE_ID));
    assert!(!s.toggle_favorite());
    assert!(s.store().favorites().is_empty());
}

#[test]
fn snake_moves_once_per_tick() {
    let mut s = open(&GameRegistry::new(), "arcade_001");
    s.start();
    s.advance(Duration::from_millis(150));
    let snake = s.snapshot().get("snake").cloned().unwrap();
    assert_eq!(snake[0], serde_json::json!({ "x": 6, "y": 5 }));
}

#[test]
fn snake_steps_once_per_tick_after_double_restart() {
    let mut s = open(&GameRegistry::new(), "arcade_001");
    s.start();
    s.restart();
    s.restart();
    s.advance(Duration::from_millis(450));
    let snake = s.snapshot().get("snake").cloned().unwrap();
    assert_eq!(snake[0], serde_json::json!({ "x": 8, "y": 5 }));
}

#[test]
fn close_persists_to_disk() {
    let path = temp_store_path("close");
    {
        let store = JsonFileStore::open(&path).unwrap();
        let mut s = open_with(&GameRegistry::new(), "casual_005", Box::new(store), Box::new(RecordingSink::new()));
        s.start();
        s.toggle_favorite();
        s.cheat("clear");
        let last = s.close();
        assert_eq!(last.score, 100);
        assert!(!s.clock().has_ticker());
    }

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.high_score("casual_005"), 100);
    assert!(reopened.is_favorite("casual_005"));
    assert_eq!(reopened.load_game("casual_005").map(|g| g.snapshot.score), Some(100));
}
