//! Logical scheduler for a single game session.
//!
//! The clock never sleeps; the host advances it by wall-clock deltas and then
//! polls for whatever became due. One ticker at most, plus a queue of deferred
//! effects stamped with the generation they were scheduled in.

use std::time::Duration;

use tracing::debug;

/// Game-defined identifier of a deferred effect.
pub type EffectId = u32;

/// Ticks further behind than this are dropped on `advance`.
pub const DEFAULT_MAX_CATCH_UP: u32 = 5;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Something the clock wants the session to run now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFire {
    Tick,
    Effect(EffectId),
}

#[derive(Debug, Clone, Copy)]
struct Ticker {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    due: Duration,
    seq: u64,
    generation: u64,
    effect: EffectId,
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Logical time of the last fire.
    now: Duration,
    /// Time the host has advanced to.
    target: Duration,
    ticker: Option<Ticker>,
    deferred: Vec<Deferred>,
    generation: u64,
    next_seq: u64,
    max_catch_up: u32,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::with_max_catch_up(DEFAULT_MAX_CATCH_UP)
    }

    pub fn with_max_catch_up(max_catch_up: u32) -> Self {
        Self {
            now: Duration::ZERO,
            target: Duration::ZERO,
            ticker: None,
            deferred: Vec::new(),
            generation: 0,
            next_seq: 0,
            max_catch_up: max_catch_up.max(1),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace any running ticker with one firing every `interval` from now.
    pub fn start_ticker(&mut self, interval: Duration) {
        if let Some(old) = self.ticker.take() {
            debug!(old_ms = old.interval.as_millis() as u64, "replacing running ticker");
        }
        let interval = interval.max(MIN_INTERVAL);
        self.ticker = Some(Ticker {
            interval,
            next_due: self.target + interval,
        });
    }

    pub fn stop_ticker(&mut self) {
        self.ticker = None;
    }

    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn ticker_interval(&self) -> Option<Duration> {
        self.ticker.map(|t| t.interval)
    }

    /// Queue `effect` to fire `delay` after the current time, in the current generation.
    pub fn schedule(&mut self, delay: Duration, effect: EffectId) {
        self.deferred.push(Deferred {
            due: self.target + delay,
            seq: self.next_seq,
            generation: self.generation,
            effect,
        });
        self.next_seq += 1;
    }

    /// Live (current-generation) effects still waiting to fire.
    pub fn pending_effects(&self) -> usize {
        self.deferred
            .iter()
            .filter(|d| d.generation == self.generation)
            .count()
    }

    /// Stop the ticker and invalidate every effect scheduled so far.
    pub fn cancel_all(&mut self) {
        self.ticker = None;
        self.generation += 1;
    }

    /// Move the target time forward. Ticks beyond the catch-up limit are skipped.
    pub fn advance(&mut self, elapsed: Duration) {
        self.target += elapsed;
        let max_catch_up = self.max_catch_up;
        let target = self.target;
        if let Some(ticker) = self.ticker.as_mut()
            && ticker.next_due <= target
        {
            let lag = (target - ticker.next_due).as_nanos();
            let interval = ticker.interval.as_nanos();
            let behind = lag / interval + 1;
            if behind > u128::from(max_catch_up) {
                // Keep the phase: the last due tick stays where it was.
                let phase = Duration::from_nanos(u64::try_from(lag % interval).unwrap_or(0));
                ticker.next_due = target - phase - ticker.interval * (max_catch_up - 1);
                let skipped = u64::try_from(behind - u128::from(max_catch_up)).unwrap_or(u64::MAX);
                debug!(skipped, "clock fell behind, skipping ticks");
            }
        }
    }

    /// Next due fire at or before the target time, earliest first.
    /// Effects win ties with the ticker.
    pub fn poll(&mut self) -> Option<ClockFire> {
        self.discard_stale();

        let effect = self
            .deferred
            .iter()
            .enumerate()
            .filter(|(_, d)| d.due <= self.target)
            .min_by_key(|(_, d)| (d.due, d.seq))
            .map(|(i, d)| (i, d.due));
        let tick = self
            .ticker
            .map(|t| t.next_due)
            .filter(|&due| due <= self.target);

        match (effect, tick) {
            (Some((index, due)), tick) if tick.is_none_or(|t| due <= t) => {
                let fired = self.deferred.swap_remove(index);
                self.now = due;
                Some(ClockFire::Effect(fired.effect))
            },
            (_, Some(due)) => {
                if let Some(ticker) = self.ticker.as_mut() {
                    ticker.next_due += ticker.interval;
                }
                self.now = due;
                Some(ClockFire::Tick)
            },
            _ => None,
        }
    }

    /// Poll until nothing is due.
    pub fn drain(&mut self) -> Vec<ClockFire> {
        std::iter::from_fn(|| self.poll()).collect()
    }

    fn discard_stale(&mut self) {
        let generation = self.generation;
        let before = self.deferred.len();
        self.deferred.retain(|d| d.generation == generation);
        let dropped = before - self.deferred.len();
        if dropped > 0 {
            debug!(dropped, generation, "discarded effects from a previous session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let mut clock = SimulationClock::new();
        clock.start_ticker(ms(20));
        clock.advance(ms(19));
        assert!(clock.drain().is_empty());
        clock.advance(ms(1));
        assert_eq!(clock.drain(), vec![ClockFire::Tick]);
        clock.advance(ms(40));
        assert_eq!(clock.drain(), vec![ClockFire::Tick, ClockFire::Tick]);
    }

    #[test]
    fn restarting_ticker_never_doubles_ticks() {
        let mut clock = SimulationClock::new();
        clock.start_ticker(ms(10));
        clock.start_ticker(ms(10));
        clock.start_ticker(ms(10));
        clock.advance(ms(30));
        assert_eq!(clock.drain().len(), 3);
    }

    #[test]
    fn falling_behind_skips_excess_ticks() {
        let mut clock = SimulationClock::with_max_catch_up(3);
        clock.start_ticker(ms(10));
        clock.advance(ms(1_000));
        assert_eq!(clock.drain().len(), 3);
        clock.advance(ms(10));
        assert_eq!(clock.drain().len(), 1);
    }

    #[test]
    fn huge_stall_still_caps_catch_up() {
        let mut clock = SimulationClock::new();
        clock.start_ticker(ms(1));
        // Far more intervals than fit in a u32.
        clock.advance(Duration::from_secs(u64::MAX / 4));
        assert_eq!(clock.drain().len(), DEFAULT_MAX_CATCH_UP as usize);
        clock.advance(ms(1));
        assert_eq!(clock.drain(), vec![ClockFire::Tick]);
    }

    #[test]
    fn catch_up_keeps_the_tick_phase() {
        let mut clock = SimulationClock::with_max_catch_up(2);
        clock.start_ticker(ms(10));
        clock.advance(ms(1_005));
        assert_eq!(clock.drain().len(), 2);
        assert_eq!(clock.now(), ms(1_000));
        clock.advance(ms(4));
        assert!(clock.drain().is_empty());
        clock.advance(ms(1));
        assert_eq!(clock.drain(), vec![ClockFire::Tick]);
    }

    #[test]
    fn effects_fire_in_due_order() {
        let mut clock = SimulationClock::new();
        clock.schedule(ms(500), 1);
        clock.schedule(ms(200), 2);
        clock.schedule(ms(200), 3);
        clock.advance(ms(600));
        assert_eq!(
            clock.drain(),
            vec![
                ClockFire::Effect(2),
                ClockFire::Effect(3),
                ClockFire::Effect(1)
            ]
        );
        assert_eq!(clock.pending_effects(), 0);
    }

    #[test]
    fn effects_interleave_with_ticks() {
        let mut clock = SimulationClock::new();
        clock.start_ticker(ms(20));
        clock.schedule(ms(30), 7);
        clock.advance(ms(40));
        assert_eq!(
            clock.drain(),
            vec![ClockFire::Tick, ClockFire::Effect(7), ClockFire::Tick]
        );
        assert_eq!(clock.now(), ms(40));
    }

    #[test]
    fn cancel_all_discards_pending_effects() {
        let mut clock = SimulationClock::new();
        clock.start_ticker(ms(16));
        clock.schedule(ms(500), 1);
        assert_eq!(clock.pending_effects(), 1);

        clock.cancel_all();
        assert!(!clock.has_ticker());
        assert_eq!(clock.pending_effects(), 0);

        clock.schedule(ms(500), 2);
        clock.advance(ms(1_000));
        assert_eq!(clock.drain(), vec![ClockFire::Effect(2)]);
    }

    #[test]
    fn effect_scheduled_during_drain_fires_when_due() {
        let mut clock = SimulationClock::new();
        clock.start_ticker(ms(10));
        clock.advance(ms(25));
        assert_eq!(clock.poll(), Some(ClockFire::Tick));
        // Scheduled relative to the advanced target, so it is not yet due.
        clock.schedule(ms(5), 9);
        assert_eq!(clock.poll(), Some(ClockFire::Tick));
        assert_eq!(clock.poll(), None);
        clock.advance(ms(5));
        assert_eq!(clock.drain(), vec![ClockFire::Effect(9), ClockFire::Tick]);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut clock = SimulationClock::new();
        clock.start_ticker(Duration::ZERO);
        assert_eq!(clock.ticker_interval(), Some(ms(1)));
    }
}
