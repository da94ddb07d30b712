//! Keeps the tick timer in step with the engine.
//!
//! Every start, stop and reschedule of the `Ticker` goes through here, so
//! the ordering holds no matter which front end drives the loop: the timer
//! is stopped before a state is replaced, rescheduled when the speed changes
//! and stopped for good when the round ends.

use std::time::Instant;

use log::debug;

use crate::engine::{Engine, TickOutcome};
use crate::ticker::Ticker;

/// Starts a new round on a fresh state.
pub fn restart(engine: &mut Engine, ticker: &mut Ticker, now: Instant) {
    ticker.stop();
    let interval = engine.initialize();
    ticker.start(interval, now);
}

/// Ticks the engine if the timer is due. `None` when it was not.
pub fn step(engine: &mut Engine, ticker: &mut Ticker, now: Instant) -> Option<TickOutcome> {
    if !ticker.poll(now) {
        return None;
    }

    let outcome = engine.tick();
    apply_outcome(ticker, &outcome, now);
    Some(outcome)
}

pub fn apply_outcome(ticker: &mut Ticker, outcome: &TickOutcome, now: Instant) {
    match outcome {
        TickOutcome::Ate { new_interval: Some(interval), .. } => {
            debug!("[Control] Rescheduling at {:?}", interval);
            ticker.reschedule(*interval, now);
        }
        TickOutcome::GameOver { .. } => ticker.stop(),
        _ => {}
    }
}

pub fn pause(ticker: &mut Ticker) {
    ticker.stop();
}

pub fn resume(engine: &Engine, ticker: &mut Ticker, now: Instant) {
    if engine.state().is_running() {
        ticker.start(engine.state().interval(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::Phase;
    use crate::snake::{Direction, Snake};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn running(seed: u64, t0: Instant) -> (Engine, Ticker) {
        let mut engine = Engine::with_seed(GameConfig::default(), seed);
        let mut ticker = Ticker::new();
        restart(&mut engine, &mut ticker, t0);
        (engine, ticker)
    }

    #[test]
    fn nothing_happens_before_the_timer_is_due() {
        let t0 = Instant::now();
        let (mut engine, mut ticker) = running(1, t0);
        engine.state_mut().food = (0, 0);
        engine.set_direction(Direction::Right);

        assert_eq!(step(&mut engine, &mut ticker, t0 + ms(100)), None);
        assert_eq!(engine.state().snake.head(), (10, 10));
        assert_eq!(step(&mut engine, &mut ticker, t0 + ms(150)), Some(TickOutcome::Moved));
        assert_eq!(engine.state().snake.head(), (11, 10));
    }

    #[test]
    fn game_over_stops_the_timer() {
        let t0 = Instant::now();
        let (mut engine, mut ticker) = running(2, t0);
        engine.state_mut().snake = Snake::new((19, 10));
        engine.state_mut().food = (0, 0);
        engine.set_direction(Direction::Right);

        let outcome = step(&mut engine, &mut ticker, t0 + ms(150));
        assert!(matches!(outcome, Some(TickOutcome::GameOver { .. })));
        assert!(!ticker.is_active());
        assert_eq!(step(&mut engine, &mut ticker, t0 + ms(10_000)), None);
        assert_eq!(engine.state().phase, Phase::GameOver);
    }

    #[test]
    fn speed_up_reschedules_at_the_new_interval() {
        let t0 = Instant::now();
        let (mut engine, mut ticker) = running(3, t0);
        engine.state_mut().score = 2;
        engine.state_mut().food = (11, 10);
        engine.set_direction(Direction::Right);

        let outcome = step(&mut engine, &mut ticker, t0 + ms(150));
        assert_eq!(outcome, Some(TickOutcome::Ate { score: 3, new_interval: Some(ms(140)) }));
        assert!(ticker.is_active());
        assert_eq!(ticker.interval(), ms(140));
        assert_eq!(ticker.interval(), engine.state().interval());

        // Next tick is due 140ms after the reschedule, not 150.
        assert_eq!(step(&mut engine, &mut ticker, t0 + ms(289)), None);
        assert!(step(&mut engine, &mut ticker, t0 + ms(290)).is_some());
    }

    #[test]
    fn restart_replaces_a_running_timer() {
        let t0 = Instant::now();
        let (mut engine, mut ticker) = running(4, t0);
        engine.state_mut().speed_ms = 90;
        ticker.reschedule(ms(90), t0);

        restart(&mut engine, &mut ticker, t0 + ms(40));
        assert_eq!(ticker.interval(), ms(150));
        assert_eq!(step(&mut engine, &mut ticker, t0 + ms(130)), None);
        assert_eq!(engine.state().speed_ms, 150);
    }

    #[test]
    fn pause_and_resume() {
        let t0 = Instant::now();
        let (mut engine, mut ticker) = running(5, t0);
        engine.set_direction(Direction::Down);

        pause(&mut ticker);
        assert_eq!(step(&mut engine, &mut ticker, t0 + ms(1000)), None);

        resume(&engine, &mut ticker, t0 + ms(1000));
        assert!(step(&mut engine, &mut ticker, t0 + ms(1150)).is_some());
    }
}
