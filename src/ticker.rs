//! The game's single periodic timer.
//!
//! There is one deadline slot, so starting, rescheduling and stopping can
//! never leave a second timer running.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new() -> Self {
        Ticker { interval: Duration::from_millis(0), next_due: None }
    }

    /// Cancels whatever was pending and arms a fresh deadline.
    pub fn start(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.next_due = Some(now + interval);
    }

    pub fn reschedule(&mut self, interval: Duration, now: Instant) {
        self.start(interval, now);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fires at most once per call. A late poll re-arms from `now` rather
    /// than replaying the missed ticks.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_per_interval() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new();
        ticker.start(ms(150), t0);

        assert!(!ticker.poll(t0 + ms(100)));
        assert!(ticker.poll(t0 + ms(150)));
        assert!(!ticker.poll(t0 + ms(151)));
        assert!(ticker.poll(t0 + ms(300)));
    }

    #[test]
    fn late_poll_does_not_burst() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new();
        ticker.start(ms(50), t0);

        assert!(ticker.poll(t0 + ms(500)));
        assert!(!ticker.poll(t0 + ms(500)));
    }

    #[test]
    fn stopped_ticker_never_fires() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new();
        ticker.start(ms(10), t0);
        ticker.stop();

        assert!(!ticker.is_active());
        assert!(!ticker.poll(t0 + ms(1000)));
    }

    #[test]
    fn reschedule_replaces_the_pending_deadline() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new();
        ticker.start(ms(150), t0);
        ticker.reschedule(ms(140), t0 + ms(20));

        assert_eq!(ticker.interval(), ms(140));
        assert!(!ticker.poll(t0 + ms(150)));
        assert!(ticker.poll(t0 + ms(160)));
    }
}
