//! Cancel-and-replace timers driven by an explicit clock.
//!
//! There is no background thread: the owner re-arms on every trigger and
//! polls with [`Debounce::fire`] from its tick handler. Re-arming replaces
//! the pending deadline (last write wins) and bumps the generation, so a
//! caller holding an older generation can tell it was superseded.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
    generation: u64,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            generation: 0,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// (Re)start the quiet interval at `now`. Returns the new generation.
    pub fn arm(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.deadline = Some(now + self.delay);
        self.generation
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return the generation if the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<u64> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.generation)
            }
            _ => None,
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
    fn fires_once_after_quiet_interval() {
        let t0 = Instant::now();
        let mut d = Debounce::from_millis(100);
        d.arm(t0);
        assert_eq!(d.fire(t0 + ms(99)), None);
        assert_eq!(d.fire(t0 + ms(100)), Some(1));
        assert_eq!(d.fire(t0 + ms(500)), None);
        assert!(!d.is_armed());
    }

    #[test]
    fn rearm_replaces_pending_deadline() {
        let t0 = Instant::now();
        let mut d = Debounce::from_millis(100);
        d.arm(t0);
        let generation = d.arm(t0 + ms(80));
        assert_eq!(generation, 2);
        assert_eq!(d.fire(t0 + ms(120)), None);
        assert_eq!(d.fire(t0 + ms(180)), Some(2));
    }

    #[test]
    fn cancel_drops_pending_fire() {
        let t0 = Instant::now();
        let mut d = Debounce::from_millis(10);
        d.arm(t0);
        d.cancel();
        assert_eq!(d.fire(t0 + ms(50)), None);
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn zero_delay_fires_immediately() {
        let t0 = Instant::now();
        let mut d = Debounce::from_millis(0);
        d.arm(t0);
        assert_eq!(d.fire(t0), Some(1));
    }
}
