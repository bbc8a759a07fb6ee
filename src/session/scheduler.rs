use std::thread;
use std::time::{Duration, Instant};

/// Source of scan ticks
pub trait Ticker {
    /// Return once the next tick is due
    fn wait_next(&mut self);
}

/// Fixed-rate ticks, one per `interval`
///
/// Late ticks are not made up: if a tick runs long the schedule restarts from
/// now, like a display refresh callback that missed a frame.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl IntervalTicker {
    /// Ticker firing every `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Ticker for IntervalTicker {
    fn wait_next(&mut self) {
        let now = Instant::now();
        let due = match self.next_due {
            Some(due) if due > now => {
                thread::sleep(due - now);
                due
            }
            // first tick, or we fell behind
            _ => now,
        };
        self.next_due = Some(due + self.interval);
    }
}

/// Ticks back to back with no delay
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateTicker;

impl Ticker for ImmediateTicker {
    fn wait_next(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_ticker_paces() {
        let mut ticker = IntervalTicker::new(Duration::from_millis(10));
        let start = Instant::now();
        ticker.wait_next(); // immediate
        ticker.wait_next();
        ticker.wait_next();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_interval_ticker_does_not_catch_up() {
        let mut ticker = IntervalTicker::new(Duration::from_millis(50));
        ticker.wait_next();
        thread::sleep(Duration::from_millis(120));
        let before = Instant::now();
        ticker.wait_next();
        // fell behind, so this tick is immediate rather than a burst
        assert!(before.elapsed() < Duration::from_millis(50));
    }
}
