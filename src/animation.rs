//! Frame pacing for the animated algorithms.

use std::time::{Duration, Instant};

/// Fixed-delay timer deciding when the next animation step is due.
///
/// The search, the maze carver and the path follower each run at their own pace; the timer is
/// re-armed with the matching delay whenever one of them starts.
#[derive(Debug, Clone)]
pub(crate) struct StepTimer {
    /// Time to wait between two steps.
    delay: Duration,
    /// Timestamp of the last step.
    ///
    /// This field stores the time when the animation last advanced, used to space steps evenly no
    /// matter how often the UI redraws.
    last_update_time: Instant,
}

impl StepTimer {
    /// Creates a timer that is due after `delay`.
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_update_time: Instant::now(),
        }
    }

    /// Changes the delay and restarts the wait.
    pub(crate) fn rearm(&mut self, delay: Duration) {
        self.delay = delay;
        self.last_update_time = Instant::now();
    }

    /// Delay between two steps.
    pub(crate) const fn delay(&self) -> Duration {
        self.delay
    }

    /// Checks whether the next step is due, starting a new wait if it is.
    pub(crate) fn ready(&mut self) -> bool {
        if self.last_update_time.elapsed() >= self.delay {
            self.last_update_time = Instant::now();
            true
        } else {
            false
        }
    }

    /// Time left until the next step is due.
    pub(crate) fn remaining(&self) -> Duration {
        self.delay.saturating_sub(self.last_update_time.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_zero_delay_is_always_ready() {
        let mut timer = StepTimer::new(Duration::ZERO);

        assert!(timer.ready());
        assert!(timer.ready());
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_long_delay_is_not_ready() {
        let mut timer = StepTimer::new(Duration::from_secs(3600));

        assert!(!timer.ready());
        assert!(timer.remaining() > Duration::from_secs(3500));
    }

    #[test]
    fn test_rearm_changes_delay() {
        let mut timer = StepTimer::new(Duration::from_secs(3600));
        timer.rearm(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(5));

        assert_eq!(timer.delay(), Duration::from_millis(1));
        assert!(timer.ready());
        assert!(!StepTimer::new(Duration::from_secs(60)).ready());
    }
}
