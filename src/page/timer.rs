use std::time::Duration;

/// A task that becomes due every `interval` after an initial delay, until it is
/// cancelled. Time is supplied by the caller.
#[derive(Debug, Clone)]
pub struct RepeatingTask {
    interval: Duration,
    next_due: Duration,
    cancelled: bool,
}

impl RepeatingTask {
    pub fn start(now: Duration, delay: Duration, interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: now + delay,
            cancelled: false,
        }
    }

    pub fn every(now: Duration, interval: Duration) -> Self {
        Self::start(now, interval, interval)
    }

    /// Consumes one due tick, if any. Call in a loop to catch up after a long frame.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.cancelled || now < self.next_due {
            return false;
        }

        self.next_due += self.interval;
        true
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn first_tick_waits_for_delay() {
        let mut task = RepeatingTask::start(ms(0), ms(1000), ms(100));

        assert!(!task.poll(ms(999)));
        assert!(task.poll(ms(1000)));
        assert!(!task.poll(ms(1099)));
        assert!(task.poll(ms(1100)));
    }

    #[test]
    fn catches_up_one_tick_at_a_time() {
        let mut task = RepeatingTask::every(ms(0), ms(16));

        let mut ticks = 0;
        while task.poll(ms(100)) {
            ticks += 1;
        }

        assert_eq!(ticks, 6);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut task = RepeatingTask::every(ms(0), ms(16));
        task.cancel();

        assert!(task.is_cancelled());
        assert!(!task.poll(ms(10_000)));
    }
}
