use chrono::{DateTime, TimeDelta, Utc};

/// Fixed-interval schedule for periodic snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveTimer {
    interval: TimeDelta,
    next_due: DateTime<Utc>,
}

impl AutosaveTimer {
    pub fn new(interval: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// Returns true once per elapsed interval and schedules the next one.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    /// Starts a fresh interval from `now`.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.next_due = now + self.interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_fires_once_per_interval() {
        let mut timer = AutosaveTimer::new(TimeDelta::seconds(10), at(0));
        assert!(!timer.poll(at(9)));
        assert!(timer.poll(at(10)));
        assert!(!timer.poll(at(15)));
        assert!(timer.poll(at(21)));
    }

    #[test]
    fn test_restart_pushes_deadline() {
        let mut timer = AutosaveTimer::new(TimeDelta::seconds(10), at(0));
        timer.restart(at(8));
        assert!(!timer.poll(at(10)));
        assert!(timer.poll(at(18)));
    }
}
