use crate::clock::{deadline, millis};
use chrono::{DateTime, Duration, Utc};

/// Fixed-interval schedule for full scans. The host polls; nothing here
/// sleeps.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    next_run: Option<DateTime<Utc>>,
}

impl Scheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval: millis(interval_ms.max(1)),
            next_run: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.next_run
    }

    /// Records a run at `now`; the next one is due one interval later.
    /// An interval past the end of time is never due again.
    pub fn mark_ran(&mut self, now: DateTime<Utc>) {
        self.next_run = Some(deadline(now, self.interval));
    }

    /// Whether a run is due. Manual runs do not shift the schedule.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run.is_none_or(|due| now >= due)
    }

    /// Claims the due run, advancing the schedule by whole intervals so a
    /// stalled host does not fire a burst of catch-up scans.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> bool {
        let Some(due) = self.next_run else {
            self.mark_ran(now);
            return true;
        };
        if now < due {
            return false;
        }
        let step = self.interval.num_milliseconds().max(1);
        let behind = (now - due).num_milliseconds();
        let next = step
            .checked_mul(behind / step + 1)
            .and_then(Duration::try_milliseconds)
            .map_or(DateTime::<Utc>::MAX_UTC, |skip| deadline(due, skip));
        self.next_run = Some(next);
        true
    }

    pub fn reset(&mut self) {
        self.next_run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let start = DateTime::<Utc>::default();
        let mut s = Scheduler::new(30_000);
        s.mark_ran(start);
        assert!(!s.take_due(start + Duration::milliseconds(29_999)));
        assert!(s.take_due(start + Duration::milliseconds(30_000)));
        assert!(!s.take_due(start + Duration::milliseconds(30_001)));
    }

    #[test]
    fn skips_missed_ticks_without_bursting() {
        let start = DateTime::<Utc>::default();
        let mut s = Scheduler::new(1_000);
        s.mark_ran(start);
        assert!(s.take_due(start + Duration::milliseconds(5_500)));
        assert_eq!(s.next_run(), Some(start + Duration::milliseconds(6_000)));
        assert!(!s.take_due(start + Duration::milliseconds(5_900)));
    }

    #[test]
    fn huge_interval_is_never_due() {
        let start = DateTime::<Utc>::default();
        let mut s = Scheduler::new(u64::MAX);
        assert!(s.take_due(start));
        assert_eq!(s.next_run(), Some(DateTime::<Utc>::MAX_UTC));
        assert!(!s.take_due(start + Duration::days(365 * 1000)));

        s.mark_ran(DateTime::<Utc>::MAX_UTC - Duration::days(1));
        assert_eq!(s.next_run(), Some(DateTime::<Utc>::MAX_UTC));
    }
}
