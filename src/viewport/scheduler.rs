use std::time::{Duration, Instant};

/// Fixed-cadence tick clock. Stopped until [`FrameScheduler::start`].
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    running: bool,
    frame_interval: Duration,
    next_frame_time: Option<Instant>,
    last_frame_time: Option<Instant>,
    frame_count: u64,
    pub frame_dt: f32,
}

impl FrameScheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            running: false,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            next_frame_time: None,
            last_frame_time: None,
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The first frame is due immediately.
    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.next_frame_time = Some(now);
        log::debug!("frame loop started ({:?} interval)", self.frame_interval);
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.next_frame_time = None;
        log::debug!("frame loop stopped after {} frames", self.frame_count);
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.running && self.next_frame_time.is_some_and(|next| now >= next)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_frame_time.filter(|_| self.running)
    }

    /// Books a rendered frame at `now`. A late frame schedules the next one
    /// one interval from now rather than bursting to catch up.
    pub fn record_frame(&mut self, now: Instant) {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            self.frame_interval
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);
        self.frame_count = self.frame_count.saturating_add(1);

        if self.running {
            let scheduled = self.next_frame_time.unwrap_or(now) + self.frame_interval;
            self.next_frame_time = Some(if scheduled <= now {
                now + self.frame_interval
            } else {
                scheduled
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FrameScheduler;
    use std::time::{Duration, Instant};

    const INTERVAL: Duration = Duration::from_millis(16);

    #[test]
    fn nothing_is_due_until_started() {
        let mut scheduler = FrameScheduler::new(INTERVAL);
        let now = Instant::now();
        assert!(!scheduler.is_due(now));
        assert_eq!(scheduler.next_deadline(), None);

        scheduler.start(now);
        assert!(scheduler.is_due(now));
        assert_eq!(scheduler.next_deadline(), Some(now));
    }

    #[test]
    fn frames_follow_the_interval() {
        let mut scheduler = FrameScheduler::new(INTERVAL);
        let t0 = Instant::now();
        scheduler.start(t0);
        scheduler.record_frame(t0);
        assert_eq!(scheduler.frame_count(), 1);
        assert!(!scheduler.is_due(t0 + Duration::from_millis(5)));
        assert!(scheduler.is_due(t0 + INTERVAL));

        scheduler.record_frame(t0 + INTERVAL);
        assert_eq!(scheduler.next_deadline(), Some(t0 + INTERVAL * 2));
        assert!((scheduler.frame_dt - INTERVAL.as_secs_f32()).abs() < 1e-6);
    }

    #[test]
    fn late_frames_do_not_burst() {
        let mut scheduler = FrameScheduler::new(INTERVAL);
        let t0 = Instant::now();
        scheduler.start(t0);
        let late = t0 + Duration::from_millis(100);
        scheduler.record_frame(late);
        assert_eq!(scheduler.next_deadline(), Some(late + INTERVAL));
    }

    #[test]
    fn stop_clears_the_deadline() {
        let mut scheduler = FrameScheduler::new(INTERVAL);
        let t0 = Instant::now();
        scheduler.start(t0);
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert!(!scheduler.is_due(t0 + INTERVAL));
        assert_eq!(scheduler.next_deadline(), None);
    }
}
