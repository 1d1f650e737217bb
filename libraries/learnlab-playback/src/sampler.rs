//! Progress sampling
//!
//! While playing, the sampler fires on a fixed cadence and turns the
//! resource's position into a [`ProgressReport`]. The cadence is driven
//! cooperatively by [`MediaTracker::tick`](crate::MediaTracker::tick); no
//! thread or runtime timer is involved.

use crate::resource::PlaybackResource;
use crate::types::{PlaybackRate, ProgressReport, ProgressUpdate};
use std::time::{Duration, Instant};

/// Receives progress reports for persistence
///
/// Fire-and-forget: implementations handle their own failures and must not
/// block the caller.
pub trait ProgressSink {
    /// Hand over one report
    fn report(&self, report: &ProgressReport);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressReport),
{
    fn report(&self, report: &ProgressReport) {
        self(report)
    }
}

/// Cancellable periodic deadline
///
/// Armed timers fire once per period when polled. Disarming or dropping the
/// timer cancels it; re-arming starts a fresh period.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl IntervalTimer {
    /// Create a disarmed timer
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Start a fresh period at `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    /// Cancel any pending deadline
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Pending deadline, if armed
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Period between firings
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true once per elapsed period
    ///
    /// Missed periods are not replayed: after a long stall the timer fires
    /// once and schedules the next deadline a full period from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let next = deadline + self.period;
        self.deadline = Some(if next <= now { now + self.period } else { next });
        true
    }
}

/// Periodic progress sampler
#[derive(Debug, Clone)]
pub struct Sampler {
    timer: IntervalTimer,
}

impl Sampler {
    /// Create a sampler with the given cadence
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
        }
    }

    /// Disarm; the next poll that sees playback starts a fresh period
    pub fn reset(&mut self) {
        self.timer.disarm();
    }

    /// Whether the timer is running
    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Underlying timer
    pub fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    /// Advance the cadence, returns true when a sample is due
    ///
    /// Not playing disarms immediately, so no trailing sample is taken
    /// after a pause.
    pub fn poll(&mut self, now: Instant, is_playing: bool) -> bool {
        if !is_playing {
            self.timer.disarm();
            return false;
        }
        if !self.timer.is_armed() {
            self.timer.arm(now);
            return false;
        }
        self.timer.poll(now)
    }

    /// Read the resource and build a report plus the matching store update
    pub fn sample(
        item_id: &str,
        resource: &dyn PlaybackResource,
        rate: PlaybackRate,
    ) -> (ProgressReport, ProgressUpdate) {
        let position = resource.position();
        let completion = completion_percentage(position, resource.duration());

        let report = ProgressReport {
            item_id: item_id.to_string(),
            position_seconds: position,
            completion_percentage: completion,
        };
        let update = ProgressUpdate {
            position_seconds: Some(position),
            completion_percentage: Some(completion),
            playback_speed: Some(rate.as_f64()),
            completed_segments: None,
        };
        (report, update)
    }
}

/// `100 * position / duration`, zero when the duration is unusable
pub fn completion_percentage(position: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !position.is_finite() {
        return 0.0;
    }
    (100.0 * position / duration).clamp(0.0, 100.0)
}
