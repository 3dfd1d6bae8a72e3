//! Frame-driven task primitives.
//!
//! The engine has three recurring scheduling needs: detecting when a zoom/pan
//! gesture has gone quiet, detecting when a label sub-scroll has settled, and
//! stepping an eased recovery animation. All three follow the same rule:
//! starting a new instance cancels the previous one (last-request-wins, never
//! queued). This module implements the pattern once.
//!
//! Nothing here reads a clock. Callers pass the host's frame timestamp into
//! `restart`/`poll`, which keeps idle windows tied to display-refresh time and
//! makes tests deterministic.

/// A restartable idle deadline polled once per frame.
///
/// `restart` arms (or re-arms) the deadline; `poll` fires at most once when
/// the idle window has elapsed without another restart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debounce {
    deadline: Option<f64>,
}

impl Debounce {
    /// Arms the deadline `window_ms` after `now_ms`, replacing any pending one.
    pub fn restart(&mut self, now_ms: f64, window_ms: f64) {
        self.deadline = Some(now_ms + window_ms);
    }

    /// Cancels the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true while a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires if the idle window has elapsed. Disarms on fire.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A fixed-duration interpolation from one value to another, stepped once per
/// frame with an ease-out-quadratic curve.
#[derive(Debug, Clone, Copy)]
pub struct EasedTween {
    from: f64,
    to: f64,
    started_at: f64,
    duration_ms: f64,
}

impl EasedTween {
    /// Starts a tween at `now_ms`. Creating a new tween where one is already
    /// running is the cancellation mechanism: the caller overwrites the slot.
    pub fn new(from: f64, to: f64, now_ms: f64, duration_ms: f64) -> Self {
        Self { from, to, started_at: now_ms, duration_ms }
    }

    /// Returns the target value.
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Returns the interpolated value at `now_ms`.
    pub fn value_at(&self, now_ms: f64) -> f64 {
        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - self.started_at) / self.duration_ms).clamp(0.0, 1.0)
        };
        self.from + (self.to - self.from) * ease_out_quad(progress)
    }

    /// Returns true once the tween has reached its target.
    pub fn is_done(&self, now_ms: f64) -> bool {
        now_ms - self.started_at >= self.duration_ms
    }
}

/// Ease-out-quadratic: fast start, gentle landing.
fn ease_out_quad(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p) * (1.0 - p)
}
