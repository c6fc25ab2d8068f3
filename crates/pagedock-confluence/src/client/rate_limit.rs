//! Request rate limiting with a counting 60-second window.

use std::time::{Duration, Instant};

use tracing::debug;

/// Window length for the request counter.
const WINDOW: Duration = Duration::from_secs(60);

/// Counting rate limiter.
///
/// After `max_per_window` requests inside the current window the caller
/// sleeps for the remainder of the window; the counter resets once a full
/// window has elapsed since the first request in it. State is process-local
/// and mutated only by the owning client's sequential calls.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window_start: Option<Instant>,
    count: u32,
}

impl RateLimiter {
    /// Create a limiter allowing `max_per_window` requests per minute.
    #[must_use]
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window: max_per_window.max(1),
            window_start: None,
            count: 0,
        }
    }

    /// Account for one request, sleeping when the ceiling is reached.
    pub fn acquire(&mut self) {
        if let Some(pause) = self.plan(Instant::now()) {
            debug!(seconds = pause.as_secs_f64(), "rate limit reached, pausing");
            std::thread::sleep(pause);
            // The pause consumed the rest of the window
            self.window_start = Some(Instant::now());
            self.count = 1;
        }
    }

    /// Pure bookkeeping half of [`acquire`](Self::acquire): count the request
    /// at `now` and return how long the caller must pause, if at all.
    fn plan(&mut self, now: Instant) -> Option<Duration> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            self.count = 1;
            return None;
        };

        let elapsed = now.duration_since(start);
        if elapsed >= WINDOW {
            self.window_start = Some(now);
            self.count = 1;
            return None;
        }

        self.count += 1;
        if self.count > self.max_per_window {
            return Some(WINDOW - elapsed);
        }
        None
    }
}
