//! Per-tick elapsed time

/// Tracks the previous tick timestamp and yields a sanitized dt
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    was_paused: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now_ms` and return the elapsed milliseconds.
    ///
    /// Always >= 0 and finite. Zero on the first tick and on the first tick
    /// after a pause. The timestamp advances even while paused.
    pub fn advance(&mut self, now_ms: f64, paused: bool) -> f64 {
        let resuming = self.was_paused && !paused;
        self.was_paused = paused;

        if !now_ms.is_finite() {
            return 0.0;
        }

        let dt = match self.last_ms.replace(now_ms) {
            Some(last) => now_ms - last,
            None => 0.0,
        };

        if resuming || !dt.is_finite() || dt < 0.0 {
            0.0
        } else {
            dt
        }
    }

    #[cfg(test)]
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_ms
    }
}
