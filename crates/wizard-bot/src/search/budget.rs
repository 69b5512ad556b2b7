use std::time::{Duration, Instant};

/// Wall-clock budget for one decision, polled between units of work.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    start: Instant,
    limit: Duration,
}

impl Budget {
    pub fn start(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    /// True while less than `fraction` of the limit has been used.
    pub fn within(&self, fraction: f64) -> bool {
        self.elapsed() < self.limit.mul_f64(fraction)
    }

    pub fn is_exhausted(&self) -> bool {
        self.elapsed() >= self.limit
    }

    /// `fraction` of the time still left.
    pub fn slice(&self, fraction: f64) -> Duration {
        self.remaining().mul_f64(fraction)
    }

    pub fn utilization_percent(&self) -> u8 {
        if self.limit.is_zero() {
            return 100;
        }
        let used = self.elapsed().as_secs_f64() / self.limit.as_secs_f64();
        (used * 100.0).round().clamp(0.0, 100.0) as u8
    }
}
