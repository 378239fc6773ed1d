use std::time::{Duration, Instant};

/// Measures the time between frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            delta: Duration::ZERO,
        }
    }

    /// Marks the start of a frame and returns the seconds since the
    /// previous one.
    pub fn update(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        self.delta = now.saturating_duration_since(self.last);
        self.last = now;
        self.delta_seconds()
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.last.saturating_duration_since(self.start).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_time_since_previous_update() {
        let mut clock = FrameClock::new();
        let start = clock.start;

        assert!((clock.tick_at(start + Duration::from_millis(16)) - 0.016).abs() < 1e-6);
        assert!((clock.tick_at(start + Duration::from_millis(50)) - 0.034).abs() < 1e-6);
        assert!((clock.elapsed_seconds() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn fresh_clock_reports_zero() {
        let clock = FrameClock::new();
        assert_eq!(clock.delta_seconds(), 0.0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
    }
}
