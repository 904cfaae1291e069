//! # Frame Timing
//!
//! Two small pieces drive the render loop's notion of time:
//!
//! - [`FrameClock`] yields the elapsed seconds since the previous frame, used
//!   for frame-rate-independent camera movement.
//! - [`FpsCounter`] averages frame times over short windows and formats the
//!   window title with the result.
//!
//! ## Usage
//!
//! ```rust
//! use woodland::performance::{FpsCounter, FrameClock};
//!
//! let mut clock = FrameClock::new();
//! let mut fps = FpsCounter::new();
//!
//! // In your main loop
//! let dt = clock.tick();
//! assert!(dt <= 0.25);
//! if let Some(title) = fps.frame("Woodland") {
//!     println!("{title}");
//! }
//! ```

use std::time::{Duration, Instant};

/// Longest step a single frame may report, in seconds.
pub const MAX_FRAME_STEP: f32 = 0.25;

/// Minimum length of an FPS averaging window.
pub const FPS_WINDOW: Duration = Duration::from_millis(250);

/// Measures the time between consecutive frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick, clamped to [`MAX_FRAME_STEP`].
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_STEP)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averaged frame statistics of the last completed window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerformanceMetrics {
    pub fps: f32,
    pub frame_time_ms: f32,
}

impl PerformanceMetrics {
    /// `"<title>    FPS: x.xxx    Frame Time: y.yyy (ms)"`
    pub fn title(&self, base: &str) -> String {
        format!(
            "{base}    FPS: {:.3}    Frame Time: {:.3} (ms)",
            self.fps, self.frame_time_ms
        )
    }
}

/// Counts frames and reports an average once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    metrics: PerformanceMetrics,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            window_start: start,
            frames: 0,
            metrics: PerformanceMetrics::default(),
        }
    }

    /// Counts one frame. Returns a fresh window title when a window closes.
    pub fn frame(&mut self, base_title: &str) -> Option<String> {
        self.frame_at(Instant::now(), base_title)
    }

    pub fn frame_at(&mut self, now: Instant, base_title: &str) -> Option<String> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < FPS_WINDOW {
            return None;
        }

        let seconds = elapsed.as_secs_f32();
        self.metrics.fps = self.frames as f32 / seconds;
        self.metrics.frame_time_ms = seconds * 1000.0 / self.frames as f32;
        self.frames = 0;
        self.window_start = now;

        Some(self.metrics.title(base_title))
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_reports_elapsed_seconds() {
        let start = Instant::now();
        let mut clock = FrameClock { last: start };
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_clock_clamps_long_stalls() {
        let start = Instant::now();
        let mut clock = FrameClock { last: start };
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), MAX_FRAME_STEP);
        // time going backwards is treated as no time at all
        assert_eq!(clock.tick_at(start), 0.0);
    }

    #[test]
    fn test_counter_waits_for_full_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::starting_at(start);
        for i in 1..10 {
            assert!(counter
                .frame_at(start + Duration::from_millis(i * 20), "W")
                .is_none());
        }
        let title = counter.frame_at(start + Duration::from_millis(250), "W");
        assert_eq!(
            title.as_deref(),
            Some("W    FPS: 40.000    Frame Time: 25.000 (ms)")
        );
    }

    #[test]
    fn test_counter_starts_new_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::starting_at(start);
        assert!(counter
            .frame_at(start + Duration::from_millis(500), "W")
            .is_some());
        assert!(counter
            .frame_at(start + Duration::from_millis(600), "W")
            .is_none());
        let title = counter.frame_at(start + Duration::from_millis(1000), "W");
        assert_eq!(
            title.as_deref(),
            Some("W    FPS: 4.000    Frame Time: 250.000 (ms)")
        );
    }
}
