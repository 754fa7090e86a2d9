//! Frame timing, statistics, and the on-screen frame log

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Wall-clock timing for the frame loop.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    delta: Duration,
}

impl Time {
    /// Start the clock.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
        }
    }

    /// Advance to the current instant, capturing the frame delta.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
    }

    /// Duration of the last frame.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Last frame delta in seconds, for movement math.
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Time since the clock started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling frame-rate statistics over the last 120 frames.
#[derive(Debug)]
pub struct FrameStats {
    frame_times: VecDeque<Duration>,
    fps: f32,
    avg_frame_time_ms: f32,
    min_frame_time_ms: f32,
    max_frame_time_ms: f32,
    total_frames: u64,
}

impl FrameStats {
    const WINDOW: usize = 120;

    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(Self::WINDOW),
            fps: 0.0,
            avg_frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            total_frames: 0,
        }
    }

    /// Record one frame's delta and refresh the derived numbers.
    pub fn record_frame(&mut self, delta: Duration) {
        self.total_frames += 1;
        if self.frame_times.len() >= Self::WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(delta);

        let mut total = Duration::ZERO;
        let mut min = Duration::MAX;
        let mut max = Duration::ZERO;
        for &frame in &self.frame_times {
            total += frame;
            min = min.min(frame);
            max = max.max(frame);
        }
        let count = self.frame_times.len() as f32;
        let total_secs = total.as_secs_f32();
        if total_secs > 0.0 {
            self.fps = count / total_secs;
            self.avg_frame_time_ms = total_secs / count * 1000.0;
        } else {
            self.fps = 0.0;
            self.avg_frame_time_ms = 0.0;
        }
        self.min_frame_time_ms = min.as_secs_f32() * 1000.0;
        self.max_frame_time_ms = max.as_secs_f32() * 1000.0;
    }

    /// Frames per second over the rolling window.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_frame_time_ms
    }

    /// Fastest frame in the window, in milliseconds.
    #[must_use]
    pub fn min_frame_time_ms(&self) -> f32 {
        self.min_frame_time_ms
    }

    /// Slowest frame in the window, in milliseconds.
    #[must_use]
    pub fn max_frame_time_ms(&self) -> f32 {
        self.max_frame_time_ms
    }

    /// Frames recorded since startup.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// One-line summary for overlays and logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FPS: {:.1} | frame: {:.2}ms (min {:.2}, max {:.2})",
            self.fps, self.avg_frame_time_ms, self.min_frame_time_ms, self.max_frame_time_ms
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame text overlay.
///
/// Systems push lines during update; the context draws them at the
/// configured anchor with the default font and forgets them. Disabled by
/// default, costing nothing until enabled.
#[derive(Debug, Default)]
pub struct FrameLog {
    enabled: bool,
    anchor: (i32, i32),
    lines: Vec<String>,
}

impl FrameLog {
    /// Create a disabled log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable drawing, anchored at (x, y) in logical pixels.
    pub fn enable_at(&mut self, x: i32, y: i32) {
        self.enabled = true;
        self.anchor = (x, y);
    }

    /// Stop drawing. Queued lines still reset every frame.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether the log draws this frame.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Top-left corner the lines are drawn from.
    #[must_use]
    pub fn anchor(&self) -> (i32, i32) {
        self.anchor
    }

    /// Queue a line for this frame.
    pub fn log(&mut self, line: impl Into<String>) {
        if self.enabled {
            self.lines.push(line.into());
        }
    }

    /// Lines queued so far this frame.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drop the previous frame's lines. The engine calls this once per
    /// frame before the game updates.
    pub fn begin_frame(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_update_advances() {
        let mut time = Time::new();
        time.update();
        assert!(time.delta() >= Duration::ZERO);
        assert!(time.elapsed() >= time.delta());
    }

    #[test]
    fn test_frame_stats_window_math() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::from_millis(10));
        stats.record_frame(Duration::from_millis(20));

        assert_eq!(stats.total_frames(), 2);
        assert!((stats.avg_frame_time_ms() - 15.0).abs() < 0.01);
        assert!((stats.min_frame_time_ms() - 10.0).abs() < 0.01);
        assert!((stats.max_frame_time_ms() - 20.0).abs() < 0.01);
        // 2 frames over 30ms.
        assert!((stats.fps() - 66.67).abs() < 0.1);
    }

    #[test]
    fn test_frame_stats_window_slides() {
        let mut stats = FrameStats::new();
        for _ in 0..FrameStats::WINDOW + 50 {
            stats.record_frame(Duration::from_millis(5));
        }
        assert_eq!(stats.total_frames(), (FrameStats::WINDOW + 50) as u64);
        assert!((stats.avg_frame_time_ms() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_frame_log_collects_only_when_enabled() {
        let mut log = FrameLog::new();
        log.log("dropped");
        assert!(log.lines().is_empty());

        log.enable_at(5, 5);
        log.log("update: 2ms");
        log.log("entities: 14");
        assert_eq!(log.lines().len(), 2);
        assert_eq!(log.anchor(), (5, 5));

        log.begin_frame();
        assert!(log.lines().is_empty());
        assert!(log.is_enabled());
    }
}
