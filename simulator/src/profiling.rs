//! Frame timing statistics for the simulator window.

use core::fmt::Write;
use std::time::{Duration, Instant};

use heapless::String;
use hud_compositor::render::FrameStats;

/// Frame timing and compositor statistics.
pub struct FrameMetrics {
    // Frame timing (microseconds)
    pub frame_time_us: u32,
    pub render_time_us: u32,
    pub sleep_time_us: u32,

    // Statistics
    pub frame_time_min_us: u32,
    pub frame_time_max_us: u32,
    frame_time_avg_us: f32,

    // Counters
    pub total_frames: u64,
    /// Ticks without vision (not started or camera down).
    pub blank_frames: u64,
    pub failed_frames: u64,
    /// Drawers run by the last frame.
    pub drawers_run: usize,

    start_time: Instant,
}

impl FrameMetrics {
    const EMA_ALPHA: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            frame_time_us: 0,
            render_time_us: 0,
            sleep_time_us: 0,
            frame_time_min_us: u32::MAX,
            frame_time_max_us: 0,
            frame_time_avg_us: 0.0,
            total_frames: 0,
            blank_frames: 0,
            failed_frames: 0,
            drawers_run: 0,
            start_time: Instant::now(),
        }
    }

    /// Record timing and, when the frame succeeded, its compositor stats.
    pub fn record_frame(
        &mut self,
        total_time: Duration,
        render_time: Duration,
        sleep_time: Duration,
        stats: Option<&FrameStats>,
    ) {
        let total_us = total_time.as_micros() as u32;
        self.frame_time_us = total_us;
        self.render_time_us = render_time.as_micros() as u32;
        self.sleep_time_us = sleep_time.as_micros() as u32;

        self.frame_time_min_us = self.frame_time_min_us.min(total_us);
        self.frame_time_max_us = self.frame_time_max_us.max(total_us);

        if self.total_frames == 0 {
            self.frame_time_avg_us = total_us as f32;
        } else {
            self.frame_time_avg_us =
                Self::EMA_ALPHA.mul_add(total_us as f32, (1.0 - Self::EMA_ALPHA) * self.frame_time_avg_us);
        }

        match stats {
            Some(stats) => {
                self.drawers_run = stats.drawers_run;
                if !stats.vision {
                    self.blank_frames += 1;
                }
            }
            None => self.failed_frames += 1,
        }
        self.total_frames += 1;
    }

    #[inline]
    pub const fn frame_time_avg_us(&self) -> u32 { self.frame_time_avg_us as u32 }

    /// Frames per second from the average frame time.
    pub fn fps(&self) -> f32 {
        if self.frame_time_avg_us > 0.0 { 1_000_000.0 / self.frame_time_avg_us } else { 0.0 }
    }

    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }

    /// Format uptime as HH:MM:SS.
    pub fn uptime_string(&self) -> String<12> {
        let secs = self.uptime().as_secs();
        let mut s = String::new();
        write!(s, "{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60).ok();
        s
    }

    /// One-line summary for the status overlay.
    pub fn status_line(&self) -> String<96> {
        let mut s = String::new();
        write!(
            s,
            "{:.1} FPS  render {:.1} ms  drawers {}  blank {}  up {}",
            self.fps(),
            self.render_time_us as f32 / 1000.0,
            self.drawers_run,
            self.blank_frames,
            self.uptime_string()
        )
        .ok();
        s
    }
}

impl Default for FrameMetrics {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(vision: bool) -> FrameStats {
        FrameStats {
            frame: 1,
            vision,
            blitted: vision,
            drawers_run: if vision { 13 } else { 0 },
        }
    }

    #[test]
    fn test_min_max_and_average() {
        let mut metrics = FrameMetrics::new();
        let ms = Duration::from_millis;
        metrics.record_frame(ms(50), ms(30), ms(20), Some(&stats(true)));
        metrics.record_frame(ms(60), ms(55), ms(5), Some(&stats(true)));
        assert_eq!(metrics.frame_time_min_us, 50_000);
        assert_eq!(metrics.frame_time_max_us, 60_000);
        assert!((50_990..=51_010).contains(&metrics.frame_time_avg_us()), "EMA moves a tenth of the way");
        assert_eq!(metrics.drawers_run, 13);
    }

    #[test]
    fn test_blank_and_failed_frames_counted() {
        let mut metrics = FrameMetrics::new();
        metrics.record_frame(Duration::from_millis(5), Duration::ZERO, Duration::ZERO, Some(&stats(false)));
        metrics.record_frame(Duration::from_millis(5), Duration::ZERO, Duration::ZERO, None);
        assert_eq!(metrics.blank_frames, 1);
        assert_eq!(metrics.failed_frames, 1);
        assert_eq!(metrics.total_frames, 2);
    }

    #[test]
    fn test_uptime_format() {
        let metrics = FrameMetrics::new();
        assert_eq!(metrics.uptime_string().as_str(), "00:00:00");
    }
}
