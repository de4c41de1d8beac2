//! Timeline model: frames, fps and the time <-> pixel mapping.
//!
//! Every time-based renderer (live waveform strip, scrub handling, export
//! waveform) derives its vertical math from this one struct so the mappings
//! cannot drift apart. `y_for_time` and `time_for_y` are exact inverses up
//! to floating-point rounding for times inside `[0, duration]`.
//!
//! When no audio is loaded (`duration == 0`) the sheet still has a height:
//! `frame_count * row_height`.

use serde::{Deserialize, Serialize};

/// Frame/fps timeline with an optional audio duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineModel {
    /// Number of exposure rows in the sheet, always >= 1.
    pub frame_count: usize,
    /// Frames per second, always > 0.
    pub fps: f64,
    /// Loaded audio duration in seconds, 0.0 when no audio.
    pub duration: f64,
}

impl Default for TimelineModel {
    fn default() -> Self {
        Self { frame_count: 48, fps: 24.0, duration: 0.0 }
    }
}

impl TimelineModel {
    pub fn new(frame_count: usize, fps: f64, duration: f64) -> Self {
        Self {
            frame_count: frame_count.max(1),
            fps: if fps > 0.0 { fps } else { 24.0 },
            duration: duration.max(0.0),
        }
    }

    /// Vertical pixels covered by one second of audio at the given row height.
    pub fn pixels_per_second(&self, row_height: f32) -> f64 {
        self.fps * row_height as f64
    }

    /// Full strip height in pixels. Falls back to the frame grid height
    /// when there is no audio.
    pub fn total_pixel_height(&self, row_height: f32) -> f64 {
        if self.duration > 0.0 {
            self.duration * self.pixels_per_second(row_height)
        } else {
            self.frame_count as f64 * row_height as f64
        }
    }

    /// Audio time at a strip-space y position, clamped to `[0, duration]`.
    pub fn time_for_y(&self, y: f64, row_height: f32) -> f64 {
        let pps = self.pixels_per_second(row_height);
        if pps <= 0.0 || self.duration <= 0.0 {
            return 0.0;
        }
        (y / pps).clamp(0.0, self.duration)
    }

    /// Strip-space y position of an audio time.
    pub fn y_for_time(&self, t: f64, row_height: f32) -> f64 {
        t * self.pixels_per_second(row_height)
    }

    /// Frame row containing an audio time, clamped to the sheet.
    pub fn frame_for_time(&self, t: f64) -> usize {
        ((t * self.fps).floor().max(0.0) as usize).min(self.frame_count.saturating_sub(1))
    }

    /// Start time of a frame row.
    pub fn time_for_frame(&self, frame: usize) -> f64 {
        frame as f64 / self.fps
    }

    /// Rows needed to cover an audio duration (grows, never shrinks, a sheet).
    pub fn required_frames(fps: f64, duration: f64) -> usize {
        (duration * fps).ceil() as usize
    }
}
