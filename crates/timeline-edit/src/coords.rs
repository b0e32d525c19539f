//! Pure mapping between time units and pixel space.
//!
//! All functions here are total and exactly invertible: `pixel_to_time`
//! undoes `time_to_pixel` to within floating-point epsilon, and the
//! transform/time-range pair round-trips the same way.

use serde::{Deserialize, Serialize};

use crate::ADD_SCALE_COUNT;

/// Scale parameters of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleConfig {
    /// Pixel offset of time zero from the left edge of the content area.
    pub start_left: f64,
    /// Time units per tick mark.
    pub scale: f64,
    /// Pixel width of a tick mark.
    pub scale_width: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            start_left: crate::DEFAULT_START_LEFT,
            scale: crate::DEFAULT_SCALE,
            scale_width: crate::DEFAULT_SCALE_WIDTH,
        }
    }
}

impl ScaleConfig {
    /// Pixels per time unit.
    pub fn pixels_per_unit(&self) -> f64 {
        self.scale * self.scale_width
    }
}

/// Half-open time span of an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

/// Pixel-space projection of a [`TimeRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub left: f64,
    pub width: f64,
}

impl Transform {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

pub fn time_to_pixel(time: f64, cfg: &ScaleConfig) -> f64 {
    cfg.start_left + time * cfg.pixels_per_unit()
}

pub fn pixel_to_time(pixel: f64, cfg: &ScaleConfig) -> f64 {
    (pixel - cfg.start_left) / cfg.pixels_per_unit()
}

pub fn time_range_to_transform(range: TimeRange, cfg: &ScaleConfig) -> Transform {
    let left = time_to_pixel(range.start, cfg);
    Transform {
        left,
        width: time_to_pixel(range.end, cfg) - left,
    }
}

pub fn transform_to_time_range(transform: Transform, cfg: &ScaleConfig) -> TimeRange {
    TimeRange {
        start: pixel_to_time(transform.left, cfg),
        end: pixel_to_time(transform.left + transform.width, cfg),
    }
}

/// Number of tick marks needed so that `pixel` stays inside the rendered
/// axis, with [`ADD_SCALE_COUNT`] marks of headroom. Never shrinks below the
/// current `scale_count`.
pub fn scale_count_from_pixel(
    pixel: f64,
    start_left: f64,
    scale_width: f64,
    scale_count: usize,
) -> usize {
    let needed = ((pixel - start_left) / scale_width).ceil();
    if !needed.is_finite() || needed < 0.0 {
        return scale_count;
    }
    scale_count.max(needed as usize + ADD_SCALE_COUNT)
}
