//! Grid quantization and magnetic guide-line snapping.
//!
//! One [`SnapResolver`] lives for the duration of a single drag or resize
//! gesture. Pointer deltas are accumulated and only consumed once they cross
//! the effective step (the magnetic distance while adsorbed, otherwise the
//! grid size), so sub-grid motion never jitters the action. Leftover
//! sub-threshold motion is carried over between ticks, including across
//! snapped/unsnapped transitions.

use crate::{Direction, Transform};

/// Pixel-space movement limits for the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            left: f64::NEG_INFINITY,
            right: f64::INFINITY,
        }
    }
}

/// Per-gesture snapping parameters, frozen at gesture start.
#[derive(Debug, Clone)]
pub struct SnapParams {
    /// Grid step, px.
    pub grid: f64,
    /// Magnetic snap distance, px.
    pub adsorption_distance: f64,
    /// Pixel position of time zero; the grid is anchored here.
    pub start_left: f64,
    pub bounds: Bounds,
    /// Guide-line pixel positions eligible for magnetic snapping.
    pub guide_positions: Vec<f64>,
    /// Whether a left-edge resize searches the guide set at all.
    pub magnet_left_edge: bool,
}

impl Default for SnapParams {
    fn default() -> Self {
        Self {
            grid: crate::DEFAULT_MOVE_GRID,
            adsorption_distance: crate::DEFAULT_ADSORPTION_DISTANCE,
            start_left: crate::DEFAULT_START_LEFT,
            bounds: Bounds::default(),
            guide_positions: Vec::new(),
            magnet_left_edge: true,
        }
    }
}

/// Resolves raw pointer deltas into snapped pixel positions.
#[derive(Debug, Clone)]
pub struct SnapResolver {
    params: SnapParams,
    delta: f64,
    adsorbed: bool,
}

impl SnapResolver {
    pub fn new(params: SnapParams) -> Self {
        Self {
            params,
            delta: 0.0,
            adsorbed: false,
        }
    }

    /// Adds raw pointer movement to the accumulator.
    pub fn accumulate(&mut self, dx: f64) {
        self.delta += dx;
    }

    /// Whether the last consumed tick aligned to a guide line.
    pub fn is_adsorbed(&self) -> bool {
        self.adsorbed
    }

    pub fn reset(&mut self) {
        self.delta = 0.0;
        self.adsorbed = false;
    }

    fn effective_distance(&self) -> f64 {
        if self.adsorbed {
            self.params.adsorption_distance
        } else {
            self.params.grid
        }
    }

    /// Nearest guide line within the magnetic distance of `edge`, if any.
    /// Returns (distance, guide position).
    fn nearest_guide(&self, edge: f64) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for &guide in &self.params.guide_positions {
            let distance = (guide - edge).abs();
            if distance < self.params.adsorption_distance
                && best.is_none_or(|(d, _)| distance < d)
            {
                best = Some((distance, guide));
            }
        }
        best
    }

    fn quantize_to_grid(&self, pixel: f64) -> f64 {
        let offset = pixel - self.params.start_left;
        if offset % self.params.grid != 0.0 {
            self.params.start_left + self.params.grid * (offset / self.params.grid).round()
        } else {
            pixel
        }
    }

    /// Consumes the accumulator for a horizontal move. Returns the new left
    /// edge, or `None` while the accumulated delta is below threshold.
    pub fn snap_move(&mut self, pre_left: f64, pre_width: f64) -> Option<f64> {
        let distance = self.effective_distance();
        if self.delta.abs() < distance {
            return None;
        }
        let steps = (self.delta / distance).trunc();
        let mut left = pre_left + steps * distance;

        // Both edges are magnetic; the smaller distance wins and the left
        // edge beats the right edge on an exact tie.
        let left_hit = self.nearest_guide(left);
        let right_hit = self.nearest_guide(left + pre_width);
        let snapped = match (left_hit, right_hit) {
            (Some((dl, gl)), Some((dr, gr))) => {
                if dl <= dr {
                    Some(gl)
                } else {
                    Some(gr - pre_width)
                }
            }
            (Some((_, gl)), None) => Some(gl),
            (None, Some((_, gr))) => Some(gr - pre_width),
            (None, None) => None,
        };

        if let Some(position) = snapped {
            self.adsorbed = true;
            left = position;
        } else {
            left = self.quantize_to_grid(left);
            self.adsorbed = false;
        }
        self.delta %= distance;

        if left < self.params.bounds.left {
            left = self.params.bounds.left;
        } else if left + pre_width > self.params.bounds.right {
            left = self.params.bounds.right - pre_width;
        }
        Some(left)
    }

    /// Consumes the accumulator for a resize. Only the moving edge is tested
    /// against guide lines; the opposite edge is held fixed and the width is
    /// clamped so it never changes sign.
    pub fn snap_resize(
        &mut self,
        dir: Direction,
        pre_left: f64,
        pre_width: f64,
    ) -> Option<Transform> {
        let distance = self.effective_distance();
        if self.delta.abs() < distance {
            return None;
        }
        let steps = (self.delta / distance).trunc();

        match dir {
            Direction::Left => {
                let mut left = pre_left + steps * distance;
                let hit = if self.params.magnet_left_edge {
                    self.nearest_guide(left)
                } else {
                    None
                };
                if let Some((_, guide)) = hit {
                    self.adsorbed = true;
                    left = guide;
                } else {
                    left = self.quantize_to_grid(left);
                    self.adsorbed = false;
                }
                self.delta %= distance;

                let right = pre_left + pre_width;
                if left < self.params.bounds.left {
                    left = self.params.bounds.left;
                }
                if left > right {
                    left = right;
                }
                Some(Transform {
                    left,
                    width: right - left,
                })
            }
            Direction::Right => {
                let mut right = pre_left + pre_width + steps * distance;
                if let Some((_, guide)) = self.nearest_guide(right) {
                    self.adsorbed = true;
                    right = guide;
                } else {
                    right = self.quantize_to_grid(right);
                    self.adsorbed = false;
                }
                self.delta %= distance;

                if right > self.params.bounds.right {
                    right = self.params.bounds.right;
                }
                if right < pre_left {
                    right = pre_left;
                }
                Some(Transform {
                    left: pre_left,
                    width: right - pre_left,
                })
            }
        }
    }
}
