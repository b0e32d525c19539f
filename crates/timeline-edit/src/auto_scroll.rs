//! Edge-triggered auto-scroll for active gestures.
//!
//! While a drag or resize is running and the pointer sits inside a margin at
//! either end of the viewport, the controller yields a scroll delta on every
//! host tick (frame or timer), scaled by how deep into the margin the pointer
//! is. `start`/`stop` are idempotent; `stop` is called on every gesture exit
//! path, after which `tick` never yields again.

/// Margin at each viewport edge that triggers scrolling, px.
pub const DEFAULT_SCROLL_MARGIN: f64 = 32.0;
/// Largest scroll delta yielded per tick, px.
pub const DEFAULT_MAX_SCROLL_SPEED: f64 = 12.0;

#[derive(Debug, Clone)]
pub struct AutoScrollController {
    margin: f64,
    max_speed: f64,
    running: bool,
    speed: f64,
}

impl Default for AutoScrollController {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_MARGIN, DEFAULT_MAX_SCROLL_SPEED)
    }
}

impl AutoScrollController {
    pub fn new(margin: f64, max_speed: f64) -> Self {
        Self {
            margin,
            max_speed,
            running: false,
            speed: 0.0,
        }
    }

    /// Arms the controller for a gesture. Calling it again while already
    /// running only resets the current speed.
    pub fn start(&mut self) {
        self.running = true;
        self.speed = 0.0;
    }

    /// Disarms the controller. Safe to call at any time, running or not.
    pub fn stop(&mut self) {
        self.running = false;
        self.speed = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Recomputes the per-tick speed from the pointer's x position relative
    /// to the viewport's left edge. Negative speed scrolls toward the start.
    pub fn update_pointer(&mut self, pointer_x: f64, viewport_width: f64) {
        if !self.running || !pointer_x.is_finite() || !viewport_width.is_finite() {
            return;
        }
        self.speed = if pointer_x < self.margin {
            let depth = (self.margin - pointer_x).clamp(0.0, self.margin);
            -self.max_speed * depth / self.margin
        } else if pointer_x > viewport_width - self.margin {
            let depth = (pointer_x - (viewport_width - self.margin)).clamp(0.0, self.margin);
            self.max_speed * depth / self.margin
        } else {
            0.0
        };
    }

    /// The scroll delta for this tick, if the gesture is active and the
    /// pointer is inside a scroll margin.
    pub fn tick(&self) -> Option<f64> {
        if self.running && self.speed != 0.0 {
            Some(self.speed)
        } else {
            None
        }
    }
}
