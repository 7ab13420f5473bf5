// ── Virtual joystick ──
//
// Pure transformation from a pointer drag to a vector inside the unit
// disk. No I/O; the vector is consumed by the presentation layer only.

use serde::Serialize;

/// Default maximum knob travel, in display units.
pub const DEFAULT_RADIUS: f64 = 64.0;

/// Drive vector. `x` is positive to the right, `y` positive *up*
/// (screen y grows downward, so it is inverted on the way in).
/// Always satisfies `x² + y² ≤ 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JoystickVector {
    pub x: f64,
    pub y: f64,
}

impl JoystickVector {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_centered(self) -> bool {
        self == Self::ORIGIN
    }

    /// Knob displacement from the base center in screen coordinates
    /// (y down) for a joystick of the given radius.
    pub fn knob_offset(self, radius: f64) -> (f64, f64) {
        (self.x * radius, -self.y * radius)
    }
}

/// Tracks one drag gesture at a time.
#[derive(Debug, Clone)]
pub struct JoystickTracker {
    radius: f64,
    vector: JoystickVector,
    dragging: bool,
}

impl Default for JoystickTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

impl JoystickTracker {
    /// A non-positive or non-finite radius falls back to [`DEFAULT_RADIUS`].
    pub fn new(radius: f64) -> Self {
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            DEFAULT_RADIUS
        };
        Self {
            radius,
            vector: JoystickVector::ORIGIN,
            dragging: false,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn vector(&self) -> JoystickVector {
        self.vector
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer pressed inside the control.
    pub fn begin(&mut self) {
        self.dragging = true;
    }

    /// Pointer moved by `(dx, dy)` from the gesture origin, screen
    /// coordinates. Ignored unless a drag is in progress.
    pub fn update(&mut self, dx: f64, dy: f64) -> JoystickVector {
        if !self.dragging {
            return self.vector;
        }

        let x = finite_or_zero(dx) / self.radius;
        let y = -finite_or_zero(dy) / self.radius;

        let magnitude = x.hypot(y);
        self.vector = if magnitude > 1.0 {
            JoystickVector {
                x: x / magnitude,
                y: y / magnitude,
            }
        } else {
            JoystickVector { x, y }
        };
        self.vector
    }

    /// Pointer released: spring back to exactly center.
    pub fn release(&mut self) {
        self.dragging = false;
        self.vector = JoystickVector::ORIGIN;
    }

    /// Gesture cancelled by the system. Same as a release.
    pub fn terminate(&mut self) {
        self.release();
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
