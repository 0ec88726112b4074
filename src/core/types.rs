use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Drawing surface size supplied by the host for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Replaces non-finite or negative extents with zero so projections stay finite.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clean = |value: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                0.0
            }
        };
        Self {
            width: clean(self.width),
            height: clean(self.height),
        }
    }
}

impl Hash for Canvas {
    fn hash<H: Hasher>(&self, state: &mut H) {
        OrderedFloat(self.width).hash(state);
        OrderedFloat(self.height).hash(state);
    }
}

/// Visible window vs. total scroll extent, both in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub visible_hours: u32,
    pub total_hours: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(visible_hours: u32, total_hours: u32) -> Self {
        Self {
            visible_hours,
            total_hours,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.visible_hours > 0 && self.total_hours > 0
    }

    /// Visible hours clamped to at least one so the horizontal scale never divides by zero.
    #[must_use]
    pub fn effective_visible_hours(self) -> u32 {
        self.visible_hours.max(1)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            visible_hours: 5,
            total_hours: 24,
        }
    }
}
