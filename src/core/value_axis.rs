use serde::{Deserialize, Serialize};

use crate::core::{Canvas, GlucoseReading, PredictionSet};

/// Fallback bounds and guards used when deriving the glucose domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueDomainDefaults {
    pub ceiling: f64,
    pub floor: f64,
    pub min_span: f64,
}

impl Default for ValueDomainDefaults {
    fn default() -> Self {
        Self {
            ceiling: 450.0,
            floor: 70.0,
            min_span: 1.0,
        }
    }
}

/// Glucose value range shown on the vertical axis, in mg/dL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub min_value: f64,
    pub max_value: f64,
}

impl ValueDomain {
    /// Derives the domain from readings and every prediction series.
    ///
    /// The maximum falls back to `defaults.ceiling` only when there is no
    /// value at all. The minimum is always clamped to at most `defaults.floor`,
    /// while the maximum is never clamped to the ceiling.
    #[must_use]
    pub fn from_series(
        readings: &[GlucoseReading],
        predictions: &PredictionSet,
        defaults: ValueDomainDefaults,
    ) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in readings
            .iter()
            .filter_map(|reading| reading.value)
            .chain(predictions.values())
        {
            let value = f64::from(value);
            min = min.min(value);
            max = max.max(value);
        }

        let max_value = if max.is_finite() {
            max
        } else {
            defaults.ceiling
        };
        let min_value = if min.is_finite() {
            min.min(defaults.floor)
        } else {
            defaults.floor
        };

        Self::guarded(min_value, max_value, defaults.min_span)
    }

    /// Widens a collapsed or inverted range so the span is never zero.
    #[must_use]
    pub fn guarded(min_value: f64, max_value: f64, min_span: f64) -> Self {
        let min_span = if min_span.is_finite() && min_span > 0.0 {
            min_span
        } else {
            1.0
        };
        if max_value - min_value < f64::EPSILON {
            return Self {
                min_value,
                max_value: min_value + min_span,
            };
        }
        Self {
            min_value,
            max_value,
        }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max_value - self.min_value
    }
}

/// Domain bounds paired with their pixel rows, for grid lines and labels.
///
/// `min_y` is the row of `max_value` (top of the plot), `max_y` the row of
/// `min_value` (bottom of the plot).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelDomain {
    pub min_value: f64,
    pub max_value: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Vertical mapping from glucose values to chart y coordinates.
///
/// Higher values map to smaller y. `top_reserved` is kept free above the plot
/// for the basal sub-chart, `bottom_reserved` below it for time labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueAxis {
    domain: ValueDomain,
    plot_bottom: f64,
    pixels_per_unit: f64,
}

impl ValueAxis {
    #[must_use]
    pub fn new(
        domain: ValueDomain,
        canvas: Canvas,
        top_reserved: f64,
        bottom_reserved: f64,
    ) -> Self {
        let canvas = canvas.sanitized();
        let plot_height = (canvas.height - top_reserved - bottom_reserved).max(0.0);
        Self {
            domain,
            plot_bottom: canvas.height - bottom_reserved,
            pixels_per_unit: plot_height / domain.span(),
        }
    }

    #[must_use]
    pub fn y_for_value(self, value: f64) -> f64 {
        self.plot_bottom - (value - self.domain.min_value) * self.pixels_per_unit
    }

    #[must_use]
    pub fn domain_for_labels(self) -> LabelDomain {
        LabelDomain {
            min_value: self.domain.min_value,
            max_value: self.domain.max_value,
            min_y: self.y_for_value(self.domain.max_value),
            max_y: self.y_for_value(self.domain.min_value),
        }
    }
}
