use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{seconds_between, truncate_to_minute};
use crate::core::{Canvas, GlucoseReading, PredictionSet, Viewport};

pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Horizontal mapping from timestamps to chart x coordinates.
///
/// x = 0 sits at the anchor time; one visible window (`visible_hours`) spans
/// the canvas width, so the full history is `width * total / visible` wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    anchor: DateTime<Utc>,
    pixels_per_second: f64,
    full_width: f64,
}

impl TimeAxis {
    #[must_use]
    pub fn new(anchor: DateTime<Utc>, canvas: Canvas, viewport: Viewport) -> Self {
        let canvas = canvas.sanitized();
        let visible_hours = f64::from(viewport.effective_visible_hours());
        let full_width = canvas.width * f64::from(viewport.total_hours) / visible_hours;
        Self {
            anchor,
            pixels_per_second: canvas.width / (visible_hours * SECONDS_PER_HOUR),
            full_width,
        }
    }

    /// Anchors at the first reading truncated to its minute, or at
    /// `now - fallback_lookback` when there are no readings.
    #[must_use]
    pub fn from_readings(
        readings: &[GlucoseReading],
        now: DateTime<Utc>,
        fallback_lookback: TimeDelta,
        canvas: Canvas,
        viewport: Viewport,
    ) -> Self {
        let anchor = readings.first().map_or_else(
            || now.checked_sub_signed(fallback_lookback).unwrap_or(now),
            |first| truncate_to_minute(first.time),
        );
        Self::new(anchor, canvas, viewport)
    }

    #[must_use]
    pub fn anchor(self) -> DateTime<Utc> {
        self.anchor
    }

    #[must_use]
    pub fn pixels_per_second(self) -> f64 {
        self.pixels_per_second
    }

    /// Width of the `total_hours` history window.
    #[must_use]
    pub fn full_width(self) -> f64 {
        self.full_width
    }

    #[must_use]
    pub fn x_for_time(self, time: DateTime<Utc>) -> f64 {
        seconds_between(self.anchor, time) * self.pixels_per_second
    }

    /// Width needed past the history window to fit the longest prediction.
    ///
    /// `max((L * cadence - (last_reading - deliver_at)) * px_per_s, min_width)`,
    /// or `min_width` when predictions, their anchor, or readings are missing.
    #[must_use]
    pub fn extra_width(
        self,
        readings: &[GlucoseReading],
        predictions: &PredictionSet,
        cadence: TimeDelta,
        min_width: f64,
    ) -> f64 {
        let (Some(deliver_at), Some(last)) = (predictions.deliver_at, readings.last()) else {
            return min_width;
        };
        if predictions.is_empty() {
            return min_width;
        }

        let horizon = predictions.max_len() as f64 * cadence.num_milliseconds() as f64 / 1000.0;
        let delay = seconds_between(deliver_at, last.time);
        ((horizon - delay) * self.pixels_per_second).max(min_width)
    }

    /// Total horizontal frame: history plus prediction room.
    #[must_use]
    pub fn chart_width(self, extra_width: f64) -> f64 {
        self.full_width + extra_width
    }
}
