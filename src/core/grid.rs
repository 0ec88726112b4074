use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Canvas, ChartPoint, GlucoseUnits, TimeAxis, ValueAxis};

/// Horizontal grid line with its glucose label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueGridLine {
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
    /// Label value already converted to the display units.
    pub label_value: f64,
    pub label_anchor: ChartPoint,
}

/// Vertical hour line with the timestamp the host formats for its label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourGridLine {
    pub time: DateTime<Utc>,
    pub x: f64,
    pub y_start: f64,
    pub y_end: f64,
    pub label_anchor: ChartPoint,
}

pub type ValueGrid = SmallVec<[ValueGridLine; 8]>;

/// `intervals + 1` evenly spaced lines from the top of the value domain to
/// its bottom. Label values are rounded in mg/dL before unit conversion.
#[must_use]
pub fn value_grid(
    value_axis: ValueAxis,
    canvas: Canvas,
    intervals: u32,
    units: GlucoseUnits,
    label_inset: f64,
) -> ValueGrid {
    let canvas = canvas.sanitized();
    let labels = value_axis.domain_for_labels();
    let intervals = intervals.max(1);
    let y_step = (labels.max_y - labels.min_y) / f64::from(intervals);
    let value_step = (labels.max_value - labels.min_value) / f64::from(intervals);

    (0..=intervals)
        .map(|line| {
            let line = f64::from(line);
            let y = labels.min_y + line * y_step;
            let value = (labels.max_value - line * value_step).round();
            ValueGridLine {
                y,
                x_start: 0.0,
                x_end: canvas.width,
                label_value: units.from_mg_dl(value),
                label_anchor: ChartPoint::new(canvas.width - label_inset, y),
            }
        })
        .collect()
}

/// One line per hour starting at `first_hour`, spanning the chart above the
/// time-label strip at the bottom of the canvas; labels are centered in that
/// strip.
#[must_use]
pub fn hour_grid(
    time_axis: TimeAxis,
    first_hour: DateTime<Utc>,
    hours: u32,
    canvas: Canvas,
    label_strip_height: f64,
) -> Vec<HourGridLine> {
    let canvas = canvas.sanitized();
    let y_end = (canvas.height - label_strip_height).max(0.0);
    (0..hours)
        .map_while(|hour| {
            let time = first_hour.checked_add_signed(TimeDelta::hours(i64::from(hour)))?;
            let x = time_axis.x_for_time(time);
            Some(HourGridLine {
                time,
                x,
                y_start: 0.0,
                y_end,
                label_anchor: ChartPoint::new(x, y_end + label_strip_height / 2.0),
            })
        })
        .collect()
}
