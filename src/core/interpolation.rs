use chrono::{DateTime, Utc};

use crate::core::{ChartPoint, GlucoseReading, TimeAxis, ValueAxis};

/// Samples the glucose curve at arbitrary times.
///
/// Interpolation runs in pixel space: the fraction between two bracketing
/// readings is taken from their x coordinates so results stay on the drawn
/// polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolator {
    time_axis: TimeAxis,
    value_axis: ValueAxis,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bracket {
    /// No earlier sample (or no sample at all): hold the last value.
    Tail(f64),
    Between {
        prev: usize,
        next: usize,
        fraction: f64,
    },
}

impl Interpolator {
    #[must_use]
    pub fn new(time_axis: TimeAxis, value_axis: ValueAxis) -> Self {
        Self {
            time_axis,
            value_axis,
        }
    }

    /// Glucose value at `time`.
    #[must_use]
    pub fn value_at(self, time: DateTime<Utc>, series: &[GlucoseReading]) -> f64 {
        match self.bracket(time, series) {
            Bracket::Tail(value) => value,
            Bracket::Between {
                prev,
                next,
                fraction,
            } => {
                let prev = f64::from(series[prev].value_or_zero());
                let next = f64::from(series[next].value_or_zero());
                prev + (next - prev) * fraction
            }
        }
    }

    /// Chart point on the glucose curve at `time`.
    #[must_use]
    pub fn point_at(self, time: DateTime<Utc>, series: &[GlucoseReading]) -> ChartPoint {
        let x = self.time_axis.x_for_time(time);
        match self.bracket(time, series) {
            Bracket::Tail(value) => ChartPoint::new(x, self.value_axis.y_for_value(value)),
            Bracket::Between {
                prev,
                next,
                fraction,
            } => {
                let prev = self.project(series[prev]);
                let next = self.project(series[next]);
                prev.lerp(next, fraction)
            }
        }
    }

    fn project(self, reading: GlucoseReading) -> ChartPoint {
        ChartPoint::new(
            self.time_axis.x_for_time(reading.time),
            self.value_axis.y_for_value(f64::from(reading.value_or_zero())),
        )
    }

    fn bracket(self, time: DateTime<Utc>, series: &[GlucoseReading]) -> Bracket {
        let next = series.iter().position(|reading| reading.time > time);
        let next = match next {
            Some(index) if index > 0 => index,
            _ => {
                let last = series.last().map_or(0, |reading| reading.value_or_zero());
                return Bracket::Tail(f64::from(last));
            }
        };
        let prev = next - 1;

        let x = self.time_axis.x_for_time(time);
        let prev_x = self.time_axis.x_for_time(series[prev].time);
        let next_x = self.time_axis.x_for_time(series[next].time);
        let delta = next_x - prev_x;
        let fraction = if delta > 0.0 && delta.is_finite() {
            (x - prev_x) / delta
        } else {
            0.0
        };

        Bracket::Between {
            prev,
            next,
            fraction,
        }
    }
}
