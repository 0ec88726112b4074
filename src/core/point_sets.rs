use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::primitives::{decimal_to_f64, format_decimal};
use crate::core::{
    BolusEvent, ChartPoint, CircleMarker, GlucoseReading, Interpolator, PredictionKind,
    PredictionSet, TimeAxis, ValueAxis,
};

/// Marker sizing for discrete series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub glucose_diameter: f64,
    pub prediction_diameter: f64,
    pub bolus_base_size: f64,
    pub bolus_scale: f64,
    pub bolus_label_offset: f64,
    pub prediction_cadence_minutes: i64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            glucose_diameter: 4.0,
            prediction_diameter: 4.0,
            bolus_base_size: 8.0,
            bolus_scale: 8.0,
            bolus_label_offset: 8.0,
            prediction_cadence_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BolusLabel {
    pub amount: Decimal,
    pub text: String,
    pub anchor: ChartPoint,
}

/// Bolus marker together with its dose label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BolusMarker {
    pub marker: CircleMarker,
    pub label: BolusLabel,
}

pub type PredictionPoints = IndexMap<PredictionKind, Vec<CircleMarker>>;

/// Maps discrete series to marker shapes. Output order follows input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSetBuilder {
    time_axis: TimeAxis,
    value_axis: ValueAxis,
    style: MarkerStyle,
}

impl PointSetBuilder {
    #[must_use]
    pub fn new(time_axis: TimeAxis, value_axis: ValueAxis, style: MarkerStyle) -> Self {
        Self {
            time_axis,
            value_axis,
            style,
        }
    }

    /// One fixed-size dot per reading.
    #[must_use]
    pub fn glucose_points(&self, readings: &[GlucoseReading]) -> Vec<CircleMarker> {
        // Each dot depends only on its own reading.
        #[cfg(feature = "parallel-projection")]
        {
            readings
                .par_iter()
                .map(|reading| self.glucose_point(*reading))
                .collect()
        }

        #[cfg(not(feature = "parallel-projection"))]
        {
            readings
                .iter()
                .map(|reading| self.glucose_point(*reading))
                .collect()
        }
    }

    fn glucose_point(&self, reading: GlucoseReading) -> CircleMarker {
        let center = ChartPoint::new(
            self.time_axis.x_for_time(reading.time),
            self.value_axis
                .y_for_value(f64::from(reading.value_or_zero())),
        );
        CircleMarker::new(center, self.style.glucose_diameter)
    }

    /// Dose-sized markers sitting on the interpolated glucose curve.
    ///
    /// Diameter is `bolus_base_size + amount * bolus_scale`; the label sits
    /// `bolus_label_offset` below the marker.
    #[must_use]
    pub fn bolus_markers(
        &self,
        boluses: &[BolusEvent],
        readings: &[GlucoseReading],
    ) -> Vec<BolusMarker> {
        let interpolator = Interpolator::new(self.time_axis, self.value_axis);
        boluses
            .iter()
            .map(|bolus| {
                let amount = bolus.amount_or_zero();
                let center = interpolator.point_at(bolus.time, readings);
                let diameter =
                    self.style.bolus_base_size + decimal_to_f64(amount) * self.style.bolus_scale;
                let marker = CircleMarker::new(center, diameter);
                let bounds = marker.bounds();
                BolusMarker {
                    marker,
                    label: BolusLabel {
                        amount,
                        text: format_decimal(amount, 2),
                        anchor: ChartPoint::new(
                            bounds.mid_x(),
                            bounds.bottom() + self.style.bolus_label_offset,
                        ),
                    },
                }
            })
            .collect()
    }

    /// Dots for one prediction series; sample `i` sits at `anchor + i * cadence`.
    #[must_use]
    pub fn prediction_series_points(
        &self,
        values: &[i32],
        anchor: DateTime<Utc>,
    ) -> Vec<CircleMarker> {
        let cadence = TimeDelta::try_minutes(self.style.prediction_cadence_minutes)
            .unwrap_or_else(TimeDelta::zero);
        values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let offset = i32::try_from(index)
                    .ok()
                    .and_then(|index| cadence.checked_mul(index))
                    .unwrap_or_else(TimeDelta::zero);
                let time = anchor.checked_add_signed(offset).unwrap_or(anchor);
                let center = ChartPoint::new(
                    self.time_axis.x_for_time(time),
                    self.value_axis.y_for_value(f64::from(*value)),
                );
                CircleMarker::new(center, self.style.prediction_diameter)
            })
            .collect()
    }

    /// Dots for all four series, keyed in `iob, cob, zt, uam` order.
    ///
    /// `fallback_anchor` is used when the set has no `deliver_at`. Absent
    /// series map to empty sets.
    #[must_use]
    pub fn prediction_points(
        &self,
        predictions: &PredictionSet,
        fallback_anchor: DateTime<Utc>,
    ) -> PredictionPoints {
        let anchor = predictions.deliver_at.unwrap_or(fallback_anchor);
        PredictionKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    self.prediction_series_points(predictions.series(kind), anchor),
                )
            })
            .collect()
    }
}
