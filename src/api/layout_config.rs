use chrono::{FixedOffset, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{MarkerStyle, SCHEDULE_REPLICA_DAYS, ValueDomainDefaults};
use crate::error::{ChartError, ChartResult};

/// Longest basal window the replicated schedule covers from any start time.
const MAX_BASAL_WINDOW_HOURS: i64 = (SCHEDULE_REPLICA_DAYS - 1) * 24;

/// Chart constants shared by every layout pass.
///
/// This type is serializable so host applications can persist/load chart
/// setup; missing fields fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayoutConfig {
    /// Height of the basal sub-chart strip above the glucose plot.
    pub basal_height: f64,
    /// Gap between the basal strip and the top of the glucose plot.
    pub top_padding: f64,
    /// Space kept under the glucose plot for time labels.
    pub bottom_padding: f64,
    pub min_additional_width: f64,
    pub value_defaults: ValueDomainDefaults,
    pub y_grid_intervals: u32,
    pub markers: MarkerStyle,
    pub temp_target_padding: f64,
    /// Anchor fallback and basal window start, measured back from `now`.
    pub history_lookback_hours: u32,
    pub basal_window_hours: u32,
    /// Schedule-only reference line window, `[now - lookback, now + lookahead]`.
    pub reference_lookback_hours: u32,
    pub reference_lookahead_hours: u32,
    pub basal_label_offset_x: f64,
    /// Floor applied to the max basal rate before scaling the basal strip.
    pub min_max_basal_rate: f64,
    pub value_label_inset: f64,
    pub time_label_strip_height: f64,
    /// UTC offset at which schedule days start.
    pub schedule_utc_offset_minutes: i32,
}

impl Default for ChartLayoutConfig {
    fn default() -> Self {
        Self {
            basal_height: 60.0,
            top_padding: 20.0,
            bottom_padding: 50.0,
            min_additional_width: 150.0,
            value_defaults: ValueDomainDefaults::default(),
            y_grid_intervals: 5,
            markers: MarkerStyle::default(),
            temp_target_padding: 3.0,
            history_lookback_hours: 24,
            basal_window_hours: 30,
            reference_lookback_hours: 36,
            reference_lookahead_hours: 12,
            basal_label_offset_x: 30.0,
            min_max_basal_rate: 0.01,
            value_label_inset: 12.0,
            time_label_strip_height: 20.0,
            schedule_utc_offset_minutes: 0,
        }
    }
}

impl ChartLayoutConfig {
    #[must_use]
    pub fn with_value_defaults(mut self, floor: f64, ceiling: f64) -> Self {
        self.value_defaults.floor = floor;
        self.value_defaults.ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn with_markers(mut self, markers: MarkerStyle) -> Self {
        self.markers = markers;
        self
    }

    #[must_use]
    pub fn with_basal_height(mut self, basal_height: f64) -> Self {
        self.basal_height = basal_height;
        self
    }

    #[must_use]
    pub fn with_y_grid_intervals(mut self, intervals: u32) -> Self {
        self.y_grid_intervals = intervals;
        self
    }

    #[must_use]
    pub fn with_schedule_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.schedule_utc_offset_minutes = minutes;
        self
    }

    /// Space reserved above the glucose plot (basal strip + padding).
    #[must_use]
    pub fn top_reserved(self) -> f64 {
        self.top_padding + self.basal_height
    }

    #[must_use]
    pub fn history_lookback(self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.history_lookback_hours))
    }

    #[must_use]
    pub fn basal_window_span(self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.basal_window_hours))
    }

    #[must_use]
    pub fn reference_lookback(self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.reference_lookback_hours))
    }

    #[must_use]
    pub fn reference_window_span(self) -> TimeDelta {
        TimeDelta::hours(
            i64::from(self.reference_lookback_hours) + i64::from(self.reference_lookahead_hours),
        )
    }

    #[must_use]
    pub fn prediction_cadence(self) -> TimeDelta {
        TimeDelta::try_minutes(self.markers.prediction_cadence_minutes)
            .unwrap_or_else(TimeDelta::zero)
    }

    /// Offset for schedule day boundaries; validated configs always resolve.
    #[must_use]
    pub fn day_offset(self) -> FixedOffset {
        FixedOffset::east_opt(self.schedule_utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [
            (self.basal_height, "basal_height"),
            (self.top_padding, "top_padding"),
            (self.bottom_padding, "bottom_padding"),
            (self.min_additional_width, "min_additional_width"),
            (self.temp_target_padding, "temp_target_padding"),
            (self.basal_label_offset_x, "basal_label_offset_x"),
            (self.value_label_inset, "value_label_inset"),
            (self.time_label_strip_height, "time_label_strip_height"),
            (self.markers.glucose_diameter, "markers.glucose_diameter"),
            (self.markers.prediction_diameter, "markers.prediction_diameter"),
            (self.markers.bolus_base_size, "markers.bolus_base_size"),
            (self.markers.bolus_scale, "markers.bolus_scale"),
            (self.markers.bolus_label_offset, "markers.bolus_label_offset"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "`{name}` must be finite and >= 0"
                )));
            }
        }

        for (value, name) in [
            (self.min_max_basal_rate, "min_max_basal_rate"),
            (self.value_defaults.min_span, "value_defaults.min_span"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "`{name}` must be finite and > 0"
                )));
            }
        }

        if !self.value_defaults.floor.is_finite() || !self.value_defaults.ceiling.is_finite() {
            return Err(ChartError::InvalidConfig(
                "value domain defaults must be finite".to_owned(),
            ));
        }
        if self.y_grid_intervals == 0 {
            return Err(ChartError::InvalidConfig(
                "`y_grid_intervals` must be > 0".to_owned(),
            ));
        }
        for (span, name) in [
            (self.basal_window_span(), "basal_window_hours"),
            (self.reference_window_span(), "reference_lookback_hours + reference_lookahead_hours"),
        ] {
            if span > TimeDelta::hours(MAX_BASAL_WINDOW_HOURS) {
                return Err(ChartError::InvalidConfig(format!(
                    "`{name}` must cover at most {MAX_BASAL_WINDOW_HOURS} hours"
                )));
            }
        }
        if self.markers.prediction_cadence_minutes <= 0
            || TimeDelta::try_minutes(self.markers.prediction_cadence_minutes).is_none()
        {
            return Err(ChartError::InvalidConfig(
                "`markers.prediction_cadence_minutes` must be > 0 and representable".to_owned(),
            ));
        }
        if FixedOffset::east_opt(self.schedule_utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(ChartError::InvalidConfig(format!(
                "schedule UTC offset of {} minutes is out of range",
                self.schedule_utc_offset_minutes
            )));
        }

        Ok(self)
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to parse layout config json: {e}"))
        })?;
        config.validate()
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize layout config json: {e}"))
        })
    }
}
