use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::truncate_to_minute;
use crate::core::{
    BasalGeometry, BasalPathBuilder, BasalScale, BasalWindow, BolusMarker, Canvas, ChartRect,
    CircleMarker, HourGridLine, LabelDomain, PointSetBuilder, PredictionPoints, TimeAxis,
    ValueAxis, ValueDomain, ValueGrid, Viewport, hour_grid, merge_interval_rects,
    project_temp_target_rects, value_grid,
};

use super::{ChartInputs, ChartLayoutConfig};

/// Resolved axes and horizontal extent of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub canvas: Canvas,
    pub viewport: Viewport,
    pub time_axis: TimeAxis,
    pub value_axis: ValueAxis,
    /// Width of the `total_hours` history window.
    pub full_width: f64,
    /// Room after the history window for the prediction horizon.
    pub extra_width: f64,
    /// `full_width + extra_width`.
    pub chart_width: f64,
    pub value_labels: LabelDomain,
}

/// Horizontal and vertical grid lines with label anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGrid {
    pub value_lines: ValueGrid,
    pub hour_lines: Vec<HourGridLine>,
}

/// Every geometry artifact for one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub frame: ChartFrame,
    pub glucose_points: Vec<CircleMarker>,
    pub bolus_markers: Vec<BolusMarker>,
    pub prediction_points: PredictionPoints,
    pub basal: BasalGeometry,
    pub temp_targets: Vec<ChartRect>,
    pub grid: ChartGrid,
}

/// Axes resolved from one snapshot; each artifact method is independent.
#[derive(Debug, Clone, Copy)]
pub struct LayoutPass<'a> {
    config: &'a ChartLayoutConfig,
    inputs: &'a ChartInputs,
    canvas: Canvas,
    viewport: Viewport,
    time_axis: TimeAxis,
    value_axis: ValueAxis,
}

impl<'a> LayoutPass<'a> {
    #[must_use]
    pub fn new(
        config: &'a ChartLayoutConfig,
        canvas: Canvas,
        viewport: Viewport,
        inputs: &'a ChartInputs,
    ) -> Self {
        let canvas = canvas.sanitized();
        let time_axis = TimeAxis::from_readings(
            &inputs.readings,
            inputs.now,
            config.history_lookback(),
            canvas,
            viewport,
        );
        let domain =
            ValueDomain::from_series(&inputs.readings, &inputs.predictions, config.value_defaults);
        let value_axis = ValueAxis::new(
            domain,
            canvas,
            config.top_reserved(),
            config.bottom_padding,
        );

        Self {
            config,
            inputs,
            canvas,
            viewport,
            time_axis,
            value_axis,
        }
    }

    #[must_use]
    pub fn time_axis(&self) -> TimeAxis {
        self.time_axis
    }

    #[must_use]
    pub fn value_axis(&self) -> ValueAxis {
        self.value_axis
    }

    #[must_use]
    pub fn frame(&self) -> ChartFrame {
        let extra_width = self.time_axis.extra_width(
            &self.inputs.readings,
            &self.inputs.predictions,
            self.config.prediction_cadence(),
            self.config.min_additional_width,
        );
        ChartFrame {
            canvas: self.canvas,
            viewport: self.viewport,
            time_axis: self.time_axis,
            value_axis: self.value_axis,
            full_width: self.time_axis.full_width(),
            extra_width,
            chart_width: self.time_axis.chart_width(extra_width),
            value_labels: self.value_axis.domain_for_labels(),
        }
    }

    fn point_sets(&self) -> PointSetBuilder {
        PointSetBuilder::new(self.time_axis, self.value_axis, self.config.markers)
    }

    #[must_use]
    pub fn glucose_points(&self) -> Vec<CircleMarker> {
        self.point_sets().glucose_points(&self.inputs.readings)
    }

    #[must_use]
    pub fn bolus_markers(&self) -> Vec<BolusMarker> {
        self.point_sets()
            .bolus_markers(&self.inputs.boluses, &self.inputs.readings)
    }

    /// Prediction dots; a missing `deliver_at` falls back to `now`.
    #[must_use]
    pub fn prediction_points(&self) -> PredictionPoints {
        self.point_sets()
            .prediction_points(&self.inputs.predictions, self.inputs.now)
    }

    /// Effective path over the rolling window ending `basal_window_hours`
    /// after `now - history_lookback_hours`; schedule-only reference path over
    /// the wider reference window around `now`.
    #[must_use]
    pub fn basal(&self) -> BasalGeometry {
        let scale = BasalScale::new(
            self.config.basal_height,
            self.inputs.max_basal,
            self.config.min_max_basal_rate,
        );
        let effective_window = BasalWindow::rolling(
            self.inputs.now,
            self.config.history_lookback(),
            self.config.basal_window_span(),
        );
        let reference_window = BasalWindow::rolling(
            self.inputs.now,
            self.config.reference_lookback(),
            self.config.reference_window_span(),
        );
        BasalPathBuilder::new(
            &self.inputs.basal_schedule,
            self.time_axis,
            scale,
            self.config.day_offset(),
        )
        .build(
            &self.inputs.temp_basals,
            effective_window,
            reference_window,
            self.config.basal_label_offset_x,
        )
    }

    #[must_use]
    pub fn temp_targets(&self) -> Vec<ChartRect> {
        merge_interval_rects(project_temp_target_rects(
            &self.inputs.temp_targets,
            self.time_axis,
            self.value_axis,
            self.config.temp_target_padding,
        ))
    }

    /// First hour line time: the first reading truncated to its minute, or `now`.
    #[must_use]
    pub fn first_hour(&self) -> DateTime<Utc> {
        truncate_to_minute(
            self.inputs
                .readings
                .first()
                .map_or(self.inputs.now, |reading| reading.time),
        )
    }

    /// Value grid plus `2 * total_hours` hour lines.
    #[must_use]
    pub fn grid(&self) -> ChartGrid {
        ChartGrid {
            value_lines: value_grid(
                self.value_axis,
                self.canvas,
                self.config.y_grid_intervals,
                self.inputs.units,
                self.config.value_label_inset,
            ),
            hour_lines: hour_grid(
                self.time_axis,
                self.first_hour(),
                self.viewport.total_hours.saturating_mul(2),
                self.canvas,
                self.config.time_label_strip_height,
            ),
        }
    }

    /// Computes every artifact. With `parallel-projection` the independent
    /// artifacts run on the rayon pool.
    #[must_use]
    pub fn compute(&self) -> ChartLayout {
        #[cfg(feature = "parallel-projection")]
        {
            let ((glucose_points, bolus_markers), (prediction_points, (basal, (temp_targets, grid)))) =
                rayon::join(
                    || rayon::join(|| self.glucose_points(), || self.bolus_markers()),
                    || {
                        rayon::join(
                            || self.prediction_points(),
                            || {
                                rayon::join(
                                    || self.basal(),
                                    || rayon::join(|| self.temp_targets(), || self.grid()),
                                )
                            },
                        )
                    },
                );
            ChartLayout {
                frame: self.frame(),
                glucose_points,
                bolus_markers,
                prediction_points,
                basal,
                temp_targets,
                grid,
            }
        }

        #[cfg(not(feature = "parallel-projection"))]
        {
            ChartLayout {
                frame: self.frame(),
                glucose_points: self.glucose_points(),
                bolus_markers: self.bolus_markers(),
                prediction_points: self.prediction_points(),
                basal: self.basal(),
                temp_targets: self.temp_targets(),
                grid: self.grid(),
            }
        }
    }
}

/// Uncached layout of one snapshot.
#[must_use]
pub fn compute_layout(
    config: &ChartLayoutConfig,
    canvas: Canvas,
    viewport: Viewport,
    inputs: &ChartInputs,
) -> ChartLayout {
    LayoutPass::new(config, canvas, viewport, inputs).compute()
}
