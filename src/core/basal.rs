use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::primitives::{add_minutes, decimal_to_f64, format_decimal, start_of_day};
use crate::core::{
    BasalScheduleEntry, ChartPoint, PumpHistoryRecord, TempBasalOverride, TimeAxis,
};

/// Calendar days the daily schedule is replicated across, starting with the
/// day that contains the window start. Three days cover any window of up to
/// 48 hours regardless of where midnight falls.
pub const SCHEDULE_REPLICA_DAYS: i64 = 3;

const MINUTES_PER_DAY: i64 = 1_440;

/// Maps basal rates (U/hr) into the basal sub-chart, whose baseline is at
/// `height` and whose top (y = 0) is `max_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasalScale {
    height: f64,
    rate_cost: f64,
}

impl BasalScale {
    /// `min_max_rate` replaces a zero, negative or non-finite `max_rate`.
    #[must_use]
    pub fn new(height: f64, max_rate: Decimal, min_max_rate: f64) -> Self {
        let max_rate = decimal_to_f64(max_rate);
        let max_rate = if max_rate >= min_max_rate {
            max_rate
        } else {
            min_max_rate.max(f64::EPSILON)
        };
        Self {
            height,
            rate_cost: height / max_rate,
        }
    }

    #[must_use]
    pub fn baseline(self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn y_for_rate(self, rate: Decimal) -> f64 {
        self.height - decimal_to_f64(rate) * self.rate_cost
    }
}

/// Time window a basal path is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasalWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BasalWindow {
    #[must_use]
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { begin, end }
    }

    /// `[now - lookback, now - lookback + span]`.
    #[must_use]
    pub fn rolling(now: DateTime<Utc>, lookback: TimeDelta, span: TimeDelta) -> Self {
        let begin = now.checked_sub_signed(lookback).unwrap_or(now);
        let end = begin.checked_add_signed(span).unwrap_or(begin);
        Self { begin, end }
    }
}

/// Step-function outline of a basal rate over a window.
///
/// `knots` are the rate change points; `outline` is the drawable vertex list
/// (horizontal run at the previous rate, then vertical step to the next).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasalPath {
    pub knots: Vec<ChartPoint>,
    pub outline: Vec<ChartPoint>,
    /// `true` when the outline returns along the baseline for filling.
    pub closed: bool,
}

/// Current temp-basal rate readout placed next to the end of the last run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasalRateLabel {
    pub rate: Decimal,
    pub text: String,
    /// End of the last temp-basal run at its rate's height.
    pub last_point: ChartPoint,
    pub anchor: ChartPoint,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasalGeometry {
    /// Effective rate: schedule with temp-basal overrides applied, closed for fill.
    pub effective: BasalPath,
    /// Schedule-only reference line.
    pub scheduled: BasalPath,
    pub current_rate: Option<BasalRateLabel>,
}

/// Decodes temp-basal overrides from consecutive record pairs.
///
/// Pairs whose kinds are not `(TempBasal, TempBasalDuration)` are dropped, as
/// is an unpaired trailing record. The result is ordered by start time.
#[must_use]
pub fn pair_temp_basals(records: &[PumpHistoryRecord]) -> Vec<TempBasalOverride> {
    let mut overrides = Vec::with_capacity(records.len() / 2);
    for (index, chunk) in records.chunks(2).enumerate() {
        match TempBasalOverride::from_pair(chunk) {
            Some(run) => overrides.push(run),
            None => debug!(
                pair_index = index,
                chunk_len = chunk.len(),
                "dropping malformed temp basal pair"
            ),
        }
    }
    overrides.sort_by_key(|run| run.start);
    overrides
}

/// Builds basal step paths from a repeating daily schedule and temp-basal runs.
#[derive(Debug, Clone, Copy)]
pub struct BasalPathBuilder<'a> {
    schedule: &'a [BasalScheduleEntry],
    time_axis: TimeAxis,
    scale: BasalScale,
    day_offset: FixedOffset,
}

impl<'a> BasalPathBuilder<'a> {
    /// `day_offset` is the UTC offset in which schedule days start at midnight.
    #[must_use]
    pub fn new(
        schedule: &'a [BasalScheduleEntry],
        time_axis: TimeAxis,
        scale: BasalScale,
        day_offset: FixedOffset,
    ) -> Self {
        Self {
            schedule,
            time_axis,
            scale,
            day_offset,
        }
    }

    /// Schedule knots in absolute time, replicated over `SCHEDULE_REPLICA_DAYS`
    /// days starting at midnight of the day containing `begin`.
    fn replicated_schedule(&self, begin: DateTime<Utc>) -> Vec<(DateTime<Utc>, Decimal)> {
        let mut entries = self.schedule.to_vec();
        entries.sort_by_key(|entry| entry.minute_of_day);

        let midnight = start_of_day(begin, self.day_offset);
        (0..SCHEDULE_REPLICA_DAYS)
            .flat_map(|day| {
                entries.iter().map(move |entry| {
                    let minutes = i64::from(entry.minute_of_day) + day * MINUTES_PER_DAY;
                    (add_minutes(midnight, minutes), entry.rate)
                })
            })
            .collect()
    }

    /// Schedule knots inside `[begin, end)`.
    ///
    /// A schedule segment straddling `begin` is clipped to start at `begin`
    /// with the rate of the segment's entering knot. The final replicated
    /// knot has no leaving edge and holds until `end`.
    #[must_use]
    pub fn regular_points(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> Vec<ChartPoint> {
        if begin >= end {
            return Vec::new();
        }

        let knots = self.replicated_schedule(begin);
        let leaving = knots.iter().skip(1).map(|(time, _)| Some(*time)).chain([None]);
        knots
            .iter()
            .zip(leaving)
            .filter_map(|(&(entering_time, rate), leaving_time)| {
                if entering_time < begin {
                    return match leaving_time {
                        Some(leaving_time) if leaving_time < begin => None,
                        _ => Some(self.knot(begin, rate)),
                    };
                }
                (entering_time < end).then(|| self.knot(entering_time, rate))
            })
            .collect()
    }

    /// Effective-rate knots across `window`: schedule knots in every gap
    /// between runs, and for each run its start corner at the run rate and
    /// its end corner on the baseline.
    ///
    /// Runs are clipped to the window and to the end of the previous run, so
    /// knot x never decreases. Runs left empty by clipping are skipped.
    #[must_use]
    pub fn override_points(
        &self,
        overrides: &[TempBasalOverride],
        window: BasalWindow,
    ) -> Vec<ChartPoint> {
        let mut points = Vec::new();
        let mut last_end = window.begin;
        for run in overrides {
            let start = run.start.max(last_end);
            let end = run.end().min(window.end);
            if start >= end {
                trace!(start = %run.start, end = %run.end(), "temp basal run outside window");
                continue;
            }
            points.extend(self.regular_points(last_end, start));
            points.push(self.knot(start, run.rate));
            points.push(ChartPoint::new(
                self.time_axis.x_for_time(end),
                self.scale.baseline(),
            ));
            last_end = end;
        }
        points.extend(self.regular_points(last_end, window.end));
        points
    }

    /// Closed effective-rate outline for fill and stroke.
    #[must_use]
    pub fn override_path(&self, overrides: &[TempBasalOverride], window: BasalWindow) -> BasalPath {
        let knots = self.override_points(overrides, window);
        let start_x = self.time_axis.x_for_time(window.begin);
        let end_x = self.time_axis.x_for_time(window.end);
        let baseline = self.scale.baseline();

        let (mut outline, last_y) = step_outline(&knots, ChartPoint::new(start_x, baseline));
        outline.push(ChartPoint::new(end_x, last_y));
        outline.push(ChartPoint::new(end_x, baseline));
        outline.push(ChartPoint::new(start_x, baseline));

        BasalPath {
            knots,
            outline,
            closed: true,
        }
    }

    /// Open schedule-only outline, ignoring every override. Hosts pass a
    /// window wider than the effective one; nothing is clipped to the canvas.
    #[must_use]
    pub fn regular_path(&self, window: BasalWindow) -> BasalPath {
        let knots = self.regular_points(window.begin, window.end);
        let start_x = self.time_axis.x_for_time(window.begin);
        let end_x = self.time_axis.x_for_time(window.end);

        let (mut outline, last_y) =
            step_outline(&knots, ChartPoint::new(start_x, self.scale.baseline()));
        outline.push(ChartPoint::new(end_x, last_y));

        BasalPath {
            knots,
            outline,
            closed: false,
        }
    }

    /// Readout for the trailing record pair, when it is a well-formed run.
    #[must_use]
    pub fn current_rate_label(
        &self,
        records: &[PumpHistoryRecord],
        label_offset_x: f64,
    ) -> Option<BasalRateLabel> {
        let tail = records.len().checked_sub(2).map(|start| &records[start..])?;
        let run = TempBasalOverride::from_pair(tail)?;
        let last_point = ChartPoint::new(
            self.time_axis.x_for_time(run.end()),
            self.scale.y_for_rate(run.rate),
        );
        Some(BasalRateLabel {
            rate: run.rate,
            text: format!("{} U/hr", format_decimal(run.rate, 2)),
            last_point,
            anchor: ChartPoint::new(last_point.x + label_offset_x, self.scale.baseline() / 2.0),
        })
    }

    /// Effective path, schedule reference path and current-rate readout.
    #[must_use]
    pub fn build(
        &self,
        records: &[PumpHistoryRecord],
        effective_window: BasalWindow,
        scheduled_window: BasalWindow,
        label_offset_x: f64,
    ) -> BasalGeometry {
        let overrides = pair_temp_basals(records);
        BasalGeometry {
            effective: self.override_path(&overrides, effective_window),
            scheduled: self.regular_path(scheduled_window),
            current_rate: self.current_rate_label(records, label_offset_x),
        }
    }

    fn knot(&self, time: DateTime<Utc>, rate: Decimal) -> ChartPoint {
        ChartPoint::new(self.time_axis.x_for_time(time), self.scale.y_for_rate(rate))
    }
}

/// Walks knots as a step function starting from `start`; returns the outline
/// and the y of the final step.
fn step_outline(knots: &[ChartPoint], start: ChartPoint) -> (Vec<ChartPoint>, f64) {
    let mut outline = Vec::with_capacity(knots.len() * 2 + 4);
    outline.push(start);
    let mut y = start.y;
    for knot in knots {
        outline.push(ChartPoint::new(knot.x, y));
        outline.push(*knot);
        y = knot.y;
    }
    (outline, y)
}
