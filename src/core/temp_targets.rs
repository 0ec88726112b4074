use ordered_float::OrderedFloat;

use crate::core::primitives::decimal_to_f64;
use crate::core::{ChartRect, TempTarget, TimeAxis, ValueAxis};

/// Projects temp targets into bands spanning `[start, start + duration]`
/// horizontally and `[target_high, target_low]` vertically, grown by
/// `vertical_padding` above and below.
///
/// Targets are compared in whole mg/dL like the rest of the value geometry.
#[must_use]
pub fn project_temp_target_rects(
    targets: &[TempTarget],
    time_axis: TimeAxis,
    value_axis: ValueAxis,
    vertical_padding: f64,
) -> Vec<ChartRect> {
    targets
        .iter()
        .map(|target| {
            let x0 = time_axis.x_for_time(target.start);
            let x1 = time_axis.x_for_time(target.end());
            let high_y = value_axis.y_for_value(decimal_to_f64(target.target_high).trunc());
            let low_y = value_axis.y_for_value(decimal_to_f64(target.target_low).trunc());
            let top = high_y.min(low_y);
            let bottom = high_y.max(low_y);
            ChartRect::new(
                x0,
                top - vertical_padding,
                (x1 - x0).max(0.0),
                bottom - top + 2.0 * vertical_padding,
            )
        })
        .collect()
}

/// Resolves horizontal overlaps between bands in one left-to-right pass.
///
/// Bands are ordered by left edge (stable, so input order breaks ties). When
/// the previously emitted band extends past the next band's left edge it is
/// cut to end exactly there; the next band is never modified, so the later
/// band wins at the overlap.
///
/// The output comes back sorted by start, not in input order.
#[must_use]
pub fn merge_interval_rects(mut rects: Vec<ChartRect>) -> Vec<ChartRect> {
    rects.sort_by_key(|rect| OrderedFloat(rect.x));

    let mut merged: Vec<ChartRect> = Vec::with_capacity(rects.len());
    for rect in rects {
        if let Some(previous) = merged.last_mut() {
            if previous.right() > rect.x {
                previous.width = rect.x - previous.x;
            }
        }
        merged.push(rect);
    }
    merged
}
