use approx::assert_abs_diff_eq;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use glucose_chart::core::{
    BolusEvent, Canvas, GlucoseReading, MarkerStyle, PointSetBuilder, PredictionKind,
    PredictionSet, TimeAxis, ValueAxis, ValueDomain, Viewport,
};
use rust_decimal::Decimal;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, hour, minute, 0)
        .single()
        .expect("valid time")
}

fn axes() -> (TimeAxis, ValueAxis) {
    let canvas = Canvas::new(500.0, 400.0);
    (
        TimeAxis::new(at(6, 0), canvas, Viewport::new(5, 24)),
        ValueAxis::new(ValueDomain::guarded(70.0, 340.0, 1.0), canvas, 80.0, 50.0),
    )
}

fn builder() -> PointSetBuilder {
    let (time_axis, value_axis) = axes();
    PointSetBuilder::new(time_axis, value_axis, MarkerStyle::default())
}

fn readings() -> Vec<GlucoseReading> {
    vec![
        GlucoseReading::new(at(7, 0), 100),
        GlucoseReading::new(at(7, 30), 160),
        GlucoseReading::new(at(8, 0), 130),
    ]
}

#[test]
fn glucose_points_keep_input_order() {
    let points = builder().glucose_points(&readings());

    assert_eq!(points.len(), 3);
    let expected = [(100.0, 320.0), (150.0, 260.0), (200.0, 290.0)];
    for (marker, (x, y)) in points.iter().zip(expected) {
        assert_abs_diff_eq!(marker.center.x, x, epsilon = 1e-9);
        assert_abs_diff_eq!(marker.center.y, y, epsilon = 1e-9);
        assert_eq!(marker.diameter, 4.0);
    }
}

#[test]
fn glucose_point_bounds_are_centered() {
    let points = builder().glucose_points(&readings());
    let bounds = points[0].bounds();

    assert_abs_diff_eq!(bounds.x, 98.0, epsilon = 1e-9);
    assert_abs_diff_eq!(bounds.y, 318.0, epsilon = 1e-9);
    assert_eq!(bounds.width, 4.0);
    assert_eq!(bounds.height, 4.0);
}

#[test]
fn empty_readings_yield_no_points() {
    assert!(builder().glucose_points(&[]).is_empty());
}

#[test]
fn bolus_diameter_grows_with_dose() {
    let boluses = [BolusEvent::new(at(7, 30), Decimal::new(20, 1))];

    let markers = builder().bolus_markers(&boluses, &readings());

    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].marker.diameter, 24.0);
}

#[test]
fn bolus_sits_on_interpolated_curve() {
    let boluses = [BolusEvent::new(at(7, 15), Decimal::new(5, 1))];

    let markers = builder().bolus_markers(&boluses, &readings());
    let marker = markers[0].marker;

    // Halfway between 100 and 160 mg/dL.
    assert_abs_diff_eq!(marker.center.x, 125.0, epsilon = 1e-9);
    assert_abs_diff_eq!(marker.center.y, 290.0, epsilon = 1e-9);
    assert_eq!(marker.diameter, 12.0);
}

#[test]
fn bolus_label_is_paired_with_its_marker() {
    let boluses = [
        BolusEvent::new(at(7, 30), Decimal::new(20, 1)),
        BolusEvent::new(at(8, 0), Decimal::new(35, 2)),
    ];

    let markers = builder().bolus_markers(&boluses, &readings());

    assert_eq!(markers[0].label.text, "2");
    assert_eq!(markers[1].label.text, "0.35");
    assert_eq!(markers[1].label.amount, Decimal::new(35, 2));

    let first = &markers[0];
    assert_abs_diff_eq!(first.label.anchor.x, first.marker.center.x, epsilon = 1e-9);
    assert_abs_diff_eq!(
        first.label.anchor.y,
        first.marker.center.y + 12.0 + 8.0,
        epsilon = 1e-9
    );
}

#[test]
fn bolus_without_amount_uses_base_size() {
    let boluses = [BolusEvent {
        time: at(7, 0),
        amount: None,
    }];

    let markers = builder().bolus_markers(&boluses, &readings());
    assert_eq!(markers[0].marker.diameter, 8.0);
    assert_eq!(markers[0].label.text, "0");
}

#[test]
fn prediction_samples_follow_five_minute_cadence() {
    let (time_axis, _) = axes();
    let predictions =
        PredictionSet::new(at(8, 0)).with_series(PredictionKind::Iob, vec![130, 140, 150]);

    let points = builder().prediction_points(&predictions, at(12, 0));
    let iob = &points[&PredictionKind::Iob];

    assert_eq!(iob.len(), 3);
    for (index, marker) in iob.iter().enumerate() {
        let time = at(8, 0) + TimeDelta::minutes(5 * index as i64);
        assert_abs_diff_eq!(marker.center.x, time_axis.x_for_time(time), epsilon = 1e-9);
    }
    assert_abs_diff_eq!(iob[2].center.y, 270.0, epsilon = 1e-9);
}

#[test]
fn absent_series_yield_empty_sets_in_fixed_order() {
    let predictions = PredictionSet::new(at(8, 0)).with_series(PredictionKind::Uam, vec![120]);

    let points = builder().prediction_points(&predictions, at(12, 0));

    let kinds: Vec<_> = points.keys().copied().collect();
    assert_eq!(kinds, PredictionKind::ALL.to_vec());
    assert!(points[&PredictionKind::Iob].is_empty());
    assert!(points[&PredictionKind::Cob].is_empty());
    assert!(points[&PredictionKind::Zt].is_empty());
    assert_eq!(points[&PredictionKind::Uam].len(), 1);
}

#[test]
fn missing_deliver_at_uses_fallback_anchor() {
    let predictions = PredictionSet::default().with_series(PredictionKind::Zt, vec![110]);

    let points = builder().prediction_points(&predictions, at(9, 0));

    assert_abs_diff_eq!(
        points[&PredictionKind::Zt][0].center.x,
        300.0,
        epsilon = 1e-9
    );
}
