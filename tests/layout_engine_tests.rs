use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use glucose_chart::api::{ChartInputs, ChartLayoutConfig, ChartLayoutEngine, compute_layout};
use glucose_chart::core::{
    BasalScheduleEntry, BolusEvent, Canvas, GlucoseReading, GlucoseUnits, PredictionKind,
    PredictionSet, PumpHistoryRecord, TempTarget, Viewport,
};
use rust_decimal::Decimal;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, hour, minute, 0)
        .single()
        .expect("valid time")
}

fn canvas() -> Canvas {
    Canvas::new(500.0, 400.0)
}

fn viewport() -> Viewport {
    Viewport::new(5, 24)
}

fn readings() -> Vec<GlucoseReading> {
    (0..24)
        .map(|index| {
            let time = at(10, 0) + TimeDelta::minutes(5 * index);
            GlucoseReading::new(time, 110 + (index as i32 % 6) * 10)
        })
        .collect()
}

fn inputs() -> ChartInputs {
    let readings = readings();
    let last = readings.last().map(|reading| reading.time).expect("readings");
    ChartInputs::new(at(12, 0))
        .with_readings(readings)
        .with_basal_schedule(vec![
            BasalScheduleEntry::new(0, Decimal::new(5, 1)),
            BasalScheduleEntry::new(480, Decimal::ONE),
        ])
        .with_temp_basals(vec![
            PumpHistoryRecord::temp_basal(at(11, 0), Decimal::new(15, 1)),
            PumpHistoryRecord::duration(at(11, 0), 30),
        ])
        .with_boluses(vec![BolusEvent::new(at(10, 30), Decimal::new(25, 1))])
        .with_predictions(
            PredictionSet::new(last)
                .with_series(PredictionKind::Iob, vec![150, 145, 140, 135])
                .with_series(PredictionKind::Zt, vec![150, 140]),
        )
        .with_temp_targets(vec![TempTarget::new(
            at(10, 0),
            60,
            Decimal::from(100),
            Decimal::from(110),
        )])
        .with_max_basal(Decimal::from(3))
}

#[test]
fn empty_snapshot_produces_default_frame() {
    let layout = compute_layout(
        &ChartLayoutConfig::default(),
        canvas(),
        viewport(),
        &ChartInputs::new(at(12, 0)),
    );

    assert_eq!(
        layout.frame.time_axis.anchor(),
        at(12, 0) - TimeDelta::hours(24)
    );
    assert_eq!(layout.frame.value_labels.min_value, 70.0);
    assert_eq!(layout.frame.value_labels.max_value, 450.0);
    assert_eq!(layout.frame.extra_width, 150.0);
    assert!((layout.frame.full_width - 2_400.0).abs() <= 1e-9);
    assert!((layout.frame.chart_width - 2_550.0).abs() <= 1e-9);

    assert!(layout.glucose_points.is_empty());
    assert!(layout.bolus_markers.is_empty());
    assert!(layout.temp_targets.is_empty());
    assert_eq!(layout.prediction_points.len(), 4);
    assert!(layout.prediction_points.values().all(Vec::is_empty));
    assert!(layout.basal.current_rate.is_none());
    assert!(layout.basal.effective.closed);
    assert_eq!(layout.grid.value_lines.len(), 6);
    assert_eq!(layout.grid.hour_lines.len(), 48);
}

#[test]
fn snapshot_artifacts_are_populated() {
    let layout = compute_layout(&ChartLayoutConfig::default(), canvas(), viewport(), &inputs());

    assert_eq!(layout.frame.time_axis.anchor(), at(10, 0));
    assert_eq!(layout.glucose_points.len(), 24);
    assert_eq!(layout.bolus_markers.len(), 1);
    assert_eq!(layout.bolus_markers[0].marker.diameter, 28.0);
    assert_eq!(layout.prediction_points[&PredictionKind::Iob].len(), 4);
    assert_eq!(layout.prediction_points[&PredictionKind::Zt].len(), 2);
    assert_eq!(layout.temp_targets.len(), 1);
    assert_eq!(layout.grid.hour_lines[0].time, at(10, 0));

    let label = layout.basal.current_rate.expect("current temp basal");
    assert_eq!(label.text, "1.5 U/hr");
    assert!(!layout.basal.effective.knots.is_empty());
    assert!(!layout.basal.scheduled.knots.is_empty());
}

#[test]
fn units_only_change_grid_labels() {
    let config = ChartLayoutConfig::default();
    let mg = compute_layout(&config, canvas(), viewport(), &inputs());
    let mmol = compute_layout(
        &config,
        canvas(),
        viewport(),
        &inputs().with_units(GlucoseUnits::MmolL),
    );

    assert_eq!(mg.glucose_points, mmol.glucose_points);
    assert_eq!(mg.basal, mmol.basal);
    assert_ne!(mg.grid.value_lines, mmol.grid.value_lines);
    assert_eq!(mg.grid.value_lines[0].y, mmol.grid.value_lines[0].y);
}

#[test]
fn engine_matches_uncached_layout() {
    let config = ChartLayoutConfig::default();
    let mut engine = ChartLayoutEngine::new(config).expect("engine init");

    let cached = engine.layout(canvas(), viewport(), &inputs());
    let direct = compute_layout(&config, canvas(), viewport(), &inputs());
    assert_eq!(cached, direct);
}

#[test]
fn repeated_layout_is_served_from_cache() {
    let mut engine = ChartLayoutEngine::new(ChartLayoutConfig::default()).expect("engine init");
    let inputs = inputs();

    let first = engine.layout(canvas(), viewport(), &inputs);
    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 6);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.size, 6);

    let second = engine.layout(canvas(), viewport(), &inputs);
    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 6);
    assert_eq!(stats.hits, 6);
    assert_eq!(first, second);
}

#[test]
fn bolus_change_recomputes_only_bolus_markers() {
    let mut engine = ChartLayoutEngine::new(ChartLayoutConfig::default()).expect("engine init");
    let inputs = inputs();
    let _ = engine.layout(canvas(), viewport(), &inputs);

    let changed = inputs
        .clone()
        .with_boluses(vec![BolusEvent::new(at(11, 0), Decimal::ONE)]);
    let layout = engine.layout(canvas(), viewport(), &changed);

    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 7);
    assert_eq!(stats.hits, 5);
    assert_eq!(layout.bolus_markers[0].marker.diameter, 16.0);
}

#[test]
fn appended_reading_keeps_basal_cached() {
    let mut engine = ChartLayoutEngine::new(ChartLayoutConfig::default()).expect("engine init");
    let inputs = inputs();
    let _ = engine.layout(canvas(), viewport(), &inputs);

    let mut readings = inputs.readings.clone();
    readings.push(GlucoseReading::new(at(12, 0), 180));
    let changed = inputs.clone().with_readings(readings);
    let layout = engine.layout(canvas(), viewport(), &changed);

    let stats = engine.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 11);
    assert_eq!(layout.glucose_points.len(), 25);
    assert_eq!(layout.frame.value_labels.max_value, 180.0);
}

#[test]
fn canvas_change_recomputes_everything() {
    let mut engine = ChartLayoutEngine::new(ChartLayoutConfig::default()).expect("engine init");
    let inputs = inputs();
    let _ = engine.layout(canvas(), viewport(), &inputs);
    let layout = engine.layout(Canvas::new(800.0, 600.0), viewport(), &inputs);

    let stats = engine.cache_stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 12);
    assert!((layout.frame.full_width - 3_840.0).abs() <= 1e-9);
}

#[test]
fn config_change_clears_cached_artifacts() {
    let mut engine = ChartLayoutEngine::new(ChartLayoutConfig::default()).expect("engine init");
    let inputs = inputs();
    let _ = engine.layout(canvas(), viewport(), &inputs);

    engine
        .set_config(ChartLayoutConfig::default().with_basal_height(40.0))
        .expect("valid config");
    assert_eq!(engine.cache_stats().size, 0);
    assert_eq!(engine.config().basal_height, 40.0);

    let layout = engine.layout(canvas(), viewport(), &inputs);
    assert_eq!(engine.cache_stats().misses, 12);
    assert!(layout.basal.effective.outline.iter().all(|point| point.y <= 40.0));
}

#[test]
fn invalid_config_is_rejected_and_previous_kept() {
    let mut engine = ChartLayoutEngine::new(ChartLayoutConfig::default()).expect("engine init");

    let result = engine.set_config(ChartLayoutConfig::default().with_y_grid_intervals(0));
    assert!(result.is_err());
    assert_eq!(engine.config(), ChartLayoutConfig::default());

    assert!(
        ChartLayoutEngine::new(ChartLayoutConfig::default().with_basal_height(-1.0)).is_err()
    );
}

#[test]
fn clear_cache_keeps_counters() {
    let mut engine = ChartLayoutEngine::new(ChartLayoutConfig::default()).expect("engine init");
    let _ = engine.layout(canvas(), viewport(), &inputs());

    engine.clear_cache();
    let stats = engine.cache_stats();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.misses, 6);
}

#[test]
fn degenerate_canvas_yields_finite_geometry() {
    let layout = compute_layout(
        &ChartLayoutConfig::default(),
        Canvas::new(f64::INFINITY, f64::NAN),
        Viewport::new(0, 0),
        &inputs(),
    );

    assert!(
        layout
            .glucose_points
            .iter()
            .all(|marker| marker.center.x.is_finite() && marker.center.y.is_finite())
    );
    assert!(layout.temp_targets.iter().all(|rect| rect.is_finite()));
    assert!(layout.grid.hour_lines.is_empty());
}

#[test]
fn schedule_reference_line_spans_wider_window_than_effective_path() {
    let layout = compute_layout(&ChartLayoutConfig::default(), canvas(), viewport(), &inputs());

    // Anchor 10:00, 100 px per hour. Effective window is 03-09 12:00 to
    // 03-10 18:00; the reference window is 03-09 00:00 to 03-11 00:00.
    let effective = &layout.basal.effective.outline;
    let scheduled = &layout.basal.scheduled.outline;
    let effective_min = effective.iter().map(|point| point.x).fold(f64::INFINITY, f64::min);
    let effective_max = effective.iter().map(|point| point.x).fold(f64::NEG_INFINITY, f64::max);
    assert!((effective_min + 2_200.0).abs() <= 1e-9);
    assert!((effective_max - 800.0).abs() <= 1e-9);

    let first = scheduled.first().expect("reference start");
    let last = scheduled.last().expect("reference end");
    assert!((first.x + 3_400.0).abs() <= 1e-9);
    assert!((last.x - 1_400.0).abs() <= 1e-9);
    assert!(first.x < effective_min);
    assert!(last.x > effective_max);
}
