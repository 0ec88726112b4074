use chrono::{TimeDelta, TimeZone, Utc};
use glucose_chart::core::{
    Canvas, GlucoseReading, PredictionKind, PredictionSet, ValueAxis, ValueDomain,
    ValueDomainDefaults,
};
use proptest::prelude::*;

fn readings(values: &[i32]) -> Vec<GlucoseReading> {
    let start = Utc
        .with_ymd_and_hms(2024, 3, 10, 0, 0, 0)
        .single()
        .expect("valid time");
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            GlucoseReading::new(start + TimeDelta::minutes(5 * index as i64), *value)
        })
        .collect()
}

proptest! {
    #[test]
    fn domain_covers_every_value_and_respects_floor(
        values in prop::collection::vec(1i32..600, 0..48),
        predicted in prop::collection::vec(1i32..600, 0..48)
    ) {
        let predictions = PredictionSet::default().with_series(PredictionKind::Iob, predicted.clone());
        let domain = ValueDomain::from_series(
            &readings(&values),
            &predictions,
            ValueDomainDefaults::default(),
        );

        prop_assert!(domain.min_value <= 70.0);
        prop_assert!(domain.span() > 0.0);
        for value in values.iter().chain(&predicted) {
            prop_assert!(f64::from(*value) >= domain.min_value);
            prop_assert!(f64::from(*value) <= domain.max_value);
        }
    }

    #[test]
    fn projection_is_non_increasing_and_matches_labels(
        values in prop::collection::vec(1i32..600, 1..48),
        height in 200.0f64..1_200.0,
        a in 0.0f64..700.0,
        b in 0.0f64..700.0
    ) {
        let domain = ValueDomain::from_series(
            &readings(&values),
            &PredictionSet::default(),
            ValueDomainDefaults::default(),
        );
        let axis = ValueAxis::new(domain, Canvas::new(800.0, height), 80.0, 50.0);

        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(axis.y_for_value(high) <= axis.y_for_value(low));

        let labels = axis.domain_for_labels();
        prop_assert!((labels.min_y - 80.0).abs() <= 1e-6);
        prop_assert!((labels.max_y - (height - 50.0)).abs() <= 1e-6);
    }
}
