use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{
    BasalScheduleEntry, BolusEvent, GlucoseReading, GlucoseUnits, PredictionSet,
    PumpHistoryRecord, TempTarget,
};

/// Immutable data snapshot for one layout pass.
///
/// `now` is supplied by the host; layout never reads the wall clock, so the
/// same snapshot always produces the same geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartInputs {
    pub now: DateTime<Utc>,
    /// Chronological glucose readings.
    #[serde(default)]
    pub readings: Vec<GlucoseReading>,
    #[serde(default)]
    pub basal_schedule: Vec<BasalScheduleEntry>,
    /// Temp-basal start/duration records, in pump history order.
    #[serde(default)]
    pub temp_basals: Vec<PumpHistoryRecord>,
    #[serde(default)]
    pub boluses: Vec<BolusEvent>,
    #[serde(default)]
    pub predictions: PredictionSet,
    #[serde(default)]
    pub temp_targets: Vec<TempTarget>,
    #[serde(default)]
    pub max_basal: Decimal,
    #[serde(default)]
    pub units: GlucoseUnits,
}

impl ChartInputs {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            readings: Vec::new(),
            basal_schedule: Vec::new(),
            temp_basals: Vec::new(),
            boluses: Vec::new(),
            predictions: PredictionSet::default(),
            temp_targets: Vec::new(),
            max_basal: Decimal::ZERO,
            units: GlucoseUnits::MgDl,
        }
    }

    #[must_use]
    pub fn with_readings(mut self, readings: Vec<GlucoseReading>) -> Self {
        self.readings = readings;
        self
    }

    #[must_use]
    pub fn with_basal_schedule(mut self, schedule: Vec<BasalScheduleEntry>) -> Self {
        self.basal_schedule = schedule;
        self
    }

    #[must_use]
    pub fn with_temp_basals(mut self, records: Vec<PumpHistoryRecord>) -> Self {
        self.temp_basals = records;
        self
    }

    #[must_use]
    pub fn with_boluses(mut self, boluses: Vec<BolusEvent>) -> Self {
        self.boluses = boluses;
        self
    }

    #[must_use]
    pub fn with_predictions(mut self, predictions: PredictionSet) -> Self {
        self.predictions = predictions;
        self
    }

    #[must_use]
    pub fn with_temp_targets(mut self, targets: Vec<TempTarget>) -> Self {
        self.temp_targets = targets;
        self
    }

    #[must_use]
    pub fn with_max_basal(mut self, max_basal: Decimal) -> Self {
        self.max_basal = max_basal;
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: GlucoseUnits) -> Self {
        self.units = units;
        self
    }
}
