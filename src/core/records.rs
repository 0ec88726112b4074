use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::add_minutes;

/// One sensor glucose sample in mg/dL.
///
/// A reading without a value still occupies its time slot; it is skipped
/// when deriving the value domain and plotted at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlucoseReading {
    pub time: DateTime<Utc>,
    pub value: Option<i32>,
}

impl GlucoseReading {
    #[must_use]
    pub fn new(time: DateTime<Utc>, value: i32) -> Self {
        Self {
            time,
            value: Some(value),
        }
    }

    #[must_use]
    pub fn without_value(time: DateTime<Utc>) -> Self {
        Self { time, value: None }
    }

    #[must_use]
    pub fn value_or_zero(self) -> i32 {
        self.value.unwrap_or(0)
    }
}

/// Scheduled basal rate starting at `minute_of_day`, repeated every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasalScheduleEntry {
    pub minute_of_day: u32,
    pub rate: Decimal,
}

impl BasalScheduleEntry {
    #[must_use]
    pub fn new(minute_of_day: u32, rate: Decimal) -> Self {
        Self {
            minute_of_day,
            rate,
        }
    }
}

/// Temp-basal pump history record.
///
/// A temporary basal run is recorded as a `TempBasal` record immediately
/// followed by its `TempBasalDuration` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PumpHistoryRecord {
    TempBasal {
        time: DateTime<Utc>,
        rate: Option<Decimal>,
    },
    TempBasalDuration {
        time: DateTime<Utc>,
        duration_minutes: Option<i64>,
    },
}

impl PumpHistoryRecord {
    #[must_use]
    pub fn temp_basal(time: DateTime<Utc>, rate: Decimal) -> Self {
        Self::TempBasal {
            time,
            rate: Some(rate),
        }
    }

    #[must_use]
    pub fn duration(time: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self::TempBasalDuration {
            time,
            duration_minutes: Some(duration_minutes),
        }
    }
}

/// A well-formed temp-basal run decoded from a start/duration record pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempBasalOverride {
    pub start: DateTime<Utc>,
    pub rate: Decimal,
    pub duration_minutes: i64,
}

impl TempBasalOverride {
    /// Decodes a `[TempBasal, TempBasalDuration]` pair; any other shape yields `None`.
    #[must_use]
    pub fn from_pair(pair: &[PumpHistoryRecord]) -> Option<Self> {
        match pair {
            [
                PumpHistoryRecord::TempBasal { time, rate },
                PumpHistoryRecord::TempBasalDuration {
                    duration_minutes, ..
                },
            ] => Some(Self {
                start: *time,
                rate: rate.unwrap_or(Decimal::ZERO),
                duration_minutes: duration_minutes.unwrap_or(0),
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn end(self) -> DateTime<Utc> {
        add_minutes(self.start, self.duration_minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BolusEvent {
    pub time: DateTime<Utc>,
    pub amount: Option<Decimal>,
}

impl BolusEvent {
    #[must_use]
    pub fn new(time: DateTime<Utc>, amount: Decimal) -> Self {
        Self {
            time,
            amount: Some(amount),
        }
    }

    #[must_use]
    pub fn amount_or_zero(self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionKind {
    Iob,
    Cob,
    Zt,
    Uam,
}

impl PredictionKind {
    pub const ALL: [Self; 4] = [Self::Iob, Self::Cob, Self::Zt, Self::Uam];
}

/// Predicted glucose trajectories sharing one `deliver_at` anchor.
///
/// Sample `i` of every series sits at `deliver_at + i * cadence`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionSet {
    #[serde(default)]
    pub deliver_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub iob: Vec<i32>,
    #[serde(default)]
    pub cob: Vec<i32>,
    #[serde(default)]
    pub zt: Vec<i32>,
    #[serde(default)]
    pub uam: Vec<i32>,
}

impl PredictionSet {
    #[must_use]
    pub fn new(deliver_at: DateTime<Utc>) -> Self {
        Self {
            deliver_at: Some(deliver_at),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_series(mut self, kind: PredictionKind, values: Vec<i32>) -> Self {
        match kind {
            PredictionKind::Iob => self.iob = values,
            PredictionKind::Cob => self.cob = values,
            PredictionKind::Zt => self.zt = values,
            PredictionKind::Uam => self.uam = values,
        }
        self
    }

    #[must_use]
    pub fn series(&self, kind: PredictionKind) -> &[i32] {
        match kind {
            PredictionKind::Iob => &self.iob,
            PredictionKind::Cob => &self.cob,
            PredictionKind::Zt => &self.zt,
            PredictionKind::Uam => &self.uam,
        }
    }

    /// Longest sample count across the four series.
    #[must_use]
    pub fn max_len(&self) -> usize {
        PredictionKind::ALL
            .iter()
            .map(|kind| self.series(*kind).len())
            .max()
            .unwrap_or(0)
    }

    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        PredictionKind::ALL
            .into_iter()
            .flat_map(|kind| self.series(kind).iter().copied())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max_len() == 0
    }
}

/// Time-bounded glucose target range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempTarget {
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
    pub target_low: Decimal,
    pub target_high: Decimal,
}

impl TempTarget {
    #[must_use]
    pub fn new(
        start: DateTime<Utc>,
        duration_minutes: i64,
        target_low: Decimal,
        target_high: Decimal,
    ) -> Self {
        Self {
            start,
            duration_minutes,
            target_low,
            target_high,
        }
    }

    #[must_use]
    pub fn end(self) -> DateTime<Utc> {
        add_minutes(self.start, self.duration_minutes)
    }
}

/// Display units for value labels. Geometry is always computed in mg/dL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlucoseUnits {
    #[default]
    MgDl,
    MmolL,
}

impl GlucoseUnits {
    /// mg/dL to mmol/L factor.
    pub const EXCHANGE_RATE: f64 = 0.0555;

    #[must_use]
    pub fn from_mg_dl(self, value: f64) -> f64 {
        match self {
            Self::MgDl => value,
            Self::MmolL => value * Self::EXCHANGE_RATE,
        }
    }
}
