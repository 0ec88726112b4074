pub mod basal;
pub mod geometry;
pub mod grid;
pub mod interpolation;
pub mod point_sets;
pub mod primitives;
pub mod records;
pub mod temp_targets;
pub mod time_axis;
pub mod types;
pub mod value_axis;

pub use basal::{
    BasalGeometry, BasalPath, BasalPathBuilder, BasalRateLabel, BasalScale, BasalWindow,
    SCHEDULE_REPLICA_DAYS, pair_temp_basals,
};
pub use geometry::{ChartPoint, ChartRect, CircleMarker};
pub use grid::{HourGridLine, ValueGrid, ValueGridLine, hour_grid, value_grid};
pub use interpolation::Interpolator;
pub use point_sets::{BolusLabel, BolusMarker, MarkerStyle, PointSetBuilder, PredictionPoints};
pub use records::{
    BasalScheduleEntry, BolusEvent, GlucoseReading, GlucoseUnits, PredictionKind, PredictionSet,
    PumpHistoryRecord, TempBasalOverride, TempTarget,
};
pub use temp_targets::{merge_interval_rects, project_temp_target_rects};
pub use time_axis::{SECONDS_PER_HOUR, TimeAxis};
pub use types::{Canvas, Viewport};
pub use value_axis::{LabelDomain, ValueAxis, ValueDomain, ValueDomainDefaults};
