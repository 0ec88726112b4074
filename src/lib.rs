//! glucose-chart: deterministic layout engine for glucose charts.
//!
//! The crate turns a snapshot of glucose readings, basal schedule, temp
//! basals, boluses, predictions and temp targets into drawable geometry
//! (points, step paths, rectangles, grid lines and label anchors). Drawing is
//! left to the host; every pass is a pure function of its inputs.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{ChartInputs, ChartLayout, ChartLayoutConfig, ChartLayoutEngine, compute_layout};
pub use error::{ChartError, ChartResult};
