mod json_contract;
mod layout;
mod layout_cache;
mod layout_config;
mod layout_engine;
mod layout_input;

pub use json_contract::{CHART_LAYOUT_JSON_SCHEMA_V1, ChartLayoutJsonContractV1};
pub use layout::{ChartFrame, ChartGrid, ChartLayout, LayoutPass, compute_layout};
pub use layout_cache::{LayoutArtifact, LayoutCacheStats};
pub use layout_config::ChartLayoutConfig;
pub use layout_engine::ChartLayoutEngine;
pub use layout_input::ChartInputs;
