use tracing::{debug, warn};

use crate::core::{Canvas, Viewport};
use crate::error::ChartResult;

use super::layout_cache::{LayoutCache, LayoutFingerprints};
use super::{ChartInputs, ChartLayout, ChartLayoutConfig, LayoutCacheStats, LayoutPass};

/// Layout facade consumed by host applications.
///
/// Holds the validated configuration and memoizes each artifact of the last
/// pass, so a snapshot that changed only in boluses recomputes only the bolus
/// markers. The frame is cheap and always recomputed.
#[derive(Debug)]
pub struct ChartLayoutEngine {
    config: ChartLayoutConfig,
    cache: LayoutCache,
}

impl ChartLayoutEngine {
    pub fn new(config: ChartLayoutConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            cache: LayoutCache::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> ChartLayoutConfig {
        self.config
    }

    /// Replaces the configuration and drops every cached artifact.
    pub fn set_config(&mut self, config: ChartLayoutConfig) -> ChartResult<()> {
        self.config = config.validate()?;
        self.cache.clear();
        debug!("layout config replaced; cache cleared");
        Ok(())
    }

    pub fn layout(
        &mut self,
        canvas: Canvas,
        viewport: Viewport,
        inputs: &ChartInputs,
    ) -> ChartLayout {
        if !canvas.is_valid() {
            warn!(
                width = canvas.width,
                height = canvas.height,
                "degenerate canvas; geometry collapses to zero extent"
            );
        }
        if !viewport.is_valid() {
            warn!(
                visible_hours = viewport.visible_hours,
                total_hours = viewport.total_hours,
                "degenerate viewport"
            );
        }

        let pass = LayoutPass::new(&self.config, canvas, viewport, inputs);
        let fingerprints = LayoutFingerprints::new(canvas, viewport, inputs);
        let cache = &mut self.cache;

        let glucose_points = cache.glucose_points.get_or_compute(
            fingerprints.glucose_points,
            &mut cache.counters,
            || pass.glucose_points(),
        );
        let bolus_markers = cache.bolus_markers.get_or_compute(
            fingerprints.bolus_markers,
            &mut cache.counters,
            || pass.bolus_markers(),
        );
        let prediction_points = cache.prediction_points.get_or_compute(
            fingerprints.prediction_points,
            &mut cache.counters,
            || pass.prediction_points(),
        );
        let basal = cache
            .basal
            .get_or_compute(fingerprints.basal, &mut cache.counters, || pass.basal());
        let temp_targets = cache.temp_targets.get_or_compute(
            fingerprints.temp_targets,
            &mut cache.counters,
            || pass.temp_targets(),
        );
        let grid = cache
            .grid
            .get_or_compute(fingerprints.grid, &mut cache.counters, || pass.grid());

        ChartLayout {
            frame: pass.frame(),
            glucose_points,
            bolus_markers,
            prediction_points,
            basal,
            temp_targets,
            grid,
        }
    }

    #[must_use]
    pub fn cache_stats(&self) -> LayoutCacheStats {
        self.cache.stats()
    }

    /// Drops cached artifacts; hit/miss counters are kept.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
