use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{
    BasalGeometry, BolusMarker, Canvas, ChartRect, CircleMarker, PredictionPoints, Viewport,
};

use super::{ChartGrid, ChartInputs};

/// Runtime metrics exposed by the in-engine layout cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Artifacts currently held.
    pub size: usize,
}

/// Independently cached layout outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutArtifact {
    GlucosePoints,
    BolusMarkers,
    PredictionPoints,
    Basal,
    TempTargets,
    Grid,
}

/// Input fingerprints, one per artifact, covering exactly what each one reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct LayoutFingerprints {
    pub(super) glucose_points: u64,
    pub(super) bolus_markers: u64,
    pub(super) prediction_points: u64,
    pub(super) basal: u64,
    pub(super) temp_targets: u64,
    pub(super) grid: u64,
}

impl LayoutFingerprints {
    pub(super) fn new(canvas: Canvas, viewport: Viewport, inputs: &ChartInputs) -> Self {
        // Both axes: the time axis reads the first reading and `now`, the value
        // axis reads every reading and prediction value.
        let mut axes = DefaultHasher::new();
        canvas.hash(&mut axes);
        viewport.hash(&mut axes);
        inputs.now.hash(&mut axes);
        inputs.readings.hash(&mut axes);
        inputs.predictions.hash(&mut axes);

        // Basal reads the time axis only.
        let mut time_only = DefaultHasher::new();
        canvas.hash(&mut time_only);
        viewport.hash(&mut time_only);
        inputs.now.hash(&mut time_only);
        inputs.readings.first().map(|reading| reading.time).hash(&mut time_only);

        Self {
            glucose_points: extend(&axes, LayoutArtifact::GlucosePoints, &()),
            bolus_markers: extend(&axes, LayoutArtifact::BolusMarkers, &inputs.boluses),
            prediction_points: extend(&axes, LayoutArtifact::PredictionPoints, &()),
            basal: extend(
                &time_only,
                LayoutArtifact::Basal,
                &(&inputs.basal_schedule, &inputs.temp_basals, inputs.max_basal),
            ),
            temp_targets: extend(&axes, LayoutArtifact::TempTargets, &inputs.temp_targets),
            grid: extend(&axes, LayoutArtifact::Grid, &inputs.units),
        }
    }
}

fn extend<T: Hash + ?Sized>(base: &DefaultHasher, artifact: LayoutArtifact, extra: &T) -> u64 {
    let mut hasher = base.clone();
    artifact.hash(&mut hasher);
    extra.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
struct ArtifactSlot<T> {
    fingerprint: u64,
    value: T,
}

#[derive(Debug, Default)]
pub(super) struct CacheCounters {
    hits: u64,
    misses: u64,
}

/// Single-entry slot for one artifact; a fingerprint change replaces it.
#[derive(Debug)]
pub(super) struct ArtifactCache<T> {
    artifact: LayoutArtifact,
    slot: Option<ArtifactSlot<T>>,
}

impl<T: Clone> ArtifactCache<T> {
    pub(super) fn new(artifact: LayoutArtifact) -> Self {
        Self {
            artifact,
            slot: None,
        }
    }

    pub(super) fn get_or_compute(
        &mut self,
        fingerprint: u64,
        counters: &mut CacheCounters,
        compute: impl FnOnce() -> T,
    ) -> T {
        if let Some(slot) = self.slot.as_ref().filter(|slot| slot.fingerprint == fingerprint) {
            counters.hits = counters.hits.saturating_add(1);
            trace!(artifact = ?self.artifact, "layout cache hit");
            return slot.value.clone();
        }

        counters.misses = counters.misses.saturating_add(1);
        debug!(
            artifact = ?self.artifact,
            fingerprint,
            replaced = self.slot.is_some(),
            "layout cache miss"
        );
        let value = compute();
        self.slot = Some(ArtifactSlot {
            fingerprint,
            value: value.clone(),
        });
        value
    }

    fn is_filled(&self) -> bool {
        self.slot.is_some()
    }

    fn clear(&mut self) {
        self.slot = None;
    }
}

/// Per-artifact memo of the previous layout pass.
#[derive(Debug)]
pub(super) struct LayoutCache {
    pub(super) glucose_points: ArtifactCache<Vec<CircleMarker>>,
    pub(super) bolus_markers: ArtifactCache<Vec<BolusMarker>>,
    pub(super) prediction_points: ArtifactCache<PredictionPoints>,
    pub(super) basal: ArtifactCache<BasalGeometry>,
    pub(super) temp_targets: ArtifactCache<Vec<ChartRect>>,
    pub(super) grid: ArtifactCache<ChartGrid>,
    pub(super) counters: CacheCounters,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self {
            glucose_points: ArtifactCache::new(LayoutArtifact::GlucosePoints),
            bolus_markers: ArtifactCache::new(LayoutArtifact::BolusMarkers),
            prediction_points: ArtifactCache::new(LayoutArtifact::PredictionPoints),
            basal: ArtifactCache::new(LayoutArtifact::Basal),
            temp_targets: ArtifactCache::new(LayoutArtifact::TempTargets),
            grid: ArtifactCache::new(LayoutArtifact::Grid),
            counters: CacheCounters::default(),
        }
    }
}

impl LayoutCache {
    pub(super) fn clear(&mut self) {
        self.glucose_points.clear();
        self.bolus_markers.clear();
        self.prediction_points.clear();
        self.basal.clear();
        self.temp_targets.clear();
        self.grid.clear();
    }

    pub(super) fn stats(&self) -> LayoutCacheStats {
        let size = [
            self.glucose_points.is_filled(),
            self.bolus_markers.is_filled(),
            self.prediction_points.is_filled(),
            self.basal.is_filled(),
            self.temp_targets.is_filled(),
            self.grid.is_filled(),
        ]
        .into_iter()
        .filter(|filled| *filled)
        .count();

        LayoutCacheStats {
            hits: self.counters.hits,
            misses: self.counters.misses,
            size,
        }
    }
}
