//! Opt-in timing hooks for the generation pipeline.
//!
//! Timing is only collected when the `mesh_engine_metrics` feature is enabled
//! and the target is not `wasm32` (`std::time::Instant` is unavailable there).
//! Otherwise every call compiles down to running the closure.
//!
//! ```ignore
//! use geomesh_engine::geom::{GeomMetrics, TimingBucket};
//!
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let indices = metrics.time(TimingBucket::Triangulation, || {
//!     triangulator.triangulate(&buffer, &holes)
//! });
//! if let Some(report) = metrics.end() {
//!     println!("triangulation: {} ns", report.triangulation_ns);
//! }
//! ```

use serde::Serialize;

/// Pipeline stages that accumulate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Concave hull and center of mass over all input points.
    Anchor,
    /// Ring flattening into local meters.
    Projection,
    /// Polygon triangulation.
    Triangulation,
    /// Subdivision refinement.
    Subdivision,
    /// Vertex normal recomputation.
    Normals,
    /// Bounding-box UV synthesis.
    Uv,
    /// World assembly (bounding box, centering translation).
    Assembly,
}

/// Cumulative nanoseconds per [`TimingBucket`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeomTimingReport {
    pub anchor_ns: u64,
    pub projection_ns: u64,
    pub triangulation_ns: u64,
    pub subdivision_ns: u64,
    pub normals_ns: u64,
    pub uv_ns: u64,
    pub assembly_ns: u64,
}

impl GeomTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.anchor_ns
            .saturating_add(self.projection_ns)
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.subdivision_ns)
            .saturating_add(self.normals_ns)
            .saturating_add(self.uv_ns)
            .saturating_add(self.assembly_ns)
    }

    /// Total time in milliseconds, for display.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Anchor => &mut self.anchor_ns,
            TimingBucket::Projection => &mut self.projection_ns,
            TimingBucket::Triangulation => &mut self.triangulation_ns,
            TimingBucket::Subdivision => &mut self.subdivision_ns,
            TimingBucket::Normals => &mut self.normals_ns,
            TimingBucket::Uv => &mut self.uv_ns,
            TimingBucket::Assembly => &mut self.assembly_ns,
        }
    }

    /// Adds `nanos` to `bucket`, saturating.
    pub fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.bucket_mut(bucket);
        *slot = slot.saturating_add(nanos);
    }
}

/// Accumulator for timing pipeline stages.
///
/// Call [`begin`](Self::begin) to reset, wrap stages with [`time`](Self::time)
/// and collect the report with [`end`](Self::end). With metrics disabled
/// [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and accumulates its elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX to prevent overflow
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.report.add(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_total() {
        let mut report = GeomTimingReport::default();
        report.add(TimingBucket::Anchor, 1000);
        report.add(TimingBucket::Triangulation, 2000);
        report.add(TimingBucket::Uv, 3000);
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_add_saturates() {
        let mut report = GeomTimingReport::default();
        report.add(TimingBucket::Subdivision, u64::MAX);
        report.add(TimingBucket::Subdivision, 10);
        assert_eq!(report.subdivision_ns, u64::MAX);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::Normals, || 42);
        assert_eq!(result, 42);
        let _ = metrics.end();
    }
}
