//! Per-mesh diagnostics collected while assembling a footprint mesh.
//!
//! Every stage of the assembler records what it did (triangles produced,
//! subdivision passes run or skipped by the triangle cap, triangles rewound,
//! degenerate UV axes) so a host can show why a mesh looks the way it does.
//!
//! ```ignore
//! let refined = assembler.assemble(&polygon, &projector)?;
//! if !refined.diagnostics.is_clean() {
//!     for warning in &refined.diagnostics.warnings {
//!         log::warn!("{warning}");
//!     }
//! }
//! ```

use std::fmt;

use serde::Serialize;

/// Diagnostics for one assembled mesh, or the sum over a World.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeomMeshDiagnostics {
    /// Vertices in the final mesh.
    pub vertex_count: usize,

    /// Triangles in the final mesh.
    pub triangle_count: usize,

    /// Triangles produced by the triangulator, before refinement.
    pub raw_triangle_count: usize,

    /// Edges split at their midpoint by the pre-refinement split pass.
    pub split_edge_count: usize,

    /// Subdivision iterations that actually ran.
    pub subdivision_iterations: usize,

    /// Whether the triangle cap stopped subdivision before the requested
    /// iteration count was reached.
    pub subdivision_capped: bool,

    /// Triangles rewound so their normal points towards +Z.
    pub flipped_triangle_count: usize,

    /// Open (boundary) edges of the final mesh. A flat footprint always has
    /// some; holes add more.
    pub open_edge_count: usize,

    /// Edges shared by more than two triangles.
    pub non_manifold_edge_count: usize,

    /// UV axes whose bounding-box extent was zero and were mapped to 0.
    pub degenerate_uv_axes: usize,

    /// Human-readable warnings, e.g. "subdivision capped at 2 of 3 iterations".
    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Returns `true` if no repairs or fallbacks were needed.
    ///
    /// Open edges are expected for flat footprints and do not count.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.non_manifold_edge_count == 0
            && self.degenerate_uv_axes == 0
            && !self.subdivision_capped
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another diagnostics struct into this one.
    ///
    /// Counts are summed, warnings appended and flags OR'd. The iteration
    /// count keeps the maximum, since meshes of one pass share their settings.
    pub fn merge(&mut self, other: &GeomMeshDiagnostics) {
        self.vertex_count += other.vertex_count;
        self.triangle_count += other.triangle_count;
        self.raw_triangle_count += other.raw_triangle_count;
        self.split_edge_count += other.split_edge_count;
        self.subdivision_iterations = self.subdivision_iterations.max(other.subdivision_iterations);
        self.subdivision_capped = self.subdivision_capped || other.subdivision_capped;
        self.flipped_triangle_count += other.flipped_triangle_count;
        self.open_edge_count += other.open_edge_count;
        self.non_manifold_edge_count += other.non_manifold_edge_count;
        self.degenerate_uv_axes += other.degenerate_uv_axes;
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Short summary for logging: `"V:{vertices} T:{triangles} [details...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.raw_triangle_count > 0 {
            parts.push(format!("raw:{}", self.raw_triangle_count));
        }
        if self.subdivision_iterations > 0 {
            parts.push(format!("loop:{}", self.subdivision_iterations));
        }
        if self.split_edge_count > 0 {
            parts.push(format!("split:{}", self.split_edge_count));
        }
        if self.subdivision_capped {
            parts.push("capped".to_string());
        }
        if self.flipped_triangle_count > 0 {
            parts.push(format!("flipped:{}", self.flipped_triangle_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.degenerate_uv_axes > 0 {
            parts.push(format!("flat-uv:{}", self.degenerate_uv_axes));
        }

        parts.join(" ")
    }
}

impl fmt::Display for GeomMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {} (raw {})", self.triangle_count, self.raw_triangle_count)?;
        writeln!(f, "  Subdivision iterations: {}", self.subdivision_iterations)?;

        if self.subdivision_capped {
            writeln!(f, "  Subdivision stopped by triangle cap")?;
        }
        if self.split_edge_count > 0 {
            writeln!(f, "  Split edges: {}", self.split_edge_count)?;
        }
        if self.flipped_triangle_count > 0 {
            writeln!(f, "  Rewound triangles: {}", self.flipped_triangle_count)?;
        }
        if self.open_edge_count > 0 || self.non_manifold_edge_count > 0 {
            writeln!(f, "  Topology:")?;
            writeln!(f, "    - Open edges: {}", self.open_edge_count)?;
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
        }
        if self.degenerate_uv_axes > 0 {
            writeln!(f, "  Degenerate UV axes: {}", self.degenerate_uv_axes)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        let status = if self.is_clean() { "CLEAN" } else { "ISSUES DETECTED" };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}
