use std::collections::BTreeMap;

use super::metrics::GeomMetrics;
use super::{BBox, Point3, Tolerance, Vec3};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub normals: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    /// Create a new mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            uvs: None,
            normals: None,
        }
    }

    #[must_use]
    pub fn with_attributes(
        positions: Vec<[f64; 3]>,
        indices: Vec<u32>,
        uvs: Option<Vec<[f64; 2]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Self {
        Self {
            positions,
            indices,
            uvs,
            normals,
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Returns true if indices represent a triangle list.
    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    /// Returns true if all optional vertex attribute buffers match `positions.len()`.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
    }

    /// Returns true if any UV coordinate lies outside `[0, 1]` or is not finite.
    #[must_use]
    pub fn has_invalid_uvs(&self) -> bool {
        self.uvs.as_ref().is_some_and(|uvs| {
            uvs.iter()
                .flatten()
                .any(|c| !c.is_finite() || !(0.0..=1.0).contains(c))
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.has_triangle_indices() {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        if self.has_invalid_uvs() {
            return Err("mesh has UV coordinates outside [0, 1]".to_string());
        }
        Ok(())
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_positions(&self.positions)
    }

    /// Sum of triangle areas.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .filter_map(|tri| triangle_normal(&self.positions, tri))
            .map(|n| 0.5 * n.length())
            .sum()
    }

    /// Copy of the positions shifted by `offset`.
    #[must_use]
    pub fn translated_positions(&self, offset: Vec3) -> Vec<[f64; 3]> {
        self.positions
            .iter()
            .map(|p| (Point3::from_array(*p) + offset).to_array())
            .collect()
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    ///
    /// This is a zero-copy view over `positions`, useful for wasm/JS adapters that
    /// expect packed numeric buffers.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.positions.as_flattened()
    }

    /// Returns the UV buffer as a flat slice: `[u0, v0, u1, v1, ...]`.
    #[must_use]
    pub fn uvs_flat(&self) -> Option<&[f64]> {
        self.uvs.as_deref().map(<[[f64; 2]]>::as_flattened)
    }

    /// Returns the normal buffer as a flat slice: `[nx0, ny0, nz0, nx1, ny1, nz1, ...]`.
    #[must_use]
    pub fn normals_flat(&self) -> Option<&[f64]> {
        self.normals.as_deref().map(<[[f64; 3]]>::as_flattened)
    }
}

#[derive(Debug)]
pub struct GeomContext {
    pub tolerance: Tolerance,
    pub metrics: GeomMetrics,
}

impl GeomContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: Tolerance::default_geom(),
            metrics: GeomMetrics::default(),
        }
    }
}

impl Default for GeomContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unnormalized face normal (length = twice the triangle area).
fn triangle_normal(positions: &[[f64; 3]], tri: &[u32]) -> Option<Vec3> {
    let a = Point3::from_array(*positions.get(tri[0] as usize)?);
    let b = Point3::from_array(*positions.get(tri[1] as usize)?);
    let c = Point3::from_array(*positions.get(tri[2] as usize)?);
    Some(b.sub_point(a).cross(c.sub_point(a)))
}

/// Rewinds every triangle whose normal points below the XY plane so that all
/// faces look towards +Z. Returns the number of triangles flipped.
pub fn orient_triangles_up(positions: &[[f64; 3]], indices: &mut [u32]) -> usize {
    let mut flipped = 0usize;
    for tri in indices.chunks_exact_mut(3) {
        let Some(n) = triangle_normal(positions, tri) else {
            continue;
        };
        if n.z < 0.0 {
            tri.swap(1, 2);
            flipped += 1;
        }
    }
    flipped
}

/// Area-weighted per-vertex normals.
///
/// Vertices without a usable accumulated normal (unreferenced, or only touched
/// by zero-area triangles) fall back to +Z.
#[must_use]
pub fn compute_smooth_normals(positions: &[[f64; 3]], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let Some(n) = triangle_normal(positions, tri) else {
            continue;
        };
        for &i in tri {
            sums[i as usize] = sums[i as usize] + n;
        }
    }

    sums.into_iter()
        .map(|n| n.normalized().filter(|n| n.is_finite()).unwrap_or(Vec3::Z).to_array())
        .collect()
}

/// Planar UVs from the XY bounding box of `positions`.
///
/// `u = (x - min.x) / size.x`, `v = (y - min.y) / size.y`. An axis whose extent
/// is within `tol` maps to 0. Results are clamped into `[0, 1]`. Returns the
/// UVs and the number of degenerate axes.
#[must_use]
pub fn compute_bbox_uvs(positions: &[[f64; 3]], tol: Tolerance) -> (Vec<[f64; 2]>, usize) {
    let Some(bbox) = BBox::from_positions(positions) else {
        return (Vec::new(), 0);
    };

    let size = bbox.size();
    let degenerate_x = !(size.x.is_finite() && size.x > tol.eps);
    let degenerate_y = !(size.y.is_finite() && size.y > tol.eps);
    let degenerate_axes = usize::from(degenerate_x) + usize::from(degenerate_y);

    let axis = |value: f64, min: f64, extent: f64, degenerate: bool| -> f64 {
        if degenerate {
            return 0.0;
        }
        let t = (value - min) / extent;
        if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
    };

    let uvs = positions
        .iter()
        .map(|p| {
            [
                axis(p[0], bbox.min.x, size.x, degenerate_x),
                axis(p[1], bbox.min.y, size.y, degenerate_y),
            ]
        })
        .collect();

    (uvs, degenerate_axes)
}

/// Counts open (single-triangle) and non-manifold (3+ triangles) edges.
#[must_use]
pub fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut edge_counts: BTreeMap<(u32, u32), u32> = BTreeMap::new();

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }

        for (ea, eb) in [(i0, i1), (i1, i2), (i2, i0)] {
            let key = if ea <= eb { (ea, eb) } else { (eb, ea) };
            *edge_counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut open_edge_count = 0usize;
    let mut non_manifold_edge_count = 0usize;
    for count in edge_counts.into_values() {
        if count == 1 {
            open_edge_count += 1;
        } else if count > 2 {
            non_manifold_edge_count += 1;
        }
    }

    (open_edge_count, non_manifold_edge_count)
}
