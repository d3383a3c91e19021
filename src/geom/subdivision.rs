//! Loop subdivision for triangle meshes.
//!
//! The refinement operator sits behind the [`Subdivider`] trait so the mesh
//! assembler only depends on its contract: a triangle mesh plus
//! [`SubdOptions`] in, a denser triangle mesh out. [`LoopSubdivider`] is the
//! built-in implementation.
//!
//! # Example
//! ```ignore
//! use geomesh_engine::geom::{GeomMesh, LoopSubdivider, SubdOptions, Subdivider};
//!
//! let quad = GeomMesh::new(positions, vec![0, 1, 2, 0, 2, 3]);
//! let (refined, diag) = LoopSubdivider.subdivide(&quad, &SubdOptions::with_iterations(2))?;
//! assert_eq!(diag.iterations_run, 2);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use super::core::Point3;
use super::mesh::GeomMesh;

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubdError {
    #[error("empty input: {0}")]
    EmptyInput(String),
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    #[error("subdivided mesh would exceed the u32 index range")]
    IndexOverflow,
}

// ============================================================================
// Options and diagnostics
// ============================================================================

/// Refinement settings for one subdivision call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdOptions {
    /// Number of 1→4 refinement iterations; 0 returns the mesh unchanged.
    pub iterations: usize,
    /// Split coplanar interior edges at their midpoint before the first iteration.
    pub split: bool,
    /// Move original interior vertices with the Loop vertex rule.
    pub smooth: bool,
    /// Keep boundary vertices fixed and boundary edge points on their edge.
    pub preserve_edges: bool,
    /// Only insert midpoints; no vertex ever moves.
    pub flat: bool,
    /// Upper bound on the triangle count of any iteration; `None` is unbounded.
    pub max_triangles: Option<usize>,
}

impl Default for SubdOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            split: true,
            smooth: false,
            preserve_edges: false,
            flat: false,
            max_triangles: None,
        }
    }
}

impl SubdOptions {
    #[must_use]
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Default::default()
        }
    }

    fn allows(&self, triangles: usize) -> bool {
        self.max_triangles.is_none_or(|max| triangles <= max)
    }
}

/// Diagnostics from one subdivision call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubdDiagnostics {
    pub input_triangles: usize,
    pub output_triangles: usize,
    /// Edges split by the pre-refinement split pass.
    pub split_edges: usize,
    pub iterations_run: usize,
    /// The triangle cap stopped refinement early.
    pub capped: bool,
}

/// Subdivision capability used by the mesh assembler.
pub trait Subdivider {
    /// Refine `mesh` according to `options`.
    ///
    /// # Errors
    /// Returns [`SubdError`] for empty or invalid meshes and when the result
    /// would not be indexable with `u32`.
    fn subdivide(
        &self,
        mesh: &GeomMesh,
        options: &SubdOptions,
    ) -> Result<(GeomMesh, SubdDiagnostics), SubdError>;
}

// ============================================================================
// Loop scheme
// ============================================================================

/// Loop subdivision with split, smoothing, edge preservation and flat modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSubdivider;

impl Subdivider for LoopSubdivider {
    fn subdivide(
        &self,
        mesh: &GeomMesh,
        options: &SubdOptions,
    ) -> Result<(GeomMesh, SubdDiagnostics), SubdError> {
        if mesh.indices.is_empty() {
            return Err(SubdError::EmptyInput("mesh has no triangles".into()));
        }
        mesh.validate().map_err(SubdError::InvalidTopology)?;

        let mut diag = SubdDiagnostics {
            input_triangles: mesh.triangle_count(),
            ..Default::default()
        };

        let mut positions = mesh.positions.clone();
        let mut indices = mesh.indices.clone();

        if options.iterations > 0 && options.split {
            let (split_positions, split_indices, split_edges) =
                split_coplanar_edges(&positions, &indices)?;
            if options.allows(split_indices.len() / 3) {
                positions = split_positions;
                indices = split_indices;
                diag.split_edges = split_edges;
            } else {
                diag.capped = true;
            }
        }

        for _ in 0..options.iterations {
            let next_triangles = (indices.len() / 3).saturating_mul(4);
            if !options.allows(next_triangles) {
                diag.capped = true;
                break;
            }
            (positions, indices) = loop_iteration(&positions, &indices, options)?;
            diag.iterations_run += 1;
        }

        diag.output_triangles = indices.len() / 3;
        Ok((GeomMesh::new(positions, indices), diag))
    }
}

/// Edge adjacency of a triangle list: for every undirected edge the vertices
/// opposite to it in each incident triangle.
fn edge_opposites(indices: &[u32]) -> BTreeMap<(u32, u32), Vec<u32>> {
    let mut edges: BTreeMap<(u32, u32), Vec<u32>> = BTreeMap::new();
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        for (a, b, opposite) in [(i0, i1, i2), (i1, i2, i0), (i2, i0, i1)] {
            edges.entry(normalized_edge_pair(a, b)).or_default().push(opposite);
        }
    }
    edges
}

fn loop_iteration(
    positions: &[[f64; 3]],
    indices: &[u32],
    options: &SubdOptions,
) -> Result<(Vec<[f64; 3]>, Vec<u32>), SubdError> {
    let edges = edge_opposites(indices);

    let mut neighbors: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    let mut boundary_neighbors: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for (&(a, b), opposites) in &edges {
        neighbors.entry(a).or_default().insert(b);
        neighbors.entry(b).or_default().insert(a);
        if opposites.len() != 2 {
            boundary_neighbors.entry(a).or_default().push(b);
            boundary_neighbors.entry(b).or_default().push(a);
        }
    }

    let point = |i: u32| Point3::from_array(positions[i as usize]);

    let mut out: Vec<[f64; 3]> = Vec::with_capacity(positions.len() + edges.len());
    for (i, p) in positions.iter().enumerate() {
        let i = i as u32;
        let moved = if options.flat {
            None
        } else if let Some(ring) = boundary_neighbors.get(&i) {
            match ring.as_slice() {
                [b0, b1] if !options.preserve_edges => Some(weighted(&[
                    (point(i), 0.75),
                    (point(*b0), 0.125),
                    (point(*b1), 0.125),
                ])),
                _ => None,
            }
        } else if options.smooth {
            neighbors.get(&i).map(|ring| {
                let n = ring.len() as f64;
                let beta = if ring.len() == 3 { 3.0 / 16.0 } else { 3.0 / (8.0 * n) };
                let mut terms = vec![(point(i), 1.0 - n * beta)];
                terms.extend(ring.iter().map(|&j| (point(j), beta)));
                weighted(&terms)
            })
        } else {
            None
        };
        out.push(moved.map_or(*p, Point3::to_array));
    }

    let mut edge_points: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    for (&(a, b), opposites) in &edges {
        let p = match opposites.as_slice() {
            [c, d] if !options.flat => weighted(&[
                (point(a), 0.375),
                (point(b), 0.375),
                (point(*c), 0.125),
                (point(*d), 0.125),
            ]),
            _ => weighted(&[(point(a), 0.5), (point(b), 0.5)]),
        };
        let index = u32::try_from(out.len()).map_err(|_| SubdError::IndexOverflow)?;
        out.push(p.to_array());
        edge_points.insert((a, b), index);
    }

    let mid = |a: u32, b: u32| -> Result<u32, SubdError> {
        edge_points
            .get(&normalized_edge_pair(a, b))
            .copied()
            .ok_or_else(|| SubdError::InvalidTopology(format!("missing edge ({a}, {b})")))
    };

    let mut out_indices = Vec::with_capacity(indices.len() * 4);
    for tri in indices.chunks_exact(3) {
        let (v0, v1, v2) = (tri[0], tri[1], tri[2]);
        let m01 = mid(v0, v1)?;
        let m12 = mid(v1, v2)?;
        let m20 = mid(v2, v0)?;
        out_indices.extend_from_slice(&[v0, m01, m20, v1, m12, m01, v2, m20, m12, m01, m12, m20]);
    }

    Ok((out, out_indices))
}

/// Splits every interior edge whose two triangles are coplanar and re-fans the
/// affected triangles (1→2, 1→3 or 1→4). Winding is preserved.
fn split_coplanar_edges(
    positions: &[[f64; 3]],
    indices: &[u32],
) -> Result<(Vec<[f64; 3]>, Vec<u32>, usize), SubdError> {
    let edges = edge_opposites(indices);
    let point = |i: u32| Point3::from_array(positions[i as usize]);

    let mut out = positions.to_vec();
    let mut midpoints: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    for (&(a, b), opposites) in &edges {
        let [c, d] = opposites.as_slice() else {
            continue;
        };
        let n1 = point(b).sub_point(point(a)).cross(point(*c).sub_point(point(a)));
        let n2 = point(a).sub_point(point(b)).cross(point(*d).sub_point(point(b)));
        let coplanar = match (n1.normalized(), n2.normalized()) {
            (Some(n1), Some(n2)) => n1.dot(n2) >= 1.0 - COPLANAR_EPS,
            _ => false,
        };
        if !coplanar {
            continue;
        }
        let index = u32::try_from(out.len()).map_err(|_| SubdError::IndexOverflow)?;
        out.push(weighted(&[(point(a), 0.5), (point(b), 0.5)]).to_array());
        midpoints.insert((a, b), index);
    }

    let split_edges = midpoints.len();
    let mut out_indices = Vec::with_capacity(indices.len() * 2);
    for tri in indices.chunks_exact(3) {
        let v = [tri[0], tri[1], tri[2]];
        let m = [
            midpoints.get(&normalized_edge_pair(v[0], v[1])).copied(),
            midpoints.get(&normalized_edge_pair(v[1], v[2])).copied(),
            midpoints.get(&normalized_edge_pair(v[2], v[0])).copied(),
        ];

        match m.iter().filter(|m| m.is_some()).count() {
            0 => out_indices.extend_from_slice(&v),
            1 => {
                // Rotate so the split edge is (a, b).
                let k = m.iter().position(Option::is_some).unwrap_or(0);
                let (a, b, c) = (v[k], v[(k + 1) % 3], v[(k + 2) % 3]);
                let Some(mab) = m[k] else { continue };
                out_indices.extend_from_slice(&[a, mab, c, mab, b, c]);
            }
            2 => {
                // Rotate so the unsplit edge is (c, a).
                let k = m.iter().position(Option::is_none).unwrap_or(0);
                let (a, b, c) = (v[(k + 1) % 3], v[(k + 2) % 3], v[k]);
                let (Some(mab), Some(mbc)) = (m[(k + 1) % 3], m[(k + 2) % 3]) else {
                    continue;
                };
                out_indices.extend_from_slice(&[mab, b, mbc, a, mab, mbc, a, mbc, c]);
            }
            _ => {
                let (Some(m01), Some(m12), Some(m20)) = (m[0], m[1], m[2]) else {
                    continue;
                };
                out_indices.extend_from_slice(&[
                    v[0], m01, m20, v[1], m12, m01, v[2], m20, m12, m01, m12, m20,
                ]);
            }
        }
    }

    Ok((out, out_indices, split_edges))
}

// ============================================================================
// Helper functions
// ============================================================================

const COPLANAR_EPS: f64 = 1e-9;

/// Normalize an edge pair so that the smaller index comes first.
#[inline]
fn normalized_edge_pair(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn weighted(terms: &[(Point3, f64)]) -> Point3 {
    terms.iter().fold(Point3::ORIGIN, |acc, (p, w)| {
        Point3::new(acc.x + p.x * w, acc.y + p.y * w, acc.z + p.z * w)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> GeomMesh {
        GeomMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let options = SubdOptions::with_iterations(0);
        let (mesh, diag) = LoopSubdivider.subdivide(&quad(), &options).unwrap();
        assert_eq!(mesh, quad());
        assert_eq!(diag.iterations_run, 0);
        assert_eq!(diag.split_edges, 0);
    }

    #[test]
    fn test_split_refans_shared_diagonal() {
        let (positions, indices, split) =
            split_coplanar_edges(&quad().positions, &quad().indices).unwrap();
        assert_eq!(split, 1);
        assert_eq!(positions.len(), 5);
        assert_eq!(positions[4], [0.5, 0.5, 0.0]);
        assert_eq!(indices.len(), 12);
    }

    #[test]
    fn test_split_skips_folded_edges() {
        let mesh = GeomMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, -1.0]],
            vec![0, 1, 2, 0, 2, 3],
        );
        let (_, _, split) = split_coplanar_edges(&mesh.positions, &mesh.indices).unwrap();
        assert_eq!(split, 0);
    }

    #[test]
    fn test_one_iteration_quadruples() {
        let options = SubdOptions {
            split: false,
            ..SubdOptions::with_iterations(1)
        };
        let (mesh, diag) = LoopSubdivider.subdivide(&quad(), &options).unwrap();
        assert_eq!(mesh.triangle_count(), 8);
        // 4 corners + 5 edges
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(diag.iterations_run, 1);
    }

    #[test]
    fn test_cap_stops_iterations() {
        let options = SubdOptions {
            split: false,
            max_triangles: Some(10),
            ..SubdOptions::with_iterations(3)
        };
        let (mesh, diag) = LoopSubdivider.subdivide(&quad(), &options).unwrap();
        assert_eq!(diag.iterations_run, 1);
        assert!(diag.capped);
        assert_eq!(mesh.triangle_count(), 8);
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let err = LoopSubdivider
            .subdivide(&GeomMesh::default(), &SubdOptions::default())
            .unwrap_err();
        assert!(matches!(err, SubdError::EmptyInput(_)));
    }
}
