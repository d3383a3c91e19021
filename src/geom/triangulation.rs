//! Polygon triangulation over a flattened vertex buffer.
//!
//! Vertices are read in the XY plane (`z` is ignored). The buffer holds the
//! outer ring first, followed by each hole ring; `hole_starts` gives the buffer
//! index where every hole begins. Output indices refer to the input buffer.

use super::Tolerance;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriangulationError {
    #[error("polygon requires at least 3 vertices, got {got}")]
    NotEnoughVertices { got: usize },
    #[error("triangulation vertices must be finite")]
    NonFinite,
    #[error("hole start {start} is out of range for {len} vertices")]
    InvalidHoleStart { start: usize, len: usize },
    #[error("polygon is degenerate: {0}")]
    Degenerate(String),
    #[error("earcut triangulation failed: {0}")]
    Earcut(String),
}

/// Triangulation capability used by the mesh assembler.
pub trait Triangulator {
    /// Triangulate `vertices` (outer ring, then holes) into a triangle list.
    ///
    /// # Errors
    /// Degenerate input (too few or collinear vertices) and topologies the
    /// implementation cannot handle are reported as [`TriangulationError`].
    fn triangulate(
        &self,
        vertices: &[[f64; 3]],
        hole_starts: &[usize],
    ) -> Result<Vec<u32>, TriangulationError>;
}

// ============================================================================
// Ear clipping
// ============================================================================

/// Ear-clipping triangulator with hole support, backed by `earcutr`.
///
/// Rings may be wound either way. Holes with fewer than 3 vertices are left
/// out, and every output triangle is counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EarcutTriangulator {
    pub tolerance: Tolerance,
}

impl Triangulator for EarcutTriangulator {
    fn triangulate(
        &self,
        vertices: &[[f64; 3]],
        hole_starts: &[usize],
    ) -> Result<Vec<u32>, TriangulationError> {
        let rings = ring_ranges(vertices.len(), hole_starts)?;
        let points = planar_points(vertices)?;
        let tol = Tolerance::new(self.tolerance.eps * extent(&points).max(1.0));

        // `source` maps earcut vertex indices back to the caller's buffer.
        let mut coords = Vec::with_capacity(points.len() * 2);
        let mut source: Vec<u32> = Vec::with_capacity(points.len());
        let mut hole_indices = Vec::with_capacity(hole_starts.len());
        for (ring, &(begin, end)) in rings.iter().enumerate() {
            if ring > 0 {
                if end - begin < 3 {
                    continue;
                }
                hole_indices.push(source.len());
            }
            for (idx, p) in points.iter().enumerate().take(end).skip(begin) {
                coords.extend_from_slice(&[p.x, p.y]);
                source.push(idx as u32);
            }
        }

        let triangles = earcutr::earcut(&coords, &hole_indices, 2)
            .map_err(|err| TriangulationError::Earcut(format!("{err:?}")))?;

        let mut indices = Vec::with_capacity(triangles.len());
        for tri in triangles.chunks_exact(3) {
            let (i0, i1, i2) = (source[tri[0]], source[tri[1]], source[tri[2]]);
            if i0 == i1 || i1 == i2 || i0 == i2 {
                continue;
            }
            let area2 = orient2d(points[i0 as usize], points[i1 as usize], points[i2 as usize]);
            if !area2.is_finite() || 0.5 * area2.abs() <= tol.eps_squared() {
                continue;
            }
            if area2 > 0.0 {
                indices.extend_from_slice(&[i0, i1, i2]);
            } else {
                indices.extend_from_slice(&[i0, i2, i1]);
            }
        }

        if indices.is_empty() {
            return Err(TriangulationError::Degenerate(
                "triangulation produced no triangles".into(),
            ));
        }
        Ok(indices)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pt {
    x: f64,
    y: f64,
}

fn ring_ranges(
    len: usize,
    hole_starts: &[usize],
) -> Result<Vec<(usize, usize)>, TriangulationError> {
    let mut bounds = Vec::with_capacity(hole_starts.len() + 2);
    bounds.push(0);
    for &start in hole_starts {
        let previous = bounds.last().copied().unwrap_or(0);
        if start <= previous || start >= len {
            return Err(TriangulationError::InvalidHoleStart { start, len });
        }
        bounds.push(start);
    }
    bounds.push(len);

    let ranges: Vec<(usize, usize)> = bounds.windows(2).map(|w| (w[0], w[1])).collect();
    let outer_len = ranges.first().map_or(0, |(a, b)| b - a);
    if outer_len < 3 {
        return Err(TriangulationError::NotEnoughVertices { got: outer_len });
    }
    Ok(ranges)
}

fn planar_points(vertices: &[[f64; 3]]) -> Result<Vec<Pt>, TriangulationError> {
    vertices
        .iter()
        .map(|v| {
            if v[0].is_finite() && v[1].is_finite() {
                Ok(Pt { x: v[0], y: v[1] })
            } else {
                Err(TriangulationError::NonFinite)
            }
        })
        .collect()
}

fn extent(points: &[Pt]) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if points.is_empty() {
        0.0
    } else {
        (max_x - min_x).max(max_y - min_y)
    }
}

fn orient2d(a: Pt, b: Pt, c: Pt) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn point_in_ring(p: Pt, ring: &[Pt]) -> bool {
    let mut inside = false;
    let mut j = ring.len().saturating_sub(1);
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ============================================================================
// Delaunay
// ============================================================================

/// Delaunay triangulation of the ring vertices, clipped to the polygon.
///
/// Triangles whose centroid falls outside the outer ring or inside a hole are
/// dropped. Concave outlines whose edges are not Delaunay edges lose area, so
/// this is only a good fit for convex-ish footprints.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DelaunayTriangulator {
    pub tolerance: Tolerance,
}

impl Triangulator for DelaunayTriangulator {
    fn triangulate(
        &self,
        vertices: &[[f64; 3]],
        hole_starts: &[usize],
    ) -> Result<Vec<u32>, TriangulationError> {
        let rings = ring_ranges(vertices.len(), hole_starts)?;
        let points = planar_points(vertices)?;
        let tol = Tolerance::new(self.tolerance.eps * extent(&points).max(1.0));

        let delaunator_points: Vec<delaunator::Point> =
            points.iter().map(|p| delaunator::Point { x: p.x, y: p.y }).collect();
        let triangulation = delaunator::triangulate(&delaunator_points);
        if triangulation.triangles.is_empty() {
            return Err(TriangulationError::Degenerate("all vertices are collinear".into()));
        }

        let ring_points: Vec<&[Pt]> = rings.iter().map(|&(a, b)| &points[a..b]).collect();
        let (outer, holes) = ring_points
            .split_first()
            .ok_or(TriangulationError::NotEnoughVertices { got: 0 })?;

        let mut indices = Vec::with_capacity(triangulation.triangles.len());
        for tri in triangulation.triangles.chunks_exact(3) {
            let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
            let area2 = orient2d(a, b, c);
            if area2.abs() * 0.5 <= tol.eps_squared() {
                continue;
            }

            let centroid = Pt {
                x: (a.x + b.x + c.x) / 3.0,
                y: (a.y + b.y + c.y) / 3.0,
            };
            if !point_in_ring(centroid, outer)
                || holes.iter().any(|hole| point_in_ring(centroid, hole))
            {
                continue;
            }

            if area2 > 0.0 {
                indices.extend_from_slice(&[tri[0] as u32, tri[1] as u32, tri[2] as u32]);
            } else {
                indices.extend_from_slice(&[tri[0] as u32, tri[2] as u32, tri[1] as u32]);
            }
        }

        if indices.is_empty() {
            return Err(TriangulationError::Degenerate(
                "no triangle lies inside the polygon".into(),
            ));
        }
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_ranges_split_outer_and_holes() {
        let ranges = ring_ranges(10, &[4, 7]).unwrap();
        assert_eq!(ranges, vec![(0, 4), (4, 7), (7, 10)]);
    }

    #[test]
    fn ring_ranges_reject_unordered_holes() {
        assert_eq!(
            ring_ranges(10, &[7, 4]),
            Err(TriangulationError::InvalidHoleStart { start: 4, len: 10 })
        );
        assert_eq!(
            ring_ranges(10, &[10]),
            Err(TriangulationError::InvalidHoleStart { start: 10, len: 10 })
        );
    }

    #[test]
    fn point_in_ring_even_odd() {
        let ring = [
            Pt { x: 0.0, y: 0.0 },
            Pt { x: 2.0, y: 0.0 },
            Pt { x: 2.0, y: 2.0 },
            Pt { x: 0.0, y: 2.0 },
        ];
        assert!(point_in_ring(Pt { x: 1.0, y: 1.0 }, &ring));
        assert!(!point_in_ring(Pt { x: 3.0, y: 1.0 }, &ring));
    }
}
