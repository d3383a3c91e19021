//! Anchor resolution: the single geographic origin of a generation pass.
//!
//! Every ring position of every polygon goes into one point set; the anchor is
//! the center of mass of that set's concave hull. Hull and centroid math is
//! delegated to a [`HullOps`] implementation.

use geo::{Centroid, ConcaveHull, Coord, LineString, MultiPoint, Point, Polygon};

use super::projection::{AnchorPoint, GeoPolygon, LonLat};

/// Default concavity for [`GeoHullOps`]; larger values approach the convex hull.
pub const DEFAULT_CONCAVITY: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnchorError {
    #[error("cannot resolve anchor: need at least 3 distinct points, found {found}")]
    NotEnoughPoints { found: usize },
    #[error("cannot resolve anchor: all points are collinear")]
    Collinear,
    #[error("cannot resolve anchor: input contains non-finite coordinates")]
    NonFinite,
    #[error("cannot resolve anchor: concave hull computation failed")]
    HullFailed,
    #[error("cannot resolve anchor: hull has no center of mass")]
    NoCenterOfMass,
}

/// Hull and centroid capability used by [`resolve_anchor`].
pub trait HullOps {
    /// Concave hull of `points` as an open ring, `None` if it cannot be built.
    fn concave_hull(&self, points: &[LonLat]) -> Option<Vec<LonLat>>;

    /// Area-weighted center of mass of a closed or open ring.
    fn center_of_mass(&self, hull: &[LonLat]) -> Option<LonLat>;
}

/// [`HullOps`] backed by the `geo` crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoHullOps {
    pub concavity: f64,
}

impl Default for GeoHullOps {
    fn default() -> Self {
        Self {
            concavity: DEFAULT_CONCAVITY,
        }
    }
}

impl HullOps for GeoHullOps {
    fn concave_hull(&self, points: &[LonLat]) -> Option<Vec<LonLat>> {
        let multi: MultiPoint<f64> = points.iter().map(|p| Point::new(p.lon, p.lat)).collect();
        let hull = multi.concave_hull(self.concavity);

        let mut ring: Vec<LonLat> = hull
            .exterior()
            .coords()
            .map(|c| LonLat::new(c.x, c.y))
            .collect();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        (ring.len() >= 3).then_some(ring)
    }

    fn center_of_mass(&self, hull: &[LonLat]) -> Option<LonLat> {
        let coords: Vec<Coord<f64>> = hull.iter().map(|p| Coord { x: p.lon, y: p.lat }).collect();
        let polygon = Polygon::new(LineString::from(coords), Vec::new());
        polygon
            .centroid()
            .map(|c| LonLat::new(c.x(), c.y()))
            .filter(|c| c.is_finite())
    }
}

/// Collect every ring position of every polygon, outer rings first.
#[must_use]
pub fn collect_points(polygons: &[GeoPolygon]) -> Vec<LonLat> {
    polygons.iter().flat_map(GeoPolygon::positions).collect()
}

/// Resolve the anchor for a whole input.
///
/// # Errors
/// Fails when the point set has fewer than 3 distinct points, is collinear,
/// contains non-finite values, or the hull capability cannot produce a hull or
/// its center of mass.
pub fn resolve_anchor(
    polygons: &[GeoPolygon],
    hull_ops: &dyn HullOps,
) -> Result<AnchorPoint, AnchorError> {
    let points = collect_points(polygons);
    if points.iter().any(|p| !p.is_finite()) {
        return Err(AnchorError::NonFinite);
    }

    let distinct = distinct_points(&points);
    if distinct.len() < 3 {
        return Err(AnchorError::NotEnoughPoints {
            found: distinct.len(),
        });
    }
    if all_collinear(&distinct) {
        return Err(AnchorError::Collinear);
    }

    let hull = hull_ops.concave_hull(&points).ok_or(AnchorError::HullFailed)?;
    let center = hull_ops.center_of_mass(&hull).ok_or(AnchorError::NoCenterOfMass)?;

    log::debug!(
        "anchor resolved at ({:.7}, {:.7}) from {} points, hull of {}",
        center.lon,
        center.lat,
        points.len(),
        hull.len()
    );

    Ok(AnchorPoint::from(center))
}

fn distinct_points(points: &[LonLat]) -> Vec<LonLat> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.lon.total_cmp(&b.lon).then_with(|| a.lat.total_cmp(&b.lat)));
    sorted.dedup();
    sorted
}

fn all_collinear(points: &[LonLat]) -> bool {
    let Some((&first, rest)) = points.split_first() else {
        return true;
    };

    let span2 = points
        .iter()
        .map(|p| (p.lon - first.lon).powi(2) + (p.lat - first.lat).powi(2))
        .fold(0.0_f64, f64::max);
    let eps = f64::EPSILON * span2.max(f64::MIN_POSITIVE);

    let Some(&second) = rest.iter().find(|p| **p != first) else {
        return true;
    };

    rest.iter().all(|p| {
        let cross = (second.lon - first.lon) * (p.lat - first.lat)
            - (second.lat - first.lat) * (p.lon - first.lon);
        cross.abs() <= eps
    })
}
