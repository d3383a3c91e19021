//! Local tangent-plane flattening of geographic coordinates.
//!
//! Coordinates are mapped to meters relative to a single [`AnchorPoint`]:
//! longitude is scaled linearly (no `cos(lat)` correction) and latitude goes
//! through the Web-Mercator vertical stretch, both taken relative to the anchor
//! instead of the equator. The result is only meaningful close to the anchor,
//! and the stretch is singular at the poles.

use serde::{Deserialize, Serialize};

/// Earth-radius-like scale in meters (WGS84 semi-major axis).
pub const EARTH_SCALE: f64 = 6_378_137.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A polygon footprint: outer ring first, holes after it.
///
/// Rings are stored open; a closing position equal to the first one is
/// dropped by the parser.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPolygon {
    pub rings: Vec<Vec<LonLat>>,
}

impl GeoPolygon {
    #[must_use]
    pub fn new(rings: Vec<Vec<LonLat>>) -> Self {
        Self { rings }
    }

    #[must_use]
    pub fn outer(&self) -> Option<&[LonLat]> {
        self.rings.first().map(Vec::as_slice)
    }

    pub fn holes(&self) -> impl Iterator<Item = &[LonLat]> {
        self.rings.iter().skip(1).map(Vec::as_slice)
    }

    /// Total number of positions across all rings.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    /// Every position of every ring, outer ring first.
    pub fn positions(&self) -> impl Iterator<Item = LonLat> + '_ {
        self.rings.iter().flat_map(|ring| ring.iter().copied())
    }
}

/// The projection origin shared by every feature of one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub lon: f64,
    pub lat: f64,
}

impl AnchorPoint {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<LonLat> for AnchorPoint {
    fn from(p: LonLat) -> Self {
        Self::new(p.lon, p.lat)
    }
}

impl From<AnchorPoint> for LonLat {
    fn from(a: AnchorPoint) -> Self {
        Self::new(a.lon, a.lat)
    }
}

/// `ln(tan(π/4 + φ/2))` for a latitude in degrees.
#[must_use]
pub fn mercator_stretch(lat_deg: f64) -> f64 {
    (std::f64::consts::FRAC_PI_4 + lat_deg.to_radians() / 2.0).tan().ln()
}

/// Projector with the anchor offsets precomputed for one generation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjector {
    anchor: AnchorPoint,
    scale: f64,
    origin_x: f64,
    origin_y: f64,
}

impl LocalProjector {
    #[must_use]
    pub fn new(anchor: AnchorPoint) -> Self {
        Self::with_scale(anchor, EARTH_SCALE)
    }

    #[must_use]
    pub fn with_scale(anchor: AnchorPoint, scale: f64) -> Self {
        Self {
            anchor,
            scale,
            origin_x: scale * (anchor.lon % 360.0).to_radians(),
            origin_y: scale * mercator_stretch(anchor.lat % 360.0),
        }
    }

    #[must_use]
    pub fn anchor(&self) -> AnchorPoint {
        self.anchor
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Map a geographic coordinate to local meters; `z` is always 0.
    #[must_use]
    pub fn project(&self, lon: f64, lat: f64) -> [f64; 3] {
        let x = self.scale * lon.to_radians() - self.origin_x;
        let y = self.scale * mercator_stretch(lat) - self.origin_y;
        [x, y, 0.0]
    }

    #[must_use]
    pub fn project_point(&self, p: LonLat) -> [f64; 3] {
        self.project(p.lon, p.lat)
    }

    /// Appends the projection of every ring position to `out`, preserving order.
    pub fn project_ring_into(&self, ring: &[LonLat], out: &mut Vec<[f64; 3]>) {
        out.extend(ring.iter().map(|p| self.project_point(*p)));
    }
}

/// One-shot projection of `(lon, lat)` relative to `anchor`.
#[must_use]
pub fn project_lon_lat(anchor: AnchorPoint, lon: f64, lat: f64) -> [f64; 3] {
    LocalProjector::new(anchor).project(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mercator_stretch_is_zero_at_equator() {
        assert!(mercator_stretch(0.0).abs() < 1e-15);
        assert!(mercator_stretch(45.0) > 0.0);
        assert!(mercator_stretch(-45.0) < 0.0);
    }

    #[test]
    fn one_degree_of_longitude_matches_scale() {
        let p = project_lon_lat(AnchorPoint::new(0.0, 0.0), 1.0, 0.0);
        let expected = EARTH_SCALE * 1.0_f64.to_radians();
        assert!((p[0] - expected).abs() < 1e-6);
        assert!(p[1].abs() < 1e-9);
        assert_eq!(p[2], 0.0);
    }

    #[test]
    fn anchor_longitude_is_wrapped() {
        let wrapped = LocalProjector::new(AnchorPoint::new(370.0, 0.0));
        let plain = LocalProjector::new(AnchorPoint::new(10.0, 0.0));
        let a = wrapped.project(12.0, 0.0);
        let b = plain.project(12.0, 0.0);
        assert!((a[0] - b[0]).abs() < 1e-6);
    }

    #[test]
    fn ring_projection_preserves_order() {
        let projector = LocalProjector::new(AnchorPoint::new(5.0, 52.0));
        let ring = [LonLat::new(5.0, 52.0), LonLat::new(5.1, 52.0), LonLat::new(5.1, 52.1)];
        let mut out = Vec::new();
        projector.project_ring_into(&ring, &mut out);
        assert_eq!(out.len(), 3);
        assert!(out[0][0].abs() < 1e-6 && out[0][1].abs() < 1e-6);
        assert!(out[1][0] > out[0][0]);
        assert!(out[2][1] > out[1][1]);
    }
}
