//! Eén volledige generatiepas: anker, projectie en per-feature assemblage.

use std::fmt;

use thiserror::Error;

use super::assembler::assemble_feature;
use super::params::Params;
use super::world::{SkippedFeature, World};
use crate::geom::{
    AnchorError, EarcutTriangulator, GeoHullOps, GeomContext, HullOps, LocalProjector,
    LoopSubdivider, Subdivider, TimingBucket, Triangulator, resolve_anchor,
};
use crate::parse::GeoInput;

/// De verwisselbare geometrische capaciteiten van de pijplijn.
pub struct Toolkit {
    pub hull: Box<dyn HullOps>,
    pub triangulator: Box<dyn Triangulator>,
    pub subdivider: Box<dyn Subdivider>,
}

impl Toolkit {
    #[must_use]
    pub fn with_hull(mut self, hull: impl HullOps + 'static) -> Self {
        self.hull = Box::new(hull);
        self
    }

    #[must_use]
    pub fn with_triangulator(mut self, triangulator: impl Triangulator + 'static) -> Self {
        self.triangulator = Box::new(triangulator);
        self
    }

    #[must_use]
    pub fn with_subdivider(mut self, subdivider: impl Subdivider + 'static) -> Self {
        self.subdivider = Box::new(subdivider);
        self
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self {
            hull: Box::new(GeoHullOps::default()),
            triangulator: Box::new(EarcutTriangulator::default()),
            subdivider: Box::new(LoopSubdivider),
        }
    }
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolkit").finish_non_exhaustive()
    }
}

/// Fatale fout: de pas levert geen wereld op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("kan anker niet bepalen: {0}")]
    Anchor(#[from] AnchorError),
}

/// Bouwt een nieuwe [`World`] uit de invoer en parameters.
///
/// Features die niet te verwerken zijn worden overgeslagen en in
/// [`World::skipped`] vermeld.
///
/// # Errors
/// [`GenerateError::Anchor`] als er geen anker bepaald kan worden.
pub fn generate(
    input: &GeoInput,
    params: &Params,
    toolkit: &Toolkit,
) -> Result<World, GenerateError> {
    let mut ctx = GeomContext::new();
    ctx.metrics.begin();

    let anchor = ctx
        .metrics
        .time(TimingBucket::Anchor, || resolve_anchor(&input.polygons, toolkit.hull.as_ref()))?;
    log::debug!("anker: lon={} lat={}", anchor.lon, anchor.lat);

    let projector = LocalProjector::new(anchor);
    let mut meshes = Vec::with_capacity(input.polygons.len());
    let mut skipped = Vec::new();

    for (index, polygon) in input.polygons.iter().enumerate() {
        match assemble_feature(index, polygon, &projector, params, toolkit, &mut ctx) {
            Ok(refined) => meshes.push(refined),
            Err(err) => {
                log::warn!("feature {index} overgeslagen: {err}");
                skipped.push(SkippedFeature {
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }

    let mut world = ctx
        .metrics
        .time(TimingBucket::Assembly, || World::new(anchor, meshes, skipped));
    world.timing = ctx.metrics.end();

    log::debug!(
        "wereld: {} meshes, {} overgeslagen, {}",
        world.meshes.len(),
        world.skipped.len(),
        world.diagnostics.summary()
    );

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{DelaunayTriangulator, GeoPolygon, LonLat};

    fn square(x: f64, y: f64, size: f64) -> GeoPolygon {
        GeoPolygon::new(vec![vec![
            LonLat::new(x, y),
            LonLat::new(x + size, y),
            LonLat::new(x + size, y + size),
            LonLat::new(x, y + size),
        ]])
    }

    #[test]
    fn degenerate_feature_is_skipped() {
        let input = GeoInput::from_polygons(vec![
            square(4.0, 52.0, 0.001),
            GeoPolygon::new(vec![vec![
                LonLat::new(4.0, 52.0),
                LonLat::new(4.0005, 52.0),
                LonLat::new(4.001, 52.0),
            ]]),
        ]);
        let world = generate(&input, &Params::default(), &Toolkit::default()).unwrap();
        assert_eq!(world.meshes.len(), 1);
        assert_eq!(world.skipped.len(), 1);
        assert_eq!(world.skipped[0].index, 1);
        assert_eq!(world.meshes[0].source, 0);
    }

    #[test]
    fn empty_input_has_no_anchor() {
        let err =
            generate(&GeoInput::default(), &Params::default(), &Toolkit::default()).unwrap_err();
        assert!(matches!(err, GenerateError::Anchor(AnchorError::NotEnoughPoints { found: 0 })));
    }

    #[test]
    fn delaunay_toolkit_builds_the_same_square() {
        let input = GeoInput::from_polygons(vec![square(4.0, 52.0, 0.001)]);
        let params = Params {
            iterations: 0,
            split: false,
            ..Params::default()
        };
        let toolkit = Toolkit::default().with_triangulator(DelaunayTriangulator::default());
        let world = generate(&input, &params, &toolkit).unwrap();
        assert_eq!(world.triangle_count(), 2);
    }

    #[test]
    fn generation_is_deterministic() {
        let input =
            GeoInput::from_polygons(vec![square(4.0, 52.0, 0.001), square(4.002, 52.0, 0.0005)]);
        let a = generate(&input, &Params::default(), &Toolkit::default()).unwrap();
        let b = generate(&input, &Params::default(), &Toolkit::default()).unwrap();
        assert_eq!(a.meshes, b.meshes);
        assert_eq!(a.translation, b.translation);
    }
}
