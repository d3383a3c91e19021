//! Het resultaat van één generatiepas.

use serde::Serialize;

use super::assembler::RefinedMesh;
use crate::geom::{AnchorPoint, BBox, GeomMeshDiagnostics, GeomTimingReport, Vec3};

/// Een feature die tijdens de pas overgeslagen werd.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFeature {
    /// Index van de polygoon in de invoer.
    pub index: usize,
    pub reason: String,
}

/// Alle meshes van één generatiepas, met één gezamenlijke translatie die het
/// midden van de omhullende doos in de oorsprong legt.
///
/// Een `World` wordt nooit gewijzigd; een nieuwe pas bouwt een nieuwe.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub meshes: Vec<RefinedMesh>,
    pub translation: Vec3,
    pub anchor: AnchorPoint,
    pub skipped: Vec<SkippedFeature>,
    /// Samengevoegde diagnostiek van alle meshes.
    pub diagnostics: GeomMeshDiagnostics,
    pub timing: Option<GeomTimingReport>,
}

impl World {
    #[must_use]
    pub fn new(
        anchor: AnchorPoint,
        meshes: Vec<RefinedMesh>,
        skipped: Vec<SkippedFeature>,
    ) -> Self {
        let translation = local_bounding_box(&meshes).map_or(Vec3::ZERO, |bbox| {
            let center = bbox.center();
            Vec3::new(-center.x, -center.y, -center.z)
        });

        let mut diagnostics = GeomMeshDiagnostics::new();
        for refined in &meshes {
            diagnostics.merge(&refined.diagnostics);
        }

        Self {
            meshes,
            translation,
            anchor,
            skipped,
            diagnostics,
            timing: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.vertex_count()).sum()
    }

    /// Omhullende doos in wereldcoördinaten (na translatie).
    #[must_use]
    pub fn bounding_box(&self) -> Option<BBox> {
        local_bounding_box(&self.meshes).map(|bbox| bbox.translated(self.translation))
    }

    /// Posities van mesh `index` in wereldcoördinaten.
    #[must_use]
    pub fn world_positions(&self, index: usize) -> Option<Vec<[f64; 3]>> {
        self.meshes
            .get(index)
            .map(|refined| refined.mesh.translated_positions(self.translation))
    }
}

fn local_bounding_box(meshes: &[RefinedMesh]) -> Option<BBox> {
    meshes
        .iter()
        .filter_map(|refined| refined.mesh.bbox())
        .reduce(BBox::union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GeomMesh;
    use crate::pipeline::params::MeshMaterial;

    fn refined(source: usize, positions: Vec<[f64; 3]>) -> RefinedMesh {
        RefinedMesh {
            source,
            mesh: GeomMesh::new(positions, vec![0, 1, 2]),
            material: MeshMaterial::default(),
            diagnostics: GeomMeshDiagnostics {
                vertex_count: 3,
                triangle_count: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn world_is_centered() {
        let world = World::new(
            AnchorPoint::new(5.0, 52.0),
            vec![
                refined(0, vec![[10.0, 10.0, 0.0], [20.0, 10.0, 0.0], [20.0, 20.0, 0.0]]),
                refined(1, vec![[-30.0, 0.0, 0.0], [-20.0, 0.0, 0.0], [-20.0, 4.0, 0.0]]),
            ],
            Vec::new(),
        );

        assert_eq!(world.translation, Vec3::new(5.0, -10.0, 0.0));
        let center = world.bounding_box().unwrap().center();
        assert!(center.x.abs() < 1e-12 && center.y.abs() < 1e-12 && center.z.abs() < 1e-12);
        assert_eq!(world.triangle_count(), 2);
        assert_eq!(world.diagnostics.vertex_count, 6);
        assert_eq!(world.world_positions(1).unwrap()[0], [-25.0, -10.0, 0.0]);
    }

    #[test]
    fn empty_world_has_no_translation() {
        let world = World::new(AnchorPoint::default(), Vec::new(), Vec::new());
        assert!(world.is_empty());
        assert_eq!(world.translation, Vec3::ZERO);
        assert!(world.bounding_box().is_none());
    }
}
