//! Export van de wereld als JSON-document met BufferGeometry-achtige objecten.

use serde::Serialize;

use super::world::World;

/// Standaard generator-aanduiding in geëxporteerde documenten.
pub const GENERATOR: &str = concat!("geomesh-engine ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub generator: String,
    pub geometries: Vec<ExportGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub data: ExportData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportData {
    pub attributes: ExportAttributes,
    pub index: IndexAttribute,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportAttributes {
    pub position: FloatAttribute,
    pub normal: FloatAttribute,
    pub uv: FloatAttribute,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatAttribute {
    pub item_size: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub array: Vec<f32>,
    pub normalized: bool,
}

impl FloatAttribute {
    #[allow(clippy::cast_possible_truncation)]
    fn new(item_size: usize, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            item_size,
            kind: "Float32Array",
            array: values.into_iter().map(|v| v as f32).collect(),
            normalized: false,
        }
    }

    /// Aantal elementen (array-lengte gedeeld door `item_size`).
    #[must_use]
    pub fn count(&self) -> usize {
        self.array.len() / self.item_size.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexAttribute {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub array: Vec<u32>,
}

impl ExportDocument {
    /// # Errors
    /// Geeft de `serde_json`-fout als tekst terug.
    pub fn to_json_string(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|err| err.to_string())
    }

    /// # Errors
    /// Geeft de `serde_json`-fout als tekst terug.
    pub fn to_json_string_pretty(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|err| err.to_string())
    }
}

/// Exporteert alle meshes in wereldcoördinaten. Een lege wereld levert `None`.
#[must_use]
pub fn export_world(world: &World) -> Option<ExportDocument> {
    export_world_with_generator(world, GENERATOR)
}

#[must_use]
pub fn export_world_with_generator(world: &World, generator: &str) -> Option<ExportDocument> {
    if world.is_empty() {
        return None;
    }

    let geometries = world
        .meshes
        .iter()
        .map(|refined| {
            let mesh = &refined.mesh;
            let positions = mesh.translated_positions(world.translation);
            let normals = mesh.normals.as_deref().unwrap_or_default();
            let uvs = mesh.uvs.as_deref().unwrap_or_default();

            ExportGeometry {
                kind: "BufferGeometry",
                name: format!("feature-{}", refined.source),
                data: ExportData {
                    attributes: ExportAttributes {
                        position: FloatAttribute::new(3, positions.into_iter().flatten()),
                        normal: FloatAttribute::new(3, normals.iter().flatten().copied()),
                        uv: FloatAttribute::new(2, uvs.iter().flatten().copied()),
                    },
                    index: IndexAttribute {
                        kind: "Uint32Array",
                        array: mesh.indices.clone(),
                    },
                },
            }
        })
        .collect();

    log::debug!("export: {} geometrieën", world.meshes.len());

    Some(ExportDocument {
        generator: generator.to_owned(),
        geometries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{AnchorPoint, GeomMesh, GeomMeshDiagnostics};
    use crate::pipeline::assembler::RefinedMesh;
    use crate::pipeline::params::MeshMaterial;

    fn triangle_world() -> World {
        let mesh = GeomMesh::with_attributes(
            vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
            vec![0, 1, 2],
            Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
            Some(vec![[0.0, 0.0, 1.0]; 3]),
        );
        World::new(
            AnchorPoint::default(),
            vec![RefinedMesh {
                source: 3,
                mesh,
                material: MeshMaterial::default(),
                diagnostics: GeomMeshDiagnostics::default(),
            }],
            Vec::new(),
        )
    }

    #[test]
    fn empty_world_exports_nothing() {
        let world = World::new(AnchorPoint::default(), Vec::new(), Vec::new());
        assert!(export_world(&world).is_none());
    }

    #[test]
    fn positions_are_exported_in_world_space() {
        let doc = export_world(&triangle_world()).unwrap();
        assert_eq!(doc.generator, GENERATOR);
        assert_eq!(doc.geometries.len(), 1);

        let geometry = &doc.geometries[0];
        assert_eq!(geometry.name, "feature-3");
        assert_eq!(geometry.data.attributes.position.array[..3], [-1.0, -1.0, 0.0]);
        assert_eq!(geometry.data.attributes.position.count(), 3);
        assert_eq!(geometry.data.attributes.normal.count(), 3);
        assert_eq!(geometry.data.attributes.uv.count(), 3);
        assert_eq!(geometry.data.index.array, vec![0, 1, 2]);
    }

    #[test]
    fn json_uses_buffer_geometry_layout() {
        let doc = export_world_with_generator(&triangle_world(), "test").unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&doc.to_json_string().unwrap()).unwrap();

        assert_eq!(value["generator"], "test");
        let geometry = &value["geometries"][0];
        assert_eq!(geometry["type"], "BufferGeometry");
        let position = &geometry["data"]["attributes"]["position"];
        assert_eq!(position["itemSize"], 3);
        assert_eq!(position["type"], "Float32Array");
        assert_eq!(position["normalized"], false);
        assert_eq!(geometry["data"]["attributes"]["uv"]["itemSize"], 2);
        assert_eq!(geometry["data"]["index"]["type"], "Uint32Array");
    }
}
