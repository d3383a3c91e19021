//! Bouwt één polygoon om tot een verfijnde, texturable mesh.

use thiserror::Error;

use super::orchestrator::Toolkit;
use super::params::{MeshMaterial, Params};
use crate::geom::{
    GeoPolygon, GeomContext, GeomMesh, GeomMeshDiagnostics, LocalProjector, SubdError, TimingBucket,
    TriangulationError, compute_bbox_uvs, compute_smooth_normals, count_edge_topology,
    orient_triangles_up,
};

/// Herstelbare fout voor één feature; de feature wordt overgeslagen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("gedegenereerde geometrie: {0}")]
    Degenerate(String),
    #[error("triangulatie mislukt: {0}")]
    Triangulation(TriangulationError),
    #[error("subdivisie mislukt: {0}")]
    Subdivision(#[from] SubdError),
}

impl From<TriangulationError> for FeatureError {
    fn from(err: TriangulationError) -> Self {
        match err {
            TriangulationError::NotEnoughVertices { .. }
            | TriangulationError::NonFinite
            | TriangulationError::Degenerate(_) => Self::Degenerate(err.to_string()),
            other => Self::Triangulation(other),
        }
    }
}

/// Een mesh klaar voor de wereld, met materiaal en diagnostiek.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedMesh {
    /// Index van de polygoon in de invoer.
    pub source: usize,
    /// Posities in lokale meters rond het anker; normalen en UV's zijn gevuld.
    pub mesh: GeomMesh,
    pub material: MeshMaterial,
    pub diagnostics: GeomMeshDiagnostics,
}

/// Projecteert, trianguleert, verfijnt en voorziet één polygoon van normalen
/// en UV's.
///
/// # Errors
/// [`FeatureError`] voor gedegenereerde ringen en falende triangulatie of
/// subdivisie; de aanroeper slaat de feature dan over.
pub fn assemble_feature(
    source: usize,
    polygon: &GeoPolygon,
    projector: &LocalProjector,
    params: &Params,
    toolkit: &Toolkit,
    ctx: &mut GeomContext,
) -> Result<RefinedMesh, FeatureError> {
    let mut diagnostics = GeomMeshDiagnostics::new();

    let outer = polygon
        .outer()
        .filter(|ring| ring.len() >= 3)
        .ok_or_else(|| {
            FeatureError::Degenerate("buitenring heeft minder dan 3 punten".to_owned())
        })?;

    let (vertices, hole_starts) = ctx.metrics.time(TimingBucket::Projection, || {
        let mut vertices = Vec::with_capacity(polygon.vertex_count());
        let mut hole_starts = Vec::new();
        projector.project_ring_into(outer, &mut vertices);
        for hole in polygon.holes() {
            if hole.len() < 3 {
                continue;
            }
            hole_starts.push(vertices.len());
            projector.project_ring_into(hole, &mut vertices);
        }
        (vertices, hole_starts)
    });

    let skipped_holes = polygon.holes().filter(|hole| hole.len() < 3).count();
    if skipped_holes > 0 {
        diagnostics.add_warning(format!(
            "{skipped_holes} gat(en) met minder dan 3 punten genegeerd"
        ));
    }

    let mut indices = ctx.metrics.time(TimingBucket::Triangulation, || {
        toolkit.triangulator.triangulate(&vertices, &hole_starts)
    })?;
    diagnostics.raw_triangle_count = indices.len() / 3;
    diagnostics.flipped_triangle_count = orient_triangles_up(&vertices, &mut indices);

    let raw = GeomMesh::new(vertices, indices);
    let options = params.subd_options();
    let (mut mesh, subd) = ctx
        .metrics
        .time(TimingBucket::Subdivision, || toolkit.subdivider.subdivide(&raw, &options))?;

    diagnostics.split_edge_count = subd.split_edges;
    diagnostics.subdivision_iterations = subd.iterations_run;
    diagnostics.subdivision_capped = subd.capped;
    if subd.capped {
        diagnostics.add_warning(format!(
            "subdivisie begrensd op {} van {} iteraties ({} -> {} driehoeken)",
            subd.iterations_run, options.iterations, subd.input_triangles, subd.output_triangles
        ));
    }

    let normals = ctx
        .metrics
        .time(TimingBucket::Normals, || compute_smooth_normals(&mesh.positions, &mesh.indices));
    let tolerance = ctx.tolerance;
    let (uvs, degenerate_axes) = ctx
        .metrics
        .time(TimingBucket::Uv, || compute_bbox_uvs(&mesh.positions, tolerance));
    mesh.normals = Some(normals);
    mesh.uvs = Some(uvs);

    let (open_edges, non_manifold_edges) = count_edge_topology(&mesh.indices);
    diagnostics.vertex_count = mesh.vertex_count();
    diagnostics.triangle_count = mesh.triangle_count();
    diagnostics.open_edge_count = open_edges;
    diagnostics.non_manifold_edge_count = non_manifold_edges;
    diagnostics.degenerate_uv_axes = degenerate_axes;

    log::debug!("feature {source}: {}", diagnostics.summary());

    Ok(RefinedMesh {
        source,
        mesh,
        material: params.material(),
        diagnostics,
    })
}
