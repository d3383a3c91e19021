mod anchor;
mod core;
mod diagnostics;
mod metrics;
mod mesh;
mod projection;
mod subdivision;
mod triangulation;

pub use anchor::{
    AnchorError, DEFAULT_CONCAVITY, GeoHullOps, HullOps, collect_points, resolve_anchor,
};
pub use core::{BBox, Point3, Tolerance, Vec3};
pub use diagnostics::GeomMeshDiagnostics;
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use mesh::{
    GeomContext, GeomMesh, compute_bbox_uvs, compute_smooth_normals, count_edge_topology,
    orient_triangles_up,
};
pub use projection::{
    AnchorPoint, EARTH_SCALE, GeoPolygon, LocalProjector, LonLat, mercator_stretch,
    project_lon_lat,
};
pub use subdivision::{LoopSubdivider, SubdDiagnostics, SubdError, SubdOptions, Subdivider};
pub use triangulation::{DelaunayTriangulator, EarcutTriangulator, TriangulationError, Triangulator};

#[cfg(test)]
mod tests;
