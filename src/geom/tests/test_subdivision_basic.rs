use crate::geom::{BBox, GeomMesh, LoopSubdivider, SubdError, SubdOptions, Subdivider};

fn square_mesh() -> GeomMesh {
    GeomMesh::new(
        vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]],
        vec![0, 1, 2, 0, 2, 3],
    )
}

fn bbox(mesh: &GeomMesh) -> BBox {
    mesh.bbox().unwrap()
}

#[test]
fn two_iterations_increase_vertex_count() {
    let options = SubdOptions {
        iterations: 2,
        split: true,
        ..Default::default()
    };
    let (mesh, diag) = LoopSubdivider.subdivide(&square_mesh(), &options).unwrap();
    assert!(mesh.vertex_count() > 4);
    assert_eq!(diag.iterations_run, 2);
    assert_eq!(diag.split_edges, 1);
    // split: 2 -> 4 triangles, then two 1->4 passes.
    assert_eq!(mesh.triangle_count(), 64);
    assert!(mesh.validate().is_ok());
}

#[test]
fn flat_mode_keeps_plane_and_bbox() {
    let options = SubdOptions {
        iterations: 3,
        flat: true,
        ..Default::default()
    };
    let input = square_mesh();
    let (mesh, _) = LoopSubdivider.subdivide(&input, &options).unwrap();

    assert!(mesh.positions.iter().all(|p| p[2] == 0.0));
    assert_eq!(bbox(&mesh), bbox(&input));
    for (a, b) in input.positions.iter().zip(&mesh.positions) {
        assert_eq!(a, b);
    }
}

#[test]
fn preserve_edges_keeps_footprint_bbox() {
    let options = SubdOptions {
        iterations: 2,
        smooth: true,
        preserve_edges: true,
        ..Default::default()
    };
    let input = square_mesh();
    let (mesh, _) = LoopSubdivider.subdivide(&input, &options).unwrap();
    assert_eq!(bbox(&mesh), bbox(&input));
}

#[test]
fn boundary_smoothing_pulls_corners_in() {
    let options = SubdOptions {
        iterations: 1,
        split: false,
        ..Default::default()
    };
    let (mesh, _) = LoopSubdivider.subdivide(&square_mesh(), &options).unwrap();
    // 3/4 * (0,0) + 1/8 * (10,0) + 1/8 * (0,10)
    assert_eq!(mesh.positions[0], [1.25, 1.25, 0.0]);
}

#[test]
fn interior_vertices_stay_without_smooth() {
    // Fan around a center vertex: the center is interior.
    let positions = vec![
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, -1.0, 0.0],
    ];
    let indices = vec![0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1];
    let mesh = GeomMesh::new(positions, indices);

    let fixed = SubdOptions {
        iterations: 1,
        split: false,
        smooth: false,
        ..Default::default()
    };
    let (out, _) = LoopSubdivider.subdivide(&mesh, &fixed).unwrap();
    assert_eq!(out.positions[0], [0.0, 0.0, 1.0]);

    let smooth = SubdOptions { smooth: true, ..fixed };
    let (out, _) = LoopSubdivider.subdivide(&mesh, &smooth).unwrap();
    // n = 4, beta = 3/32: (1 - 4 * 3/32) * 1.0
    assert!((out.positions[0][2] - 0.625).abs() < 1e-12);
}

#[test]
fn cap_is_never_exceeded() {
    for max in [1, 2, 7, 8, 100, 1_000, 5_000] {
        let options = SubdOptions {
            iterations: 7,
            max_triangles: Some(max),
            ..Default::default()
        };
        let (mesh, diag) = LoopSubdivider.subdivide(&square_mesh(), &options).unwrap();
        if diag.iterations_run > 0 || diag.split_edges > 0 {
            assert!(mesh.triangle_count() <= max, "max {max}: {}", mesh.triangle_count());
        }
    }
}

#[test]
fn unbounded_runs_every_iteration() {
    let options = SubdOptions {
        iterations: 4,
        split: false,
        max_triangles: None,
        ..Default::default()
    };
    let (mesh, diag) = LoopSubdivider.subdivide(&square_mesh(), &options).unwrap();
    assert_eq!(diag.iterations_run, 4);
    assert!(!diag.capped);
    assert_eq!(mesh.triangle_count(), 2 * 4usize.pow(4));
}

#[test]
fn output_is_deterministic() {
    let options = SubdOptions {
        iterations: 3,
        smooth: true,
        ..Default::default()
    };
    let a = LoopSubdivider.subdivide(&square_mesh(), &options).unwrap();
    let b = LoopSubdivider.subdivide(&square_mesh(), &options).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_indices_are_rejected() {
    let mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0]], vec![0, 1, 2]);
    let err = LoopSubdivider.subdivide(&mesh, &SubdOptions::default()).unwrap_err();
    assert!(matches!(err, SubdError::InvalidTopology(_)));
}
