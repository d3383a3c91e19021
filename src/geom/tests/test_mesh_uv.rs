use crate::geom::{Tolerance, compute_bbox_uvs, compute_smooth_normals, orient_triangles_up};

#[test]
fn uvs_span_the_unit_square() {
    let positions = vec![[-5.0, 2.0, 0.0], [15.0, 2.0, 0.0], [15.0, 12.0, 0.0], [5.0, 7.0, 0.0]];
    let (uvs, degenerate) = compute_bbox_uvs(&positions, Tolerance::default());

    assert_eq!(degenerate, 0);
    assert_eq!(uvs[0], [0.0, 0.0]);
    assert_eq!(uvs[2], [1.0, 1.0]);
    assert_eq!(uvs[3], [0.5, 0.5]);
    assert!(uvs.iter().flatten().all(|c| (0.0..=1.0).contains(c)));
}

#[test]
fn degenerate_axis_maps_to_zero() {
    let line = vec![[0.0, 3.0, 0.0], [4.0, 3.0, 0.0], [8.0, 3.0, 0.0]];
    let (uvs, degenerate) = compute_bbox_uvs(&line, Tolerance::default());
    assert_eq!(degenerate, 1);
    assert_eq!(uvs, vec![[0.0, 0.0], [0.5, 0.0], [1.0, 0.0]]);

    let point = vec![[1.0, 1.0, 0.0]; 3];
    let (uvs, degenerate) = compute_bbox_uvs(&point, Tolerance::default());
    assert_eq!(degenerate, 2);
    assert!(uvs.iter().flatten().all(|c| *c == 0.0));
}

#[test]
fn empty_positions_give_no_uvs() {
    let (uvs, degenerate) = compute_bbox_uvs(&[], Tolerance::default());
    assert!(uvs.is_empty());
    assert_eq!(degenerate, 0);
}

#[test]
fn oriented_flat_mesh_has_up_normals() {
    let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
    // Both triangles wound clockwise.
    let mut indices = vec![0, 2, 1, 0, 3, 2];
    assert_eq!(orient_triangles_up(&positions, &mut indices), 2);

    let normals = compute_smooth_normals(&positions, &indices);
    for n in normals {
        assert!((n[2] - 1.0).abs() < 1e-12, "{n:?}");
    }
}
