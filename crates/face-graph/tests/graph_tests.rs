use std::path::Path;

use approx::assert_relative_eq;
use face_graph::*;
use geom_sampler::{GeometrySampler, MockSampler, MockSolid};
use ndarray::{s, ArrayView1};

fn build(solid: MockSolid, config: SamplingConfig) -> FaceGraph {
    let sampler = MockSampler::new().with_solid("part.step", solid);
    let handle = sampler.load_solid(Path::new("part.step")).unwrap();
    build_graph(&sampler, &handle, &config).unwrap()
}

#[test]
fn curveless_edges_are_dropped_from_features_only() {
    let solid = MockSolid::box_solid(1.0, 1.0, 1.0)
        .without_curve(0)
        .without_curve(7);
    let graph = build(solid, SamplingConfig::uniform(3));

    assert_eq!(graph.num_edges(), 12);
    assert_eq!(graph.num_edge_features(), 10);
    assert!(!graph.has_complete_edge_features());
    assert!(graph.validate().is_ok());
}

#[test]
fn face_features_carry_points_normals_and_mask() {
    let graph = build(MockSolid::box_solid(2.0, 3.0, 4.0), SamplingConfig::uniform(5));

    // Face 1 is the top of the box at z = 4 with normal +z.
    for iu in 0..5 {
        for iv in 0..5 {
            let cell: ArrayView1<f32> = graph.node_features.slice(s![1, iu, iv, ..]);
            assert_relative_eq!(cell[2], 4.0);
            assert_relative_eq!(cell[5], 1.0);
            assert_relative_eq!(cell[6], 1.0);
        }
    }
}

#[test]
fn trimmed_caps_mask_out_corner_samples() {
    let graph = build(MockSolid::prism(6, 1.0, 1.0), SamplingConfig::uniform(5));

    // Bottom cap: the grid corner lies outside the hexagon.
    assert_relative_eq!(graph.node_features[[0, 0, 0, 6]], 0.0);
    // Grid centre is inside.
    assert_relative_eq!(graph.node_features[[0, 2, 2, 6]], 1.0);
    // Side faces are untrimmed.
    assert_relative_eq!(graph.node_features[[2, 0, 0, 6]], 1.0);
}

#[test]
fn edge_features_follow_the_curve() {
    let graph = build(MockSolid::box_solid(1.0, 1.0, 1.0), SamplingConfig::uniform(4));

    // Edge 0 runs from (0,0,0) to (1,0,0).
    let first: ArrayView1<f32> = graph.edge_features.slice(s![0, 0, ..]);
    let last: ArrayView1<f32> = graph.edge_features.slice(s![0, 3, ..]);
    assert_relative_eq!(first[0], 0.0);
    assert_relative_eq!(last[0], 1.0);
    assert_relative_eq!(first[3], 1.0);
    assert_relative_eq!(first[4], 0.0);
}

#[test]
fn blob_file_round_trip_preserves_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.bin");
    let graph = build(
        MockSolid::prism(5, 2.0, 1.0).without_curve(3),
        SamplingConfig::default(),
    );

    write_graph_file(&path, &graph).unwrap();
    let loaded = read_graph_file(&path).unwrap();

    assert_eq!(loaded, graph);
    assert_eq!(loaded.num_edge_features(), graph.num_edges() - 1);
}

#[test]
fn missing_blob_file_is_an_io_error() {
    let err = read_graph_file(Path::new("/definitely/not/here.bin")).unwrap_err();
    assert!(matches!(err, BlobError::Io { .. }));
}
