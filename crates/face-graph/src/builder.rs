use geom_sampler::{GeometrySampler, SolidHandle};
use ndarray::{Array3, Array4};
use tracing::{debug, info, instrument};

use crate::config::SamplingConfig;
use crate::errors::GraphError;
use crate::types::{FaceGraph, EDGE_CHANNELS, FACE_CHANNELS};

/// Build the face-adjacency graph of a solid with sampled feature tensors.
///
/// Faces keep the sampler's traversal order. Adjacency edges whose boundary
/// has no parametric curve stay in the edge list but get no feature tensor.
#[instrument(skip(sampler, solid))]
pub fn build_graph(
    sampler: &dyn GeometrySampler,
    solid: &SolidHandle,
    config: &SamplingConfig,
) -> Result<FaceGraph, GraphError> {
    let adjacency = sampler.face_adjacency(solid)?;
    let (nu, nv) = (config.surface_u_samples, config.surface_v_samples);
    let cu = config.curve_u_samples;

    let num_nodes = adjacency.faces.len();
    let mut node_data = Vec::with_capacity(num_nodes * nu * nv * FACE_CHANNELS);
    for (i, &face) in adjacency.faces.iter().enumerate() {
        let samples = sampler.sample_face(solid, face, nu, nv)?;
        if samples.num_u != nu || samples.num_v != nv || !samples.is_consistent() {
            return Err(GraphError::InconsistentFaceSamples {
                face: i,
                expected: nu * nv,
                found: samples.points.len(),
            });
        }
        for cell in 0..nu * nv {
            let p = samples.points[cell];
            let n = samples.normals[cell];
            let mask = if samples.visibility[cell].is_visible() {
                1.0
            } else {
                0.0
            };
            node_data.extend_from_slice(&[
                p[0] as f32,
                p[1] as f32,
                p[2] as f32,
                n[0] as f32,
                n[1] as f32,
                n[2] as f32,
                mask,
            ]);
        }
    }

    let mut edges = Vec::with_capacity(adjacency.edges.len());
    let mut edge_data = Vec::new();
    let mut curve_edges = 0usize;
    for (i, adj) in adjacency.edges.iter().enumerate() {
        edges.push([adj.source, adj.target]);
        let Some(samples) = sampler.sample_edge(solid, adj.edge, cu)? else {
            debug!(edge = i, "edge has no parametric curve, skipping features");
            continue;
        };
        if samples.num_u != cu || !samples.is_consistent() {
            return Err(GraphError::InconsistentEdgeSamples {
                edge: i,
                expected: cu,
                found: samples.points.len(),
            });
        }
        for (p, t) in samples.points.iter().zip(&samples.tangents) {
            edge_data.extend_from_slice(&[
                p[0] as f32,
                p[1] as f32,
                p[2] as f32,
                t[0] as f32,
                t[1] as f32,
                t[2] as f32,
            ]);
        }
        curve_edges += 1;
    }

    let node_features = Array4::from_shape_vec((num_nodes, nu, nv, FACE_CHANNELS), node_data)
        .map_err(|e| GraphError::Shape {
            reason: e.to_string(),
        })?;
    let edge_features = Array3::from_shape_vec((curve_edges, cu, EDGE_CHANNELS), edge_data)
        .map_err(|e| GraphError::Shape {
            reason: e.to_string(),
        })?;

    info!(
        faces = num_nodes,
        edges = edges.len(),
        edge_features = curve_edges,
        "face graph built"
    );

    Ok(FaceGraph {
        num_nodes,
        edges,
        node_features,
        edge_features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom_sampler::{MockSampler, MockSolid};
    use std::path::Path;

    #[test]
    fn box_graph_shapes() {
        let sampler = MockSampler::new().with_solid("b.step", MockSolid::box_solid(1.0, 1.0, 1.0));
        let solid = sampler.load_solid(Path::new("b.step")).unwrap();
        let graph = build_graph(&sampler, &solid, &SamplingConfig::uniform(4)).unwrap();
        assert_eq!(graph.num_nodes, 6);
        assert_eq!(graph.node_features.shape(), &[6, 4, 4, 7]);
        assert_eq!(graph.edge_features.shape(), &[12, 4, 6]);
        assert!(graph.has_complete_edge_features());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn zero_resolution_propagates_sampler_error() {
        let sampler = MockSampler::new().with_solid("b.step", MockSolid::box_solid(1.0, 1.0, 1.0));
        let solid = sampler.load_solid(Path::new("b.step")).unwrap();
        let config = SamplingConfig {
            surface_u_samples: 0,
            ..SamplingConfig::default()
        };
        let err = build_graph(&sampler, &solid, &config).unwrap_err();
        assert!(matches!(err, GraphError::Sampler(_)));
    }
}
