//! MockSampler: deterministic test double implementing GeometrySampler.
//!
//! Serves registered [`MockSolid`]s by file path. Used by the graph builder,
//! the pipeline and the bridge tests in place of a real CAD kernel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::primitives::MockSolid;
use crate::traits::GeometrySampler;
use crate::types::*;

/// Face and edge ids are offset per solid so they never collide across solids.
const ID_STRIDE: u64 = 10_000;
const EDGE_OFFSET: u64 = 5_000;

/// Deterministic sampling service over registered synthetic solids.
#[derive(Debug, Default)]
pub struct MockSampler {
    solids: Vec<MockSolid>,
    by_path: HashMap<PathBuf, usize>,
}

impl MockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a solid under a file path. Re-registering a path replaces it.
    pub fn register(&mut self, path: impl Into<PathBuf>, solid: MockSolid) {
        let idx = self.solids.len();
        self.solids.push(solid);
        self.by_path.insert(path.into(), idx);
    }

    /// Builder-style [`MockSampler::register`].
    pub fn with_solid(mut self, path: impl Into<PathBuf>, solid: MockSolid) -> Self {
        self.register(path, solid);
        self
    }

    fn solid(&self, handle: &SolidHandle) -> Result<&MockSolid, SamplerError> {
        self.solids
            .get(handle.id() as usize)
            .ok_or(SamplerError::UnknownHandle { id: handle.id() })
    }

    fn face_id(handle: &SolidHandle, index: usize) -> FaceId {
        FaceId(handle.id() * ID_STRIDE + index as u64)
    }

    fn edge_id(handle: &SolidHandle, index: usize) -> EdgeId {
        EdgeId(handle.id() * ID_STRIDE + EDGE_OFFSET + index as u64)
    }

    fn face_index(handle: &SolidHandle, face: FaceId) -> Option<usize> {
        let base = handle.id() * ID_STRIDE;
        (face.0 >= base && face.0 < base + EDGE_OFFSET).then(|| (face.0 - base) as usize)
    }

    fn edge_index(handle: &SolidHandle, edge: EdgeId) -> Option<usize> {
        let base = handle.id() * ID_STRIDE + EDGE_OFFSET;
        (edge.0 >= base && edge.0 < base + EDGE_OFFSET).then(|| (edge.0 - base) as usize)
    }
}

/// Evenly spaced parameters over [0, 1]; a single sample sits at the midpoint.
fn grid(n: usize) -> impl Iterator<Item = f64> {
    (0..n).map(move |i| {
        if n == 1 {
            0.5
        } else {
            i as f64 / (n - 1) as f64
        }
    })
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        v
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

impl GeometrySampler for MockSampler {
    fn load_solid(&self, path: &Path) -> Result<SolidHandle, SamplerError> {
        self.by_path
            .get(path)
            .map(|&idx| SolidHandle(idx as u64))
            .ok_or_else(|| SamplerError::SolidNotFound {
                path: path.to_path_buf(),
            })
    }

    fn face_adjacency(&self, solid: &SolidHandle) -> Result<FaceAdjacency, SamplerError> {
        let mock = self.solid(solid)?;
        let faces = (0..mock.faces.len())
            .map(|i| Self::face_id(solid, i))
            .collect();
        let edges = mock
            .shared_edges()
            .into_iter()
            .map(|(edge, source, target)| AdjacentFaces {
                edge: Self::edge_id(solid, edge),
                source,
                target,
            })
            .collect();
        Ok(FaceAdjacency { faces, edges })
    }

    fn sample_face(
        &self,
        solid: &SolidHandle,
        face: FaceId,
        num_u: usize,
        num_v: usize,
    ) -> Result<FaceSamples, SamplerError> {
        if num_u == 0 || num_v == 0 {
            return Err(SamplerError::InvalidResolution { num_u, num_v });
        }
        let mock = self.solid(solid)?;
        let f = Self::face_index(solid, face)
            .and_then(|i| mock.faces.get(i))
            .ok_or(SamplerError::FaceNotFound { id: face })?;

        let n = num_u * num_v;
        let mut points = Vec::with_capacity(n);
        let mut visibility = Vec::with_capacity(n);
        for s in grid(num_u) {
            for t in grid(num_v) {
                points.push(f.point_at(s, t));
                visibility.push(VisibilityStatus::from_code(f.classify(s, t)));
            }
        }

        Ok(FaceSamples {
            num_u,
            num_v,
            points,
            normals: vec![normalize(f.normal); n],
            visibility,
        })
    }

    fn sample_edge(
        &self,
        solid: &SolidHandle,
        edge: EdgeId,
        num_u: usize,
    ) -> Result<Option<CurveSamples>, SamplerError> {
        if num_u == 0 {
            return Err(SamplerError::InvalidResolution { num_u, num_v: 1 });
        }
        let mock = self.solid(solid)?;
        let e = Self::edge_index(solid, edge)
            .and_then(|i| mock.edges.get(i))
            .ok_or(SamplerError::EdgeNotFound { id: edge })?;
        if !e.has_curve {
            return Ok(None);
        }

        let dir = [
            e.end[0] - e.start[0],
            e.end[1] - e.start[1],
            e.end[2] - e.start[2],
        ];
        let points = grid(num_u)
            .map(|s| {
                [
                    e.start[0] + s * dir[0],
                    e.start[1] + s * dir[1],
                    e.start[2] + s * dir[2],
                ]
            })
            .collect();

        Ok(Some(CurveSamples {
            num_u,
            points,
            tangents: vec![normalize(dir); num_u],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sampler_with_box() -> (MockSampler, SolidHandle) {
        let sampler = MockSampler::new().with_solid("box.step", MockSolid::box_solid(2.0, 2.0, 2.0));
        let handle = sampler.load_solid(Path::new("box.step")).unwrap();
        (sampler, handle)
    }

    #[test]
    fn unknown_path_is_an_error() {
        let sampler = MockSampler::new();
        let err = sampler.load_solid(Path::new("missing.step")).unwrap_err();
        assert!(matches!(err, SamplerError::SolidNotFound { .. }));
    }

    #[test]
    fn adjacency_lists_faces_in_order() {
        let (sampler, handle) = sampler_with_box();
        let adj = sampler.face_adjacency(&handle).unwrap();
        assert_eq!(adj.faces.len(), 6);
        assert_eq!(adj.edges.len(), 12);
        for e in &adj.edges {
            assert!(e.source < 6 && e.target < 6);
            assert_ne!(e.source, e.target);
        }
    }

    #[test]
    fn face_grid_spans_the_face() {
        let (sampler, handle) = sampler_with_box();
        let adj = sampler.face_adjacency(&handle).unwrap();
        let samples = sampler.sample_face(&handle, adj.faces[1], 3, 4).unwrap();
        assert!(samples.is_consistent());
        let first = samples.points[0];
        let last = samples.points[samples.index(2, 3)];
        assert_relative_eq!(first[2], 2.0);
        assert_relative_eq!(last[0], 2.0);
        assert_relative_eq!(last[1], 2.0);
        assert!(samples.visibility.iter().all(|v| v.is_visible()));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let (sampler, handle) = sampler_with_box();
        let adj = sampler.face_adjacency(&handle).unwrap();
        assert!(sampler.sample_face(&handle, adj.faces[0], 0, 4).is_err());
    }

    #[test]
    fn curveless_edge_samples_to_none() {
        let sampler = MockSampler::new().with_solid(
            "box.step",
            MockSolid::box_solid(1.0, 1.0, 1.0).without_curve(0),
        );
        let handle = sampler.load_solid(Path::new("box.step")).unwrap();
        let adj = sampler.face_adjacency(&handle).unwrap();
        let first = sampler.sample_edge(&handle, adj.edges[0].edge, 5).unwrap();
        assert!(first.is_none());
        let second = sampler.sample_edge(&handle, adj.edges[1].edge, 5).unwrap().unwrap();
        assert!(second.is_consistent());
        assert_relative_eq!(second.tangents[0][1], 1.0);
    }
}
