use std::path::Path;

use crate::types::*;

/// Geometric sampling service backed by a CAD kernel.
///
/// The segmentation pipeline treats the kernel as a black box: it only needs
/// the face-adjacency structure of a solid and regular parametric samples of
/// its faces and boundary curves. Implementations must be shareable across
/// threads because graph construction runs on a worker.
pub trait GeometrySampler: Send + Sync {
    /// Read a solid from a CAD file.
    fn load_solid(&self, path: &Path) -> Result<SolidHandle, SamplerError>;

    /// Face nodes in traversal order plus the faces sharing each boundary edge.
    ///
    /// The face order is the order used for display and for label vectors.
    fn face_adjacency(&self, solid: &SolidHandle) -> Result<FaceAdjacency, SamplerError>;

    /// Sample a `num_u` x `num_v` grid of points, normals and visibility codes on a face.
    fn sample_face(
        &self,
        solid: &SolidHandle,
        face: FaceId,
        num_u: usize,
        num_v: usize,
    ) -> Result<FaceSamples, SamplerError>;

    /// Sample `num_u` points and tangents along an edge's parametric curve.
    ///
    /// Returns `Ok(None)` when the edge has no usable parametric curve.
    fn sample_edge(
        &self,
        solid: &SolidHandle,
        edge: EdgeId,
        num_u: usize,
    ) -> Result<Option<CurveSamples>, SamplerError>;
}
