use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque handle to a solid loaded by the sampling service.
/// NEVER persisted. Valid only for the sampler instance that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    /// Wrap a sampler-specific solid id. Only sampler implementations should call this.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Sampler-internal face identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u64);

/// Sampler-internal edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

/// Classification of a surface sample against the trimmed face.
///
/// Numeric codes follow the kernel's state enumeration: 0 inside, 1 outside,
/// 2 on the boundary, 3 unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityStatus {
    Inside,
    Outside,
    OnBoundary,
    Unknown,
}

impl VisibilityStatus {
    pub fn code(self) -> u8 {
        match self {
            VisibilityStatus::Inside => 0,
            VisibilityStatus::Outside => 1,
            VisibilityStatus::OnBoundary => 2,
            VisibilityStatus::Unknown => 3,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => VisibilityStatus::Inside,
            1 => VisibilityStatus::Outside,
            2 => VisibilityStatus::OnBoundary,
            _ => VisibilityStatus::Unknown,
        }
    }

    /// Mask value for this sample: codes 0 and 2 are visible.
    pub fn is_visible(self) -> bool {
        matches!(self, VisibilityStatus::Inside | VisibilityStatus::OnBoundary)
    }
}

/// Face-adjacency structure of a solid.
#[derive(Debug, Clone, Default)]
pub struct FaceAdjacency {
    /// Face nodes in traversal order.
    pub faces: Vec<FaceId>,
    /// One entry per boundary edge shared by two faces.
    pub edges: Vec<AdjacentFaces>,
}

/// A boundary edge and the two faces it separates, as indices into `FaceAdjacency::faces`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacentFaces {
    pub edge: EdgeId,
    pub source: usize,
    pub target: usize,
}

/// Regular `(u, v)` grid of samples on a face, stored row-major (`u` outer, `v` inner).
#[derive(Debug, Clone)]
pub struct FaceSamples {
    pub num_u: usize,
    pub num_v: usize,
    pub points: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub visibility: Vec<VisibilityStatus>,
}

impl FaceSamples {
    /// Flat index of grid cell `(iu, iv)`.
    pub fn index(&self, iu: usize, iv: usize) -> usize {
        iu * self.num_v + iv
    }

    /// Whether every per-cell array has `num_u * num_v` entries.
    pub fn is_consistent(&self) -> bool {
        let n = self.num_u * self.num_v;
        self.points.len() == n && self.normals.len() == n && self.visibility.len() == n
    }
}

/// Regular `u` grid of samples along a curve.
#[derive(Debug, Clone)]
pub struct CurveSamples {
    pub num_u: usize,
    pub points: Vec<[f64; 3]>,
    pub tangents: Vec<[f64; 3]>,
}

impl CurveSamples {
    pub fn is_consistent(&self) -> bool {
        self.points.len() == self.num_u && self.tangents.len() == self.num_u
    }
}

/// Errors from the sampling service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SamplerError {
    #[error("no solid could be read from {path:?}")]
    SolidNotFound { path: PathBuf },

    #[error("unknown solid handle: {id}")]
    UnknownHandle { id: u64 },

    #[error("face not found: {id:?}")]
    FaceNotFound { id: FaceId },

    #[error("edge not found: {id:?}")]
    EdgeNotFound { id: EdgeId },

    #[error("invalid sample resolution {num_u}x{num_v}")]
    InvalidResolution { num_u: usize, num_v: usize },

    #[error("sampler error: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_codes_round_trip() {
        for code in 0..4u8 {
            assert_eq!(VisibilityStatus::from_code(code).code(), code);
        }
        assert_eq!(VisibilityStatus::from_code(42), VisibilityStatus::Unknown);
    }

    #[test]
    fn only_inside_and_boundary_are_visible() {
        assert!(VisibilityStatus::Inside.is_visible());
        assert!(VisibilityStatus::OnBoundary.is_visible());
        assert!(!VisibilityStatus::Outside.is_visible());
        assert!(!VisibilityStatus::Unknown.is_visible());
    }
}
