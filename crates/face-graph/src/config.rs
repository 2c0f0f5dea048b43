use serde::{Deserialize, Serialize};

/// Sample resolutions used when building a face graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Samples along each boundary curve.
    pub curve_u_samples: usize,
    /// Samples along the surface `u` direction.
    pub surface_u_samples: usize,
    /// Samples along the surface `v` direction.
    pub surface_v_samples: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            curve_u_samples: 10,
            surface_u_samples: 10,
            surface_v_samples: 10,
        }
    }
}

impl SamplingConfig {
    /// Same resolution in every direction.
    pub fn uniform(samples: usize) -> Self {
        Self {
            curve_u_samples: samples,
            surface_u_samples: samples,
            surface_v_samples: samples,
        }
    }
}
