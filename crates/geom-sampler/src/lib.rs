pub mod mock_sampler;
pub mod primitives;
pub mod traits;
pub mod types;

pub use mock_sampler::MockSampler;
pub use primitives::MockSolid;
pub use traits::*;
pub use types::*;
