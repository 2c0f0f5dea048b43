//! Inference over face graphs.
//!
//! Graph tensors are permuted channel-first ([`ChannelFirstGraph`]) and handed
//! to a [`ScoringModel`]. [`predict`] turns per-face scores into raw labels by
//! argmax. Labels are not clamped here; the caller clamps them into the
//! current taxonomy.

pub mod errors;
pub mod labels;
pub mod linear;
pub mod mock_model;
pub mod model;
pub mod tensor;

pub use errors::InferenceError;
pub use labels::{argmax_labels, predict};
pub use linear::{LinearProbe, LINEAR_FORMAT_ID, LINEAR_FORMAT_VERSION};
pub use mock_model::MockModel;
pub use model::ScoringModel;
pub use tensor::ChannelFirstGraph;
