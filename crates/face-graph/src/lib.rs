//! Face-adjacency graph construction and the precomputed-graph blob format.
//!
//! [`build_graph`] turns a solid into a [`FaceGraph`] by sampling every face on
//! a `(u, v)` grid and every curve-bearing boundary edge on a `u` grid.
//! [`save_graph`] / [`load_graph`] persist the graph for reuse without the
//! CAD kernel.

pub mod blob;
pub mod builder;
pub mod config;
pub mod errors;
pub mod types;

pub use blob::{load_graph, read_graph_file, save_graph, write_graph_file, FORMAT_VERSION};
pub use builder::build_graph;
pub use config::SamplingConfig;
pub use errors::{BlobError, GraphError};
pub use types::{FaceGraph, EDGE_CHANNELS, FACE_CHANNELS};
