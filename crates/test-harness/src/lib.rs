//! Test harness for scripted segmentation sessions.
//!
//! Provides programmatic tools for driving a session through the message
//! bridge, checking its invariants at every step, and producing readable
//! diagnostics.
//!
//! # Key Components
//!
//! - [`SessionDriver`]: Fluent API over `seg_bridge::dispatch` with named fixture solids
//! - [`oracle`]: Invariant checks returning pass/fail verdicts
//! - [`report`]: Structured text session descriptions
//! - [`helpers`]: Error type, fixture workspace, standard solids
//! - [`assertions`]: Assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod workflow;

pub use helpers::{FixtureWorkspace, HarnessError};
pub use oracle::OracleVerdict;
pub use report::SessionReport;
pub use workflow::SessionDriver;
