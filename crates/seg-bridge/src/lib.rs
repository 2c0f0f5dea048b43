//! Message bridge between a front end and a label session.
//!
//! Requests arrive as [`UiToEngine`] values (serde-tagged JSON on the wire)
//! and are answered with [`EngineToUi`]. Segmentation runs execute on a
//! worker thread; [`dispatch`] answers `Segment` with `RunStarted` and
//! `RunBatch` with `BatchStarted`, and the result is collected with [`poll`]
//! or [`wait`].

pub mod dispatch;
pub mod messages;
pub mod state;
pub mod worker;

pub use dispatch::{dispatch, dispatch_json, poll, wait};
pub use messages::{EngineToUi, HistoryEntry, UiToEngine};
pub use state::{ActiveBatch, BridgeError, BridgeState};
pub use worker::{spawn_batch, spawn_run, BatchHandle, RunHandle, WorkerHandle};
