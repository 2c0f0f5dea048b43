use label_engine::{BatchReport, CancelToken, EngineError};
use label_format::{export_session, write_taxonomy};
use tracing::{info, warn};

use crate::messages::{EngineToUi, HistoryEntry, UiToEngine};
use crate::state::{ActiveBatch, BridgeError, BridgeState};
use crate::worker::{spawn_batch, spawn_run};

/// Handle one request and return the response.
///
/// Failures become [`EngineToUi::Error`]; the session is left as it was.
pub fn dispatch(state: &mut BridgeState, msg: UiToEngine) -> EngineToUi {
    match handle_message(state, msg) {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

/// Parse a JSON request, dispatch it and serialize the response.
pub fn dispatch_json(state: &mut BridgeState, json: &str) -> String {
    let response = match serde_json::from_str::<UiToEngine>(json) {
        Ok(msg) => dispatch(state, msg),
        Err(e) => error_response(BridgeError::Serialization {
            reason: e.to_string(),
        }),
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"type":"Error","message":"{}"}}"#, e.to_string().replace('"', "'"))
    })
}

/// Collect a finished run or batch without blocking. `None` while the work is
/// still going or when nothing was started.
pub fn poll(state: &mut BridgeState) -> Option<EngineToUi> {
    if let Some(handle) = state.pending.as_mut() {
        let result = handle.try_finish()?;
        state.pending = None;
        return Some(complete(state, result));
    }
    let result = state.batch.as_mut()?.handle.try_finish()?;
    state.batch = None;
    Some(batch_finished(result))
}

/// Block until the pending run or batch finishes. `None` when nothing was
/// started.
pub fn wait(state: &mut BridgeState) -> Option<EngineToUi> {
    if let Some(handle) = state.pending.take() {
        let result = handle.wait();
        return Some(complete(state, result));
    }
    let batch = state.batch.take()?;
    Some(batch_finished(batch.handle.wait()))
}

fn batch_finished(result: Result<BatchReport, EngineError>) -> EngineToUi {
    match result {
        Ok(report) => EngineToUi::BatchFinished {
            total: report.total,
            succeeded: report.succeeded(),
            failed: report.failed(),
            cancelled: report.cancelled,
        },
        Err(e) => {
            warn!(error = %e, "batch failed");
            error_response(e.into())
        }
    }
}

fn complete(
    state: &mut BridgeState,
    result: Result<label_engine::CompletedRun, EngineError>,
) -> EngineToUi {
    match state.session.finish_run(result) {
        Ok(_) => segmentation_ready(state),
        Err(e) => {
            warn!(error = %e, "segmentation run failed");
            error_response(e.into())
        }
    }
}

fn error_response(e: BridgeError) -> EngineToUi {
    EngineToUi::Error {
        message: e.to_string(),
    }
}

fn taxonomy_updated(state: &BridgeState) -> EngineToUi {
    EngineToUi::TaxonomyUpdated {
        snapshot: state.session.snapshot(),
    }
}

fn segmentation_ready(state: &BridgeState) -> EngineToUi {
    EngineToUi::SegmentationReady {
        snapshot: state.session.snapshot(),
        labels: state.session.labels().map(<[usize]>::to_vec).unwrap_or_default(),
    }
}

fn require_idle(state: &BridgeState) -> Result<(), BridgeError> {
    if state.is_running() {
        return Err(EngineError::RunInProgress.into());
    }
    Ok(())
}

fn handle_message(state: &mut BridgeState, msg: UiToEngine) -> Result<EngineToUi, BridgeError> {
    match msg {
        // -- Inputs --
        UiToEngine::SetMode { mode } => {
            require_idle(state)?;
            state.session.set_mode(mode);
            Ok(EngineToUi::ModeChanged {
                mode,
                missing: state.session.pipeline().missing_input(),
            })
        }

        UiToEngine::LoadInput { path } => {
            require_idle(state)?;
            let kind = state.session.load_input(&path)?;
            Ok(EngineToUi::InputLoaded { kind, path })
        }

        UiToEngine::LoadModel { path } => {
            require_idle(state)?;
            let report = state.session.load_model(&path)?;
            Ok(EngineToUi::ModelLoaded {
                model_name: report.model_name,
                companion: report.companion,
                companion_error: report.companion_error,
                snapshot: state.session.snapshot(),
            })
        }

        UiToEngine::LoadMapping { path } => {
            require_idle(state)?;
            state.session.load_mapping(&path)?;
            Ok(taxonomy_updated(state))
        }

        UiToEngine::SetGeometry { path } => {
            require_idle(state)?;
            state.session.set_geometry(path.clone());
            Ok(EngineToUi::InputLoaded {
                kind: seg_types::InputKind::Geometry,
                path,
            })
        }

        // -- Taxonomy --
        UiToEngine::ReplaceTaxonomy { names, colors } => {
            require_idle(state)?;
            state.session.replace_taxonomy(&names, &colors)?;
            Ok(taxonomy_updated(state))
        }

        UiToEngine::SaveTaxonomy { path } => {
            write_taxonomy(&path, state.session.taxonomy())?;
            Ok(EngineToUi::Done)
        }

        // -- Runs --
        UiToEngine::Segment => {
            require_idle(state)?;
            let run = state.session.begin_run()?;
            let mode = run.mode;
            info!(%mode, "segmentation run handed to worker");
            state.pending = Some(spawn_run(run));
            Ok(EngineToUi::RunStarted { mode })
        }

        UiToEngine::RunBatch {
            input_dir,
            output_dir,
        } => {
            require_idle(state)?;
            let request = state.session.batch_request(output_dir)?;
            let mode = request.mode;
            let cancel = CancelToken::new();
            info!(%mode, input = %input_dir.display(), "batch handed to worker");
            state.batch = Some(ActiveBatch {
                handle: spawn_batch(request, input_dir, cancel.clone()),
                cancel,
            });
            Ok(EngineToUi::BatchStarted { mode })
        }

        UiToEngine::CancelBatch => {
            let batch = state.batch.as_ref().ok_or(EngineError::NoRunInProgress)?;
            batch.cancel.cancel();
            info!("batch cancellation requested");
            Ok(EngineToUi::Done)
        }

        // -- Views --
        UiToEngine::GetSnapshot => Ok(taxonomy_updated(state)),

        UiToEngine::GetFaces => Ok(EngineToUi::Faces {
            faces: state.session.face_entries(),
        }),

        // -- History --
        UiToEngine::ListHistory => Ok(EngineToUi::History {
            entries: state
                .session
                .history()
                .iter()
                .enumerate()
                .map(|(i, record)| HistoryEntry::from_record(i, record))
                .collect(),
        }),

        UiToEngine::ReplayHistory { index } => {
            require_idle(state)?;
            state.session.replay(index)?;
            Ok(segmentation_ready(state))
        }

        UiToEngine::ClearHistory => {
            state.session.clear_history()?;
            Ok(EngineToUi::History {
                entries: Vec::new(),
            })
        }

        // -- Files --
        UiToEngine::Export { path, format } => {
            let format = export_session(&state.session, &path, format)?;
            Ok(EngineToUi::Exported { path, format })
        }

        UiToEngine::Reset => {
            require_idle(state)?;
            state.session.reset();
            Ok(taxonomy_updated(state))
        }

        UiToEngine::Shutdown => {
            if let Some(batch) = &state.batch {
                batch.cancel.cancel();
            }
            if let Some(EngineToUi::Error { message }) = wait(state) {
                warn!(%message, "pending work failed during shutdown");
            }
            state.session.shutdown()?;
            Ok(EngineToUi::Done)
        }
    }
}
