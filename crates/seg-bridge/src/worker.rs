//! Background execution of prepared runs and batches.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

use label_engine::{
    collect_geometry_sources, run_batch, BatchReport, BatchRequest, CancelToken, CompletedRun,
    EngineError, PreparedRun,
};
use tracing::{debug, info, warn};

/// Work executing on its own thread. The result arrives over a channel.
#[derive(Debug)]
pub struct WorkerHandle<T> {
    rx: Receiver<Result<T, EngineError>>,
    thread: Option<JoinHandle<()>>,
}

/// A segmentation run on the worker.
pub type RunHandle = WorkerHandle<CompletedRun>;

/// A batch on the worker.
pub type BatchHandle = WorkerHandle<BatchReport>;

fn spawn_worker<T, F>(job: F) -> WorkerHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let thread = std::thread::spawn(move || {
        // The receiver may be gone if the bridge was dropped mid-run.
        let _ = tx.send(job());
    });
    WorkerHandle {
        rx,
        thread: Some(thread),
    }
}

/// Start `run` on a new thread.
pub fn spawn_run(run: PreparedRun) -> RunHandle {
    spawn_worker(move || {
        debug!(mode = %run.mode, "worker started");
        run.execute()
    })
}

/// Collect the sources under `input_dir` and run `request` over them on a new
/// thread. `cancel` is checked before each source.
pub fn spawn_batch(request: BatchRequest, input_dir: PathBuf, cancel: CancelToken) -> BatchHandle {
    spawn_worker(move || {
        let sources = collect_geometry_sources(&input_dir)?;
        debug!(mode = %request.mode, sources = sources.len(), "batch worker started");
        run_batch(&request, &sources, &cancel, |index, total, source| {
            info!(index, total, source = %source.display(), "batch item");
        })
    })
}

fn worker_lost() -> EngineError {
    EngineError::Inference {
        reason: "worker thread exited without a result".into(),
    }
}

impl<T> WorkerHandle<T> {
    /// The result if the work has finished, without blocking.
    pub fn try_finish(&mut self) -> Option<Result<T, EngineError>> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(worker_lost()))
            }
        }
    }

    /// Block until the work finishes.
    pub fn wait(mut self) -> Result<T, EngineError> {
        let result = self.rx.recv().unwrap_or_else(|_| Err(worker_lost()));
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("segmentation worker panicked");
            }
        }
    }
}
