//! # Action Runner
//!
//! Runs the mock detail-overlay actions (export, share, download, citation)
//! on the tokio runtime.
//!
//! Each run marks its action Pending on the shared [`ActionBoard`], waits
//! the simulated delay under a timeout, then records the outcome. A second
//! run of the same action while one is pending is refused; other actions
//! are unaffected. Pending runs can be cancelled, which returns the action
//! to Idle.
//!
//! The outcome is recorded by the spawned task itself, so a caller that
//! goes away mid-run (a dropped HTTP request) still releases the action.

use spacebio_core::{ActionBoard, ActionDelays, ActionKind, SpaceBioError, TaskStatus};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

/// The pending run of one action.
#[derive(Debug)]
struct Run {
    id: u64,
    abort: AbortHandle,
}

/// Board and in-flight runs, changed together under one lock.
#[derive(Debug, Default)]
struct RunnerState {
    board: ActionBoard,
    inflight: BTreeMap<ActionKind, Run>,
    next_run: u64,
}

impl RunnerState {
    /// Drop `kind`'s in-flight entry if it still belongs to run `id`.
    fn release(&mut self, kind: ActionKind, id: u64) -> bool {
        match self.inflight.get(&kind) {
            Some(run) if run.id == id => {
                self.inflight.remove(&kind);
                true
            }
            _ => false,
        }
    }
}

/// Shared runner; clones drive the same board.
#[derive(Clone)]
pub struct ActionRunner {
    state: Arc<Mutex<RunnerState>>,
    delays: ActionDelays,
    timeout: Duration,
}

impl ActionRunner {
    pub fn new(delays: ActionDelays, timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RunnerState::default())),
            delays,
            timeout,
        }
    }

    pub fn delays(&self) -> ActionDelays {
        self.delays
    }

    pub async fn status(&self, kind: ActionKind) -> TaskStatus {
        self.state.lock().await.board.status(kind).clone()
    }

    pub async fn snapshot(&self) -> Vec<(ActionKind, TaskStatus)> {
        self.state.lock().await.board.snapshot()
    }

    /// Run `kind`, producing its payload after the simulated delay.
    pub async fn run<T, F>(&self, kind: ActionKind, produce: F) -> Result<T, SpaceBioError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        // Pending and cancellable become visible together.
        let mut state = self.state.lock().await;
        state.board.begin(kind)?;
        let id = state.next_run;
        state.next_run += 1;
        tracing::debug!(action = %kind, run = id, "Action started");

        let shared = Arc::clone(&self.state);
        let delay = self.delays.for_kind(kind);
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            let produced = tokio::time::timeout(timeout, async move {
                tokio::time::sleep(delay).await;
                std::panic::catch_unwind(AssertUnwindSafe(produce))
            })
            .await;

            let mut state = shared.lock().await;
            if !state.release(kind, id) {
                // Cancelled once the work was done; the board is no longer ours.
                return Err(SpaceBioError::ActionCancelled(kind));
            }
            match produced {
                Ok(Ok(payload)) => {
                    state.board.succeed(kind);
                    tracing::info!(action = %kind, run = id, "Action completed");
                    Ok(payload)
                }
                Ok(Err(_)) => {
                    state.board.fail(kind, "action panicked".to_string());
                    tracing::warn!(action = %kind, run = id, "Action panicked");
                    Err(SpaceBioError::ActionFailed(kind))
                }
                Err(_) => {
                    state
                        .board
                        .fail(kind, format!("timed out after {} ms", timeout.as_millis()));
                    tracing::warn!(action = %kind, run = id, "Action timed out");
                    Err(SpaceBioError::ActionTimedOut(kind))
                }
            }
        });
        state.inflight.insert(
            kind,
            Run {
                id,
                abort: handle.abort_handle(),
            },
        );
        drop(state);

        match handle.await {
            Ok(result) => result,
            // Only `cancel` aborts runs, and it has already reset the board.
            Err(e) => {
                tracing::info!(action = %kind, run = id, error = %e, "Action cancelled");
                Err(SpaceBioError::ActionCancelled(kind))
            }
        }
    }

    /// Abort a pending run. Returns false if `kind` was not running.
    pub async fn cancel(&self, kind: ActionKind) -> bool {
        let mut state = self.state.lock().await;
        let Some(run) = state.inflight.remove(&kind) else {
            return false;
        };
        run.abort.abort();
        state.board.reset(kind);
        true
    }
}
