// State management module
//
// This module provides the StateManager which wraps RunState with thread-safe access
// using Arc<RwLock<T>> and emits change events for progress reporting.

use crate::models::RunState;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when run state is modified
///
/// Subscribers ([`report_progress`] in the CLI, tests) receive these instead
/// of polling the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A run has started
    RunStarted { total_modules: usize },

    /// Progress moved, or a different module is being processed
    ProgressUpdated {
        current: usize,
        total: usize,
        current_module: Option<String>,
    },

    /// A module has been processed
    ModuleProcessed {
        module: String,
        status: String,
        message: String,
    },

    /// The run has finished
    RunFinished {
        generated: usize,
        failed: usize,
        skipped: usize,
    },

    /// Cancellation was requested; modules not yet started will be skipped
    CancelRequested,

    /// State has been reset
    StateReset,
}

/// Thread-safe run state with event emission
///
/// - Provides thread-safe access to [`RunState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// Clones share the same state, so a clone can be moved into a Ctrl-C
/// handler or a worker thread.
pub struct StateManager {
    state: Arc<RwLock<RunState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with a broadcast buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RunState::default())),
            state_tx,
        }
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> RunState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let cancelled = state_manager.read(|state| state.cancel_requested);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RunState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutate the state and emit events for whatever changed
    ///
    /// # Returns
    /// The emitted events
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut RunState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        for change in &changes {
            // No subscribers is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &RunState, new: &RunState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.is_running != new.is_running {
            if new.is_running {
                changes.push(StateChange::RunStarted {
                    total_modules: new.total_modules,
                });
            } else {
                let (generated, failed, skipped, _) = new.run_stats();
                changes.push(StateChange::RunFinished {
                    generated,
                    failed,
                    skipped,
                });
            }
        }

        if old.progress != new.progress
            || old.total_modules != new.total_modules
            || old.current_module != new.current_module
        {
            changes.push(StateChange::ProgressUpdated {
                current: new.progress,
                total: new.total_modules,
                current_module: new.current_module.clone(),
            });
        }

        if !old.cancel_requested && new.cancel_requested {
            changes.push(StateChange::CancelRequested);
        }

        changes
    }

    /// Begin a run over `total_modules` modules, clearing previous results.
    ///
    /// A pending cancellation is kept; only [`reset`](Self::reset) clears it.
    pub fn start_run(&self, total_modules: usize) -> Vec<StateChange> {
        self.update(|state| {
            state.generated_modules.clear();
            state.skipped_modules.clear();
            state.failed_modules.clear();
            state.identifiers_emitted = 0;
            state.progress = 0;
            state.current_module = None;
            state.total_modules = total_modules;
            state.is_running = true;
        })
    }

    pub fn finish_run(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.is_running = false;
            state.current_module = None;
        })
    }

    pub fn set_current_module(&self, module: String) -> Vec<StateChange> {
        self.update(|state| {
            state.current_module = Some(module);
        })
    }

    /// Record the outcome of one module
    ///
    /// # Arguments
    /// * `module` - Module name
    /// * `status` - "generated", "failed" or "skipped"
    /// * `message` - Human-readable description of the result
    /// * `identifiers` - Number of identifiers emitted
    pub fn add_module_result(
        &self,
        module: String,
        status: &str,
        message: String,
        identifiers: usize,
    ) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.add_result(module.clone(), status);
            state.identifiers_emitted += identifiers;
        });

        let processed = StateChange::ModuleProcessed {
            module,
            status: status.to_string(),
            message,
        };
        let _ = self.state_tx.send(processed.clone());
        changes.push(processed);

        changes
    }

    /// Ask the running generation to stop after the modules in flight
    pub fn request_cancel(&self) -> Vec<StateChange> {
        tracing::warn!("Cancellation requested");
        self.update(|state| {
            state.cancel_requested = true;
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.read(|state| state.cancel_requested)
    }

    pub fn reset(&self) -> Vec<StateChange> {
        let mut changes = self.update(RunState::reset);

        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }
}

/// Log one line per processed module until every [`StateManager`] clone is gone.
///
/// Returns the number of modules reported.
pub async fn report_progress(mut rx: broadcast::Receiver<StateChange>) -> usize {
    let mut reported = 0;
    loop {
        match rx.recv().await {
            Ok(StateChange::ModuleProcessed {
                module,
                status,
                message,
            }) => {
                reported += 1;
                tracing::info!("[{}] {}: {}", status, module, message);
            }
            Ok(StateChange::CancelRequested) => {
                tracing::warn!("Cancellation requested, finishing modules already running");
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::debug!("Progress reporter fell behind by {} events", missed);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    reported
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
