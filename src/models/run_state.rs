use indexmap::IndexSet;

/// Progress of the current (or last) generation run.
///
/// Wrapped in `Arc<RwLock<RunState>>` by [`crate::state::StateManager`]; go
/// through its [`read()`](crate::state::StateManager::read) and
/// [`update()`](crate::state::StateManager::update) so change events are
/// emitted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunState {
    pub is_running: bool,

    /// Set by the CLI's Ctrl-C handler; checked between modules
    pub cancel_requested: bool,

    pub current_module: Option<String>,

    // Progress
    pub progress: usize,
    pub total_modules: usize,

    // Results, in completion order
    pub generated_modules: IndexSet<String>,
    pub skipped_modules: IndexSet<String>,
    pub failed_modules: IndexSet<String>,

    /// Sum of identifiers emitted by generated modules
    pub identifiers_emitted: usize,
}

impl RunState {
    /// Returns (generated, failed, skipped, total)
    pub fn run_stats(&self) -> (usize, usize, usize, usize) {
        (
            self.generated_modules.len(),
            self.failed_modules.len(),
            self.skipped_modules.len(),
            self.total_modules,
        )
    }

    /// Record a module outcome and advance the progress counter.
    ///
    /// `status` is a [`ModuleStatus::label`](crate::models::ModuleStatus::label).
    pub fn add_result(&mut self, module: String, status: &str) {
        match status {
            "generated" => {
                self.generated_modules.insert(module);
            }
            "failed" => {
                self.failed_modules.insert(module);
            }
            _ => {
                self.skipped_modules.insert(module);
            }
        }
        self.progress += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_result_counts() {
        let mut state = RunState {
            total_modules: 3,
            ..RunState::default()
        };

        state.add_result("app".to_string(), "generated");
        state.add_result("lib".to_string(), "failed");
        state.add_result("docs".to_string(), "skipped");

        assert_eq!(state.run_stats(), (1, 1, 1, 3));
        assert_eq!(state.progress, 3);
    }

    #[test]
    fn test_reset() {
        let mut state = RunState {
            is_running: true,
            cancel_requested: true,
            progress: 2,
            ..RunState::default()
        };
        state.reset();
        assert_eq!(state, RunState::default());
    }
}
