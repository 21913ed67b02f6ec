use crate::services::GenerationError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Recoverable diagnostic recorded during a module's generation.
///
/// Warnings never stop a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A configuration value was malformed and a fallback was used
    #[error("config `{key}`: {message}")]
    Config { key: String, message: String },

    /// An asset root or an entry below it could not be used
    #[error("asset `{path}`: {message}")]
    Discovery { path: String, message: String },
}

impl Warning {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn discovery(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Discovery {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Final state of one module in a run
#[derive(Debug)]
pub enum ModuleStatus {
    Generated,
    Skipped(String),
    Failed(GenerationError),
}

impl ModuleStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Diagnostic record for one module. Not persisted beyond the run.
#[derive(Debug)]
pub struct GenerationResult {
    pub module: String,
    pub module_root: Utf8PathBuf,

    /// Absolute location of the artifact, once the module's config was resolved
    pub output: Option<Utf8PathBuf>,
    pub identifier_count: usize,

    /// False when the artifact already held identical content
    pub changed: bool,
    pub warnings: Vec<Warning>,
    pub status: ModuleStatus,
}

impl GenerationResult {
    /// Result for a module that produced nothing (skipped, or failed before
    /// its config was resolved)
    pub fn unprocessed(
        module: impl Into<String>,
        module_root: impl Into<Utf8PathBuf>,
        status: ModuleStatus,
    ) -> Self {
        Self {
            module: module.into(),
            module_root: module_root.into(),
            output: None,
            identifier_count: 0,
            changed: false,
            warnings: Vec::new(),
            status,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.status, ModuleStatus::Generated)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ModuleStatus::Failed(_))
    }

    /// One-line description used in progress events and the run summary
    pub fn message(&self) -> String {
        match &self.status {
            ModuleStatus::Generated => {
                let location = self
                    .output
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                if self.changed {
                    format!("{} identifiers written to {}", self.identifier_count, location)
                } else {
                    format!("{} identifiers, {} up to date", self.identifier_count, location)
                }
            }
            ModuleStatus::Skipped(reason) => format!("skipped: {}", reason),
            ModuleStatus::Failed(error) => format!("failed: {}", error),
        }
    }
}

/// Overall outcome of a run, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every processed module was generated (or skipped on purpose)
    Success,
    /// Some modules failed, others were generated
    PartialSuccess,
    /// Nothing could be generated
    Failure,
}

/// Aggregate of a run's results plus the single user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: usize,
    pub notification: String,
}

impl RunSummary {
    pub fn from_results(results: &[GenerationResult]) -> Self {
        let generated = results.iter().filter(|r| r.is_generated()).count();
        let failed = results.iter().filter(|r| r.is_failed()).count();
        let skipped = results.len() - generated - failed;
        let warnings = results.iter().map(|r| r.warnings.len()).sum();

        let outcome = if failed == 0 {
            RunOutcome::Success
        } else if generated > 0 {
            RunOutcome::PartialSuccess
        } else {
            RunOutcome::Failure
        };

        let mut notification = match outcome {
            RunOutcome::Success => format!(
                "Asset constants generated for {} module(s){}",
                generated,
                if skipped > 0 {
                    format!(", {} skipped", skipped)
                } else {
                    String::new()
                }
            ),
            RunOutcome::PartialSuccess => format!(
                "Asset constants generated for {} module(s), {} failed:",
                generated, failed
            ),
            RunOutcome::Failure => format!("Asset generation failed for {} module(s):", failed),
        };

        for result in results.iter().filter(|r| r.is_failed()) {
            notification.push_str(&format!("\n  {}: {}", result.module, result.message()));
        }

        Self {
            outcome,
            generated,
            skipped,
            failed,
            warnings,
            notification,
        }
    }

    /// Summary for a run that could not start, e.g. no eligible modules
    pub fn from_error(error: &GenerationError) -> Self {
        Self {
            outcome: RunOutcome::Failure,
            generated: 0,
            skipped: 0,
            failed: 0,
            warnings: 0,
            notification: error.to_string(),
        }
    }
}
