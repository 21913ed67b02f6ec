use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that stop a module's generation, or the whole run.
///
/// Everything except [`NoEligibleModules`](Self::NoEligibleModules) and
/// [`Project`](Self::Project) is scoped to a single module and lands in that
/// module's [`GenerationResult`](crate::models::GenerationResult).
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No eligible modules found under {0}")]
    NoEligibleModules(Utf8PathBuf),

    #[error("Failed to read project layout at {path}: {source}")]
    Project {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list asset directory {path}: {source}")]
    Discovery {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Emission {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker for module {module} stopped unexpectedly: {reason}")]
    Worker { module: String, reason: String },
}
