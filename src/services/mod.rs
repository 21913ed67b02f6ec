//! Services module - the generation pipeline.
//!
//! The services are independent of the CLI: every input is an explicit
//! parameter and all filesystem access goes through [`AssetFs`], so the
//! pipeline can be driven by any host and tested against a mock tree.
//!
//! # Components
//!
//! - [`ProjectSource`] / [`GradleProject`]: enumerate a project's modules and
//!   load each module's `assetgen.yaml`
//! - [`discover`]: walk declared asset roots with ignore rules, in a stable order
//! - [`NameSynthesizer`]: derive unique Kotlin identifiers from asset paths
//! - [`emitter`]: render the Kotlin object and write it atomically, skipping
//!   unchanged files
//! - [`GenerationOrchestrator`]: run the pipeline per module, sequentially or
//!   on a bounded worker pool, and report a [`GenerationResult`](crate::models::GenerationResult)
//!   per module
//!
//! # Usage Example
//!
//! ```ignore
//! use assetgen::config::ConfigManager;
//! use assetgen::services::{GenerationOrchestrator, GradleProject, LocalFs};
//! use std::sync::Arc;
//!
//! let config_manager = ConfigManager::new(None::<&str>);
//! let defaults = config_manager.load_global_settings()?;
//! let project = GradleProject::new("/path/to/project", config_manager);
//!
//! let orchestrator = GenerationOrchestrator::new(Arc::new(LocalFs), defaults);
//! let results = orchestrator.generate_all(&project)?;
//! ```

pub mod discovery;
pub mod emitter;
pub mod error;
pub mod fs;
pub mod naming;
pub mod orchestrator;
pub mod project;

pub use discovery::{Discovery, discover};
pub use emitter::{Emission, emit, render};
pub use error::GenerationError;
pub use fs::{AssetFs, DirListing, EntryKind, LocalFs};
pub use naming::NameSynthesizer;
pub use orchestrator::{GenerationOrchestrator, Trigger};
pub use project::{GradleProject, ProjectSource};
