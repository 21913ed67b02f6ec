//! Data models for assetgen.
//!
//! - [`EffectiveConfig`]: Per-module settings after merging module config, [`GlobalSettings`] and defaults
//! - [`ModuleDescriptor`] / [`ModuleContext`]: One buildable unit and its borrowed per-run view
//! - [`AssetEntry`]: A discovered asset file or declared asset folder
//! - [`GeneratedIdentifier`]: A constant name bound to an asset path
//! - [`GenerationResult`] / [`RunSummary`]: Per-module and per-run diagnostics
//! - [`RunState`]: Live progress of a run, owned by [`StateManager`](crate::state::StateManager)
//!
//! None of these are persisted beyond a run except the artifact the emitter writes.

pub mod asset;
pub mod config;
pub mod module;
pub mod report;
pub mod run_state;

pub use asset::{AssetEntry, GeneratedIdentifier};
pub use config::{EffectiveConfig, GlobalSettings, SplitPattern};
pub use module::{ModuleContext, ModuleDescriptor};
pub use report::{GenerationResult, ModuleStatus, RunOutcome, RunSummary, Warning};
pub use run_state::RunState;
