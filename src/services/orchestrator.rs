//! Runs the generation pipeline over every module of a project.
//!
//! Per module: resolve config → discover assets → synthesize names → emit the
//! artifact. Each module's outcome is captured in its own
//! [`GenerationResult`]; a failing module never stops the others.
//!
//! Two drivers share the per-module pipeline:
//! - [`generate_all`](GenerationOrchestrator::generate_all) processes modules
//!   one after another on the calling thread.
//! - [`generate_all_parallel`](GenerationOrchestrator::generate_all_parallel)
//!   runs up to `jobs` modules at once on tokio's blocking pool. Modules that
//!   share an output path are serialised by a per-artifact lock, and results
//!   come back in module declaration order.

use super::GenerationError;
use super::discovery::discover;
use super::emitter::emit;
use super::fs::AssetFs;
use super::naming::NameSynthesizer;
use super::project::ProjectSource;
use crate::config::{Resolved, resolve};
use crate::metrics::Metrics;
use crate::models::{
    GenerationResult, GlobalSettings, ModuleContext, ModuleDescriptor, ModuleStatus,
};
use crate::state::StateManager;
use camino::Utf8PathBuf;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;

pub const CANCELLED_REASON: &str = "cancelled";
pub const AUTO_DETECTION_DISABLED_REASON: &str = "autoDetection is disabled for this module";

/// Who started the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    /// Explicit user request; every module is processed
    #[default]
    Manual,

    /// Tool or hook invocation; modules with `autoDetection: false` are skipped
    Automatic,
}

pub struct GenerationOrchestrator {
    fs: Arc<dyn AssetFs>,
    defaults: Arc<GlobalSettings>,
    state: StateManager,
    metrics: Arc<Metrics>,
    trigger: Trigger,
}

impl GenerationOrchestrator {
    /// Create an orchestrator with fresh state and metrics and a manual trigger
    pub fn new(fs: Arc<dyn AssetFs>, defaults: GlobalSettings) -> Self {
        Self {
            fs,
            defaults: Arc::new(defaults),
            state: StateManager::new(),
            metrics: Arc::new(Metrics::new()),
            trigger: Trigger::Manual,
        }
    }

    /// Share an existing state manager, e.g. one a Ctrl-C handler can cancel
    pub fn with_state(mut self, state: StateManager) -> Self {
        self.state = state;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Generate every module of `project`, one at a time.
    ///
    /// Cancellation is checked before each module; modules not started are
    /// reported as skipped.
    ///
    /// # Errors
    /// [`GenerationError::Project`] when the project layout cannot be read,
    /// [`GenerationError::NoEligibleModules`] when it has no modules.
    pub fn generate_all(
        &self,
        project: &dyn ProjectSource,
    ) -> Result<Vec<GenerationResult>, GenerationError> {
        let modules = self.eligible_modules(project)?;
        self.state.start_run(modules.len());

        let mut results = Vec::with_capacity(modules.len());
        for descriptor in &modules {
            let result = if self.state.is_cancelled() {
                GenerationResult::unprocessed(
                    descriptor.name.as_str(),
                    descriptor.root.as_path(),
                    ModuleStatus::Skipped(CANCELLED_REASON.to_string()),
                )
            } else {
                self.state.set_current_module(descriptor.name.clone());
                self.generate_module(descriptor)
            };
            self.record(&result);
            results.push(result);
        }

        self.state.finish_run();
        Ok(results)
    }

    /// Generate every module of `project` with at most `jobs` running at once.
    ///
    /// Must be called from within a tokio runtime. Results are in module
    /// declaration order regardless of completion order.
    pub async fn generate_all_parallel(
        self: Arc<Self>,
        project: &dyn ProjectSource,
        jobs: usize,
    ) -> Result<Vec<GenerationResult>, GenerationError> {
        let modules = self.eligible_modules(project)?;
        let jobs = jobs.max(1);
        self.state.start_run(modules.len());

        tracing::info!(
            "Generating {} module(s) with up to {} worker(s)",
            modules.len(),
            jobs
        );

        let semaphore = Arc::new(Semaphore::new(jobs));
        let mut artifact_locks: HashMap<Utf8PathBuf, Arc<Mutex<()>>> = HashMap::new();
        let mut tasks = Vec::with_capacity(modules.len());

        for descriptor in modules {
            let lock = Arc::clone(
                artifact_locks
                    .entry(self.output_location(&descriptor))
                    .or_default(),
            );
            let name = descriptor.name.clone();
            let root = descriptor.root.clone();
            let orchestrator = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);

            let task = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return GenerationResult::unprocessed(
                        descriptor.name,
                        descriptor.root,
                        ModuleStatus::Skipped(CANCELLED_REASON.to_string()),
                    );
                };

                if orchestrator.state.is_cancelled() {
                    tracing::warn!("Skipping module {}: run cancelled", descriptor.name);
                    return GenerationResult::unprocessed(
                        descriptor.name,
                        descriptor.root,
                        ModuleStatus::Skipped(CANCELLED_REASON.to_string()),
                    );
                }

                let worker = Arc::clone(&orchestrator);
                let (module, module_root) = (descriptor.name.clone(), descriptor.root.clone());
                let joined = tokio::task::spawn_blocking(move || {
                    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                    worker.state.set_current_module(descriptor.name.clone());
                    worker.generate_module(&descriptor)
                })
                .await;

                match joined {
                    Ok(result) => result,
                    Err(e) => GenerationResult::unprocessed(
                        module.clone(),
                        module_root,
                        ModuleStatus::Failed(GenerationError::Worker {
                            module,
                            reason: e.to_string(),
                        }),
                    ),
                }
            });

            tasks.push((name, root, task));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (module, module_root, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Task join error for module {}: {}", module, e);
                    GenerationResult::unprocessed(
                        module.as_str(),
                        module_root,
                        ModuleStatus::Failed(GenerationError::Worker {
                            module: module.clone(),
                            reason: e.to_string(),
                        }),
                    )
                }
            };
            self.record(&result);
            results.push(result);
        }

        self.state.finish_run();
        Ok(results)
    }

    /// Run the full pipeline for one module. Never panics on I/O problems;
    /// every failure ends up in the returned result.
    pub fn generate_module(&self, descriptor: &ModuleDescriptor) -> GenerationResult {
        let started = Instant::now();
        let context = ModuleContext::new(descriptor);

        let Resolved { config, warnings } = resolve(context.raw_config, &self.defaults);

        let mut result =
            GenerationResult::unprocessed(context.name, context.module_root, ModuleStatus::Generated);
        result.warnings = descriptor.warnings.clone();
        result.warnings.extend(warnings);

        if self.trigger == Trigger::Automatic && !config.auto_detection {
            tracing::info!("Skipping module {}: autoDetection is off", context.name);
            result.status = ModuleStatus::Skipped(AUTO_DETECTION_DISABLED_REASON.to_string());
            return result;
        }

        let output_relative = config.output_relative_path();
        let output = context.module_root.join(&output_relative);
        result.output = Some(output.clone());

        // The artifact may sit under an asset root; never name it
        let mut path_ignore = config.path_ignore.clone();
        path_ignore.insert(output_relative.as_str().replace('\\', "/"));

        let discovery = match discover(
            self.fs.as_ref(),
            context.module_root,
            context.asset_roots,
            &path_ignore,
        ) {
            Ok(discovery) => discovery,
            Err(e) => {
                tracing::error!("Module {}: {}", context.name, e);
                result.status = ModuleStatus::Failed(e);
                self.metrics.record_generation_time(started.elapsed());
                return result;
            }
        };
        result.warnings.extend(discovery.warnings);

        let identifiers = NameSynthesizer::new(&config).synthesize(&discovery.entries);

        match emit(self.fs.as_ref(), &identifiers, &config, &output) {
            Ok(emission) => {
                result.identifier_count = emission.identifier_count;
                result.changed = emission.changed;
            }
            Err(e) => {
                tracing::error!("Module {}: {}", context.name, e);
                result.status = ModuleStatus::Failed(e);
            }
        }

        self.metrics.record_generation_time(started.elapsed());
        result
    }

    fn eligible_modules(
        &self,
        project: &dyn ProjectSource,
    ) -> Result<Vec<ModuleDescriptor>, GenerationError> {
        let modules = project.modules()?;
        if modules.is_empty() {
            tracing::warn!("No eligible modules under {}", project.root());
            return Err(GenerationError::NoEligibleModules(project.root().to_path_buf()));
        }
        Ok(modules)
    }

    /// Absolute artifact path a module will be written to
    fn output_location(&self, descriptor: &ModuleDescriptor) -> Utf8PathBuf {
        let Resolved { config, .. } = resolve(descriptor.raw_config.as_ref(), &self.defaults);
        descriptor.root.join(config.output_relative_path())
    }

    /// Publish one module's outcome to logs, metrics and run state
    fn record(&self, result: &GenerationResult) {
        for warning in &result.warnings {
            tracing::warn!("Module {}: {}", result.module, warning);
        }
        self.metrics.record_warnings(result.warnings.len());

        match &result.status {
            ModuleStatus::Generated => {
                self.metrics
                    .record_module_generated(result.identifier_count, result.changed);
                tracing::info!("Module {}: {}", result.module, result.message());
            }
            ModuleStatus::Skipped(_) => self.metrics.record_module_skipped(),
            ModuleStatus::Failed(_) => self.metrics.record_module_failed(),
        }

        self.state.add_module_result(
            result.module.clone(),
            result.status.label(),
            result.message(),
            result.identifier_count,
        );
    }
}
