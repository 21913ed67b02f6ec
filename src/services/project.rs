//! Enumerates the modules of a project.
//!
//! [`ProjectSource`] is the seam between the generator and whatever knows the
//! project layout. [`GradleProject`] is the implementation used by the CLI: it
//! follows `settings.gradle(.kts)` include declarations, falling back to the
//! immediate subdirectories when there is no settings file.

use super::GenerationError;
use crate::config::{ConfigManager, MODULE_CONFIG_FILE, declared_asset_roots};
use crate::models::config::DEFAULT_ASSET_ROOT;
use crate::models::{ModuleDescriptor, Warning};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use regex::Regex;
use std::fs;

pub const GRADLE_BUILD_FILES: &[&str] = &["build.gradle.kts", "build.gradle"];
pub const GRADLE_SETTINGS_FILES: &[&str] = &["settings.gradle.kts", "settings.gradle"];

/// Supplies the modules of one project, in declaration order
pub trait ProjectSource: Send + Sync {
    fn root(&self) -> &Utf8Path;

    /// Every eligible module. An empty list is not an error here; the
    /// orchestrator turns it into [`GenerationError::NoEligibleModules`].
    fn modules(&self) -> Result<Vec<ModuleDescriptor>, GenerationError>;
}

/// Gradle-style project rooted at a directory
pub struct GradleProject {
    root: Utf8PathBuf,
    config_manager: ConfigManager,

    /// `include(":a", ":b")`, possibly spanning lines
    call_pattern: Regex,

    /// Groovy `include ':a', ':b'` on one line
    bare_pattern: Regex,

    /// A quoted module path inside an include declaration
    quoted_pattern: Regex,
}

impl GradleProject {
    pub fn new<P: AsRef<Utf8Path>>(root: P, config_manager: ConfigManager) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config_manager,
            call_pattern: Regex::new(r"(?s)\binclude\s*\(([^)]*)\)")
                .expect("Invalid include call regex"),
            bare_pattern: Regex::new(r"(?m)^\s*include\s+([^(\n][^\n]*)$")
                .expect("Invalid include regex"),
            quoted_pattern: Regex::new(r#"["']([^"']+)["']"#).expect("Invalid quoted regex"),
        }
    }

    /// Module paths declared in a settings script, in declaration order.
    ///
    /// `:libs:core` becomes `libs/core`. Line comments are ignored.
    pub fn parse_includes(&self, settings: &str) -> Vec<String> {
        let without_comments: String = settings
            .lines()
            .map(|line| match line.find("//") {
                Some(index) => &line[..index],
                None => line,
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut declarations: Vec<(usize, &str)> = self
            .call_pattern
            .captures_iter(&without_comments)
            .chain(self.bare_pattern.captures_iter(&without_comments))
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.start(), m.as_str()))
            .collect();
        declarations.sort_by_key(|(start, _)| *start);

        let mut modules = IndexSet::new();
        for (_, arguments) in declarations {
            for caps in self.quoted_pattern.captures_iter(arguments) {
                let path = caps[1].trim_start_matches(':').replace(':', "/");
                if !path.is_empty() {
                    modules.insert(path);
                }
            }
        }
        modules.into_iter().collect()
    }

    fn is_gradle_module(dir: &Utf8Path) -> bool {
        GRADLE_BUILD_FILES.iter().any(|f| dir.join(f).is_file())
    }

    /// A module takes part when it declares assets, or is a Gradle module
    /// that has the default asset folder
    fn is_eligible(dir: &Utf8Path) -> bool {
        dir.join(MODULE_CONFIG_FILE).is_file()
            || (Self::is_gradle_module(dir) && dir.join(DEFAULT_ASSET_ROOT).is_dir())
    }

    fn candidate_dirs(&self) -> Result<Vec<(String, Utf8PathBuf)>, GenerationError> {
        let project_error = |path: &Utf8Path, source| GenerationError::Project {
            path: path.to_path_buf(),
            source,
        };

        let root_name = self.root.file_name().unwrap_or("root").to_string();
        let mut candidates = vec![(root_name, self.root.clone())];

        let settings = GRADLE_SETTINGS_FILES
            .iter()
            .map(|f| self.root.join(f))
            .find(|p| p.is_file());

        match settings {
            Some(settings_path) => {
                let contents = fs::read_to_string(&settings_path)
                    .map_err(|e| project_error(&settings_path, e))?;
                for path in self.parse_includes(&contents) {
                    let dir = self.root.join(&path);
                    if dir.is_dir() {
                        candidates.push((path.replace('/', ":"), dir));
                    } else {
                        tracing::warn!("Included module {} has no directory at {}", path, dir);
                    }
                }
            }
            None => {
                let mut names = Vec::new();
                for entry in fs::read_dir(&self.root).map_err(|e| project_error(&self.root, e))? {
                    let entry = entry.map_err(|e| project_error(&self.root, e))?;
                    let Ok(name) = entry.file_name().into_string() else {
                        continue;
                    };
                    if !name.starts_with('.') && entry.path().is_dir() {
                        names.push(name);
                    }
                }
                names.sort();
                candidates.extend(names.into_iter().map(|name| {
                    let dir = self.root.join(&name);
                    (name, dir)
                }));
            }
        }

        Ok(candidates)
    }

    fn describe(&self, name: String, root: Utf8PathBuf) -> ModuleDescriptor {
        let mut warnings = Vec::new();

        let raw_config = match self.config_manager.load_module_config(&root) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Module {}: {:#}, using defaults", name, e);
                warnings.push(Warning::config(
                    MODULE_CONFIG_FILE,
                    format!("{:#}; using defaults", e),
                ));
                None
            }
        };

        let (asset_roots, root_warnings) = declared_asset_roots(raw_config.as_ref());
        warnings.extend(root_warnings);

        ModuleDescriptor {
            name,
            root,
            asset_roots,
            raw_config,
            warnings,
        }
    }
}

impl ProjectSource for GradleProject {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn modules(&self) -> Result<Vec<ModuleDescriptor>, GenerationError> {
        if !self.root.is_dir() {
            return Err(GenerationError::Project {
                path: self.root.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let modules: Vec<ModuleDescriptor> = self
            .candidate_dirs()?
            .into_iter()
            .filter(|(_, dir)| Self::is_eligible(dir))
            .map(|(name, dir)| self.describe(name, dir))
            .collect();

        tracing::info!("Found {} eligible module(s) in {}", modules.len(), self.root);
        Ok(modules)
    }
}
