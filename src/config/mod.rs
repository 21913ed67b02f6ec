//! Loading of structured configuration.
//!
//! - [`ConfigManager`] reads each module's `assetgen.yaml` and the user-level
//!   [`GlobalSettings`] (YAML file layered with `ASSETGEN_*` environment variables).
//! - [`resolver`] merges both into an [`EffectiveConfig`](crate::models::EffectiveConfig).

pub mod resolver;

pub use resolver::{Resolved, resolve};

use crate::models::config::{DEFAULT_ASSET_ROOT, KEY_ASSETS};
use crate::models::{GlobalSettings, Warning};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml_ng::{Mapping, Value};
use std::fs;

/// File name of the per-module document
pub const MODULE_CONFIG_FILE: &str = "assetgen.yaml";

/// Prefix of environment variables overriding global settings
pub const ENV_PREFIX: &str = "ASSETGEN";

/// Configuration manager for the per-module documents and the global defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    settings_path: Option<Utf8PathBuf>,
}

impl ConfigManager {
    /// Create a new ConfigManager.
    ///
    /// # Arguments
    /// * `settings_path` - Optional YAML file holding the user's global defaults
    pub fn new<P: AsRef<Utf8Path>>(settings_path: Option<P>) -> Self {
        Self {
            settings_path: settings_path.map(|p| p.as_ref().to_path_buf()),
        }
    }

    /// Location of a module's document
    pub fn module_config_path(&self, module_root: &Utf8Path) -> Utf8PathBuf {
        module_root.join(MODULE_CONFIG_FILE)
    }

    /// Load a module's `assetgen.yaml`.
    ///
    /// # Returns
    /// `Ok(None)` when the module has no document or it is empty, the parsed
    /// top-level mapping otherwise
    pub fn load_module_config(&self, module_root: &Utf8Path) -> Result<Option<Mapping>> {
        let path = self.module_config_path(module_root);
        if !path.exists() {
            tracing::debug!("No module config at {}", path);
            return Ok(None);
        }

        let file_contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read module config: {}", path))?;

        let document: Value = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse module config: {}", path))?;

        match document {
            Value::Mapping(mapping) => {
                tracing::debug!("Loaded module config from {}", path);
                Ok(Some(mapping))
            }
            Value::Null => Ok(None),
            _ => bail!("Module config {} must be a mapping at the top level", path),
        }
    }

    /// Load the global defaults.
    ///
    /// A missing settings file is not an error; environment variables still apply.
    /// Values are not type-checked here, a mistyped one is reported by
    /// [`resolve`] and replaced by the hard-coded default.
    pub fn load_global_settings(&self) -> Result<GlobalSettings> {
        self.load_global_settings_with_env(None)
    }

    /// Same as [`load_global_settings`](Self::load_global_settings) with an
    /// explicit environment instead of the process environment.
    pub fn load_global_settings_with_env(
        &self,
        env: Option<config::Map<String, String>>,
    ) -> Result<GlobalSettings> {
        let file_settings = match &self.settings_path {
            Some(path) if path.exists() => {
                let file_contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read global settings: {}", path))?;

                let document: Value = serde_yaml_ng::from_str(&file_contents)
                    .with_context(|| format!("Failed to parse global settings: {}", path))?;

                tracing::info!("Loaded global settings from {}", path);
                match document {
                    Value::Mapping(mapping) => GlobalSettings::from_mapping(&mapping),
                    Value::Null => GlobalSettings::default(),
                    _ => bail!("Global settings {} must be a mapping at the top level", path),
                }
            }
            Some(path) => {
                tracing::warn!("Global settings file not found at {}, using defaults", path);
                GlobalSettings::default()
            }
            None => GlobalSettings::default(),
        };

        let env_layer = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("path_ignore")
                    .source(env),
            )
            .build()
            .context("Failed to read ASSETGEN_* environment")?
            .try_deserialize::<Mapping>()
            .context("Failed to read ASSETGEN_* environment")?;

        Ok(file_settings.overlay(GlobalSettings::from_mapping(&env_layer)))
    }

    /// Path of the settings file, if one was configured
    pub fn settings_path(&self) -> Option<&Utf8Path> {
        self.settings_path.as_deref()
    }
}

/// Read the top-level `assets` list of a module document.
///
/// Absent or `null` means the default root. A single string is accepted as a
/// one-element list.
pub fn declared_asset_roots(raw: Option<&Mapping>) -> (Vec<String>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let default_roots = || vec![DEFAULT_ASSET_ROOT.to_string()];

    let roots = match raw.and_then(|m| m.get(KEY_ASSETS)) {
        None | Some(Value::Null) => default_roots(),
        Some(Value::String(root)) => vec![root.clone()],
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|item| match item.as_str() {
                Some(root) => Some(root.to_string()),
                None => {
                    warnings.push(Warning::config(
                        KEY_ASSETS,
                        format!("ignoring non-string entry {:?}", item),
                    ));
                    None
                }
            })
            .collect(),
        Some(_) => {
            warnings.push(Warning::config(
                KEY_ASSETS,
                format!("expected a list of paths, using `{}`", DEFAULT_ASSET_ROOT),
            ));
            default_roots()
        }
    };

    (roots, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_module() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let module_root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, module_root)
    }

    #[test]
    fn test_missing_module_config_is_none() {
        let (_temp_dir, module_root) = create_test_module();
        let manager = ConfigManager::default();
        assert!(manager.load_module_config(&module_root).unwrap().is_none());
    }

    #[test]
    fn test_load_module_config() {
        let (_temp_dir, module_root) = create_test_module();
        fs::write(
            module_root.join(MODULE_CONFIG_FILE),
            "assets:\n  - images/\nassetgen:\n  className: R\n",
        )
        .unwrap();

        let manager = ConfigManager::default();
        let mapping = manager.load_module_config(&module_root).unwrap().unwrap();

        assert!(mapping.contains_key("assets"));
        assert!(mapping.contains_key("assetgen"));
    }

    #[test]
    fn test_malformed_module_config_is_error() {
        let (_temp_dir, module_root) = create_test_module();
        fs::write(module_root.join(MODULE_CONFIG_FILE), "assets: [unclosed\n").unwrap();

        let manager = ConfigManager::default();
        let error = manager.load_module_config(&module_root).unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to parse module config"));
    }

    #[test]
    fn test_scalar_module_config_is_error() {
        let (_temp_dir, module_root) = create_test_module();
        fs::write(module_root.join(MODULE_CONFIG_FILE), "just a string\n").unwrap();

        assert!(ConfigManager::default().load_module_config(&module_root).is_err());
    }

    #[test]
    fn test_global_settings_missing_file_defaults() {
        let manager = ConfigManager::new(Some("/definitely/not/here.yaml"));
        let settings = manager
            .load_global_settings_with_env(Some(config::Map::new()))
            .unwrap();
        assert_eq!(settings, GlobalSettings::default());
    }

    #[test]
    fn test_global_settings_env_overrides_file() {
        let (_temp_dir, dir) = create_test_module();
        let settings_path = dir.join("settings.yaml");
        fs::write(
            &settings_path,
            "className: FileAssets\nnamedWithParent: false\n",
        )
        .unwrap();

        let mut env = config::Map::new();
        env.insert("ASSETGEN_CLASS_NAME".to_string(), "EnvAssets".to_string());
        env.insert("ASSETGEN_PATH_IGNORE".to_string(), "raw,tmp".to_string());

        let settings = ConfigManager::new(Some(&settings_path))
            .load_global_settings_with_env(Some(env))
            .unwrap();

        assert_eq!(settings.class_name, Some(Value::from("EnvAssets")));
        assert_eq!(settings.named_with_parent, Some(Value::from(false)));
        assert_eq!(settings.path_ignore, Some(Value::from(vec!["raw", "tmp"])));
    }

    #[test]
    fn test_declared_asset_roots() {
        let (roots, warnings) = declared_asset_roots(None);
        assert_eq!(roots, vec!["assets"]);
        assert!(warnings.is_empty());

        let mapping: Mapping = serde_yaml_ng::from_str("assets: [images/, 7, fonts/a.ttf]").unwrap();
        let (roots, warnings) = declared_asset_roots(Some(&mapping));
        assert_eq!(roots, vec!["images/", "fonts/a.ttf"]);
        assert_eq!(warnings.len(), 1);

        let mapping: Mapping = serde_yaml_ng::from_str("assets: {a: b}").unwrap();
        let (roots, warnings) = declared_asset_roots(Some(&mapping));
        assert_eq!(roots, vec!["assets"]);
        assert_eq!(warnings.len(), 1);
    }
}
