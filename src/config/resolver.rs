//! Merges a module's `assetgen` block with [`GlobalSettings`] and hard-coded
//! defaults into an [`EffectiveConfig`].
//!
//! Resolution never fails. Each field walks the tiers module → global →
//! default and takes the first value that has the right type and passes
//! validation; every rejected value is recorded as a [`Warning::Config`].

use crate::models::config::{
    DEFAULT_CLASS_NAME, DEFAULT_OUTPUT_DIR, KEY_AUTO_DETECTION, KEY_CLASS_NAME,
    KEY_CONFIGURATION_MAP, KEY_FILENAME_SPLIT_PATTERN, KEY_NAMED_WITH_PARENT, KEY_OUTPUT_DIR,
    KEY_OUTPUT_FILENAME, KEY_PACKAGE_NAME, KEY_PATH_IGNORE, OUTPUT_EXTENSION,
};
use crate::models::{EffectiveConfig, GlobalSettings, SplitPattern, Warning};
use crate::services::discovery::normalize_ignore_rule;
use crate::services::naming::{is_identifier, is_reserved};
use camino::{Utf8Component, Utf8PathBuf};
use indexmap::IndexSet;
use serde_yaml_ng::{Mapping, Value};

/// Outcome of [`resolve`]: the settings plus every fallback that was taken
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub config: EffectiveConfig,
    pub warnings: Vec<Warning>,
}

/// Resolve the effective settings for one module.
///
/// # Arguments
/// * `raw` - The module's parsed `assetgen.yaml`, if any
/// * `defaults` - User-level settings, the middle tier
pub fn resolve(raw: Option<&Mapping>, defaults: &GlobalSettings) -> Resolved {
    let mut resolver = Resolver::default();
    let block = resolver.block(raw);
    let field = |key: &str| block.and_then(|b| b.get(key));

    let auto_detection = resolver.settle(
        KEY_AUTO_DETECTION,
        field(KEY_AUTO_DETECTION),
        read_bool,
        "a boolean",
        defaults.auto_detection.as_ref(),
        Ok,
        || true,
    );

    let named_with_parent = resolver.settle(
        KEY_NAMED_WITH_PARENT,
        field(KEY_NAMED_WITH_PARENT),
        read_bool,
        "a boolean",
        defaults.named_with_parent.as_ref(),
        Ok,
        || true,
    );

    let class_name = resolver.settle(
        KEY_CLASS_NAME,
        field(KEY_CLASS_NAME),
        read_string,
        "a string",
        defaults.class_name.as_ref(),
        check_class_name,
        || DEFAULT_CLASS_NAME.to_string(),
    );

    let split_pattern = resolver.settle(
        KEY_FILENAME_SPLIT_PATTERN,
        field(KEY_FILENAME_SPLIT_PATTERN),
        read_string,
        "a string",
        defaults.filename_split_pattern.as_ref(),
        |pattern| {
            SplitPattern::new(&pattern)
                .map_err(|e| format!("`{}` is not a valid regex ({}), using the default", pattern, e))
        },
        SplitPattern::default,
    );

    let path_ignore = resolver.settle(
        KEY_PATH_IGNORE,
        field(KEY_PATH_IGNORE),
        read_string_list,
        "a list of strings",
        defaults.path_ignore.as_ref(),
        |rules| Ok(collect_ignore_rules(rules)),
        IndexSet::new,
    );

    let output_dir = resolver.settle(
        KEY_OUTPUT_DIR,
        field(KEY_OUTPUT_DIR),
        read_string,
        "a string",
        defaults.output_dir.as_ref(),
        check_output_dir,
        || Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
    );

    let output_file_name = resolver.settle(
        KEY_OUTPUT_FILENAME,
        field(KEY_OUTPUT_FILENAME),
        read_string,
        "a string",
        defaults.output_filename.as_ref(),
        check_output_filename,
        || DEFAULT_CLASS_NAME.to_lowercase(),
    );

    let package_name = resolver.settle(
        KEY_PACKAGE_NAME,
        field(KEY_PACKAGE_NAME),
        read_string,
        "a string",
        defaults.package_name.as_ref(),
        check_package_name,
        String::new,
    );

    Resolved {
        config: EffectiveConfig {
            auto_detection,
            named_with_parent,
            class_name,
            split_pattern,
            path_ignore,
            output_dir,
            output_file_name,
            package_name,
        },
        warnings: resolver.warnings,
    }
}

#[derive(Default)]
struct Resolver {
    warnings: Vec<Warning>,
}

impl Resolver {
    fn block<'a>(&mut self, raw: Option<&'a Mapping>) -> Option<&'a Mapping> {
        match raw?.get(KEY_CONFIGURATION_MAP)? {
            Value::Mapping(block) => Some(block),
            Value::Null => None,
            other => {
                self.warnings.push(Warning::config(
                    KEY_CONFIGURATION_MAP,
                    format!("expected a mapping, found {}; using defaults", describe(other)),
                ));
                None
            }
        }
    }

    /// First tier value that reads as `T` and passes `check` wins.
    #[allow(clippy::too_many_arguments)]
    fn settle<T, U>(
        &mut self,
        key: &str,
        module: Option<&Value>,
        read: fn(&Value) -> Option<T>,
        expected: &str,
        global: Option<&Value>,
        check: impl Fn(T) -> Result<U, String>,
        fallback: impl FnOnce() -> U,
    ) -> U {
        if let Some(resolved) = self.try_tier(key.to_string(), module, read, expected, &check) {
            return resolved;
        }
        let global_key = format!("global.{}", key);
        if let Some(resolved) = self.try_tier(global_key, global, read, expected, &check) {
            return resolved;
        }
        fallback()
    }

    fn try_tier<T, U>(
        &mut self,
        key: String,
        value: Option<&Value>,
        read: fn(&Value) -> Option<T>,
        expected: &str,
        check: &impl Fn(T) -> Result<U, String>,
    ) -> Option<U> {
        let value = value.filter(|v| !v.is_null())?;
        let message = match read(value) {
            Some(candidate) => match check(candidate) {
                Ok(resolved) => return Some(resolved),
                Err(message) => message,
            },
            None => format!("expected {}, found {}", expected, describe(value)),
        };
        self.warnings.push(Warning::config(key, message));
        None
    }
}

fn read_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

fn read_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn read_string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_sequence()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn check_class_name(name: String) -> Result<String, String> {
    let name = name.trim().to_string();
    if is_identifier(&name) && !is_reserved(&name) {
        Ok(name)
    } else {
        Err(format!("`{}` is not a valid class name", name))
    }
}

fn collect_ignore_rules(rules: Vec<String>) -> IndexSet<String> {
    rules
        .iter()
        .map(|rule| normalize_ignore_rule(rule))
        .filter(|rule| !rule.is_empty())
        .collect()
}

fn check_output_dir(dir: String) -> Result<Utf8PathBuf, String> {
    let normalized = dir.trim().replace('\\', "/");
    let path = Utf8PathBuf::from(normalized.trim_start_matches("./"));

    let escapes = path.components().any(|c| {
        matches!(
            c,
            Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_)
        )
    });
    if escapes {
        return Err(format!(
            "`{}` must be a relative path inside the module",
            dir
        ));
    }
    Ok(path)
}

fn check_output_filename(name: String) -> Result<String, String> {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(&format!(".{}", OUTPUT_EXTENSION))
        .unwrap_or(trimmed);

    if stem.is_empty() || stem.contains(['/', '\\']) {
        Err(format!("`{}` is not a valid file name", name))
    } else {
        Ok(stem.to_string())
    }
}

fn check_package_name(name: String) -> Result<String, String> {
    let name = name.trim().to_string();
    if name.is_empty()
        || name
            .split('.')
            .all(|segment| is_identifier(segment) && !is_reserved(segment))
    {
        Ok(name)
    } else {
        Err(format!("`{}` is not a valid package name", name))
    }
}
