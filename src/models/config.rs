use camino::Utf8PathBuf;
use indexmap::IndexSet;
use regex::Regex;
use serde_yaml_ng::{Mapping, Value};
use std::fmt;

/// Name of the configuration block inside a module's `assetgen.yaml`
pub const KEY_CONFIGURATION_MAP: &str = "assetgen";

/// Top-level key listing the module's asset roots
pub const KEY_ASSETS: &str = "assets";

pub const KEY_AUTO_DETECTION: &str = "autoDetection";
pub const KEY_NAMED_WITH_PARENT: &str = "namedWithParent";
pub const KEY_CLASS_NAME: &str = "className";
pub const KEY_FILENAME_SPLIT_PATTERN: &str = "filenameSplitPattern";
pub const KEY_PATH_IGNORE: &str = "pathIgnore";
pub const KEY_OUTPUT_DIR: &str = "outputDir";
pub const KEY_OUTPUT_FILENAME: &str = "outputFilename";
pub const KEY_PACKAGE_NAME: &str = "packageName";

pub const DEFAULT_CLASS_NAME: &str = "Assets";
pub const DEFAULT_FILENAME_SPLIT_PATTERN: &str = "[-_]";
pub const DEFAULT_OUTPUT_DIR: &str = "src/main/kotlin/generated";
pub const DEFAULT_ASSET_ROOT: &str = "assets";

/// Extension of the generated artifact
pub const OUTPUT_EXTENSION: &str = "kt";

/// User-level defaults, the middle tier between a module's own block and the
/// hard-coded defaults.
///
/// Loaded by [`ConfigManager::load_global_settings`](crate::config::ConfigManager::load_global_settings)
/// from an optional YAML file layered with `ASSETGEN_*` environment variables.
/// Values are kept as raw YAML and only type-checked during resolution, so a
/// mistyped default costs a warning rather than the whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSettings {
    pub auto_detection: Option<Value>,
    pub named_with_parent: Option<Value>,
    pub class_name: Option<Value>,
    pub filename_split_pattern: Option<Value>,
    pub path_ignore: Option<Value>,
    pub output_dir: Option<Value>,
    pub output_filename: Option<Value>,
    pub package_name: Option<Value>,
}

impl GlobalSettings {
    /// Pick the known keys out of a settings layer.
    ///
    /// Each key is accepted in the camelCase spelling used in module documents,
    /// in snake_case (as produced by environment variables) and all lowercase.
    /// Unknown keys and `null` values are ignored.
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let field = |key: &str| lookup(mapping, key);
        Self {
            auto_detection: field(KEY_AUTO_DETECTION),
            named_with_parent: field(KEY_NAMED_WITH_PARENT),
            class_name: field(KEY_CLASS_NAME),
            filename_split_pattern: field(KEY_FILENAME_SPLIT_PATTERN),
            path_ignore: field(KEY_PATH_IGNORE),
            output_dir: field(KEY_OUTPUT_DIR),
            output_filename: field(KEY_OUTPUT_FILENAME),
            package_name: field(KEY_PACKAGE_NAME),
        }
    }

    /// Fields set in `upper` replace the ones in `self`
    pub fn overlay(self, upper: GlobalSettings) -> GlobalSettings {
        GlobalSettings {
            auto_detection: upper.auto_detection.or(self.auto_detection),
            named_with_parent: upper.named_with_parent.or(self.named_with_parent),
            class_name: upper.class_name.or(self.class_name),
            filename_split_pattern: upper.filename_split_pattern.or(self.filename_split_pattern),
            path_ignore: upper.path_ignore.or(self.path_ignore),
            output_dir: upper.output_dir.or(self.output_dir),
            output_filename: upper.output_filename.or(self.output_filename),
            package_name: upper.package_name.or(self.package_name),
        }
    }
}

fn lookup(mapping: &Mapping, camel_key: &str) -> Option<Value> {
    let spellings = [
        camel_key.to_string(),
        snake_case(camel_key),
        camel_key.to_lowercase(),
    ];
    spellings
        .iter()
        .find_map(|key| mapping.get(key.as_str()))
        .filter(|value| !value.is_null())
        .cloned()
}

fn snake_case(camel_key: &str) -> String {
    let mut snake = String::with_capacity(camel_key.len() + 4);
    for c in camel_key.chars() {
        if c.is_ascii_uppercase() {
            snake.push('_');
            snake.push(c.to_ascii_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// A filename split pattern that is known to compile.
///
/// Equality compares the pattern source.
#[derive(Clone)]
pub struct SplitPattern(Regex);

impl SplitPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl Default for SplitPattern {
    fn default() -> Self {
        Self(Regex::new(DEFAULT_FILENAME_SPLIT_PATTERN).expect("Invalid default split regex"))
    }
}

impl PartialEq for SplitPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for SplitPattern {}

impl fmt::Debug for SplitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SplitPattern").field(&self.as_str()).finish()
    }
}

/// Per-module settings after merging module config, global settings and
/// hard-coded defaults. Every field is concrete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub auto_detection: bool,
    pub named_with_parent: bool,
    pub class_name: String,
    pub split_pattern: SplitPattern,
    pub path_ignore: IndexSet<String>,

    /// Relative to the module root
    pub output_dir: Utf8PathBuf,

    /// File stem, without the `.kt` extension
    pub output_file_name: String,

    /// Empty when the generated file has no `package` line
    pub package_name: String,
}

impl EffectiveConfig {
    /// Module-relative location of the generated artifact
    pub fn output_relative_path(&self) -> Utf8PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.output_file_name, OUTPUT_EXTENSION))
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            auto_detection: true,
            named_with_parent: true,
            class_name: DEFAULT_CLASS_NAME.to_string(),
            split_pattern: SplitPattern::default(),
            path_ignore: IndexSet::new(),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file_name: DEFAULT_CLASS_NAME.to_lowercase(),
            package_name: String::new(),
        }
    }
}
