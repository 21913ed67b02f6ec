//! Turns discovered asset paths into unique Kotlin identifiers.
//!
//! Names are snake_case words taken from the file stem (and optionally its
//! parent folder), split by the configured pattern. Uniqueness inside one pass
//! is enforced here: a taken name gets a numeric suffix starting at 2, and a
//! path that yields no usable name becomes a placeholder `assetN`.

use crate::models::{AssetEntry, EffectiveConfig, GeneratedIdentifier, SplitPattern};
use std::collections::HashSet;

/// Kotlin hard keywords; none of these may be used as a bare identifier
pub const KOTLIN_HARD_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

const PLACEHOLDER_PREFIX: &str = "asset";

/// First collision suffix; the original name counts as the first occurrence
const FIRST_COLLISION_SUFFIX: usize = 2;

/// ASCII identifier check: a letter or `_` followed by letters, digits or `_`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

pub fn is_reserved(name: &str) -> bool {
    KOTLIN_HARD_KEYWORDS.contains(&name)
}

/// Derives identifiers for one module's entries.
///
/// The output keeps the order of the input entries.
pub struct NameSynthesizer<'a> {
    split_pattern: &'a SplitPattern,
    named_with_parent: bool,
}

impl<'a> NameSynthesizer<'a> {
    pub fn new(config: &'a EffectiveConfig) -> Self {
        Self {
            split_pattern: &config.split_pattern,
            named_with_parent: config.named_with_parent,
        }
    }

    pub fn synthesize(&self, entries: &[AssetEntry]) -> Vec<GeneratedIdentifier> {
        let mut taken: HashSet<String> = HashSet::with_capacity(entries.len());
        let mut next_placeholder = 1usize;
        let mut identifiers = Vec::with_capacity(entries.len());

        for entry in entries {
            let name = match self.candidate(entry) {
                Some(candidate) => disambiguate(candidate, &taken),
                None => {
                    let placeholder = loop {
                        let name = format!("{}{}", PLACEHOLDER_PREFIX, next_placeholder);
                        next_placeholder += 1;
                        if !taken.contains(&name) {
                            break name;
                        }
                    };
                    tracing::debug!(
                        "No usable name for {:?}, using {}",
                        entry.relative_path,
                        placeholder
                    );
                    placeholder
                }
            };

            taken.insert(name.clone());
            identifiers.push(GeneratedIdentifier {
                name,
                source_path: source_path(entry),
            });
        }

        identifiers
    }

    /// Name before collision handling; `None` means "use a placeholder"
    fn candidate(&self, entry: &AssetEntry) -> Option<String> {
        let segments: Vec<&str> = entry
            .relative_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let (&leaf, parents) = segments.split_last()?;

        let leaf = if entry.is_directory {
            leaf
        } else {
            strip_extension(leaf)
        };

        let mut words = Vec::new();
        if self.named_with_parent {
            if let Some(parent) = parents.last() {
                self.push_words(parent, &mut words);
            }
        }
        self.push_words(leaf, &mut words);

        if words.is_empty() {
            return None;
        }

        let mut name = words.join("_");
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }

        if is_reserved(&name) { None } else { Some(name) }
    }

    fn push_words(&self, part: &str, words: &mut Vec<String>) {
        for piece in self.split_pattern.regex().split(part) {
            let ascii = deunicode::deunicode(piece);
            words.extend(
                ascii
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .map(str::to_ascii_lowercase),
            );
        }
    }
}

fn disambiguate(candidate: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&candidate) {
        return candidate;
    }

    let mut suffix = FIRST_COLLISION_SUFFIX;
    loop {
        let name = format!("{}{}", candidate, suffix);
        if !taken.contains(&name) {
            tracing::debug!("Identifier {} already taken, using {}", candidate, name);
            return name;
        }
        suffix += 1;
    }
}

/// `logo.png` → `logo`, `archive.tar.gz` → `archive.tar`, `.hidden` unchanged
fn strip_extension(leaf: &str) -> &str {
    match leaf.rfind('.') {
        Some(index) if index > 0 => &leaf[..index],
        _ => leaf,
    }
}

/// Folder declarations keep a trailing slash so they read as folders
fn source_path(entry: &AssetEntry) -> String {
    if entry.is_directory && !entry.relative_path.ends_with('/') {
        format!("{}/", entry.relative_path)
    } else {
        entry.relative_path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(named_with_parent: bool) -> EffectiveConfig {
        EffectiveConfig {
            named_with_parent,
            ..EffectiveConfig::default()
        }
    }

    fn names(config: &EffectiveConfig, entries: &[AssetEntry]) -> Vec<String> {
        NameSynthesizer::new(config)
            .synthesize(entries)
            .into_iter()
            .map(|id| id.name)
            .collect()
    }

    #[test]
    fn test_named_with_parent_example() {
        let config = config(true);
        let ids = NameSynthesizer::new(&config).synthesize(&[
            AssetEntry::file("images/logo.png"),
            AssetEntry::file("images/icons/home.png"),
        ]);

        assert_eq!(
            ids,
            vec![
                GeneratedIdentifier {
                    name: "images_logo".to_string(),
                    source_path: "images/logo.png".to_string(),
                },
                GeneratedIdentifier {
                    name: "icons_home".to_string(),
                    source_path: "images/icons/home.png".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_bare_name_collision_gets_suffix() {
        let entries = [AssetEntry::file("icons/a.png"), AssetEntry::file("fonts/a.png")];
        assert_eq!(names(&config(false), &entries), vec!["a", "a2"]);
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let entries = [
            AssetEntry::file("a.png"),
            AssetEntry::file("a2.png"),
            AssetEntry::file("x/a.png"),
        ];
        assert_eq!(names(&config(false), &entries), vec!["a", "a2", "a3"]);
    }

    #[test]
    fn test_sanitization_collisions_stay_unique() {
        let entries = [
            AssetEntry::file("img/my-icon.png"),
            AssetEntry::file("img/my_icon.png"),
            AssetEntry::file("img/my icon!.svg"),
        ];
        assert_eq!(
            names(&config(false), &entries),
            vec!["my_icon", "my_icon2", "my_icon3"]
        );
    }

    #[test]
    fn test_split_pattern_and_case() {
        let config = config(false);
        assert_eq!(
            names(&config, &[AssetEntry::file("Background-Image_Dark.PNG")]),
            vec!["background_image_dark"]
        );
    }

    #[test]
    fn test_custom_split_pattern() {
        let config = EffectiveConfig {
            named_with_parent: false,
            split_pattern: SplitPattern::new("@").unwrap(),
            ..EffectiveConfig::default()
        };
        assert_eq!(names(&config, &[AssetEntry::file("icon@2x.png")]), vec!["icon_2x"]);
    }

    #[test]
    fn test_leading_digit_is_prefixed() {
        assert_eq!(names(&config(false), &[AssetEntry::file("3d/2x.png")]), vec!["_2x"]);
        assert_eq!(names(&config(true), &[AssetEntry::file("3d/cube.obj")]), vec!["_3d_cube"]);
    }

    #[test]
    fn test_placeholders_for_unusable_names() {
        let entries = [
            AssetEntry::file(""),
            AssetEntry::file("!!!.png"),
            AssetEntry::file("class.png"),
            AssetEntry::file("logo.png"),
        ];
        assert_eq!(
            names(&config(false), &entries),
            vec!["asset1", "asset2", "asset3", "logo"]
        );
    }

    #[test]
    fn test_placeholder_skips_real_names() {
        let entries = [AssetEntry::file("asset1.png"), AssetEntry::file("?.png")];
        assert_eq!(names(&config(false), &entries), vec!["asset1", "asset2"]);
    }

    #[test]
    fn test_keyword_only_when_whole_name() {
        // "in" alone is reserved, "images_in" is not
        assert_eq!(names(&config(false), &[AssetEntry::file("in.png")]), vec!["asset1"]);
        assert_eq!(names(&config(true), &[AssetEntry::file("images/in.png")]), vec!["images_in"]);
    }

    #[test]
    fn test_unicode_is_transliterated() {
        assert_eq!(names(&config(false), &[AssetEntry::file("café.png")]), vec!["cafe"]);
    }

    #[test]
    fn test_directory_entries_keep_extension_and_trailing_slash() {
        let ids = NameSynthesizer::new(&config(true)).synthesize(&[
            AssetEntry::directory("images"),
            AssetEntry::directory("data/v1.2"),
        ]);

        assert_eq!(ids[0].name, "images");
        assert_eq!(ids[0].source_path, "images/");
        assert_eq!(ids[1].name, "data_v1_2");
        assert_eq!(ids[1].source_path, "data/v1.2/");
    }

    #[test]
    fn test_dotfile_stem_kept() {
        assert_eq!(names(&config(false), &[AssetEntry::file(".env")]), vec!["env"]);
    }

    #[test]
    fn test_identifier_helpers() {
        assert!(is_identifier("Assets"));
        assert!(is_identifier("_r2"));
        assert!(!is_identifier("2r"));
        assert!(!is_identifier("my-assets"));
        assert!(!is_identifier(""));
        assert!(is_reserved("object"));
        assert!(!is_reserved("Object"));
    }
}
