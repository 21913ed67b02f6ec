//! Walks a module's declared asset roots and produces the ordered entry list
//! the synthesizer names.
//!
//! # Ordering
//!
//! Entries follow the declaration order of the roots. Inside a directory root
//! the folder entry comes first, then every file below it sorted by its full
//! relative path. Identical input trees always produce identical lists.
//!
//! # Ignore rules
//!
//! A path is skipped when it equals a rule or starts with it. A rule written
//! with a trailing slash (`images/raw/`) also matches the folder itself.
//!
//! # Links
//!
//! Symlinks are followed, but every folder is scanned at most once per root.
//! A link back to a folder that was already scanned is reported and skipped.

use super::GenerationError;
use super::fs::{AssetFs, EntryKind};
use crate::models::{AssetEntry, Warning};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::collections::HashSet;

/// Directories nested deeper than this below a root are not walked
pub const MAX_WALK_DEPTH: usize = 64;

/// Entries found for one module plus the roots that had to be skipped
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Discovery {
    pub entries: Vec<AssetEntry>,
    pub warnings: Vec<Warning>,
}

/// Normalise a declared asset root to a module-relative, slash-separated path.
///
/// Returns `None` for absolute paths and paths that climb out of the module.
pub fn normalize_declared_root(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    if unified.starts_with('/') || Utf8Path::new(&unified).is_absolute() {
        return None;
    }
    let segments = path_segments(&unified);
    if segments.iter().any(|s| *s == "..") {
        return None;
    }
    Some(segments.join("/"))
}

/// Normalise an ignore rule; a trailing slash is meaningful and kept
pub fn normalize_ignore_rule(raw: &str) -> String {
    let unified = raw.trim().replace('\\', "/");
    let joined = path_segments(&unified).join("/");
    if !joined.is_empty() && unified.ends_with('/') {
        format!("{}/", joined)
    } else {
        joined
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

pub fn is_ignored(path: &str, rules: &IndexSet<String>) -> bool {
    rules.iter().any(|rule| {
        path == rule
            || path.starts_with(rule.as_str())
            || rule.strip_suffix('/').is_some_and(|folder| path == folder)
    })
}

/// Resolve every declared root against the module directory.
///
/// Missing roots become warnings. A listing failure on an existing directory
/// is returned as [`GenerationError::Discovery`] and stops this module only.
pub fn discover(
    fs: &dyn AssetFs,
    module_root: &Utf8Path,
    asset_roots: &[String],
    path_ignore: &IndexSet<String>,
) -> Result<Discovery, GenerationError> {
    let mut discovery = Discovery::default();
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut directory_roots: Vec<String> = Vec::new();

    for declared in asset_roots {
        let Some(root) = normalize_declared_root(declared) else {
            tracing::warn!("Asset root {:?} points outside module {}", declared, module_root);
            discovery.warnings.push(Warning::discovery(
                declared.as_str(),
                "must be a relative path inside the module",
            ));
            continue;
        };

        if root.is_empty() {
            discovery
                .warnings
                .push(Warning::discovery(declared.as_str(), "empty asset declaration"));
            continue;
        }

        if is_ignored(&root, path_ignore) {
            tracing::debug!("Asset root {} matches an ignore rule", root);
            continue;
        }

        let covered = directory_roots
            .iter()
            .any(|dir| root == *dir || root.starts_with(&format!("{}/", dir)));
        if covered {
            tracing::debug!("Asset root {} already included by an earlier root", root);
            continue;
        }

        match fs.kind(&module_root.join(&root)) {
            None => {
                tracing::warn!("Asset root {} not found in {}", root, module_root);
                discovery
                    .warnings
                    .push(Warning::discovery(root.as_str(), "does not exist, skipped"));
            }
            Some(EntryKind::File) => {
                if seen.insert(root.clone()) {
                    discovery.entries.push(AssetEntry::file(root));
                }
            }
            Some(EntryKind::Directory) => {
                let mut walker = Walker {
                    fs,
                    module_root,
                    path_ignore,
                    visited: HashSet::new(),
                    files: Vec::new(),
                    warnings: &mut discovery.warnings,
                };
                walker.walk(&root, 0)?;
                let mut files = walker.files;
                files.sort();

                if seen.insert(root.clone()) {
                    discovery.entries.push(AssetEntry::directory(root.clone()));
                }
                for file in files {
                    if seen.insert(file.clone()) {
                        discovery.entries.push(AssetEntry::file(file));
                    }
                }
                directory_roots.push(root);
            }
        }
    }

    tracing::debug!(
        "Discovered {} asset entries under {}",
        discovery.entries.len(),
        module_root
    );
    Ok(discovery)
}

struct Walker<'a> {
    fs: &'a dyn AssetFs,
    module_root: &'a Utf8Path,
    path_ignore: &'a IndexSet<String>,
    visited: HashSet<Utf8PathBuf>,
    files: Vec<String>,
    warnings: &'a mut Vec<Warning>,
}

impl Walker<'_> {
    fn walk(&mut self, dir: &str, depth: usize) -> Result<(), GenerationError> {
        if depth >= MAX_WALK_DEPTH {
            self.warnings.push(Warning::discovery(
                dir,
                format!("nested deeper than {} levels, not scanned", MAX_WALK_DEPTH),
            ));
            return Ok(());
        }

        let absolute = self.module_root.join(dir);
        let real = self
            .fs
            .canonicalize(&absolute)
            .unwrap_or_else(|_| absolute.clone());
        if !self.visited.insert(real) {
            tracing::warn!("{} links back to a folder that was already scanned", absolute);
            self.warnings.push(Warning::discovery(
                dir,
                "links to a folder that was already scanned, skipped",
            ));
            return Ok(());
        }

        let listing = self
            .fs
            .list_dir(&absolute)
            .map_err(|source| GenerationError::Discovery {
                path: absolute.clone(),
                source,
            })?;

        for raw in listing.unreadable {
            tracing::warn!("Skipping non UTF-8 file name {:?} in {}", raw, absolute);
            self.warnings.push(Warning::discovery(
                format!("{}/{}", dir, raw),
                "file name is not valid UTF-8, skipped",
            ));
        }

        for name in listing.names {
            if name.starts_with('.') {
                continue;
            }

            let relative = format!("{}/{}", dir, name);
            if is_ignored(&relative, self.path_ignore) {
                continue;
            }

            match self.fs.kind(&self.module_root.join(&relative)) {
                Some(EntryKind::Directory) => self.walk(&relative, depth + 1)?,
                Some(EntryKind::File) => self.files.push(relative),
                // Removed between listing and inspection
                None => {}
            }
        }

        Ok(())
    }
}
