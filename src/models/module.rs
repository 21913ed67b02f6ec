use super::report::Warning;
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml_ng::Mapping;

/// A buildable unit as reported by a [`ProjectSource`](crate::services::ProjectSource).
///
/// Owned so it can be handed to a worker thread; per-run processing borrows
/// it through [`ModuleContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub root: Utf8PathBuf,

    /// Declared asset roots, relative to `root`, in declaration order
    pub asset_roots: Vec<String>,

    /// Parsed module document, `None` when the module has none or it was unreadable
    pub raw_config: Option<Mapping>,

    /// Problems found while loading the module document
    pub warnings: Vec<Warning>,
}

/// Borrowed view of one module for the duration of a single generation
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    pub name: &'a str,
    pub module_root: &'a Utf8Path,
    pub asset_roots: &'a [String],
    pub raw_config: Option<&'a Mapping>,
}

impl<'a> ModuleContext<'a> {
    pub fn new(descriptor: &'a ModuleDescriptor) -> Self {
        Self {
            name: &descriptor.name,
            module_root: &descriptor.root,
            asset_roots: &descriptor.asset_roots,
            raw_config: descriptor.raw_config.as_ref(),
        }
    }
}
