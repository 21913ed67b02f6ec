//! Filesystem capability used by discovery and emission.
//!
//! The pipeline never touches `std::fs` directly; it goes through [`AssetFs`]
//! so hosts can supply their own file tree and tests can inject failures.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// What a path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Children of one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    /// In no particular order
    pub names: Vec<String>,

    /// Lossy renderings of names that are not valid UTF-8
    pub unreadable: Vec<String>,
}

/// Capabilities the generator needs from the host filesystem
#[cfg_attr(test, mockall::automock)]
pub trait AssetFs: Send + Sync {
    /// `None` when nothing exists at `path`
    fn kind(&self, path: &Utf8Path) -> Option<EntryKind>;

    fn list_dir(&self, path: &Utf8Path) -> io::Result<DirListing>;

    /// Absolute path with every symlink resolved
    fn canonicalize(&self, path: &Utf8Path) -> io::Result<Utf8PathBuf>;

    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String>;

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()>;

    /// Create or truncate `path` and write `contents`
    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;

    /// Replace `to` with `from`; atomic on the same filesystem
    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()>;

    fn remove_file(&self, path: &Utf8Path) -> io::Result<()>;
}

/// [`AssetFs`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl AssetFs for LocalFs {
    fn kind(&self, path: &Utf8Path) -> Option<EntryKind> {
        let metadata = fs::metadata(path).ok()?;
        if metadata.is_dir() {
            Some(EntryKind::Directory)
        } else {
            Some(EntryKind::File)
        }
    }

    fn list_dir(&self, path: &Utf8Path) -> io::Result<DirListing> {
        let mut listing = DirListing::default();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => listing.names.push(name),
                Err(raw) => listing
                    .unreadable
                    .push(raw.to_string_lossy().into_owned()),
            }
        }
        Ok(listing)
    }

    fn canonicalize(&self, path: &Utf8Path) -> io::Result<Utf8PathBuf> {
        path.canonicalize_utf8()
    }

    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Utf8Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
