use serde::Serialize;

/// One discovered asset file or declared asset folder.
///
/// `relative_path` always uses forward slashes and is relative to the module
/// root. Directory entries stand for an "include the whole folder" declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssetEntry {
    pub relative_path: String,
    pub is_directory: bool,
}

impl AssetEntry {
    pub fn file(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_directory: false,
        }
    }

    pub fn directory(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_directory: true,
        }
    }
}

/// A constant name bound to the asset path it refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedIdentifier {
    pub name: String,
    pub source_path: String,
}
