//! Renders identifiers into a Kotlin source file and writes it atomically.
//!
//! The rendered text depends only on the identifiers and the config, so an
//! unchanged project regenerates byte-identical output. Writes go through a
//! sibling temp file that is renamed over the target; a failed write leaves
//! the previous artifact in place.

use super::GenerationError;
use super::fs::AssetFs;
use crate::models::{EffectiveConfig, GeneratedIdentifier};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt::Write as _;

const GENERATED_HEADER: &str = "// GENERATED CODE - DO NOT MODIFY BY HAND\n// Regenerate with `assetgen` after changing assets or assetgen.yaml\n";

/// What happened to the artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub location: Utf8PathBuf,
    pub identifier_count: usize,

    /// False when the file already held exactly this content
    pub changed: bool,
}

/// Render the artifact text.
///
/// Identifiers are written in the order given.
pub fn render(identifiers: &[GeneratedIdentifier], config: &EffectiveConfig) -> String {
    let mut out = String::with_capacity(128 + identifiers.len() * 64);
    out.push_str(GENERATED_HEADER);
    out.push('\n');

    if !config.package_name.is_empty() {
        let _ = writeln!(out, "package {}", config.package_name);
        out.push('\n');
    }

    out.push_str("@Suppress(\"unused\", \"ObjectPropertyName\")\n");
    if identifiers.is_empty() {
        let _ = writeln!(out, "object {}", config.class_name);
        return out;
    }

    let _ = writeln!(out, "object {} {{", config.class_name);
    for identifier in identifiers {
        let _ = writeln!(
            out,
            "    const val {} = \"{}\"",
            identifier.name,
            escape_kotlin_string(&identifier.source_path)
        );
    }
    out.push_str("}\n");
    out
}

/// Escape for a Kotlin double-quoted literal, including `$` templates
pub fn escape_kotlin_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(escaped, "\\u{:04x}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render and write the artifact to `output`.
///
/// Either `output` holds the new content afterwards, or it is exactly what
/// it was before and an [`GenerationError::Emission`] is returned.
pub fn emit(
    fs: &dyn AssetFs,
    identifiers: &[GeneratedIdentifier],
    config: &EffectiveConfig,
    output: &Utf8Path,
) -> Result<Emission, GenerationError> {
    let content = render(identifiers, config);
    let emission = Emission {
        location: output.to_path_buf(),
        identifier_count: identifiers.len(),
        changed: true,
    };

    if let Ok(existing) = fs.read_to_string(output) {
        if existing == content {
            tracing::debug!("{} is up to date", output);
            return Ok(Emission {
                changed: false,
                ..emission
            });
        }
    }

    let fail = |source: std::io::Error| GenerationError::Emission {
        path: output.to_path_buf(),
        source,
    };

    if let Some(parent) = output.parent() {
        fs.create_dir_all(parent).map_err(fail)?;
    }

    let temp = temp_path(output);
    if let Err(source) = fs
        .write(&temp, content.as_bytes())
        .and_then(|()| fs.rename(&temp, output))
    {
        if let Err(cleanup) = fs.remove_file(&temp) {
            tracing::debug!("Could not remove temp file {}: {}", temp, cleanup);
        }
        tracing::error!("Failed to write {}: {}", output, source);
        return Err(fail(source));
    }

    tracing::info!("Wrote {} identifiers to {}", identifiers.len(), output);
    Ok(emission)
}

/// `.../assets.kt` → `.../.assets.kt.tmp`, hidden so discovery skips it
fn temp_path(output: &Utf8Path) -> Utf8PathBuf {
    let name = output.file_name().unwrap_or("artifact");
    output.with_file_name(format!(".{}.tmp", name))
}
