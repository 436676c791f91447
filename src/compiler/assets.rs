//! Asset resolution and copying.
//!
//! Every referenced asset path is either a remote URL (left untouched) or
//! a local path probed against two roots in order: the input document's
//! directory, then the bundled template directory. Input-relative hits are
//! additionally registered for watching; a path found in neither root
//! aborts the build.
//!
//! Resolution is split from copying so the pipeline can fail on a missing
//! reference before anything is written to the output directory. Resolved
//! files are copied flat under their base file name; two same-named assets
//! from different directories collide, last write wins.

use crate::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Asset resolution errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{0}` not found next to the input or in the template directory")]
    Missing(String),

    #[error("failed to copy `{path}`")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory `{path}`")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One locally resolved asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Absolute or root-joined source path.
    pub source: PathBuf,
    /// True when resolved next to the input document; only those are
    /// watched for changes.
    pub input_relative: bool,
}

/// Whether a path reference has a network-location component.
///
/// Covers absolute URLs (`https://...`) and protocol-relative references
/// (`//cdn...`), both of which are served as-is and never copied.
pub fn is_remote(path: &str) -> bool {
    if path.starts_with("//") {
        return true;
    }
    match path.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

/// Resolve every candidate against the input directory, then the template
/// directory. Remote candidates are dropped; a candidate found in neither
/// root fails the build.
pub fn resolve(
    candidates: &[String],
    input_dir: &Path,
    templates_dir: &Path,
) -> Result<Vec<ResolvedAsset>, AssetError> {
    let mut resolved = Vec::new();

    for candidate in candidates {
        // Fully qualified URLs are referenced, not shipped
        if is_remote(candidate) {
            debug!("assets"; "skipping remote {candidate}");
            continue;
        }

        let local = input_dir.join(candidate);
        if local.exists() {
            resolved.push(ResolvedAsset {
                source: local,
                input_relative: true,
            });
            continue;
        }

        let bundled = templates_dir.join(candidate);
        if !bundled.exists() {
            return Err(AssetError::Missing(candidate.clone()));
        }
        resolved.push(ResolvedAsset {
            source: bundled,
            input_relative: false,
        });
    }

    Ok(resolved)
}

/// Copy resolved assets into the output directory, flattened to their
/// base file names. Creates the output directory if absent.
pub fn copy_all(assets: &[ResolvedAsset], output: &Path) -> Result<(), AssetError> {
    for asset in assets {
        fs::create_dir_all(output).map_err(|source| AssetError::OutputDir {
            path: output.to_path_buf(),
            source,
        })?;

        let file_name = asset.source.file_name().unwrap_or(asset.source.as_os_str());
        let dest = output.join(file_name);
        debug!("assets"; "copying {} to {}", asset.source.display(), dest.display());
        fs::copy(&asset.source, &dest).map_err(|source| AssetError::Copy {
            path: asset.source.clone(),
            source,
        })?;
    }
    Ok(())
}

/// The input-relative subset, in resolution order. These join the
/// watch-set after a successful build.
pub fn watch_paths(assets: &[ResolvedAsset]) -> Vec<PathBuf> {
    assets
        .iter()
        .filter(|a| a.input_relative)
        .map(|a| a.source.clone())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
