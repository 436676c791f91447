//! The build pipeline: one document in, one output bundle out.
//!
//! # Architecture
//!
//! ```text
//! Compiler::build()
//!     │
//!     ├── parser::parse() ─────► docinfo + title/subtitle/body + images
//!     ├── meta::extract() ─────► Metadata (lower-cased keys)
//!     ├── meta::declared_assets() ─► css/js/bundle/cover candidates
//!     ├── assets::resolve() ───► fail fast on missing references
//!     ├── Page::assemble() ────► render context
//!     ├── render::render_main() / render_presenter()
//!     ├── assets::copy_all() ──► <output>/<basename> per asset
//!     └── returns the watch-set: input first, then every
//!         input-relative asset resolved during this build
//! ```
//!
//! Any failure aborts the run and propagates; there is no partial-success
//! state. The whole document is re-read and re-rendered on every call.

pub mod assets;
pub mod cache;
pub mod meta;
pub mod page;
pub mod parser;
pub mod render;

use crate::config::ProjectConfig;
use crate::debug;
use anyhow::{Context, Result};
use cache::MathCache;
use page::Page;
use parser::ParserSettings;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tera::Tera;

/// Runtime script shipped with every deck, resolved like any other asset.
pub const RUNTIME_SCRIPT: &str = "presentation.js";

/// The bundled template directory shipped with the tool.
pub fn default_templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// One-time-initialized build pipeline.
///
/// Holds the template environment and the immutable parser settings;
/// both are derived once from the template directory and configuration
/// and reused across rebuilds.
pub struct Compiler {
    templates_dir: PathBuf,
    tera: Tera,
    settings: ParserSettings,
}

impl Compiler {
    /// Set up the pipeline for a template directory and configuration.
    pub fn new(templates_dir: &Path, config: &ProjectConfig) -> Result<Self> {
        Ok(Self {
            templates_dir: templates_dir.to_path_buf(),
            tera: render::build_env(templates_dir)?,
            settings: ParserSettings::from_config(config),
        })
    }

    /// Run the pipeline once.
    ///
    /// Returns the fresh watch-set: the input document first, followed by
    /// every asset that resolved next to it. The set is recomputed from
    /// scratch on every build; references that disappeared drop out.
    pub fn build(
        &self,
        input: &Path,
        output: &Path,
        config: &ProjectConfig,
        presenter: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        let input_dir = input.parent().unwrap_or(Path::new("."));
        let math_cache = MathCache::load(input_dir);

        debug!("build"; "reading {}", input.display());
        let source = fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;

        let doc = parser::parse(&source, &self.settings)
            .with_context(|| format!("Failed to parse {}", input.display()))?;

        let mut metadata = meta::extract(&doc);
        let declared = meta::declared_assets(&mut metadata);

        // Resolve every reference before writing anything, so a missing
        // asset leaves no output behind for this run.
        let candidates = asset_candidates(config, declared, &doc.images);
        let resolved = assets::resolve(&candidates, input_dir, &self.templates_dir)?;

        let page = Page::assemble(&doc, metadata);
        render::render_main(&self.tera, &page, config, output)?;
        if let Some(name) = presenter {
            render::render_presenter(&self.tera, &page, config, output, name)?;
        }

        assets::copy_all(&resolved, output)?;

        math_cache
            .persist()
            .with_context(|| format!("Failed to persist {}", cache::CACHE_FILE))?;

        let mut watch_set = vec![input.to_path_buf()];
        watch_set.extend(assets::watch_paths(&resolved));
        Ok(watch_set)
    }
}

/// Full candidate list in resolution order: config extra files, config
/// stylesheets, the runtime script, front-matter declarations, then every
/// image referenced by the body.
fn asset_candidates(
    config: &ProjectConfig,
    declared: Vec<String>,
    images: &[String],
) -> Vec<String> {
    let mut candidates =
        Vec::with_capacity(config.extra_files.len() + config.css_files.len() + 1);
    candidates.extend(config.extra_files.iter().cloned());
    candidates.extend(config.css_files.iter().cloned());
    candidates.push(RUNTIME_SCRIPT.to_owned());
    candidates.extend(declared);
    candidates.extend(images.iter().cloned());
    candidates
}

// ============================================================================
// Tests
// ============================================================================
