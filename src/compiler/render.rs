//! View rendering via the tera template engine.
//!
//! The template environment is built once per compiler from the template
//! directory and reused for every rebuild. Both views render from the same
//! context; the presenter view only flips the `presenter_view` flag.
//!
//! Re-rendering with unchanged inputs is byte-identical: the context is
//! assembled from ordered maps and carries no timestamps.

use crate::compiler::assets::is_remote;
use crate::compiler::page::Page;
use crate::config::ProjectConfig;
use crate::debug;
use anyhow::{Context as _, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tera::{Context, Tera, Value};

/// Name of the page template inside the template directory.
pub const MAIN_TEMPLATE: &str = "template.html";

// ============================================================================
// Environment
// ============================================================================

/// Build the template environment from a template directory.
///
/// Registers the `basename_or_url` filter: local asset paths flatten to
/// their base file name (matching where the resolver copies them), URLs
/// pass through untouched.
pub fn build_env(templates_dir: &Path) -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_template_file(templates_dir.join(MAIN_TEMPLATE), Some(MAIN_TEMPLATE))
        .with_context(|| {
            format!(
                "Failed to load {MAIN_TEMPLATE} from {}",
                templates_dir.display()
            )
        })?;
    tera.register_filter("basename_or_url", basename_or_url);
    Ok(tera)
}

fn basename_or_url(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("basename_or_url expects a string"))?;
    if is_remote(path) {
        return Ok(value.clone());
    }
    let base = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_owned());
    Ok(Value::String(base))
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the main (audience) view to `<output>/index.html`.
pub fn render_main(tera: &Tera, page: &Page, config: &ProjectConfig, output: &Path) -> Result<PathBuf> {
    let rendered = render(tera, page, config, false)?;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    let output_file = output.join("index.html");
    debug!("render"; "writing {}", output_file.display());
    fs::write(&output_file, rendered)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;
    Ok(output_file)
}

/// Render the presenter view.
///
/// A name ending in `.html` is written as `<output>/<name>`; any other
/// name is treated as a directory, `<output>/<name>/index.html`.
/// Intermediate directories are created either way.
pub fn render_presenter(
    tera: &Tera,
    page: &Page,
    config: &ProjectConfig,
    output: &Path,
    name: &str,
) -> Result<PathBuf> {
    let rendered = render(tera, page, config, true)?;

    let output_file = if name.ends_with(".html") {
        output.join(name)
    } else {
        output.join(name).join("index.html")
    };
    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    debug!("render"; "writing {}", output_file.display());
    fs::write(&output_file, rendered)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;
    Ok(output_file)
}

fn render(tera: &Tera, page: &Page, config: &ProjectConfig, presenter_view: bool) -> Result<String> {
    let mut context = Context::new();
    context.insert("page", page);
    context.insert("presenter_view", &presenter_view);
    context.insert("language", &config.language);
    context.insert("smart_quotes", &config.smart_quotes);
    context.insert("extra_files", &config.extra_files);
    context.insert("css_files", &config.css_files);

    tera.render(MAIN_TEMPLATE, &context)
        .context("Template rendering failed")
}

// ============================================================================
// Tests
// ============================================================================
