//! Metadata extraction from the parsed document's docinfo section.
//!
//! `extract` is a pure function of the parsed tree: docinfo elements become
//! a flat map of lower-cased keys. `declared_assets` then drains the
//! asset-carrying keys (`css`, `js`, `bundle`, `cover`) into a candidate
//! list for the asset resolver; `bundle` is an internal-only signal and is
//! removed from the map so templates never see it.

use crate::compiler::parser::{DocinfoElement, ParsedDocument};
use serde::Serialize;
use std::collections::BTreeMap;

/// One metadata value: most keys are plain text, `authors` is a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Text content, `None` for lists.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

/// Extracted front-matter mapping. Keys are lower-case and unique.
pub type Metadata = BTreeMap<String, MetaValue>;

// ============================================================================
// Extraction
// ============================================================================

/// Pull the metadata mapping out of a parsed document.
///
/// Keys are lower-cased; on duplicate fields the later occurrence wins.
pub fn extract(doc: &ParsedDocument) -> Metadata {
    let mut metadata = Metadata::new();

    for element in &doc.docinfo {
        let (key, value) = match element {
            DocinfoElement::Field { name, body } => {
                (name.to_ascii_lowercase(), MetaValue::Text(body.clone()))
            }
            DocinfoElement::Authors { names } => {
                ("authors".to_owned(), MetaValue::List(names.clone()))
            }
            DocinfoElement::Standard { tag, text } => {
                (tag.to_ascii_lowercase(), MetaValue::Text(text.clone()))
            }
        };
        metadata.insert(key, value);
    }

    metadata
}

/// Drain asset declarations out of the metadata.
///
/// `css`, `js` and `bundle` are newline-separated path lists, `cover` a
/// single path. Order is preserved: css, js, bundle, cover. `bundle` is
/// removed from the map; the other keys stay visible to templates.
pub fn declared_assets(metadata: &mut Metadata) -> Vec<String> {
    let mut assets = Vec::new();

    for key in ["css", "js"] {
        if let Some(value) = metadata.get(key).and_then(MetaValue::as_text) {
            assets.extend(split_path_list(value));
        }
    }

    if let Some(value) = metadata.remove("bundle") {
        if let Some(text) = value.as_text() {
            assets.extend(split_path_list(text));
        }
    }

    if let Some(cover) = metadata.get("cover").and_then(MetaValue::as_text) {
        assets.push(cover.trim().to_owned());
    }

    assets
}

/// Split a newline-separated path list, trimming entries and dropping
/// empties.
fn split_path_list(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
