//! Page assembly: the render context handed to templates.
//!
//! A `Page` holds the fixed fields every template can rely on (title,
//! subtitle, content) plus the retained front-matter entries, flattened
//! into the serialized form so templates address them as `page.<key>`.
//! A fresh `Page` is built for every rebuild; nothing is carried over
//! from a previous run.

use crate::compiler::meta::Metadata;
use crate::compiler::parser::ParsedDocument;
use serde::Serialize;

/// Render context for one document.
///
/// A front-matter `title` or `subtitle` entry lands in `extra` and, being
/// serialized after the fixed fields, shadows the document-derived value
/// in the rendered context.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Inline HTML of the document title.
    pub title: Option<String>,
    /// Inline HTML of the document subtitle.
    pub subtitle: Option<String>,
    /// Rendered body HTML.
    pub content: String,
    /// Retained front-matter entries, exposed as `page.<key>`.
    #[serde(flatten)]
    pub extra: Metadata,
}

impl Page {
    /// Merge the parse byproduct with the retained metadata.
    pub fn assemble(doc: &ParsedDocument, metadata: Metadata) -> Self {
        Self {
            title: doc.title.clone(),
            subtitle: doc.subtitle.clone(),
            content: doc.body.clone(),
            extra: metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::meta::{MetaValue, extract};
    use crate::compiler::parser::{ParserSettings, parse};
    use crate::config::ProjectConfig;

    fn parse_doc(source: &str) -> ParsedDocument {
        let settings = ParserSettings::from_config(&ProjectConfig::default());
        parse(source, &settings).unwrap()
    }

    #[test]
    fn test_assemble_fixed_fields() {
        let doc = parse_doc("# Hello\n\n## World\n\nBody text.\n");
        let page = Page::assemble(&doc, Metadata::new());
        assert_eq!(page.title.as_deref(), Some("Hello"));
        assert_eq!(page.subtitle.as_deref(), Some("World"));
        assert!(page.content.contains("<p>Body text.</p>"));
        assert!(page.extra.is_empty());
    }

    #[test]
    fn test_extra_fields_flatten_into_context() {
        let doc = parse_doc("Theme: dark\nAuthors: Alice; Bob\n\n# T\n\nx\n");
        let metadata = extract(&doc);
        let page = Page::assemble(&doc, metadata);

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["authors"][1], "Bob");
        assert_eq!(value["title"], "T");
    }

    #[test]
    fn test_metadata_title_shadows_document_title() {
        let doc = parse_doc("Title: From docinfo\n\n# From heading\n\nx\n");
        let metadata = extract(&doc);
        let page = Page::assemble(&doc, metadata);

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["title"], "From docinfo");
    }

    #[test]
    fn test_page_is_fresh_per_assembly() {
        let doc = parse_doc("# A\n\nx\n");
        let mut metadata = Metadata::new();
        metadata.insert("stale".into(), MetaValue::Text("yes".into()));
        let first = Page::assemble(&doc, metadata);
        assert!(first.extra.contains_key("stale"));

        let second = Page::assemble(&doc, Metadata::new());
        assert!(second.extra.is_empty());
    }
}
