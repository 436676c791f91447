//! Markdown parsing front-end.
//!
//! Wraps `pulldown-cmark` behind the small surface the rest of the build
//! pipeline needs: a docinfo (front-matter) section, the title/subtitle/body
//! rendering byproduct, and the list of image references found in the body.
//!
//! # Docinfo grammar
//!
//! A document may begin with a run of field lines, terminated by a blank
//! line. The block is recognized only if the first non-empty line of the
//! document is a field line.
//!
//! ```text
//! Title: Intro to slidedown
//! Authors:
//!   Alice
//!   Bob
//! CSS: deck-overrides.css
//!
//! # Intro to slidedown
//! ...
//! ```
//!
//! - `Name: value`: field names start with a letter and contain letters,
//!   digits, `_` or `-`.
//! - Lines indented under a field extend its value (joined with newlines).
//! - Standard docinfo names (`title`, `author`, `date`, ...) classify as
//!   standard elements, `authors` as an authors element with one child per
//!   `;`- or newline-separated entry, anything else as a generic field.
//!
//! # Body structure
//!
//! A leading `# H1` becomes the document title, a `## H2` directly after it
//! the subtitle; both are removed from the body. A fenced block with info
//! string `presenter` holds speaker notes: its content is parsed as markdown
//! and rendered as `<aside class="presenter">`.

use crate::config::ProjectConfig;
use pulldown_cmark::{
    CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html,
};
use thiserror::Error;

/// Docinfo names treated as standard elements rather than generic fields.
const STANDARD_TAGS: &[&str] = &[
    "title",
    "subtitle",
    "author",
    "date",
    "organization",
    "contact",
    "version",
    "status",
    "copyright",
];

/// Fence info string marking a presenter-notes block.
const PRESENTER_INFO: &str = "presenter";

// ============================================================================
// Types
// ============================================================================

/// Immutable parser configuration, built once at compiler construction.
#[derive(Debug, Clone)]
pub struct ParserSettings {
    options: Options,
}

impl ParserSettings {
    /// Derive parse options from the project configuration.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);
        if config.smart_quotes {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        Self { options }
    }
}

/// One element of the docinfo section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocinfoElement {
    /// Custom named field, name kept as authored.
    Field { name: String, body: String },
    /// Author list, one child per entry.
    Authors { names: Vec<String> },
    /// Standard docinfo element (title, date, ...), tag in lower case.
    Standard { tag: String, text: String },
}

/// Result of parsing one document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Docinfo elements in document order.
    pub docinfo: Vec<DocinfoElement>,
    /// Inline HTML of the leading `# H1`, if any.
    pub title: Option<String>,
    /// Inline HTML of the `## H2` directly after the title, if any.
    pub subtitle: Option<String>,
    /// Rendered body HTML, title and subtitle removed.
    pub body: String,
    /// Image references found in the body, in document order.
    pub images: Vec<String>,
}

/// Markup parsing errors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed docinfo line {line}: `{text}`")]
    MalformedDocinfo { line: usize, text: String },
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse one document into docinfo, title/subtitle/body and image refs.
///
/// Pure function of the source text and settings; performs no I/O.
pub fn parse(source: &str, settings: &ParserSettings) -> Result<ParsedDocument, ParseError> {
    let (fields, body_src) = split_docinfo(source)?;
    let docinfo = fields.into_iter().map(classify_field).collect();

    let mut events: Vec<Event> = Parser::new_ext(body_src, settings.options).collect();

    let title = take_heading(&mut events, HeadingLevel::H1);
    let subtitle = if title.is_some() {
        take_heading(&mut events, HeadingLevel::H2)
    } else {
        None
    };

    let mut images = Vec::new();
    let body = render_events(events, settings.options, &mut images);

    Ok(ParsedDocument {
        docinfo,
        title,
        subtitle,
        body,
        images,
    })
}

// ============================================================================
// Docinfo
// ============================================================================

/// Split off the docinfo block, returning raw `(name, value)` pairs and the
/// remaining body source.
fn split_docinfo(source: &str) -> Result<(Vec<(String, String)>, &str), ParseError> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut consumed = 0;
    let mut in_block = false;

    for (index, raw_line) in source.split_inclusive('\n').enumerate() {
        let line_len = raw_line.len();
        let line = raw_line.trim_end_matches('\n').trim_end_matches('\r');

        if !in_block {
            if line.trim().is_empty() {
                consumed += line_len;
                continue;
            }
            if parse_field_line(line).is_none() {
                // First real line is not a field: no docinfo block at all.
                return Ok((Vec::new(), source));
            }
            in_block = true;
        }

        if line.trim().is_empty() {
            consumed += line_len;
            break;
        }

        if let Some((name, value)) = parse_field_line(line) {
            fields.push((name.to_owned(), value.trim().to_owned()));
        } else if line.starts_with(char::is_whitespace)
            && let Some((_, body)) = fields.last_mut()
        {
            // Continuation line extends the previous field value
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(line.trim());
        } else {
            return Err(ParseError::MalformedDocinfo {
                line: index + 1,
                text: line.to_owned(),
            });
        }

        consumed += line_len;
    }

    let body = source.get(consumed..).unwrap_or("");
    Ok((fields, body))
}

/// Parse `Name: value`, returning `None` when the line is not a field.
fn parse_field_line(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (name, value) = line.split_once(':')?;
    let mut chars = name.chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    Some((name, value))
}

/// Classify a raw field into its docinfo element kind.
fn classify_field((name, value): (String, String)) -> DocinfoElement {
    if name.eq_ignore_ascii_case("authors") {
        let names = value
            .split(['\n', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        return DocinfoElement::Authors { names };
    }

    let lower = name.to_ascii_lowercase();
    if STANDARD_TAGS.contains(&lower.as_str()) {
        DocinfoElement::Standard {
            tag: lower,
            text: value,
        }
    } else {
        DocinfoElement::Field { name, body: value }
    }
}

// ============================================================================
// Body
// ============================================================================

/// If the event stream starts with a heading of `level`, remove it and
/// return its inline content rendered to HTML.
fn take_heading(events: &mut Vec<Event>, level: HeadingLevel) -> Option<String> {
    match events.first() {
        Some(Event::Start(Tag::Heading { level: l, .. })) if *l == level => {}
        _ => return None,
    }

    let end = events
        .iter()
        .position(|e| matches!(e, Event::End(TagEnd::Heading(l)) if *l == level))?;

    let inline: Vec<Event> = events.drain(..=end).skip(1).take(end - 1).collect();
    let mut out = String::new();
    html::push_html(&mut out, inline.into_iter());
    Some(out.trim().to_owned())
}

/// Render an event stream to HTML, collecting image references and
/// expanding presenter-notes blocks.
fn render_events(events: Vec<Event>, options: Options, images: &mut Vec<String>) -> String {
    let mut out_events: Vec<Event> = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                images.push(dest_url.to_string());
                out_events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if info.trim() == PRESENTER_INFO =>
            {
                let mut text = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(t) => text.push_str(&t),
                        _ => {}
                    }
                }
                let inner_events: Vec<Event> = Parser::new_ext(&text, options).collect();
                let inner_html = render_events(inner_events, options, images);
                out_events.push(Event::Html(
                    format!("<aside class=\"presenter\">\n{inner_html}</aside>\n").into(),
                ));
            }
            other => out_events.push(other),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, out_events.into_iter());
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ParserSettings {
        ParserSettings::from_config(&ProjectConfig::default())
    }

    #[test]
    fn test_docinfo_fields() {
        let doc = parse("Title: Hello\nTheme: dark\n\nbody\n", &settings()).unwrap();
        assert_eq!(
            doc.docinfo,
            vec![
                DocinfoElement::Standard {
                    tag: "title".into(),
                    text: "Hello".into()
                },
                DocinfoElement::Field {
                    name: "Theme".into(),
                    body: "dark".into()
                },
            ]
        );
        assert_eq!(doc.body.trim(), "<p>body</p>");
    }

    #[test]
    fn test_no_docinfo_when_body_starts_with_heading() {
        let doc = parse("# Hello\n\nbody\n", &settings()).unwrap();
        assert!(doc.docinfo.is_empty());
        assert_eq!(doc.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_authors_children() {
        let doc = parse("Authors:\n  Alice\n  Bob\n  Carol\n\nx\n", &settings()).unwrap();
        assert_eq!(
            doc.docinfo,
            vec![DocinfoElement::Authors {
                names: vec!["Alice".into(), "Bob".into(), "Carol".into()]
            }]
        );
    }

    #[test]
    fn test_authors_semicolon_separated() {
        let doc = parse("Authors: Alice; Bob\n\nx\n", &settings()).unwrap();
        assert_eq!(
            doc.docinfo,
            vec![DocinfoElement::Authors {
                names: vec!["Alice".into(), "Bob".into()]
            }]
        );
    }

    #[test]
    fn test_continuation_lines_fold() {
        let doc = parse("CSS:\n  a.css\n  b.css\n\nx\n", &settings()).unwrap();
        assert_eq!(
            doc.docinfo,
            vec![DocinfoElement::Field {
                name: "CSS".into(),
                body: "a.css\nb.css".into()
            }]
        );
    }

    #[test]
    fn test_malformed_docinfo_line() {
        let err = parse("Title: Hello\n!!!\n\nx\n", &settings()).unwrap_err();
        let ParseError::MalformedDocinfo { line, text } = err;
        assert_eq!(line, 2);
        assert_eq!(text, "!!!");
    }

    #[test]
    fn test_title_and_subtitle_extraction() {
        let doc = parse("# The Talk\n\n## A subtitle\n\nContent here.\n", &settings()).unwrap();
        assert_eq!(doc.title.as_deref(), Some("The Talk"));
        assert_eq!(doc.subtitle.as_deref(), Some("A subtitle"));
        assert!(!doc.body.contains("The Talk"));
        assert!(!doc.body.contains("subtitle"));
        assert!(doc.body.contains("<p>Content here.</p>"));
    }

    #[test]
    fn test_later_h2_is_not_subtitle() {
        let doc = parse("# Title\n\nIntro.\n\n## Section\n", &settings()).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Title"));
        assert_eq!(doc.subtitle, None);
        assert!(doc.body.contains("<h2>Section</h2>"));
    }

    #[test]
    fn test_images_collected_in_order() {
        let doc = parse(
            "# T\n\n![one](img/a.png)\n\n![two](b.svg)\n",
            &settings(),
        )
        .unwrap();
        assert_eq!(doc.images, vec!["img/a.png", "b.svg"]);
    }

    #[test]
    fn test_presenter_block_renders_as_aside() {
        let doc = parse(
            "# T\n\nSlide.\n\n```presenter\nDon't forget the *demo*.\n```\n",
            &settings(),
        )
        .unwrap();
        assert!(doc.body.contains("<aside class=\"presenter\">"));
        assert!(doc.body.contains("<em>demo</em>"));
        assert!(!doc.body.contains("<pre><code"));
    }

    #[test]
    fn test_presenter_block_images_are_tracked() {
        let doc = parse("```presenter\n![cue](cue.png)\n```\n", &settings()).unwrap();
        assert_eq!(doc.images, vec!["cue.png"]);
    }

    #[test]
    fn test_regular_code_block_untouched() {
        let doc = parse("```rust\nfn main() {}\n```\n", &settings()).unwrap();
        assert!(doc.body.contains("<pre><code"));
    }

    #[test]
    fn test_smart_quotes_follow_config() {
        let smart = parse("\"quoted\"\n", &settings()).unwrap();
        assert!(smart.body.contains('\u{201c}'));

        let plain_settings = ParserSettings::from_config(&ProjectConfig {
            smart_quotes: false,
            ..ProjectConfig::default()
        });
        let plain = parse("\"quoted\"\n", &plain_settings).unwrap();
        assert!(!plain.body.contains('\u{201c}'));
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("", &settings()).unwrap();
        assert!(doc.docinfo.is_empty());
        assert_eq!(doc.title, None);
        assert!(doc.body.is_empty());
    }
}
