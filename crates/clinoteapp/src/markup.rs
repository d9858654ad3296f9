//! # Note Content
//!
//! The remote service stores a note body as an XML document: a fixed header
//! followed by one `<en-note>` element holding the markup. Locally, [`Note::body`]
//! keeps only the inner markup; [`wrap_note_body`] adds the envelope before a
//! note is sent and [`unwrap_note_body`] strips it when content is loaded.
//!
//! Converting between markdown and markup goes through [`MarkupCodec`]. The
//! bundled [`PlainTextCodec`] renders markdown with `pulldown-cmark` and reads
//! markup back as plain text, keeping line structure but dropping formatting.
//!
//! [`Note::body`]: crate::model::Note::body

use crate::error::{ClinoteError, Result};
use pulldown_cmark::{html, Options, Parser};

pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?><!DOCTYPE en-note SYSTEM "http://xml.evernote.com/pub/enml2.dtd">"#;

const NOTE_OPEN: &str = "<en-note";
const NOTE_CLOSE: &str = "</en-note>";

/// Longest entity name considered when decoding, `&` and `;` excluded.
const MAX_ENTITY_LEN: usize = 10;

/// Tags whose end starts a new line in plain text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "pre", "blockquote", "ul", "ol", "tr",
];

pub fn wrap_note_body(body: &str) -> String {
    format!("{}{}>{}{}", XML_HEADER, NOTE_OPEN, body, NOTE_CLOSE)
}

/// Returns the markup inside the `<en-note>` element.
pub fn unwrap_note_body(content: &str) -> Result<String> {
    let missing = || ClinoteError::Markup("no <en-note> element".to_string());

    let start = content.find(NOTE_OPEN).ok_or_else(missing)?;
    let element = &content[start..];
    let open_end = element.find('>').ok_or_else(missing)?;
    if element[..open_end].ends_with('/') {
        return Ok(String::new());
    }
    let inner = &element[open_end + 1..];
    let close = inner
        .rfind(NOTE_CLOSE)
        .ok_or_else(|| ClinoteError::Markup("unclosed <en-note> element".to_string()))?;
    Ok(inner[..close].to_string())
}

/// Conversion between the markdown a user edits and the stored markup.
pub trait MarkupCodec {
    fn to_markdown(&self, body: &str) -> Result<String>;
    fn to_markup(&self, md: &str) -> String;

    /// Whether markup survives a trip through markdown unchanged.
    fn is_lossless(&self) -> bool {
        true
    }
}

/// Reads markup back as plain text. Link targets, lists and inline formatting
/// are lost, so a note edited through this codec is re-rendered as plain
/// paragraphs. Raw mode edits the markup itself and loses nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextCodec;

impl MarkupCodec for PlainTextCodec {
    fn is_lossless(&self) -> bool {
        false
    }

    fn to_markdown(&self, body: &str) -> Result<String> {
        let mut out = String::with_capacity(body.len());
        let mut rest = body;

        while let Some(pos) = rest.find(['<', '&']) {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];

            if rest.starts_with('<') {
                let end = rest
                    .find('>')
                    .ok_or_else(|| ClinoteError::Markup("unterminated tag".to_string()))?;
                if breaks_line(&rest[1..end]) {
                    out.push('\n');
                }
                rest = &rest[end + 1..];
                continue;
            }

            let entity = rest
                .find(';')
                .filter(|&end| end <= MAX_ENTITY_LEN + 1)
                .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
            match entity {
                Some((c, end)) => {
                    out.push(c);
                    rest = &rest[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);

        Ok(out.trim_matches('\n').to_string())
    }

    fn to_markup(&self, md: &str) -> String {
        let mut out = String::with_capacity(md.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(md, Options::empty()));
        out
    }
}

fn breaks_line(tag: &str) -> bool {
    let closing = tag.starts_with('/');
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    name == "br" || (closing && BLOCK_TAGS.contains(&name.as_str()))
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_adds_header_and_element() {
        let wrapped = wrap_note_body("<div>hi</div>");
        assert!(wrapped.starts_with(XML_HEADER));
        assert!(wrapped.ends_with("<en-note><div>hi</div></en-note>"));
    }

    #[test]
    fn test_unwrap_returns_inner_markup() {
        let content = wrap_note_body("<div>hi</div>");
        assert_eq!(unwrap_note_body(&content).unwrap(), "<div>hi</div>");
    }

    #[test]
    fn test_unwrap_element_with_attributes() {
        let content = format!(r#"{}<en-note style="x"><p>a</p></en-note>"#, XML_HEADER);
        assert_eq!(unwrap_note_body(&content).unwrap(), "<p>a</p>");
    }

    #[test]
    fn test_unwrap_empty_element() {
        let content = format!("{}<en-note/>", XML_HEADER);
        assert_eq!(unwrap_note_body(&content).unwrap(), "");
    }

    #[test]
    fn test_unwrap_rejects_missing_element() {
        assert!(matches!(
            unwrap_note_body("<div>plain</div>"),
            Err(ClinoteError::Markup(_))
        ));
        assert!(matches!(
            unwrap_note_body("<en-note><div>open"),
            Err(ClinoteError::Markup(_))
        ));
    }

    #[test]
    fn test_markup_to_plain_text() {
        let codec = PlainTextCodec;
        let md = codec
            .to_markdown("<div>one</div><div>two &amp; three<br/>four</div>")
            .unwrap();
        assert_eq!(md, "one\ntwo & three\nfour");
    }

    #[test]
    fn test_numeric_entities_and_stray_ampersand() {
        let codec = PlainTextCodec;
        assert_eq!(codec.to_markdown("&#65;&#x42; & co").unwrap(), "AB & co");
    }

    #[test]
    fn test_unterminated_tag_is_an_error() {
        assert!(PlainTextCodec.to_markdown("<div").is_err());
    }

    #[test]
    fn test_markdown_renders_to_markup() {
        let markup = PlainTextCodec.to_markup("# Title\n\nsome text");
        assert!(markup.contains("<h1>Title</h1>"));
        assert!(markup.contains("<p>some text</p>"));
    }

    #[test]
    fn test_paragraphs_survive_the_trip() {
        let codec = PlainTextCodec;
        let markup = codec.to_markup("first & one\n\nsecond");
        assert_eq!(codec.to_markdown(&markup).unwrap(), "first & one\n\nsecond");
    }
}
