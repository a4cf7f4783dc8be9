//! Visible-text extraction from fetched HTML.

use scraper::{ElementRef, Html, Node};

/// Subtrees that never contain readable page text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg", "template", "iframe"];

/// Strips markup from `html` and returns its visible text with whitespace
/// collapsed. Text nodes are joined by a single space.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut buf = String::with_capacity(html.len() / 4);
    collect_text(doc.root_element(), &mut buf);
    collapse_whitespace(&buf)
}

fn collect_text(element: ElementRef<'_>, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                buf.push_str(text);
                buf.push(' ');
            }
            Node::Element(el) => {
                if SKIPPED_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, buf);
                }
            }
            _ => {}
        }
    }
}

/// Replaces every run of whitespace with one space and trims both ends.
/// Idempotent.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
