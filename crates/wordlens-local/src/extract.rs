use html_scraper::{ElementRef, Html};
use std::io::Cursor;
use wordlens_core::{Error, Result};

use crate::textprep::normalize_ws;

/// Elements whose text is collected by [`extract_section`].
const TEXT_TAGS: &[&str] = &["p", "br", "div", "h1", "h2", "h3", "span"];

/// Convert a whole HTML page to whitespace-collapsed plain text.
pub fn html_to_text(html: &str) -> String {
    // html2text wraps at `width`; the wrapping is undone by `normalize_ws` anyway.
    let text = html2text::from_read(Cursor::new(html.as_bytes()), 10_000)
        .unwrap_or_else(|_| html.to_string());
    normalize_ws(&text)
}

/// Descendant text nodes, trimmed, blanks dropped, joined by single spaces.
fn element_text(el: &ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text between the element with id `start_id` and the element with id `end_id`.
///
/// Elements are visited in document order starting right after the start anchor (its own
/// children included). Each `p`, `br`, `div`, `h1`, `h2`, `h3` or `span` contributes its full
/// text, so a paragraph nested in a div is counted twice, and a heading that wraps the end
/// anchor is collected before the anchor itself is reached. The walk stops at the end anchor.
pub fn extract_section(html: &str, start_id: &str, end_id: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    let mut elements = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap);

    if !elements.any(|el| el.value().id() == Some(start_id)) {
        return Err(Error::Extract(format!("start anchor #{start_id} not found")));
    }

    let mut parts = Vec::new();
    let mut reached_end = false;
    for el in elements {
        if el.value().id() == Some(end_id) {
            reached_end = true;
            break;
        }
        if TEXT_TAGS.contains(&el.value().name()) {
            let t = element_text(&el);
            if !t.is_empty() {
                parts.push(t);
            }
        }
    }
    if !reached_end {
        return Err(Error::Extract(format!(
            "end anchor #{end_id} not found after #{start_id}"
        )));
    }

    let text = normalize_ws(&parts.join(" "));
    if text.is_empty() {
        return Err(Error::Extract(format!(
            "no text between #{start_id} and #{end_id}"
        )));
    }
    tracing::debug!(start_id, end_id, chars = text.chars().count(), "section extracted");
    Ok(text)
}
