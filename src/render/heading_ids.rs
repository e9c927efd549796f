//! Anchor injection for rendered heading markup.
//!
//! The static surface renders subordinate headings through the hosting
//! platform, which may omit `id` attributes. TOC links still have to land
//! somewhere, so headings without an id get one generated from their stripped
//! text with the same algorithm that produced the anchors in the list.

use std::sync::LazyLock;

use regex::Regex;

use crate::anchor::generate_anchor_id;
use crate::document::model::strip_markup;
use crate::render::escape::escape_html_attr;

static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sid=["'][^"']+["']"#).expect("id attribute regex is valid"));

/// Ensure a rendered heading carries an `id` attribute.
///
/// Markup that already has an id anywhere is returned unchanged. Otherwise an
/// anchor is generated from the heading's plain text and injected into the
/// first opening tag of the given level; other tags are untouched.
pub fn ensure_heading_anchor(markup: &str, level: u8) -> String {
    if ID_ATTR_RE.is_match(markup) {
        return markup.to_string();
    }

    // Level is caller-supplied and varies, so the opening-tag pattern cannot
    // be a static regex.
    let Ok(open_tag) = Regex::new(&format!(r"<h{level}([^>]*)>")) else {
        return markup.to_string();
    };

    let text = strip_markup(markup);
    let anchor = generate_anchor_id(text.trim());

    open_tag
        .replace(markup, |caps: &regex::Captures<'_>| {
            format!(r#"<h{level}{} id="{}">"#, &caps[1], escape_html_attr(&anchor))
        })
        .into_owned()
}
