//! Template-based TOC rendering.
//!
//! The static rendering surface: turns resolved items plus a pair of trusted
//! string templates into final markup. Anchors generated here must be
//! byte-identical to those the live surface computed for the same text, which
//! is guaranteed by sharing [`crate::anchor::generate_anchor_id`].

use crate::anchor::generate_anchor_id;
use crate::document::model::TocItem;
use crate::render::escape::{escape_html_attr, escape_html_text};

/// Wrapper-level placeholder replaced by the concatenated rendered items.
pub const ITEMS_TOKEN: &str = "{{items}}";
/// Item-level placeholder replaced by the escaped heading text.
pub const TEXT_TOKEN: &str = "{{text}}";
/// Item-level placeholder replaced by the `#`-prefixed escaped anchor.
pub const ANCHOR_TOKEN: &str = "{{anchor}}";

/// Render a TOC item list through wrapper and item templates.
///
/// Returns empty output for an empty item list (no wrapper emitted). Items
/// with empty text are skipped; items without an anchor get one generated
/// from their text. Each rendered item is followed by a line separator.
/// Unknown tokens in either template are left untouched, and a template
/// missing its placeholder simply renders without substitution at that point.
pub fn render(items: &[TocItem], wrapper_template: &str, item_template: &str) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut items_markup = String::new();
    for item in items {
        if item.text.is_empty() {
            continue;
        }
        let anchor = if item.anchor.is_empty() {
            generate_anchor_id(&item.text)
        } else {
            item.anchor.clone()
        };
        let rendered = item_template
            .replace(TEXT_TOKEN, &escape_html_text(&item.text))
            .replace(ANCHOR_TOKEN, &format!("#{}", escape_html_attr(&anchor)));
        items_markup.push_str(&rendered);
        items_markup.push('\n');
    }

    wrapper_template.replace(ITEMS_TOKEN, &items_markup)
}
