//! HTML escaping for rendered item values.
//!
//! Templates themselves are trusted configuration and are emitted verbatim;
//! only the values substituted into them (heading text and anchors) are
//! escaped for their output context.

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for an HTML text context.
pub fn escape_html_text(input: &str) -> String {
    escape(input)
}

/// Escape a value for an HTML attribute context.
pub fn escape_html_attr(input: &str) -> String {
    escape(input)
}
