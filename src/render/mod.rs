pub mod escape;
pub mod heading_ids;
pub mod template;

// Re-export main types
pub use escape::{escape_html_attr, escape_html_text};
pub use heading_ids::ensure_heading_anchor;
pub use template::{ANCHOR_TOKEN, ITEMS_TOKEN, TEXT_TOKEN, render};
