//! Template settings: shape, defaults, loading and sanitization.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{TocError, TocResult};
use crate::render::template::{ANCHOR_TOKEN, ITEMS_TOKEN, TEXT_TOKEN};

/// Default wrapper template for the rendered list.
pub const DEFAULT_WRAPPER_TEMPLATE: &str = r#"<div class="section-toc-wrapper">
  <nav class="section-toc-nav" aria-label="Section table of contents">
    <ul class="section-toc-list">
{{items}}
    </ul>
  </nav>
</div>"#;

/// Default per-item template.
pub const DEFAULT_ITEM_TEMPLATE: &str = r#"      <li class="section-toc-item">
        <a href="{{anchor}}">{{text}}</a>
      </li>"#;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script>").expect("script tag regex is valid")
});

/// Rendering settings: the wrapper and item templates plus optional CSS
/// appended to the static surface output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocSettings {
    pub wrapper_template: String,
    pub item_template: String,
    pub custom_css: Option<String>,
}

impl Default for TocSettings {
    fn default() -> Self {
        Self {
            wrapper_template: DEFAULT_WRAPPER_TEMPLATE.to_string(),
            item_template: DEFAULT_ITEM_TEMPLATE.to_string(),
            custom_css: None,
        }
    }
}

impl TocSettings {
    /// Load settings from a TOML file, falling back to defaults for missing
    /// keys, and sanitize the templates.
    pub fn load(path: &Path) -> TocResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings: TocSettings = toml::from_str(&raw)
            .map_err(|e| TocError::config(format!("{}: {e}", path.display())))?;
        Ok(settings.sanitize())
    }

    /// Sanitize the templates while preserving their placeholders.
    ///
    /// Script elements are stripped. If stripping would destroy every
    /// placeholder a template originally contained, the original template is
    /// kept instead, since a placeholder-less template silently renders
    /// nothing at that point.
    pub fn sanitize(mut self) -> Self {
        self.wrapper_template = sanitize_template(&self.wrapper_template, &[ITEMS_TOKEN]);
        self.item_template = sanitize_template(&self.item_template, &[TEXT_TOKEN, ANCHOR_TOKEN]);
        self
    }
}

fn sanitize_template(raw: &str, tokens: &[&str]) -> String {
    let stripped = SCRIPT_RE.replace_all(raw, "").into_owned();
    let had_token = tokens.iter().any(|t| raw.contains(t));
    let kept_token = tokens.iter().any(|t| stripped.contains(t));
    if had_token && !kept_token {
        return raw.to_string();
    }
    stripped
}
