//! Document tree model.
//!
//! The document is a nested tree of [`Block`]s queried as a read-only
//! snapshot. Blocks carry an attribute bag; heading blocks contribute their
//! level, text and optional explicit anchor, while a TOC list block owns the
//! persisted `h3Items` / `listStyle` attributes written by the sync engine.
//! Field names in the serialized form are camelCase to stay compatible with
//! the stored attribute format.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Block kind for headings.
pub const HEADING_KIND: &str = "heading";

/// Block kind for the TOC list block itself.
pub const TOC_LIST_KIND: &str = "toc-list";

/// Heading level assumed when a heading block carries no `level` attribute.
const DEFAULT_HEADING_LEVEL: u8 = 2;

static MARKUP_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup tag regex is valid"));

/// Strip inline markup tags from rich text, leaving plain text.
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG_RE.replace_all(text, "").into_owned()
}

/// Opaque block identity, stable across edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh unique id.
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One entry of the persisted TOC item list.
///
/// An empty `anchor` means "not yet assigned"; the renderer and the sync
/// engine generate one from the text in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    pub text: String,
    #[serde(default)]
    pub anchor: String,
}

/// Visual style of the rendered list on the live surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    #[default]
    Disc,
    Decimal,
    None,
}

impl ListStyle {
    /// The list element this style renders with.
    pub fn tag(self) -> &'static str {
        match self {
            ListStyle::Decimal => "ol",
            ListStyle::Disc | ListStyle::None => "ul",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListStyle::Disc => "disc",
            ListStyle::Decimal => "decimal",
            ListStyle::None => "none",
        }
    }
}

/// Attribute bag carried by every block.
///
/// Heading blocks use `level` / `content` / `anchor`; the TOC list block uses
/// `h3_items` / `list_style`. Unknown combinations are simply ignored by the
/// consumers, mirroring how block attributes behave in the hosting editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockAttributes {
    /// Heading level (2 assumed when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Rich text content; may carry inline markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Explicit anchor assigned in the editor; passed through as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Persisted subordinate-heading list, owned by the TOC list block.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub h3_items: Vec<TocItem>,
    /// Persisted list style, owned by the TOC list block.
    pub list_style: ListStyle,
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: NodeId,
    /// Block kind; blocks without one are ignored by the flattener.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: BlockAttributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner_blocks: Vec<Block>,
}

impl Block {
    /// Create a bare block of the given kind with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            name: Some(name.into()),
            attributes: BlockAttributes::default(),
            inner_blocks: Vec::new(),
        }
    }

    /// Create a heading block.
    pub fn heading(level: u8, content: impl Into<String>) -> Self {
        let mut block = Self::new(HEADING_KIND);
        block.attributes.level = Some(level);
        block.attributes.content = Some(content.into());
        block
    }

    /// Create a TOC list block.
    pub fn toc_list() -> Self {
        Self::new(TOC_LIST_KIND)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = NodeId::new(id);
        self
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.attributes.anchor = Some(anchor.into());
        self
    }

    pub fn with_inner_blocks(mut self, inner: Vec<Block>) -> Self {
        self.inner_blocks = inner;
        self
    }

    pub fn is_heading(&self) -> bool {
        self.name.as_deref() == Some(HEADING_KIND)
    }

    pub fn is_toc_list(&self) -> bool {
        self.name.as_deref() == Some(TOC_LIST_KIND)
    }

    /// Effective heading level; only meaningful for heading blocks.
    pub fn heading_level(&self) -> u8 {
        self.attributes.level.unwrap_or(DEFAULT_HEADING_LEVEL)
    }

    /// View this block as a heading node with markup stripped.
    ///
    /// Missing content is treated as empty text, not an error.
    pub fn as_heading(&self) -> Option<HeadingNode> {
        if !self.is_heading() {
            return None;
        }
        let raw = self.attributes.content.as_deref().unwrap_or("");
        Some(HeadingNode {
            id: self.id.clone(),
            level: self.heading_level(),
            text: strip_markup(raw),
            anchor: self.attributes.anchor.clone(),
        })
    }
}

/// A heading as seen by the resolver: plain text, level, optional anchor.
///
/// Recomputed from the snapshot on every resolution pass, never mutated in
/// place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    pub id: NodeId,
    pub level: u8,
    pub text: String,
    pub anchor: Option<String>,
}
