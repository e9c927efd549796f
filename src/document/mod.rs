pub mod model;
pub mod store;

// Re-export main types
pub use model::{
    Block, BlockAttributes, HEADING_KIND, HeadingNode, ListStyle, NodeId, TOC_LIST_KIND, TocItem,
    strip_markup,
};
pub use store::DocumentStore;
