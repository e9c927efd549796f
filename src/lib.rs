pub mod anchor;
pub mod config;
pub mod document;
pub mod error;
pub mod outline;
pub mod render;
pub mod sync;

// Re-export main types
pub use anchor::generate_anchor_id;
pub use config::{SettingsManager, TocSettings};
pub use document::{
    Block, BlockAttributes, DocumentStore, HeadingNode, ListStyle, NodeId, TocItem,
};
pub use error::{TocError, TocResult};
pub use outline::{
    Section, SectionLevels, collect_subordinates, find_owning_section, flatten, resolve_section,
};
pub use render::render;
pub use sync::{Placement, SyncEngine, SyncPhase, SyncTimings};
