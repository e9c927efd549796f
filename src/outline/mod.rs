pub mod flatten;
pub mod resolver;

// Re-export main types
pub use flatten::flatten;
pub use resolver::{
    Section, SectionLevels, collect_subordinates, find_owning_section, resolve_section,
};
