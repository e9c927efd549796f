//! Section resolution over a flattened document.
//!
//! A section is delimited by headings at the owning level: the TOC block
//! belongs to the nearest owning-level heading that precedes it, and that
//! section owns every subordinate-level heading up to (but excluding) the
//! next heading at the owning level or shallower.

use crate::document::model::{Block, HeadingNode, NodeId};

/// Heading levels that delimit a section and populate its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLevels {
    /// Level of the heading that owns a section (the section marker).
    pub owning: u8,
    /// Level of the headings collected into the section's list.
    pub subordinate: u8,
}

impl Default for SectionLevels {
    fn default() -> Self {
        Self {
            owning: 2,
            subordinate: 3,
        }
    }
}

/// A resolved section: the owning heading and its subordinate headings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub owner: HeadingNode,
    pub items: Vec<HeadingNode>,
}

/// Find the owning heading for a node.
///
/// Scans backward from the node's position for the nearest preceding heading
/// at the owning level. `None` is the valid "unplaced" state (the node sits
/// before any owning heading), not an error.
pub fn find_owning_section(
    flat: &[&Block],
    node_id: &NodeId,
    levels: SectionLevels,
) -> Option<HeadingNode> {
    let position = flat.iter().position(|block| block.id == *node_id)?;
    flat[..position]
        .iter()
        .rev()
        .find(|block| block.is_heading() && block.heading_level() == levels.owning)
        .and_then(|block| block.as_heading())
}

/// Collect the subordinate headings owned by a section.
///
/// Scans forward from the owner's position. A heading at the owning level or
/// shallower terminates the scan without being collected; headings deeper
/// than the subordinate level are skipped but do not terminate it. Output
/// preserves document order.
pub fn collect_subordinates(
    flat: &[&Block],
    owner_id: &NodeId,
    levels: SectionLevels,
) -> Vec<HeadingNode> {
    let Some(position) = flat.iter().position(|block| block.id == *owner_id) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for block in &flat[position + 1..] {
        if !block.is_heading() {
            continue;
        }
        let level = block.heading_level();
        if level <= levels.owning {
            break;
        }
        if level == levels.subordinate {
            if let Some(heading) = block.as_heading() {
                items.push(heading);
            }
        }
    }
    items
}

/// Resolve the full section a node belongs to.
pub fn resolve_section(
    flat: &[&Block],
    node_id: &NodeId,
    levels: SectionLevels,
) -> Option<Section> {
    let owner = find_owning_section(flat, node_id, levels)?;
    let items = collect_subordinates(flat, &owner.id, levels);
    Some(Section { owner, items })
}
