//! Document tree flattening.

use crate::document::model::Block;

/// Flatten a nested block tree into an ordered sequence.
///
/// Depth-first pre-order: a parent is emitted before its children, children
/// before the parent's next sibling. Blocks without a name are skipped
/// entirely, including their children. Pure function of the input tree.
pub fn flatten(blocks: &[Block]) -> Vec<&Block> {
    let mut flat = Vec::new();
    collect(blocks, &mut flat);
    flat
}

fn collect<'a>(blocks: &'a [Block], out: &mut Vec<&'a Block>) {
    for block in blocks {
        if block.name.is_none() {
            continue;
        }
        out.push(block);
        if !block.inner_blocks.is_empty() {
            collect(&block.inner_blocks, out);
        }
    }
}
