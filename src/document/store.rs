//! Document snapshot store with change notifications.
//!
//! The store holds the current document tree as an immutable snapshot behind
//! an [`ArcSwap`]: readers (the resolver, the renderer) get a cheap consistent
//! view that is never mutated under them, and every committed mutation swaps
//! in a whole new tree. Mutations also fan out a payload-free change
//! notification; subscribers must re-query the snapshot, since the
//! notification carries no information about what changed.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::document::model::{Block, BlockAttributes, NodeId};
use crate::error::{TocError, TocResult};

/// Capacity of the change-notification channel. Notifications are
/// payload-free and coalescable, so lagging receivers lose nothing that a
/// re-query would not recover.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

// The central store for the document tree and its change notifications.
pub struct DocumentStore {
    snapshot: ArcSwap<Vec<Block>>,
    changes: broadcast::Sender<()>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            snapshot: ArcSwap::new(Arc::new(Vec::new())),
            changes,
        }
    }

    /// Create a store seeded with an initial document tree.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        let store = Self::new();
        store.snapshot.store(Arc::new(blocks));
        store
    }

    /// Get the current read-only snapshot of the document tree.
    pub fn snapshot(&self) -> Arc<Vec<Block>> {
        self.snapshot.load_full()
    }

    /// Replace the whole document tree and notify subscribers.
    pub fn replace(&self, blocks: Vec<Block>) {
        self.snapshot.store(Arc::new(blocks));
        self.notify();
    }

    /// Subscribe to change notifications.
    ///
    /// Fires on any document mutation with no payload; receivers must
    /// re-query the snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }

    /// Read the attribute bag of a single block.
    pub fn read_attributes(&self, id: &NodeId) -> Option<BlockAttributes> {
        let snapshot = self.snapshot.load();
        find_block(&snapshot, id).map(|block| block.attributes.clone())
    }

    /// Mutate the attributes of a single block and notify subscribers.
    ///
    /// The mutation is applied to a copy of the tree which is then swapped in
    /// atomically, so concurrent readers keep their consistent snapshot.
    pub fn update_attributes(
        &self,
        id: &NodeId,
        mutate: impl FnOnce(&mut BlockAttributes),
    ) -> TocResult<()> {
        let mut blocks = self.snapshot.load().as_ref().clone();
        let Some(block) = find_block_mut(&mut blocks, id) else {
            return Err(TocError::block_not_found(id.as_str()));
        };
        mutate(&mut block.attributes);
        self.snapshot.store(Arc::new(blocks));
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        // No receivers is fine; notifications are best-effort fan-out.
        let _ = self.changes.send(());
    }
}

fn find_block<'a>(blocks: &'a [Block], id: &NodeId) -> Option<&'a Block> {
    for block in blocks {
        if block.id == *id {
            return Some(block);
        }
        if let Some(found) = find_block(&block.inner_blocks, id) {
            return Some(found);
        }
    }
    None
}

fn find_block_mut<'a>(blocks: &'a mut [Block], id: &NodeId) -> Option<&'a mut Block> {
    for block in blocks {
        if block.id == *id {
            return Some(block);
        }
        if let Some(found) = find_block_mut(&mut block.inner_blocks, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{Block, TocItem};

    #[test]
    fn test_replace_and_snapshot() {
        let store = DocumentStore::new();
        assert!(store.snapshot().is_empty());

        store.replace(vec![Block::heading(2, "Title")]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].attributes.content.as_deref(), Some("Title"));
    }

    #[test]
    fn test_snapshot_is_immutable_under_replace() {
        let store = DocumentStore::with_blocks(vec![Block::heading(2, "Old")]);
        let before = store.snapshot();
        store.replace(vec![Block::heading(2, "New")]);
        assert_eq!(before[0].attributes.content.as_deref(), Some("Old"));
        assert_eq!(
            store.snapshot()[0].attributes.content.as_deref(),
            Some("New")
        );
    }

    #[tokio::test]
    async fn test_replace_notifies_subscribers() {
        let store = DocumentStore::new();
        let mut rx = store.subscribe();
        store.replace(vec![]);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_update_attributes_notifies_and_writes() {
        let toc = Block::toc_list().with_id("toc");
        let store = DocumentStore::with_blocks(vec![toc]);
        let mut rx = store.subscribe();

        let id = NodeId::from("toc");
        store
            .update_attributes(&id, |attrs| {
                attrs.h3_items = vec![TocItem {
                    text: "One".to_string(),
                    anchor: "h3-1".to_string(),
                }];
            })
            .unwrap();

        assert!(rx.try_recv().is_ok());
        let attrs = store.read_attributes(&id).unwrap();
        assert_eq!(attrs.h3_items.len(), 1);
    }

    #[test]
    fn test_update_attributes_finds_nested_block() {
        let toc = Block::toc_list().with_id("nested-toc");
        let group = Block::new("group").with_inner_blocks(vec![toc]);
        let store = DocumentStore::with_blocks(vec![group]);

        let id = NodeId::from("nested-toc");
        store
            .update_attributes(&id, |attrs| {
                attrs.anchor = Some("x".to_string());
            })
            .unwrap();
        assert_eq!(
            store.read_attributes(&id).unwrap().anchor.as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_update_attributes_unknown_block_errors() {
        let store = DocumentStore::new();
        let err = store
            .update_attributes(&NodeId::from("missing"), |_| {})
            .unwrap_err();
        assert!(matches!(err, TocError::BlockNotFound { .. }));
    }
}
