//! Behavior tests for the live sync engine: debouncing, idempotent commits,
//! cooldown guarding and teardown guarantees.

use std::sync::Arc;
use std::time::Duration;

use section_toc::anchor::generate_anchor_id;
use section_toc::document::{Block, DocumentStore, NodeId};
use section_toc::outline::SectionLevels;
use section_toc::sync::{Placement, SyncEngine, SyncPhase, SyncTimings};

fn section_doc() -> Vec<Block> {
    vec![
        Block::heading(2, "A").with_id("h2-a"),
        Block::toc_list().with_id("toc"),
        Block::heading(3, "A1").with_id("h3-a1"),
        Block::heading(3, "A2").with_id("h3-a2"),
        Block::heading(2, "B").with_id("h2-b"),
        Block::heading(3, "B1").with_id("h3-b1"),
    ]
}

fn fast_timings() -> SyncTimings {
    SyncTimings {
        startup_delay: Duration::from_millis(5),
        debounce: Duration::from_millis(15),
        commit_cooldown: Duration::from_millis(30),
    }
}

fn mounted_engine(store: &Arc<DocumentStore>, timings: SyncTimings) -> SyncEngine {
    let engine = SyncEngine::with_timings(
        Arc::clone(store),
        NodeId::from("toc"),
        SectionLevels::default(),
        timings,
    );
    engine.mount();
    engine
}

fn committed_texts(store: &DocumentStore) -> Vec<String> {
    store
        .read_attributes(&NodeId::from("toc"))
        .map(|attrs| attrs.h3_items.iter().map(|i| i.text.clone()).collect())
        .unwrap_or_default()
}

/// Apply an edit the way the hosting editor does: block attributes survive a
/// structural edit, so the toc block in the replacement tree carries its
/// currently persisted attributes rather than a fresh empty bag.
fn edit_document(store: &DocumentStore, mut blocks: Vec<Block>) {
    if let Some(attrs) = store.read_attributes(&NodeId::from("toc")) {
        for block in &mut blocks {
            if block.id == NodeId::from("toc") {
                block.attributes = attrs.clone();
            }
        }
    }
    store.replace(blocks);
}

/// Wait long enough for a startup/debounce cycle plus the commit cooldown to
/// fully settle with the fast timings above.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(80)).await;
}

#[tokio::test]
async fn initial_mount_commits_section_items() {
    let store = Arc::new(DocumentStore::with_blocks(section_doc()));
    let engine = mounted_engine(&store, fast_timings());

    settle().await;

    assert_eq!(committed_texts(&store), vec!["A1", "A2"]);
    assert!(matches!(engine.placement(), Placement::Resolved(_)));
    assert_eq!(engine.phase(), SyncPhase::Idle);

    engine.teardown();
}

#[tokio::test]
async fn committed_items_carry_generated_or_explicit_anchors() {
    let doc = vec![
        Block::heading(2, "A").with_id("h2-a"),
        Block::toc_list().with_id("toc"),
        Block::heading(3, "A1").with_id("h3-a1").with_anchor("pinned"),
        Block::heading(3, "A2").with_id("h3-a2"),
    ];
    let store = Arc::new(DocumentStore::with_blocks(doc));
    let engine = mounted_engine(&store, fast_timings());

    settle().await;

    let attrs = store.read_attributes(&NodeId::from("toc")).unwrap();
    assert_eq!(attrs.h3_items[0].anchor, "pinned");
    assert_eq!(attrs.h3_items[1].anchor, generate_anchor_id("A2"));

    engine.teardown();
}

#[tokio::test]
async fn unchanged_snapshot_commits_exactly_once() {
    let store = Arc::new(DocumentStore::with_blocks(section_doc()));
    let engine = mounted_engine(&store, fast_timings());
    settle().await;

    // Feed the engine a structurally identical document: the fingerprint is
    // unchanged, so the only notification observed is the edit itself.
    let mut rx = store.subscribe();
    edit_document(&store, section_doc());
    settle().await;

    let mut notifications = 0;
    while rx.try_recv().is_ok() {
        notifications += 1;
    }
    assert_eq!(notifications, 1, "engine must not write on unchanged content");
    assert_eq!(committed_texts(&store), vec!["A1", "A2"]);

    engine.teardown();
}

#[tokio::test]
async fn rapid_edits_coalesce_and_latest_wins() {
    let store = Arc::new(DocumentStore::with_blocks(section_doc()));
    let engine = mounted_engine(&store, fast_timings());
    settle().await;

    let mut rx = store.subscribe();

    // Two edits inside one debounce window; only the second may be committed.
    let mut intermediate = section_doc();
    intermediate.push(Block::heading(3, "stale").with_id("h3-stale"));
    edit_document(&store, intermediate);

    tokio::time::sleep(Duration::from_millis(5)).await;

    let final_doc = vec![
        Block::heading(2, "A").with_id("h2-a"),
        Block::toc_list().with_id("toc"),
        Block::heading(3, "A1").with_id("h3-a1"),
        Block::heading(3, "Fresh").with_id("h3-fresh"),
    ];
    edit_document(&store, final_doc);

    settle().await;

    let mut notifications = 0;
    while rx.try_recv().is_ok() {
        notifications += 1;
    }
    // Two replaces plus exactly one engine commit.
    assert_eq!(notifications, 3);
    assert_eq!(committed_texts(&store), vec!["A1", "Fresh"]);

    engine.teardown();
}

#[tokio::test]
async fn teardown_cancels_inflight_timer_without_write() {
    let store = Arc::new(DocumentStore::with_blocks(section_doc()));
    let engine = mounted_engine(&store, fast_timings());
    settle().await;
    assert_eq!(committed_texts(&store), vec!["A1", "A2"]);

    // Arm a debounce timer with a changed document, then tear down before it
    // fires. The new heading lands inside section A, before "B".
    let mut changed = section_doc();
    changed.insert(4, Block::heading(3, "late").with_id("h3-late"));
    edit_document(&store, changed);
    engine.teardown();

    settle().await;

    assert_eq!(
        committed_texts(&store),
        vec!["A1", "A2"],
        "no write may happen after teardown"
    );
}

#[tokio::test]
async fn losing_the_owner_clears_persisted_items() {
    let store = Arc::new(DocumentStore::with_blocks(section_doc()));
    let engine = mounted_engine(&store, fast_timings());
    settle().await;
    assert_eq!(committed_texts(&store), vec!["A1", "A2"]);

    // Remove the owning heading: the block becomes unplaced and its stale
    // items are cleared rather than left behind.
    edit_document(
        &store,
        vec![
            Block::toc_list().with_id("toc"),
            Block::heading(3, "A1").with_id("h3-a1"),
        ],
    );
    settle().await;

    assert!(committed_texts(&store).is_empty());
    assert_eq!(engine.placement(), Placement::Unplaced);

    engine.teardown();
}

#[tokio::test]
async fn empty_section_on_mount_writes_nothing() {
    let doc = vec![
        Block::heading(2, "A").with_id("h2-a"),
        Block::toc_list().with_id("toc"),
    ];
    let store = Arc::new(DocumentStore::with_blocks(doc));
    let mut rx = store.subscribe();
    let engine = mounted_engine(&store, fast_timings());

    settle().await;

    assert!(rx.try_recv().is_err(), "already-empty block must not be rewritten");
    assert!(matches!(engine.placement(), Placement::Empty { .. }));

    engine.teardown();
}

#[tokio::test]
async fn change_during_commit_cooldown_is_suppressed() {
    let timings = SyncTimings {
        startup_delay: Duration::from_millis(5),
        debounce: Duration::from_millis(10),
        commit_cooldown: Duration::from_millis(150),
    };
    let store = Arc::new(DocumentStore::with_blocks(section_doc()));
    let engine = mounted_engine(&store, timings);

    // Initial commit lands at ~5ms, then the guard holds for 150ms.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(committed_texts(&store), vec!["A1", "A2"]);

    // An edit inside the cooldown window is ignored by the engine. The new
    // heading lands inside section A, before "B".
    let mut changed = section_doc();
    changed.insert(4, Block::heading(3, "swallowed").with_id("h3-swallowed"));
    edit_document(&store, changed.clone());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(committed_texts(&store), vec!["A1", "A2"]);

    // Once the guard has cleared, the next notification is honored again.
    edit_document(&store, changed);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(committed_texts(&store), vec!["A1", "A2", "swallowed"]);

    engine.teardown();
}

#[tokio::test]
async fn remount_over_committed_state_does_not_rewrite() {
    let store = Arc::new(DocumentStore::with_blocks(section_doc()));
    let engine = mounted_engine(&store, fast_timings());
    settle().await;
    engine.teardown();

    // A second engine instance mounting over the already-synchronized block
    // sees the seeded fingerprint and stays quiet.
    let mut rx = store.subscribe();
    let second = mounted_engine(&store, fast_timings());
    settle().await;

    assert!(rx.try_recv().is_err());
    assert_eq!(committed_texts(&store), vec!["A1", "A2"]);

    second.teardown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn teardown_racing_an_inflight_commit_never_writes_late() {
    // Tear down at varying offsets around the commit window. Whatever is
    // persisted the moment teardown() returns must still be persisted later;
    // a commit may complete before the teardown, never after it.
    for i in 0..40u64 {
        let store = Arc::new(DocumentStore::with_blocks(section_doc()));
        let engine = SyncEngine::with_timings(
            Arc::clone(&store),
            NodeId::from("toc"),
            SectionLevels::default(),
            SyncTimings {
                startup_delay: Duration::from_millis(1),
                debounce: Duration::from_millis(1),
                commit_cooldown: Duration::from_millis(1),
            },
        );
        engine.mount();
        tokio::time::sleep(Duration::from_micros(i * 53 % 2000)).await;
        engine.teardown();

        let at_teardown = committed_texts(&store);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            committed_texts(&store),
            at_teardown,
            "write landed after teardown returned"
        );
    }
}
