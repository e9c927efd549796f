//! Live synchronization of a TOC block with its document.
//!
//! The engine keeps one block's persisted `h3Items` consistent with the live
//! heading structure while the document is edited. Its lifecycle:
//!
//! ```text
//! change notification
//!       │
//!       ▼
//! handle_change()
//!       │
//!       ├─► Ignored while the commit cooldown guard is active
//!       │
//!       └─► schedule(): cancel the previous timer, spawn a new one
//!               │
//!               └─► debounce elapses
//!                       │
//!                       └─► run_cycle(): flatten, resolve, fingerprint
//!                               │
//!                               ├─► unchanged: discard, back to Idle
//!                               │
//!                               └─► changed: commit items, arm cooldown
//! ```
//!
//! Coalescing works because a newly scheduled timer aborts the previous one:
//! the latest scheduled recomputation always wins, and the committed state
//! reflects the snapshot at the time the debounce window closes. The cooldown
//! guard exists because committing items mutates the document, which fires
//! the same change notification the engine listens to; without the guard the
//! engine would react to its own write.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::anchor::anchor_or_generate;
use crate::document::model::{HeadingNode, NodeId, TocItem};
use crate::document::store::DocumentStore;
use crate::error::LockResultExt;
use crate::outline::flatten::flatten;
use crate::outline::resolver::{Section, SectionLevels, collect_subordinates, find_owning_section};
use crate::sync::fingerprint::fingerprint;

/// Delay before the first recomputation after mount, giving the hosting
/// surface time to finish its own initialization.
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_millis(100);

/// Debounce window coalescing rapid change notifications.
pub const DEFAULT_DEBOUNCE_DURATION: Duration = Duration::from_millis(250);

/// Cooldown during which change notifications are ignored after a commit.
pub const DEFAULT_COMMIT_COOLDOWN: Duration = Duration::from_millis(300);

/// Logging target for the sync engine.
const LOG_TARGET: &str = "section_toc::sync";

/// Phase of the per-instance synchronization state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No recomputation scheduled.
    Idle,
    /// A debounce timer is armed.
    Pending,
    /// Resolving the owning section from the current snapshot.
    Resolving,
    /// Writing changed items back to the block.
    Committing,
}

/// Timer durations, overridable for tests.
#[derive(Debug, Clone, Copy)]
pub struct SyncTimings {
    pub startup_delay: Duration,
    pub debounce: Duration,
    pub commit_cooldown: Duration,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            startup_delay: DEFAULT_STARTUP_DELAY,
            debounce: DEFAULT_DEBOUNCE_DURATION,
            commit_cooldown: DEFAULT_COMMIT_COOLDOWN,
        }
    }
}

/// Where the block currently sits in the document, for the presentation
/// layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    /// No owning heading precedes the block; an instructional state, not an
    /// error.
    #[default]
    Unplaced,
    /// An owning heading exists but the section has no subordinate headings.
    Empty { owner: HeadingNode },
    /// The section resolved with at least one subordinate heading.
    Resolved(Section),
}

struct EngineState {
    phase: SyncPhase,
    /// Fingerprint of the last committed items.
    last_fingerprint: String,
    /// True while the post-commit cooldown is running.
    guard_active: bool,
    placement: Placement,
    pending: Option<AbortHandle>,
    cooldown: Option<AbortHandle>,
    listener: Option<AbortHandle>,
}

struct EngineInner {
    store: Arc<DocumentStore>,
    block_id: NodeId,
    levels: SectionLevels,
    timings: SyncTimings,
    cancel: CancellationToken,
    state: Mutex<EngineState>,
}

/// Per-block synchronization engine.
///
/// Each TOC block instance gets its own engine; instances resolve and commit
/// independently, sharing only the read-only document snapshot. Requires a
/// tokio runtime. Call [`SyncEngine::mount`] to start and
/// [`SyncEngine::teardown`] to stop; after teardown no write occurs, even if
/// a timer was in flight.
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl SyncEngine {
    /// Create an engine for a block with default levels and timings.
    pub fn new(store: Arc<DocumentStore>, block_id: NodeId) -> Self {
        Self::with_timings(store, block_id, SectionLevels::default(), SyncTimings::default())
    }

    /// Create an engine with custom levels and timer durations.
    pub fn with_timings(
        store: Arc<DocumentStore>,
        block_id: NodeId,
        levels: SectionLevels,
        timings: SyncTimings,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                block_id,
                levels,
                timings,
                cancel: CancellationToken::new(),
                state: Mutex::new(EngineState {
                    phase: SyncPhase::Idle,
                    last_fingerprint: String::new(),
                    guard_active: false,
                    placement: Placement::Unplaced,
                    pending: None,
                    cooldown: None,
                    listener: None,
                }),
            }),
        }
    }

    /// Start listening for document changes and schedule the initial
    /// recomputation after the startup delay.
    pub fn mount(&self) {
        let inner = &self.inner;

        // Seed the fingerprint from the persisted items so re-mounting over
        // an unchanged document does not produce a redundant write.
        {
            let mut state = inner.state.lock().recover_poison("mount");
            if let Some(attrs) = inner.store.read_attributes(&inner.block_id) {
                state.last_fingerprint =
                    fingerprint(attrs.h3_items.iter().map(|item| item.text.as_str()));
            }
        }

        let listener_inner = Arc::clone(inner);
        let cancel = inner.cancel.clone();
        let mut rx = inner.store.subscribe();
        let listener = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = rx.recv() => match received {
                        // A lagged receiver only lost coalescable pings;
                        // re-querying on the next cycle recovers everything.
                        Ok(()) | Err(RecvError::Lagged(_)) => {
                            EngineInner::handle_change(&listener_inner);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });

        let mut state = inner.state.lock().recover_poison("mount");
        state.listener = Some(listener.abort_handle());
        drop(state);

        log::debug!(target: LOG_TARGET, "mounted sync engine for block {}", inner.block_id);
        EngineInner::schedule(inner, inner.timings.startup_delay);
    }

    /// Stop the engine: unsubscribe and cancel all timers.
    ///
    /// Idempotent. Guarantees no further writes, even for a timer already in
    /// flight.
    pub fn teardown(&self) {
        // Cancel while holding the state lock: run_cycle() commits under the
        // same lock, so a commit is either fully done before the cancel or
        // sees the cancelled token and writes nothing.
        let mut state = self.inner.state.lock().recover_poison("teardown");
        self.inner.cancel.cancel();
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }
        if let Some(handle) = state.cooldown.take() {
            handle.abort();
        }
        if let Some(handle) = state.listener.take() {
            handle.abort();
        }
        state.phase = SyncPhase::Idle;
        drop(state);
        log::debug!(target: LOG_TARGET, "tore down sync engine for block {}", self.inner.block_id);
    }

    /// Current phase of the state machine.
    pub fn phase(&self) -> SyncPhase {
        self.inner.state.lock().recover_poison("phase").phase
    }

    /// Current placement of the block, as of the last resolution.
    pub fn placement(&self) -> Placement {
        self.inner
            .state
            .lock()
            .recover_poison("placement")
            .placement
            .clone()
    }

    /// The block this engine synchronizes.
    pub fn block_id(&self) -> &NodeId {
        &self.inner.block_id
    }
}

impl EngineInner {
    /// React to a document-change notification.
    fn handle_change(inner: &Arc<EngineInner>) {
        if inner.cancel.is_cancelled() {
            return;
        }
        {
            let state = inner.state.lock().recover_poison("handle_change");
            if state.guard_active {
                log::trace!(
                    target: LOG_TARGET,
                    "change during commit cooldown ignored for block {}",
                    inner.block_id
                );
                return;
            }
        }
        Self::schedule(inner, inner.timings.debounce);
    }

    /// Arm the recomputation timer, superseding any armed one.
    fn schedule(inner: &Arc<EngineInner>, delay: Duration) {
        let mut state = inner.state.lock().recover_poison("schedule");
        if inner.cancel.is_cancelled() {
            return;
        }
        if let Some(previous) = state.pending.take() {
            previous.abort();
            log::trace!(
                target: LOG_TARGET,
                "superseded pending recomputation for block {}",
                inner.block_id
            );
        }
        state.phase = SyncPhase::Pending;

        let task_inner = Arc::clone(inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            EngineInner::run_cycle(&task_inner);
        });
        state.pending = Some(task.abort_handle());
    }

    /// Resolve the section from the current snapshot and commit on change.
    fn run_cycle(inner: &Arc<EngineInner>) {
        if inner.cancel.is_cancelled() {
            return;
        }
        {
            let mut state = inner.state.lock().recover_poison("run_cycle");
            state.pending = None;
            state.phase = SyncPhase::Resolving;
        }

        let snapshot = inner.store.snapshot();
        let flat = flatten(&snapshot);

        let (placement, items) =
            match find_owning_section(&flat, &inner.block_id, inner.levels) {
                Some(owner) => {
                    let items = collect_subordinates(&flat, &owner.id, inner.levels);
                    if items.is_empty() {
                        (Placement::Empty { owner }, Vec::new())
                    } else {
                        let section = Section {
                            owner,
                            items: items.clone(),
                        };
                        (Placement::Resolved(section), items)
                    }
                }
                None => (Placement::Unplaced, Vec::new()),
            };

        let next_fingerprint = fingerprint(items.iter().map(|h| h.text.as_str()));

        {
            let mut state = inner.state.lock().recover_poison("run_cycle");
            state.placement = placement;
            if next_fingerprint == state.last_fingerprint {
                state.phase = SyncPhase::Idle;
                log::trace!(
                    target: LOG_TARGET,
                    "resolution unchanged for block {}, skipping commit",
                    inner.block_id
                );
                return;
            }
            state.phase = SyncPhase::Committing;
            state.last_fingerprint = next_fingerprint;
            // Arm the guard before writing: the write itself fires a change
            // notification that must not re-trigger the engine.
            state.guard_active = true;
        }

        let toc_items: Vec<TocItem> = items
            .iter()
            .map(|heading| TocItem {
                text: heading.text.clone(),
                anchor: anchor_or_generate(heading.anchor.as_deref(), &heading.text),
            })
            .collect();

        // The cancel check and the write happen under the state lock, which
        // teardown() holds while cancelling: no write can land after
        // teardown() has returned.
        let mut state = inner.state.lock().recover_poison("run_cycle");
        if inner.cancel.is_cancelled() {
            state.phase = SyncPhase::Idle;
            return;
        }
        log::debug!(
            target: LOG_TARGET,
            "committing {} item(s) for block {}",
            toc_items.len(),
            inner.block_id
        );
        if let Err(err) = inner
            .store
            .update_attributes(&inner.block_id, |attrs| attrs.h3_items = toc_items)
        {
            log::warn!(target: LOG_TARGET, "commit failed: {err}");
        }

        let cooldown_inner = Arc::clone(inner);
        let cooldown = inner.timings.commit_cooldown;
        let task = tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            let mut state = cooldown_inner
                .state
                .lock()
                .recover_poison("cooldown");
            state.guard_active = false;
            state.cooldown = None;
        });
        state.cooldown = Some(task.abort_handle());
        state.phase = SyncPhase::Idle;
    }
}
