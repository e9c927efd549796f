pub mod engine;
pub mod fingerprint;

// Re-export main types
pub use engine::{
    DEFAULT_COMMIT_COOLDOWN, DEFAULT_DEBOUNCE_DURATION, DEFAULT_STARTUP_DELAY, Placement,
    SyncEngine, SyncPhase, SyncTimings,
};
pub use fingerprint::fingerprint;
