//! Configuration context with an explicit lifecycle.
//!
//! Settings are initialized once at startup (from defaults or a TOML file)
//! and read-mostly thereafter. [`SettingsManager`] is the injected
//! configuration object holding them; there is no ambient singleton.

pub mod settings;

pub use settings::{DEFAULT_ITEM_TEMPLATE, DEFAULT_WRAPPER_TEMPLATE, TocSettings};

use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;

/// Centralized manager for rendering settings.
///
/// Thread-safe: `ArcSwap` gives readers a consistent snapshot while
/// `apply_settings` swaps in replacements atomically.
pub struct SettingsManager {
    settings: ArcSwap<TocSettings>,
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsManager {
    /// Create a manager with default settings.
    pub fn new() -> Self {
        Self::with_settings(TocSettings::default())
    }

    /// Create a manager seeded with the given settings.
    pub fn with_settings(settings: TocSettings) -> Self {
        Self {
            settings: ArcSwap::new(Arc::new(settings)),
        }
    }

    /// Load the current settings.
    pub fn load_settings(&self) -> Arc<TocSettings> {
        self.settings.load_full()
    }

    /// Apply new settings, replacing the current ones.
    pub fn apply_settings(&self, settings: TocSettings) {
        self.settings.store(Arc::new(settings));
    }
}

/// Returns the path to the user configuration file.
///
/// `~/.config/section-toc/section-toc.toml` on Linux (honoring
/// `$XDG_CONFIG_HOME`), the platform config directory elsewhere. Returns
/// `None` if the config directory cannot be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("section-toc").join("section-toc.toml"))
}
