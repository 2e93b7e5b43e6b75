//! Options snapshot: a cached copy of the persisted options, refreshed on
//! startup, before each batch or naming decision, and on change notifications.
//!
//! Every operation works on an immutable [`Options`] clone taken at its start,
//! so a concurrent reload never changes the values seen mid-operation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;

use crate::config::{self, Options, StoredOptions};

/// Persistent key-value store the snapshot reloads from.
pub trait OptionsSource: Send + Sync {
    /// Return whichever keys are currently stored; missing keys are left untouched.
    fn load(&self) -> Result<StoredOptions>;
}

/// TOML file source (the default `config.toml` under the XDG config dir).
#[derive(Debug, Clone)]
pub struct TomlFileSource {
    path: PathBuf,
}

impl TomlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source backed by `~/.config/bunkrdl/config.toml`.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(config::config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OptionsSource for TomlFileSource {
    fn load(&self) -> Result<StoredOptions> {
        config::read_or_init_at(&self.path)
    }
}

/// In-memory source, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    stored: RwLock<StoredOptions>,
}

impl MemorySource {
    pub fn new(stored: StoredOptions) -> Self {
        Self {
            stored: RwLock::new(stored),
        }
    }

    /// Replace the stored keys; takes effect on the next refresh.
    pub fn set(&self, stored: StoredOptions) {
        *self.stored.write().unwrap_or_else(PoisonError::into_inner) = stored;
    }
}

impl OptionsSource for MemorySource {
    fn load(&self) -> Result<StoredOptions> {
        Ok(self
            .stored
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

pub struct OptionsSnapshot {
    source: Arc<dyn OptionsSource>,
    current: RwLock<Options>,
}

impl std::fmt::Debug for OptionsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsSnapshot")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl OptionsSnapshot {
    /// Snapshot holding the defaults; nothing is read until [`refresh`](Self::refresh).
    pub fn new(source: Arc<dyn OptionsSource>) -> Self {
        Self {
            source,
            current: RwLock::new(Options::default()),
        }
    }

    /// Snapshot with an initial load already applied.
    pub fn load(source: Arc<dyn OptionsSource>) -> Self {
        let snapshot = Self::new(source);
        snapshot.refresh();
        snapshot
    }

    pub fn current(&self) -> Options {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reload from the source and return the resulting options.
    /// A failed load keeps the previous values.
    pub fn refresh(&self) -> Options {
        match self.source.load() {
            Ok(stored) => self.apply_changes(&stored),
            Err(err) => {
                tracing::warn!(
                    error = %format!("{err:#}"),
                    "options reload failed; keeping previous values"
                );
                self.current()
            }
        }
    }

    /// Apply a change notification carrying only the keys that changed.
    pub fn apply_changes(&self, changes: &StoredOptions) -> Options {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        guard.merge(changes);
        guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl OptionsSource for FailingSource {
        fn load(&self) -> Result<StoredOptions> {
            anyhow::bail!("store unavailable")
        }
    }

    #[test]
    fn refresh_picks_up_source_changes() {
        let source = Arc::new(MemorySource::default());
        let snapshot = OptionsSnapshot::load(source.clone());
        assert_eq!(snapshot.current().pacing_ms, 800);

        source.set(StoredOptions {
            pacing_ms: Some(50),
            ..Default::default()
        });
        assert_eq!(snapshot.current().pacing_ms, 800);
        assert_eq!(snapshot.refresh().pacing_ms, 50);
    }

    #[test]
    fn change_notification_touches_only_named_keys() {
        let snapshot = OptionsSnapshot::new(Arc::new(MemorySource::default()));
        snapshot.apply_changes(&StoredOptions {
            subfolder: Some("Gallery".into()),
            ..Default::default()
        });
        let opts = snapshot.apply_changes(&StoredOptions {
            prefer_original_name: Some(false),
            ..Default::default()
        });
        assert_eq!(opts.subfolder, "Gallery");
        assert!(!opts.prefer_original_name);
        assert_eq!(opts.pacing_ms, 800);
    }

    #[test]
    fn failed_reload_keeps_previous_values() {
        let snapshot = OptionsSnapshot::new(Arc::new(FailingSource));
        snapshot.apply_changes(&StoredOptions {
            auto_close_secs: Some(0.0),
            ..Default::default()
        });
        let opts = snapshot.refresh();
        assert_eq!(opts.auto_close_secs, 0.0);
    }

    #[test]
    fn toml_file_source_reads_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "subfolder = \"Clips\"\n").unwrap();
        let snapshot = OptionsSnapshot::load(Arc::new(TomlFileSource::new(&path)));
        let opts = snapshot.current();
        assert_eq!(opts.subfolder, "Clips");
        assert_eq!(opts.pacing_ms, 800);
    }

    #[test]
    fn toml_file_with_partial_association_section_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "subfolder = \"Clips\"\n\n[associations]\nmax_entries = 8\n",
        )
        .unwrap();
        let snapshot = OptionsSnapshot::load(Arc::new(TomlFileSource::new(&path)));
        let opts = snapshot.current();
        assert_eq!(opts.subfolder, "Clips");
        assert_eq!(opts.associations.max_entries, 8);
        assert_eq!(opts.associations.max_age_secs, 3600);
    }
}
