use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bounds on the page → expected-name table (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationBounds {
    /// Maximum number of tracked pages; the oldest entry is evicted beyond this.
    pub max_entries: usize,
    /// Entries older than this many seconds are dropped. 0 disables the age bound.
    pub max_age_secs: u64,
}

impl Default for AssociationBounds {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_age_secs: 3600,
        }
    }
}

impl AssociationBounds {
    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_secs > 0).then(|| Duration::from_secs(self.max_age_secs))
    }
}

/// Options loaded from `~/.config/bunkrdl/config.toml`.
///
/// Values are taken as-is: a negative pacing interval or a fractional
/// auto-close delay is not rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Destination subfolder (relative to the host's download directory).
    pub subfolder: String,
    /// Prefer the name reported by the file page over the host's default filename.
    pub prefer_original_name: bool,
    /// Close a file page this many seconds after its download is named (0 = never).
    pub auto_close_secs: f64,
    /// Delay between successive page opens within a batch, in milliseconds.
    pub pacing_ms: i64,
    /// Case-insensitive substring a download URL's host must contain to be renamed.
    pub site_pattern: String,
    pub associations: AssociationBounds,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            subfolder: "Bunkr".to_string(),
            prefer_original_name: true,
            auto_close_secs: 5.0,
            pacing_ms: 800,
            site_pattern: "bunkr".to_string(),
            associations: AssociationBounds::default(),
        }
    }
}

impl Options {
    /// Delay before closing a page after its download is named, or `None` when auto-close is off.
    pub fn auto_close_delay(&self) -> Option<Duration> {
        if self.auto_close_secs.is_finite() && self.auto_close_secs > 0.0 {
            Duration::try_from_secs_f64(self.auto_close_secs).ok()
        } else {
            None
        }
    }

    /// Overlay the keys present in `stored`; absent keys keep their current value.
    pub fn merge(&mut self, stored: &StoredOptions) {
        if let Some(v) = &stored.subfolder {
            self.subfolder = v.clone();
        }
        if let Some(v) = stored.prefer_original_name {
            self.prefer_original_name = v;
        }
        if let Some(v) = stored.auto_close_secs {
            self.auto_close_secs = v;
        }
        if let Some(v) = stored.pacing_ms {
            self.pacing_ms = v;
        }
        if let Some(v) = &stored.site_pattern {
            self.site_pattern = v.clone();
        }
        if let Some(v) = &stored.associations {
            self.associations = v.clone();
        }
    }
}

/// The persisted key-value view of [`Options`]: every key may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfolder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_original_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_close_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<AssociationBounds>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bunkrdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Read the stored keys at `path`, writing a default file first if none exists.
pub fn read_or_init_at(path: &Path) -> Result<StoredOptions> {
    if !path.exists() {
        let toml = toml::to_string_pretty(&Options::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(StoredOptions::default());
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let stored: StoredOptions =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(stored)
}

/// Load options from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Options> {
    let path = config_path()?;
    let stored = read_or_init_at(&path)?;
    let mut opts = Options::default();
    opts.merge(&stored);
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_option_values() {
        let opts = Options::default();
        assert_eq!(opts.subfolder, "Bunkr");
        assert!(opts.prefer_original_name);
        assert_eq!(opts.auto_close_secs, 5.0);
        assert_eq!(opts.pacing_ms, 800);
        assert_eq!(opts.site_pattern, "bunkr");
    }

    #[test]
    fn partial_toml_keeps_unspecified_keys() {
        let toml = r#"
            subfolder = "Videos"
            pacing_ms = 250
        "#;
        let stored: StoredOptions = toml::from_str(toml).unwrap();
        let mut opts = Options::default();
        opts.merge(&stored);
        assert_eq!(opts.subfolder, "Videos");
        assert_eq!(opts.pacing_ms, 250);
        assert!(opts.prefer_original_name);
        assert_eq!(opts.auto_close_secs, 5.0);
        assert_eq!(opts.associations, AssociationBounds::default());
    }

    #[test]
    fn merge_overlays_onto_current_not_defaults() {
        let mut opts = Options::default();
        opts.merge(&StoredOptions {
            subfolder: Some("A".into()),
            ..Default::default()
        });
        opts.merge(&StoredOptions {
            pacing_ms: Some(10),
            ..Default::default()
        });
        assert_eq!(opts.subfolder, "A");
        assert_eq!(opts.pacing_ms, 10);
    }

    #[test]
    fn out_of_range_values_are_accepted() {
        let toml = r#"
            pacing_ms = -100
            auto_close_secs = -3
        "#;
        let stored: StoredOptions = toml::from_str(toml).unwrap();
        let mut opts = Options::default();
        opts.merge(&stored);
        assert_eq!(opts.pacing_ms, -100);
        assert_eq!(opts.auto_close_delay(), None);
    }

    #[test]
    fn auto_close_delay_zero_disables() {
        let mut opts = Options::default();
        assert_eq!(opts.auto_close_delay(), Some(Duration::from_secs(5)));
        opts.auto_close_secs = 0.0;
        assert_eq!(opts.auto_close_delay(), None);
        opts.auto_close_secs = 1.5;
        assert_eq!(opts.auto_close_delay(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn association_bounds_section() {
        let toml = r#"
            [associations]
            max_entries = 8
            max_age_secs = 0
        "#;
        let stored: StoredOptions = toml::from_str(toml).unwrap();
        let bounds = stored.associations.unwrap();
        assert_eq!(bounds.max_entries, 8);
        assert_eq!(bounds.max_age(), None);
    }

    #[test]
    fn association_section_with_one_key_keeps_the_rest() {
        let toml = r#"
            subfolder = "Clips"

            [associations]
            max_entries = 8
        "#;
        let stored: StoredOptions = toml::from_str(toml).unwrap();
        let mut opts = Options::default();
        opts.merge(&stored);
        assert_eq!(opts.subfolder, "Clips");
        assert_eq!(opts.associations.max_entries, 8);
        assert_eq!(opts.associations.max_age_secs, 3600);
    }

    #[test]
    fn read_or_init_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let first = read_or_init_at(&path).unwrap();
        assert_eq!(first, StoredOptions::default());
        assert!(path.exists());

        let second = read_or_init_at(&path).unwrap();
        let mut opts = Options::default();
        opts.merge(&second);
        assert_eq!(opts, Options::default());
    }
}
