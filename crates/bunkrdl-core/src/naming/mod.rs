//! Download naming.
//!
//! Decides the destination of a download coming from the target site: the
//! display name the file page reported (or the host's default filename),
//! sanitized, given an extension if it lacks one, and placed under the
//! configured subfolder with rename-on-conflict.

mod namer;
mod sanitize;
mod site;

use serde::{Deserialize, Serialize};

use crate::config::Options;

pub use namer::DownloadNamer;
pub use sanitize::{
    ensure_extension, has_plausible_extension, sanitize_display_name, truncate_to_name_max,
    NAME_MAX,
};
pub use site::matches_site;

/// Base name used when neither the page nor the host offers one.
pub const FALLBACK_FILENAME: &str = "file.bin";

/// What the host should do when the suggested path already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Rename the new file instead of overwriting.
    #[default]
    Uniquify,
}

/// Download details supplied by the host when it asks for a filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub url: String,
    /// Filename the host would use on its own.
    #[serde(default, rename = "filename")]
    pub default_filename: Option<String>,
}

impl DownloadRequest {
    /// The post-redirect URL if known, else the requested one.
    pub fn effective_url(&self) -> &str {
        self.final_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.url)
    }
}

/// Destination handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSuggestion {
    /// Path relative to the host's download directory.
    #[serde(rename = "filename")]
    pub relative_path: String,
    #[serde(rename = "conflictAction")]
    pub conflict_policy: ConflictPolicy,
}

/// Pick the unsanitized base name: the page's name when preferred and present,
/// then the host default, then [`FALLBACK_FILENAME`]. Empty strings count as absent.
pub fn choose_base_name<'a>(
    prefer_original_name: bool,
    expected_name: Option<&'a str>,
    default_filename: Option<&'a str>,
) -> &'a str {
    let expected = expected_name.filter(|s| !s.is_empty() && prefer_original_name);
    expected
        .or(default_filename.filter(|s| !s.is_empty()))
        .unwrap_or(FALLBACK_FILENAME)
}

/// Sanitize, give the name an extension if it lacks one, then cap it at [`NAME_MAX`] bytes.
pub fn final_filename(base_name: &str) -> String {
    let sanitized = sanitize_display_name(base_name);
    if sanitized.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    truncate_to_name_max(&ensure_extension(&sanitized))
}

/// Join the subfolder and filename with `/`; an empty subfolder yields the bare name.
pub fn join_subfolder(subfolder: &str, filename: &str) -> String {
    let subfolder = subfolder.trim_end_matches('/');
    if subfolder.is_empty() {
        filename.to_string()
    } else {
        format!("{subfolder}/{filename}")
    }
}

/// Build the suggestion for one download from the current options and hint.
pub fn suggest(
    opts: &Options,
    expected_name: Option<&str>,
    default_filename: Option<&str>,
) -> DownloadSuggestion {
    let base = choose_base_name(opts.prefer_original_name, expected_name, default_filename);
    DownloadSuggestion {
        relative_path: join_subfolder(&opts.subfolder, &final_filename(base)),
        conflict_policy: ConflictPolicy::Uniquify,
    }
}
