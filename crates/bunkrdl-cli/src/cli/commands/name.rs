//! `bunkrdl name <url>` – preview a download's destination.

use bunkrdl_core::config::Options;
use bunkrdl_core::naming::{self, DownloadSuggestion};

pub fn run_name(
    opts: &Options,
    url: &str,
    default_filename: Option<&str>,
    expected: Option<&str>,
) {
    match preview(opts, url, default_filename, expected) {
        Some(s) => println!("{}  (on conflict: {:?})", s.relative_path, s.conflict_policy),
        None => println!(
            "Host does not match \"{}\"; the browser keeps its own name.",
            opts.site_pattern
        ),
    }
}

pub(crate) fn preview(
    opts: &Options,
    url: &str,
    default_filename: Option<&str>,
    expected: Option<&str>,
) -> Option<DownloadSuggestion> {
    if !naming::matches_site(url, &opts.site_pattern) {
        return None;
    }
    Some(naming::suggest(opts, expected, default_filename))
}
