//! Batch planning: which URLs to try for each item, and when.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound on a single item's delay, so absurd pacing values cannot overflow timers.
const MAX_DELAY: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// One gallery entry as produced by the page scraper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadItem {
    /// File id or relative href such as `/f/hsypnH7UErZy8`.
    #[serde(alias = "id")]
    pub href: String,
    /// Display name scraped from the gallery tile, if any.
    #[serde(default, alias = "displayName")]
    pub name: Option<String>,
    #[serde(default, alias = "thumbnailUrl")]
    pub thumb: Option<String>,
}

impl DownloadItem {
    pub fn new(href: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            href: href.into(),
            name: name.map(str::to_string),
            thumb: None,
        }
    }

    /// The scraped name, treating an empty string as absent.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// One scheduled open attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOpen {
    /// Position in the input list.
    pub index: usize,
    /// Nominal offset from batch issue time, in milliseconds (`index * pacing_ms`).
    pub offset_ms: i64,
    /// URLs to try, in order; the first one that opens wins.
    pub candidates: Vec<String>,
    pub expected_name: Option<String>,
}

impl PlannedOpen {
    /// The timer delay for this attempt. Non-positive offsets run immediately.
    pub fn delay(&self) -> Duration {
        u64::try_from(self.offset_ms)
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO)
            .min(MAX_DELAY)
    }
}

/// File id from an href: strips a leading `/f/` or `f/`, then one leading `/`.
pub fn item_id(href: &str) -> &str {
    let rest = href
        .strip_prefix("/f/")
        .or_else(|| href.strip_prefix("f/"))
        .unwrap_or(href);
    rest.strip_prefix('/').unwrap_or(rest)
}

/// Base URL with a guaranteed trailing `/`.
pub fn normalize_base(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

/// The URL shapes to try for one id. The site serves some files at
/// `base + id` and others at `base + id + id`.
pub fn candidate_urls(base: &str, id: &str) -> Vec<String> {
    vec![format!("{base}{id}"), format!("{base}{id}{id}")]
}

/// Plan a batch: item `i` is attempted at offset `i * pacing_ms`, in input order.
pub fn plan(items: &[DownloadItem], base_url: &str, pacing_ms: i64) -> Vec<PlannedOpen> {
    let base = normalize_base(base_url);
    items
        .iter()
        .enumerate()
        .map(|(index, item)| PlannedOpen {
            index,
            offset_ms: i64::try_from(index)
                .unwrap_or(i64::MAX)
                .saturating_mul(pacing_ms),
            candidates: candidate_urls(&base, item_id(&item.href)),
            expected_name: item.display_name().map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_strips_file_prefix() {
        assert_eq!(item_id("/f/AAA111"), "AAA111");
        assert_eq!(item_id("f/AAA111"), "AAA111");
        assert_eq!(item_id("/AAA111"), "AAA111");
        assert_eq!(item_id("AAA111"), "AAA111");
        assert_eq!(item_id("f//AAA111"), "AAA111");
    }

    #[test]
    fn base_gets_trailing_slash() {
        assert_eq!(normalize_base("https://site.test/f"), "https://site.test/f/");
        assert_eq!(normalize_base("https://site.test/f/"), "https://site.test/f/");
    }

    #[test]
    fn candidates_single_then_doubled() {
        let items = [DownloadItem::new("/f/AAA111", Some("My File"))];
        let planned = plan(&items, "https://site.test/f/", 0);
        assert_eq!(
            planned[0].candidates,
            vec![
                "https://site.test/f/AAA111".to_string(),
                "https://site.test/f/AAA111AAA111".to_string(),
            ]
        );
        assert_eq!(planned[0].expected_name.as_deref(), Some("My File"));
    }

    #[test]
    fn offsets_are_index_times_pacing() {
        let items: Vec<_> = (0..5)
            .map(|i| DownloadItem::new(format!("/f/id{i}"), None))
            .collect();
        let planned = plan(&items, "https://site.test/f/", 800);
        let offsets: Vec<i64> = planned.iter().map(|p| p.offset_ms).collect();
        assert_eq!(offsets, vec![0, 800, 1600, 2400, 3200]);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        let indices: Vec<usize> = planned.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn negative_pacing_runs_immediately() {
        let items = vec![DownloadItem::new("a", None), DownloadItem::new("b", None)];
        let planned = plan(&items, "https://site.test/f/", -500);
        assert_eq!(planned[1].offset_ms, -500);
        assert_eq!(planned[1].delay(), Duration::ZERO);
    }

    #[test]
    fn empty_scraped_name_is_absent() {
        let items = [DownloadItem::new("/f/x", Some(""))];
        let planned = plan(&items, "https://site.test/f/", 0);
        assert_eq!(planned[0].expected_name, None);
    }

    #[test]
    fn item_json_accepts_both_field_spellings() {
        let a: DownloadItem =
            serde_json::from_str(r#"{"href":"/f/x","name":"N","thumb":"t.jpg"}"#).unwrap();
        let b: DownloadItem = serde_json::from_str(r#"{"id":"x","displayName":"N"}"#).unwrap();
        assert_eq!(a.display_name(), Some("N"));
        assert_eq!(item_id(&a.href), item_id(&b.href));
    }
}
