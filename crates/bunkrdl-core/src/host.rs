//! Capabilities the core needs from (and offers to) the host platform.
//!
//! The host owns browsing contexts and the download machinery. The core only
//! sees them through these traits, which are injected into
//! [`Background`](crate::background::Background) at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::naming::{DownloadRequest, DownloadSuggestion};

/// Opaque handle the host assigns to an opened page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub i64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure reported by a [`TabHost`] call. None of these are fatal to the core.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The page was already closed (by the user or the host).
    #[error("page {0} no longer exists")]
    PageGone(PageId),
    /// The host would not create a page for this URL.
    #[error("host refused to open {url}: {reason}")]
    OpenRefused { url: String, reason: String },
    #[error("host error: {0}")]
    Other(String),
}

/// Page lifecycle operations provided by the host.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Open a background page at `url`. Failure is reported here, not by a deadline.
    async fn open_tab(&self, url: &str) -> Result<PageId, HostError>;

    /// Close a page previously returned by `open_tab`.
    async fn close_tab(&self, page: PageId) -> Result<(), HostError>;
}

/// Hook the host calls while deciding a download's destination filename.
///
/// Returning `None` leaves the host's own choice in place.
#[async_trait]
pub trait DownloadNamingHook: Send + Sync {
    async fn determine_filename(&self, request: &DownloadRequest) -> Option<DownloadSuggestion>;
}
