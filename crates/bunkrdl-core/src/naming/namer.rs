//! The download-naming hook implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::association::AssociationTable;
use crate::host::DownloadNamingHook;
use crate::lifecycle::TabLifecycleManager;
use crate::options::OptionsSnapshot;

use super::{matches_site, suggest, DownloadRequest, DownloadSuggestion};

/// Names downloads from the target site using the most recent page association.
#[derive(Debug, Clone)]
pub struct DownloadNamer {
    options: Arc<OptionsSnapshot>,
    table: AssociationTable,
    lifecycle: TabLifecycleManager,
}

impl DownloadNamer {
    pub fn new(
        options: Arc<OptionsSnapshot>,
        table: AssociationTable,
        lifecycle: TabLifecycleManager,
    ) -> Self {
        Self {
            options,
            table,
            lifecycle,
        }
    }

    /// Decide the destination for one download, or `None` for other sites.
    ///
    /// When auto-close is on, the hinted page is handed to the lifecycle
    /// manager, so this must run inside a tokio runtime.
    pub fn name_download(&self, request: &DownloadRequest) -> Option<DownloadSuggestion> {
        let url = request.effective_url();
        if !matches_site(url, &self.options.current().site_pattern) {
            tracing::trace!(url, "download is not from the target site; leaving name alone");
            return None;
        }

        let opts = self.options.refresh();
        self.table.set_bounds(opts.associations.clone());
        let hint = self.table.most_recent();
        let expected = hint.as_ref().and_then(|(_, a)| a.expected_name.as_deref());

        let suggestion = suggest(&opts, expected, request.default_filename.as_deref());
        tracing::info!(
            url,
            hint_page = ?hint.as_ref().map(|(page, _)| *page),
            path = %suggestion.relative_path,
            "named download"
        );

        if let (Some(delay), Some((page, _))) = (opts.auto_close_delay(), hint) {
            self.lifecycle.schedule_close(page, delay);
        }

        Some(suggestion)
    }
}

#[async_trait]
impl DownloadNamingHook for DownloadNamer {
    async fn determine_filename(&self, request: &DownloadRequest) -> Option<DownloadSuggestion> {
        self.name_download(request)
    }
}
