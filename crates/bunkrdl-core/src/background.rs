//! Adapter between a host platform and the core.
//!
//! [`Background`] owns one options snapshot, one association table, and the
//! components built on them. The host feeds it inbound commands (from the
//! selection UI and from file pages) and calls its [`DownloadNamingHook`]
//! implementation when a download needs a name.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::association::AssociationTable;
use crate::config::StoredOptions;
use crate::host::{DownloadNamingHook, PageId, TabHost};
use crate::lifecycle::TabLifecycleManager;
use crate::naming::{DownloadNamer, DownloadRequest, DownloadSuggestion};
use crate::options::{OptionsSnapshot, OptionsSource};
use crate::orchestrator::{BatchHandle, DownloadItem, TabOrchestrator};

/// Inbound command, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Open a page for each selected item, paced apart.
    #[serde(rename = "BUNKR_OPEN_FILE_TABS")]
    OpenFileTabs {
        items: Vec<DownloadItem>,
        base: String,
    },
    /// A file page reporting the display name it resolved.
    #[serde(rename = "BUNKR_FILEPAGE_OGNAME")]
    ReportName { ogname: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub ok: bool,
    /// Items scheduled by an open command; always the request's item count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened: Option<usize>,
}

pub struct Background {
    options: Arc<OptionsSnapshot>,
    table: AssociationTable,
    orchestrator: TabOrchestrator,
    namer: DownloadNamer,
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Background")
            .field("options", &self.options)
            .field("tracked_pages", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl Background {
    /// Wire the core to a host. Options are loaded once here.
    pub fn new(host: Arc<dyn TabHost>, source: Arc<dyn OptionsSource>) -> Self {
        let options = Arc::new(OptionsSnapshot::load(source));
        let table = AssociationTable::new(options.current().associations);
        let lifecycle = TabLifecycleManager::new(Arc::clone(&host), table.clone());
        let orchestrator = TabOrchestrator::new(host, table.clone(), Arc::clone(&options));
        let namer = DownloadNamer::new(Arc::clone(&options), table.clone(), lifecycle);
        Self {
            options,
            table,
            orchestrator,
            namer,
        }
    }

    pub fn options(&self) -> &OptionsSnapshot {
        &self.options
    }

    pub fn table(&self) -> &AssociationTable {
        &self.table
    }

    pub fn namer(&self) -> &DownloadNamer {
        &self.namer
    }

    /// Reload every option from the store (install / startup).
    pub fn reload_options(&self) {
        let opts = self.options.refresh();
        self.table.set_bounds(opts.associations);
    }

    /// Apply a change notification from the store.
    pub fn on_options_changed(&self, changes: &StoredOptions) {
        let opts = self.options.apply_changes(changes);
        self.table.set_bounds(opts.associations);
        tracing::debug!(?changes, "options changed");
    }

    pub fn open_batch(&self, items: &[DownloadItem], base_url: &str) -> BatchHandle {
        self.orchestrator.open_batch(items, base_url)
    }

    /// Record the display name a page resolved, replacing any earlier entry for it.
    pub fn report_name(&self, page: PageId, name: &str) {
        self.table.record(page, Some(name.to_string()));
        tracing::debug!(%page, name, "file page reported name");
    }

    /// Dispatch one command. `sender` is the page the command came from, if any.
    pub fn handle(&self, command: Command, sender: Option<PageId>) -> CommandResponse {
        match command {
            Command::OpenFileTabs { items, base } => {
                let handle = self.open_batch(&items, &base);
                CommandResponse {
                    ok: true,
                    opened: Some(handle.scheduled_count()),
                }
            }
            Command::ReportName { ogname } => match sender {
                Some(page) => {
                    self.report_name(page, &ogname);
                    CommandResponse {
                        ok: true,
                        opened: None,
                    }
                }
                None => {
                    tracing::debug!("name report without a sender page; ignored");
                    CommandResponse {
                        ok: false,
                        opened: None,
                    }
                }
            },
        }
    }

    /// Decode a JSON command, dispatch it, and encode the response.
    pub fn handle_json(&self, raw: &str, sender: Option<PageId>) -> Result<String> {
        let command: Command = serde_json::from_str(raw).context("decode command")?;
        let response = self.handle(command, sender);
        serde_json::to_string(&response).context("encode response")
    }
}

#[async_trait]
impl DownloadNamingHook for Background {
    async fn determine_filename(&self, request: &DownloadRequest) -> Option<DownloadSuggestion> {
        self.namer.name_download(request)
    }
}
