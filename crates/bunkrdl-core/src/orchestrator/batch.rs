//! Per-batch handle, outcome reporting, and the single-item open routine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::association::AssociationTable;
use crate::host::{PageId, TabHost};

use super::plan::PlannedOpen;

/// What happened to one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Opened {
        index: usize,
        page: PageId,
        url: String,
    },
    /// Every candidate URL failed to open.
    Skipped { index: usize },
    /// The batch was cancelled before this item's turn.
    Cancelled { index: usize },
}

/// Summary of a finished batch, each list ordered by item index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub opened: Vec<(usize, PageId)>,
    pub skipped: Vec<usize>,
    pub cancelled: Vec<usize>,
}

impl BatchReport {
    pub(super) fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Opened { index, page, .. } => self.opened.push((index, page)),
            ItemOutcome::Skipped { index } => self.skipped.push(index),
            ItemOutcome::Cancelled { index } => self.cancelled.push(index),
        }
    }

    pub(super) fn sort(&mut self) {
        self.opened.sort_unstable_by_key(|(index, _)| *index);
        self.skipped.sort_unstable();
        self.cancelled.sort_unstable();
    }

    pub fn total(&self) -> usize {
        self.opened.len() + self.skipped.len() + self.cancelled.len()
    }
}

/// Handle to one scheduled batch.
///
/// Dropping the handle leaves the batch running; use [`cancel`](Self::cancel)
/// to stop items that have not started yet.
#[derive(Debug)]
pub struct BatchHandle {
    id: u64,
    scheduled: usize,
    abort: Arc<AtomicBool>,
    driver: JoinHandle<BatchReport>,
}

impl BatchHandle {
    pub(super) fn new(
        id: u64,
        scheduled: usize,
        abort: Arc<AtomicBool>,
        driver: JoinHandle<BatchReport>,
    ) -> Self {
        Self {
            id,
            scheduled,
            abort,
            driver,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of items scheduled; equals the input length whatever later opens do.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled
    }

    /// Skip every item whose open attempt has not begun. Attempts already in flight finish.
    pub fn cancel(&self) {
        self.abort.store(true, Ordering::Relaxed);
        tracing::info!(batch = self.id, "batch cancellation requested");
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    /// Wait for every item to be opened, skipped, or cancelled.
    pub async fn join(self) -> Result<BatchReport> {
        self.driver
            .await
            .map_err(|e| anyhow::anyhow!("batch {} join: {}", self.id, e))
    }
}

/// Try each candidate URL in order, recording an association for the first that opens.
pub(super) async fn open_first_candidate(
    host: &dyn TabHost,
    table: &AssociationTable,
    planned: &PlannedOpen,
) -> ItemOutcome {
    for url in &planned.candidates {
        match host.open_tab(url).await {
            Ok(page) => {
                table.record(page, planned.expected_name.clone());
                tracing::debug!(index = planned.index, %page, url = %url, "opened file page");
                return ItemOutcome::Opened {
                    index: planned.index,
                    page,
                    url: url.clone(),
                };
            }
            Err(err) => {
                tracing::warn!(
                    index = planned.index,
                    url = %url,
                    error = %err,
                    "failed to open file page"
                );
            }
        }
    }
    tracing::warn!(index = planned.index, "no candidate URL opened; skipping item");
    ItemOutcome::Skipped {
        index: planned.index,
    }
}
