//! Paced opening of file pages.
//!
//! A batch is planned up front (item `i` at offset `i * pacing_ms`, two
//! candidate URLs each) and every item gets its own timer task, so a slow
//! open never pushes back later items. Each batch returns a [`BatchHandle`]
//! for cancellation and reporting; callers that only need the fire-and-forget
//! contract can drop it.

mod batch;
mod plan;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::association::AssociationTable;
use crate::host::TabHost;
use crate::options::OptionsSnapshot;

pub use batch::{BatchHandle, BatchReport, ItemOutcome};
pub use plan::{candidate_urls, item_id, normalize_base, plan, DownloadItem, PlannedOpen};

/// Opens one file page per item at paced intervals.
pub struct TabOrchestrator {
    host: Arc<dyn TabHost>,
    table: AssociationTable,
    options: Arc<OptionsSnapshot>,
    next_batch: AtomicU64,
}

impl std::fmt::Debug for TabOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabOrchestrator")
            .field("next_batch", &self.next_batch)
            .finish_non_exhaustive()
    }
}

impl TabOrchestrator {
    pub fn new(
        host: Arc<dyn TabHost>,
        table: AssociationTable,
        options: Arc<OptionsSnapshot>,
    ) -> Self {
        Self {
            host,
            table,
            options,
            next_batch: AtomicU64::new(1),
        }
    }

    /// Schedule one open attempt per item and return immediately.
    ///
    /// Options (and the table bounds) are refreshed first. Failures never reach the caller: an item
    /// whose candidates all fail is logged and skipped. Must be called from
    /// within a tokio runtime.
    pub fn open_batch(&self, items: &[DownloadItem], base_url: &str) -> BatchHandle {
        let opts = self.options.refresh();
        self.table.set_bounds(opts.associations.clone());
        let id = self.next_batch.fetch_add(1, Ordering::Relaxed);
        let issued = Instant::now();
        let abort = Arc::new(AtomicBool::new(false));

        let mut tasks = JoinSet::new();
        for planned in plan(items, base_url, opts.pacing_ms) {
            let host = Arc::clone(&self.host);
            let table = self.table.clone();
            let abort = Arc::clone(&abort);
            let deadline = issued + planned.delay();
            tasks.spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if abort.load(Ordering::Relaxed) {
                    return ItemOutcome::Cancelled {
                        index: planned.index,
                    };
                }
                batch::open_first_candidate(host.as_ref(), &table, &planned).await
            });
        }

        tracing::info!(
            batch = id,
            items = items.len(),
            pacing_ms = opts.pacing_ms,
            base = base_url,
            "scheduled batch"
        );

        let driver = tokio::spawn(async move {
            let mut report = BatchReport::default();
            while let Some(res) = tasks.join_next().await {
                match res {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => tracing::warn!(batch = id, error = %e, "batch item task failed"),
                }
            }
            report.sort();
            tracing::info!(
                batch = id,
                opened = report.opened.len(),
                skipped = report.skipped.len(),
                cancelled = report.cancelled.len(),
                "batch finished"
            );
            report
        });

        BatchHandle::new(id, items.len(), abort, driver)
    }
}
