//! Closing file pages once their download has started.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::association::AssociationTable;
use crate::host::{HostError, PageId, TabHost};

/// Closes pages after a delay and forgets their associations.
#[derive(Clone)]
pub struct TabLifecycleManager {
    host: Arc<dyn TabHost>,
    table: AssociationTable,
}

impl fmt::Debug for TabLifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabLifecycleManager")
            .field("tracked", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl TabLifecycleManager {
    pub fn new(host: Arc<dyn TabHost>, table: AssociationTable) -> Self {
        Self { host, table }
    }

    /// After `delay`, close `page` and drop its association.
    pub fn schedule_close(&self, page: PageId, delay: Duration) -> JoinHandle<()> {
        tracing::debug!(%page, delay_ms = delay.as_millis() as u64, "scheduled page close");
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.close_now(page).await;
        })
    }

    /// Close `page` and drop its association. The entry is removed even when
    /// the close fails; a page that is already gone is not an error.
    pub async fn close_now(&self, page: PageId) {
        match self.host.close_tab(page).await {
            Ok(()) => tracing::debug!(%page, "closed page"),
            Err(HostError::PageGone(_)) => tracing::debug!(%page, "page already gone"),
            Err(err) => tracing::debug!(%page, error = %err, "page close failed"),
        }
        self.table.remove(page);
    }
}
