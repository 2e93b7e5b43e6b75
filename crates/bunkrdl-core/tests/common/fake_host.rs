//! Scripted in-process host: hands out page ids, fails chosen URLs, and
//! records every call with the (possibly paused) tokio clock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bunkrdl_core::host::{HostError, PageId, TabHost};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct OpenCall {
    pub url: String,
    pub at: Instant,
    pub page: Option<PageId>,
}

#[derive(Debug, Default)]
pub struct FakeHost {
    next_id: AtomicI64,
    fail_all: AtomicBool,
    fail_urls: Mutex<HashSet<String>>,
    opens: Mutex<Vec<OpenCall>>,
    closes: Mutex<Vec<(PageId, Instant)>>,
    live: Mutex<HashSet<PageId>>,
}

impl FakeHost {
    pub fn new() -> std::sync::Arc<Self> {
        let host = Self::default();
        host.next_id.store(100, Ordering::Relaxed);
        std::sync::Arc::new(host)
    }

    pub fn fail_everything(&self) {
        self.fail_all.store(true, Ordering::Relaxed);
    }

    pub fn fail_url(&self, url: &str) {
        self.fail_urls.lock().unwrap().insert(url.to_string());
    }

    /// Simulate the user closing a page behind the core's back.
    pub fn close_externally(&self, page: PageId) {
        self.live.lock().unwrap().remove(&page);
    }

    pub fn opens(&self) -> Vec<OpenCall> {
        self.opens.lock().unwrap().clone()
    }

    pub fn attempted_urls(&self) -> Vec<String> {
        self.opens().into_iter().map(|c| c.url).collect()
    }

    pub fn opened_pages(&self) -> Vec<PageId> {
        self.opens().into_iter().filter_map(|c| c.page).collect()
    }

    pub fn closes(&self) -> Vec<(PageId, Instant)> {
        self.closes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TabHost for FakeHost {
    async fn open_tab(&self, url: &str) -> Result<PageId, HostError> {
        let failed =
            self.fail_all.load(Ordering::Relaxed) || self.fail_urls.lock().unwrap().contains(url);
        let page = (!failed).then(|| PageId(self.next_id.fetch_add(1, Ordering::Relaxed)));
        self.opens.lock().unwrap().push(OpenCall {
            url: url.to_string(),
            at: Instant::now(),
            page,
        });
        match page {
            Some(page) => {
                self.live.lock().unwrap().insert(page);
                Ok(page)
            }
            None => Err(HostError::OpenRefused {
                url: url.to_string(),
                reason: "scripted failure".to_string(),
            }),
        }
    }

    async fn close_tab(&self, page: PageId) -> Result<(), HostError> {
        self.closes.lock().unwrap().push((page, Instant::now()));
        if self.live.lock().unwrap().remove(&page) {
            Ok(())
        } else {
            Err(HostError::PageGone(page))
        }
    }
}
