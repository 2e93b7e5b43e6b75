#![allow(dead_code)]

pub mod fake_host;

use std::sync::Arc;

use bunkrdl_core::background::Background;
use bunkrdl_core::config::StoredOptions;
use bunkrdl_core::options::MemorySource;

use fake_host::FakeHost;

/// A background wired to `host`, with the given keys stored.
pub fn background(host: &Arc<FakeHost>, stored: StoredOptions) -> (Background, Arc<MemorySource>) {
    let source = Arc::new(MemorySource::new(stored));
    let bg = Background::new(host.clone(), source.clone());
    (bg, source)
}

pub fn stored(pacing_ms: i64, auto_close_secs: f64) -> StoredOptions {
    StoredOptions {
        pacing_ms: Some(pacing_ms),
        auto_close_secs: Some(auto_close_secs),
        ..Default::default()
    }
}
