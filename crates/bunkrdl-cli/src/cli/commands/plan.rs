//! `bunkrdl plan <items.json>` – dry-run a batch schedule.

use anyhow::{Context, Result};
use bunkrdl_core::config::Options;
use bunkrdl_core::orchestrator::{self, DownloadItem, PlannedOpen};
use std::path::Path;

pub fn run_plan(
    opts: &Options,
    items_path: &Path,
    base: &str,
    pacing_ms: Option<i64>,
) -> Result<()> {
    let data = std::fs::read_to_string(items_path)
        .with_context(|| format!("read items: {}", items_path.display()))?;
    let items: Vec<DownloadItem> = serde_json::from_str(&data)
        .with_context(|| format!("parse items: {}", items_path.display()))?;
    if items.is_empty() {
        println!("No items.");
        return Ok(());
    }

    let pacing = pacing_ms.unwrap_or(opts.pacing_ms);
    let planned = orchestrator::plan(&items, base, pacing);
    tracing::debug!(items = planned.len(), pacing_ms = pacing, "planned batch");
    print!("{}", render_plan(&planned));
    Ok(())
}

pub(crate) fn render_plan(planned: &[PlannedOpen]) -> String {
    let mut out = format!("{:<5} {:>9}  {}\n", "IDX", "OFFSET", "NAME / CANDIDATES");
    for p in planned {
        let offset = format!("{}ms", p.offset_ms);
        let name = p.expected_name.as_deref().unwrap_or("-");
        out.push_str(&format!("{:<5} {:>9}  {}\n", p.index, offset, name));
        for url in &p.candidates {
            out.push_str(&format!("{:<5} {:>9}    {}\n", "", "", url));
        }
    }
    out
}
