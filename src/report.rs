// One-shot report: fetch a single query, require data, render through an output stage.

use std::fmt;

use crate::infra_repo::{InfraQuery, MetricsQuery, require_items};
use crate::pipeline::OutputFormat;
use crate::timeframe;

#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub query: String,
    pub plugin: String,
    pub metric: String,
    pub window_ms: i64,
    pub to_ms: i64,
    pub format: OutputFormat,
    /// Also count the entity snapshots matching the query.
    pub include_snapshots: bool,
}

#[derive(Debug)]
pub struct Report {
    pub rollup_secs: i64,
    pub items: usize,
    pub snapshots: Option<usize>,
    pub body: Vec<u8>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "metrics: {}", self.items)?;
        if let Some(n) = self.snapshots {
            write!(f, ", snapshots: {n}")?;
        }
        write!(f, ", rollup: {}s", self.rollup_secs)
    }
}

/// Fails when the window needs an unsupported rollup, the fetch fails, or nothing matched.
pub async fn run_report<Q: InfraQuery>(
    client: &Q,
    req: &ReportRequest,
) -> anyhow::Result<Report> {
    let rollup_secs = timeframe::rollup_for_window(req.window_ms)?;
    let query = MetricsQuery {
        query: req.query.clone(),
        plugin: req.plugin.clone(),
        metrics: vec![req.metric.clone()],
        rollup_secs,
        window_ms: req.window_ms,
        to_ms: req.to_ms,
    };
    let items = require_items(client.list_metrics(&query).await?, &query)?;

    let snapshots = if req.include_snapshots {
        Some(
            client
                .list_snapshots(&req.query, &req.plugin, req.window_ms)
                .await?
                .len(),
        )
    } else {
        None
    };

    let body = req.format.stage().render(&items, &req.metric)?;
    Ok(Report {
        rollup_secs,
        items: items.len(),
        snapshots,
        body,
    })
}
