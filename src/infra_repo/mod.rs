// Metrics source: the query trait the poller and report tool depend on, and its Instana client

mod instana;

pub use instana::{InstanaClient, rate_limit_warning};

use std::time::Duration;

use crate::models::{MetricItem, SnapshotItem};

/// Parameters of one infrastructure metrics request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsQuery {
    /// Dynamic focus query, e.g. `entity.type:host AND entity.zone:eu-*`.
    pub query: String,
    /// Snapshot plugin type, e.g. `host`.
    pub plugin: String,
    pub metrics: Vec<String>,
    pub rollup_secs: i64,
    pub window_ms: i64,
    /// End of the window (epoch ms).
    pub to_ms: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to metrics API failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid API token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
    #[error("metrics API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("metrics API did not answer within {0:?}")]
    Timeout(Duration),
    #[error("no metrics found for query {0:?}")]
    NoMetrics(String),
}

/// Read access to the infrastructure metrics API.
pub trait InfraQuery: Send + Sync {
    /// Metric series of every entity matching the query. An empty result is not an error here.
    fn list_metrics(
        &self,
        query: &MetricsQuery,
    ) -> impl Future<Output = Result<Vec<MetricItem>, FetchError>> + Send;

    /// Entity snapshots matching the query within the window.
    fn list_snapshots(
        &self,
        query: &str,
        plugin: &str,
        window_ms: i64,
    ) -> impl Future<Output = Result<Vec<SnapshotItem>, FetchError>> + Send;
}

/// Fails with [`FetchError::NoMetrics`] when a caller cannot proceed without data.
pub fn require_items(
    items: Vec<MetricItem>,
    query: &MetricsQuery,
) -> Result<Vec<MetricItem>, FetchError> {
    if items.is_empty() {
        return Err(FetchError::NoMetrics(query.query.clone()));
    }
    Ok(items)
}
