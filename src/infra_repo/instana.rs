// Instana infrastructure-monitoring API over reqwest

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{FetchError, InfraQuery, MetricsQuery};
use crate::models::{MetricItem, SnapshotItem};

const METRICS_PATH: &str = "/api/infrastructure-monitoring/metrics";
const SNAPSHOTS_PATH: &str = "/api/infrastructure-monitoring/snapshots";
const RATE_LIMIT_HEADER: &str = "x-ratelimit-remaining";
/// Start warning once fewer requests than this remain in the current window.
const RATE_LIMIT_WARN_BELOW: i64 = 25;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeFrame {
    window_size: i64,
    to: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CombinedMetricsRequest<'a> {
    time_frame: TimeFrame,
    rollup: i64,
    query: &'a str,
    plugin: &'a str,
    metrics: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

pub struct InstanaClient {
    http: reqwest::Client,
    base_url: String,
}

impl InstanaClient {
    /// Builds a client authenticating with `apiToken <token>`.
    ///
    /// `insecure` accepts self-signed or expired certificates, which on-prem installs often have.
    pub fn new(
        base_url: &str,
        token: &str,
        insecure: bool,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("apiToken {token}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(insecure)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn read_items<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Vec<T>, FetchError> {
        log_rate_limit(response.headers());
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: ItemsResponse<T> = response.json().await?;
        Ok(parsed.items)
    }
}

impl InfraQuery for InstanaClient {
    #[instrument(skip(self, query), fields(repo = "instana", operation = "list_metrics", plugin = %query.plugin))]
    async fn list_metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricItem>, FetchError> {
        let body = CombinedMetricsRequest {
            time_frame: TimeFrame {
                window_size: query.window_ms,
                to: query.to_ms,
            },
            rollup: query.rollup_secs,
            query: &query.query,
            plugin: &query.plugin,
            metrics: &query.metrics,
        };
        let response = self
            .http
            .post(format!("{}{}", self.base_url, METRICS_PATH))
            .json(&body)
            .send()
            .await?;
        let items = Self::read_items(response).await?;
        tracing::debug!(items = items.len(), "metrics fetched");
        Ok(items)
    }

    #[instrument(skip(self), fields(repo = "instana", operation = "list_snapshots"))]
    async fn list_snapshots(
        &self,
        query: &str,
        plugin: &str,
        window_ms: i64,
    ) -> Result<Vec<SnapshotItem>, FetchError> {
        let window = window_ms.to_string();
        let response = self
            .http
            .get(format!("{}{}", self.base_url, SNAPSHOTS_PATH))
            .query(&[
                ("query", query),
                ("plugin", plugin),
                ("windowSize", window.as_str()),
            ])
            .send()
            .await?;
        Self::read_items(response).await
    }
}

/// True when `remaining` requests is low enough to warn about (every 5th request below 25).
pub fn rate_limit_warning(remaining: i64) -> bool {
    remaining < RATE_LIMIT_WARN_BELOW && remaining % 5 == 0
}

fn log_rate_limit(headers: &HeaderMap) {
    let remaining = headers
        .get(RATE_LIMIT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());
    match remaining {
        Some(n) if rate_limit_warning(n) => {
            tracing::warn!(remaining = n, "metrics API rate limit nearly exhausted");
        }
        Some(_) => {}
        None => tracing::debug!("unable to read remaining rate limit"),
    }
}
