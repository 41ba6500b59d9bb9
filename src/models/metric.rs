// Metric items and entity snapshots as returned by the infrastructure API

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// One `(timestamp, value)` point of a metric series.
///
/// On the wire this is a two-element array `[ts, value]`. The API may send the timestamp as a
/// float, so it is read as `f64` and truncated to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(i64, f64)")]
pub struct Sample {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((ts, value): (f64, f64)) -> Self {
        Self {
            timestamp_ms: ts as i64,
            value,
        }
    }
}

impl From<Sample> for (i64, f64) {
    fn from(s: Sample) -> Self {
        (s.timestamp_ms, s.value)
    }
}

/// One monitored entity (host, JVM, ...) and its requested metric series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricItem {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub snapshot_id: String,
    #[serde(default)]
    pub plugin: String,
    #[serde(default, deserialize_with = "deserialize_series")]
    pub metrics: HashMap<String, Vec<Sample>>,
}

/// Reads `metric -> [[ts, value], ...]`, dropping points whose value is `null` (gaps in the series).
fn deserialize_series<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<Sample>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Vec<(f64, Option<f64>)>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, points)| {
            let samples = points
                .into_iter()
                .filter_map(|(ts, value)| value.map(|v| Sample::from((ts, v))))
                .collect();
            (name, samples)
        })
        .collect())
}

impl MetricItem {
    /// Host name, or the entity label when the item is not bound to a host.
    pub fn display_name(&self) -> &str {
        if self.host.is_empty() {
            &self.label
        } else {
            &self.host
        }
    }

    /// Samples for `metric`; empty when the item does not carry it.
    pub fn series(&self, metric: &str) -> &[Sample] {
        self.metrics.get(metric).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Entity snapshot descriptor from the snapshots endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub snapshot_id: String,
    #[serde(default)]
    pub plugin: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
}

static METRIC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("metric name pattern compiles"));

/// Metric names are dotted identifiers such as `cpu.user` or `metrics.gauges.KPI.error_rate`.
pub fn is_valid_metric_name(name: &str) -> bool {
    METRIC_NAME.is_match(name)
}
