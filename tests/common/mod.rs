// Shared test helpers: metric item builders and a scripted metrics source

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use infraheat::infra_repo::{FetchError, InfraQuery, MetricsQuery};
use infraheat::models::{MetricItem, Sample, SnapshotItem};

pub const CPU_USER: &str = "cpu.user";

/// 2020-10-01T12:00:00Z
pub const NOON: i64 = 1_601_553_600;

/// Item with one `metric` sample per second starting at `start_epoch` (seconds).
pub fn series_item(host: &str, metric: &str, start_epoch: i64, values: &[f64]) -> MetricItem {
    let samples = values
        .iter()
        .enumerate()
        .map(|(i, v)| Sample::new((start_epoch + i as i64) * 1000, *v))
        .collect();
    MetricItem {
        host: host.into(),
        metrics: HashMap::from([(metric.to_string(), samples)]),
        ..Default::default()
    }
}

pub fn cpu_user(start_epoch: i64, values: &[f64]) -> MetricItem {
    series_item("", CPU_USER, start_epoch, values)
}

/// Metrics source answering from a query -> items table.
#[derive(Default)]
pub struct FakeQuery {
    responses: Mutex<HashMap<String, Vec<MetricItem>>>,
    snapshots: Mutex<Vec<SnapshotItem>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl FakeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, query: &str, items: Vec<MetricItem>) {
        self.responses.lock().unwrap().insert(query.to_string(), items);
    }

    pub fn set_snapshots(&self, snapshots: Vec<SnapshotItem>) {
        *self.snapshots.lock().unwrap() = snapshots;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InfraQuery for FakeQuery {
    async fn list_metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricItem>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&query.query)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_snapshots(
        &self,
        _query: &str,
        _plugin: &str,
        _window_ms: i64,
    ) -> Result<Vec<SnapshotItem>, FetchError> {
        Ok(self.snapshots.lock().unwrap().clone())
    }
}
