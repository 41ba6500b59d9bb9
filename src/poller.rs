// Background poller: fetch every configured group, publish one snapshot per successful cycle.
// A single task awaits each fetch inline, so polls never overlap; ticks missed meanwhile are skipped.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::try_join_all;
use tokio::time::{Duration, interval, timeout};
use tracing::instrument;

use crate::cache::MetricsCache;
use crate::config::{AppConfig, GroupConfig};
use crate::infra_repo::{FetchError, InfraQuery, MetricsQuery};
use crate::models::Snapshot;
use crate::timeframe;

/// Poll outcome counters, shared with the status endpoint.
#[derive(Debug, Default)]
pub struct PollStats {
    polls_ok: AtomicU64,
    polls_failed: AtomicU64,
}

impl PollStats {
    pub fn polls_ok(&self) -> u64 {
        self.polls_ok.load(Ordering::Relaxed)
    }

    pub fn polls_failed(&self) -> u64 {
        self.polls_failed.load(Ordering::Relaxed)
    }
}

/// Client, cache and shutdown for the poller.
pub struct PollerDeps<Q> {
    pub client: Arc<Q>,
    pub cache: Arc<MetricsCache>,
    pub stats: Arc<PollStats>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Poll timing and the queries to run each cycle.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval_ms: u64,
    pub fetch_timeout_ms: u64,
    pub window_ms: i64,
    pub rollup_secs: i64,
    pub stats_log_interval_secs: u64,
    pub groups: Vec<GroupConfig>,
}

impl PollerConfig {
    pub fn from_app_config(config: &AppConfig) -> anyhow::Result<Self> {
        let window_ms = config.polling.window_ms()?;
        let rollup_secs = timeframe::rollup_for_window(window_ms)?;
        Ok(Self {
            interval_ms: config.polling.interval_ms,
            fetch_timeout_ms: config.polling.fetch_timeout_ms(),
            window_ms,
            rollup_secs,
            stats_log_interval_secs: config.polling.stats_log_interval_secs,
            groups: config.groups.clone(),
        })
    }

    fn query_for(&self, group: &GroupConfig, to_ms: i64) -> MetricsQuery {
        MetricsQuery {
            query: group.query.clone(),
            plugin: group.plugin.clone(),
            metrics: group.metrics.clone(),
            rollup_secs: self.rollup_secs,
            window_ms: self.window_ms,
            to_ms,
        }
    }
}

/// Runs one cycle: fetches all groups concurrently and assembles the snapshot.
/// Any group failing (or the cycle exceeding `fetch_timeout_ms`) fails the whole cycle.
pub async fn poll_once<Q: InfraQuery>(
    client: &Q,
    config: &PollerConfig,
    to_ms: i64,
) -> Result<Snapshot, FetchError> {
    let fetches = config.groups.iter().map(|group| {
        let query = config.query_for(group, to_ms);
        async move {
            let items = client.list_metrics(&query).await?;
            Ok::<_, FetchError>((group.entity, items))
        }
    });
    let limit = Duration::from_millis(config.fetch_timeout_ms);
    let results = timeout(limit, try_join_all(fetches))
        .await
        .map_err(|_| FetchError::Timeout(limit))??;
    let groups: BTreeMap<_, _> = results.into_iter().collect();
    Ok(Snapshot::new(timeframe::now_ms(), groups))
}

pub fn spawn<Q>(deps: PollerDeps<Q>, config: PollerConfig) -> tokio::task::JoinHandle<()>
where
    Q: InfraQuery + 'static,
{
    tokio::spawn(async move {
        run(deps, config).await;
    })
}

#[instrument(skip_all, fields(interval_ms = config.interval_ms, groups = config.groups.len()))]
async fn run<Q: InfraQuery>(deps: PollerDeps<Q>, config: PollerConfig) {
    let PollerDeps {
        client,
        cache,
        stats,
        mut shutdown_rx,
    } = deps;

    let mut tick = interval(Duration::from_millis(config.interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
    stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                match poll_once(client.as_ref(), &config, timeframe::now_ms()).await {
                    Ok(snapshot) => {
                        tracing::debug!(
                            operation = "poll",
                            fetched_at = snapshot.fetched_at,
                            "snapshot published"
                        );
                        cache.store(snapshot);
                        stats.polls_ok.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        stats.polls_failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(
                            error = %e,
                            operation = "poll",
                            "fetch failed; keeping previous snapshot"
                        );
                    }
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Poller shutting down");
                break;
            }
            _ = stats_log_tick.tick() => {
                let snapshot = cache.load();
                let items: usize = snapshot.groups().map(|(_, items)| items.len()).sum();
                tracing::info!(
                    polls_ok = stats.polls_ok(),
                    polls_failed = stats.polls_failed(),
                    items,
                    fetched_at = snapshot.fetched_at,
                    "poller stats"
                );
            }
        }
    }
}
