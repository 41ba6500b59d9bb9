use std::collections::HashSet;

use serde::Deserialize;

use crate::models::{EntityGroup, is_valid_metric_name};
use crate::timeframe;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served at `/` for the heatmap UI; nothing is served when unset.
    #[serde(default)]
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the metrics API. Overridden by `INSTANA_URL`.
    #[serde(default)]
    pub url: String,
    /// API token. Overridden by `INSTANA_TOKEN`; prefer the env var over storing it here.
    #[serde(default)]
    pub token: String,
    /// Accept invalid TLS certificates (self-signed on-prem installs).
    #[serde(default = "default_insecure")]
    pub insecure: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            insecure: default_insecure(),
        }
    }
}

fn default_insecure() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Metric window requested on each poll, e.g. "60s" or "15m".
    #[serde(default = "default_window")]
    pub window: String,
    /// Upper bound for one poll's fetch; defaults to `interval_ms`.
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
    /// How often to log poller stats at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            window: default_window(),
            fetch_timeout_ms: None,
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_window() -> String {
    "60s".into()
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl PollingConfig {
    pub fn fetch_timeout_ms(&self) -> u64 {
        self.fetch_timeout_ms.unwrap_or(self.interval_ms)
    }

    pub fn window_ms(&self) -> anyhow::Result<i64> {
        Ok(timeframe::parse_window(&self.window)?)
    }
}

/// One infrastructure query whose results are cached under `entity`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupConfig {
    pub entity: EntityGroup,
    pub query: String,
    pub plugin: String,
    pub metrics: Vec<String>,
}

fn group(entity: EntityGroup, query: &str, plugin: &str, metrics: &[&str]) -> GroupConfig {
    GroupConfig {
        entity,
        query: query.into(),
        plugin: plugin.into(),
        metrics: metrics.iter().map(|m| m.to_string()).collect(),
    }
}

fn default_groups() -> Vec<GroupConfig> {
    vec![
        group(
            EntityGroup::AppdataWriter,
            "entity.label:*appdata-writer*",
            "dropwizardApplicationContainer",
            &[
                "metrics.gauges.KPI.incoming.raw_spans.error_rate",
                "metrics.meters.KPI.incoming.raw_spans.calls",
            ],
        ),
        group(
            EntityGroup::AppdataProcessor,
            "entity.label:*appdata-processor*",
            "dropwizardApplicationContainer",
            &[
                "metrics.gauges.KPI.incoming.span_messages.error_rate",
                "metrics.meters.KPI.incoming.span_messages.calls",
            ],
        ),
        group(
            EntityGroup::Filler,
            "entity.label:filler*",
            "dropwizardApplicationContainer",
            &[
                "metrics.gauges.KPI.incoming.raw_messages.error_rate",
                "metrics.gauges.com.instana.filler.service.snapshot.OnlineSnapshotsLimit.online-snapshots-count",
            ],
        ),
        group(
            EntityGroup::Host,
            "entity.type:host AND entity.zone:Instana-*",
            "host",
            &["cpu.user", "cpu.sys", "cpu.wait"],
        ),
    ]
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`), applies `INSTANA_URL` / `INSTANA_TOKEN`, validates.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        let mut config: AppConfig = toml::from_str(&s)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests). Environment is not consulted.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("INSTANA_URL")
            && !url.is_empty()
        {
            self.api.url = url;
        }
        if let Ok(token) = std::env::var("INSTANA_TOKEN")
            && !token.is_empty()
        {
            self.api.token = token;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.api.url.is_empty(),
            "api.url must be non-empty (or set INSTANA_URL)"
        );
        anyhow::ensure!(
            !self.api.token.is_empty(),
            "api.token must be non-empty (or set INSTANA_TOKEN)"
        );
        anyhow::ensure!(
            self.polling.interval_ms > 0,
            "polling.interval_ms must be > 0, got {}",
            self.polling.interval_ms
        );
        let fetch_timeout_ms = self.polling.fetch_timeout_ms();
        anyhow::ensure!(
            fetch_timeout_ms > 0 && fetch_timeout_ms <= self.polling.interval_ms,
            "polling.fetch_timeout_ms must be between 1 and polling.interval_ms ({}), got {}",
            self.polling.interval_ms,
            fetch_timeout_ms
        );
        anyhow::ensure!(
            self.polling.stats_log_interval_secs > 0,
            "polling.stats_log_interval_secs must be > 0, got {}",
            self.polling.stats_log_interval_secs
        );
        let window_ms = self
            .polling
            .window_ms()
            .map_err(|e| anyhow::anyhow!("polling.window: {}", e))?;
        timeframe::rollup_for_window(window_ms)
            .map_err(|e| anyhow::anyhow!("polling.window: {}", e))?;

        anyhow::ensure!(!self.groups.is_empty(), "groups must not be empty");
        let mut seen = HashSet::new();
        for g in &self.groups {
            anyhow::ensure!(
                seen.insert(g.entity),
                "groups: entity {} is configured more than once",
                g.entity
            );
            anyhow::ensure!(
                !g.query.is_empty(),
                "groups.{}.query must be non-empty",
                g.entity
            );
            anyhow::ensure!(
                !g.plugin.is_empty(),
                "groups.{}.plugin must be non-empty",
                g.entity
            );
            anyhow::ensure!(
                !g.metrics.is_empty(),
                "groups.{}.metrics must list at least one metric",
                g.entity
            );
            if let Some(bad) = g.metrics.iter().find(|m| !is_valid_metric_name(m)) {
                anyhow::bail!("groups.{}.metrics: invalid metric name {:?}", g.entity, bad);
            }
        }
        Ok(())
    }
}
