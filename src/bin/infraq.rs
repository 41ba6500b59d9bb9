// One-shot infrastructure query: fetch a metric once and write a report to stdout.
//
// Usage: infraq --metric cpu.user --query 'entity.zone:us-east-2' --window 1h --format heatmap

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use infraheat::infra_repo::InstanaClient;
use infraheat::pipeline::OutputFormat;
use infraheat::report::{ReportRequest, run_report};
use infraheat::{telemetry, timeframe};

#[derive(Debug, Parser)]
#[command(name = "infraq", version, about = "Query infrastructure metrics once and print a report")]
struct Args {
    /// Metrics API base URL.
    #[arg(long, env = "INSTANA_URL")]
    url: String,

    /// Metrics API token.
    #[arg(long, env = "INSTANA_TOKEN", hide_env_values = true)]
    token: String,

    /// Metric name to extract.
    #[arg(long, default_value = "cpu.user")]
    metric: String,

    /// Infrastructure query selecting the entities.
    #[arg(long, default_value = "entity.zone:us-east-2")]
    query: String,

    /// Snapshot plugin type (e.g. host).
    #[arg(long, default_value = "host")]
    plugin: String,

    /// Metric window size (e.g. 60s, 15m, 1h).
    #[arg(long, default_value = "1h")]
    window: String,

    /// End of the window, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (UTC). Defaults to now.
    #[arg(long)]
    to: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Also count entity snapshots matching the query.
    #[arg(long)]
    snapshots: bool,

    /// Per-request timeout.
    #[arg(long, default_value = "30s")]
    timeout: String,

    /// Verify TLS certificates of the metrics API.
    #[arg(long)]
    secure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("info");
    let args = Args::parse();

    anyhow::ensure!(
        infraheat::models::is_valid_metric_name(&args.metric),
        "invalid metric name {:?}",
        args.metric
    );
    let window_ms = timeframe::parse_window(&args.window)?;
    let to_ms = match args.to.as_deref() {
        Some(s) => timeframe::parse_timestamp(s)?,
        None => timeframe::now_ms(),
    };
    let timeout_ms = timeframe::parse_window(&args.timeout)?;

    let client = InstanaClient::new(
        &args.url,
        &args.token,
        !args.secure,
        Duration::from_millis(timeout_ms as u64),
    )?;
    let request = ReportRequest {
        query: args.query,
        plugin: args.plugin,
        metric: args.metric,
        window_ms,
        to_ms,
        format: args.format,
        include_snapshots: args.snapshots,
    };
    let report = run_report(&client, &request)
        .await
        .context("error retrieving metrics")?;

    tracing::info!("report complete: {report}");
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&report.body)?;
    stdout.flush()?;
    Ok(())
}
