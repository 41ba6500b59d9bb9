// Batch report pipeline: hard failure on empty results, pluggable output stages

mod common;

use common::{CPU_USER, FakeQuery, NOON, cpu_user, series_item};
use infraheat::analysis::TabularRow;
use infraheat::infra_repo::FetchError;
use infraheat::models::SnapshotItem;
use infraheat::pipeline::{ItemSummary, OutputFormat, OutputStage, Timeseries, write_csv};
use infraheat::report::{ReportRequest, run_report};

const QUERY: &str = "entity.zone:us-east-2";

fn request(format: OutputFormat) -> ReportRequest {
    ReportRequest {
        query: QUERY.into(),
        plugin: "host".into(),
        metric: CPU_USER.into(),
        window_ms: 3_600_000,
        to_ms: (NOON + 3600) * 1000,
        format,
        include_snapshots: false,
    }
}

#[tokio::test]
async fn report_fails_when_no_items_match() {
    let client = FakeQuery::new();
    let err = run_report(&client, &request(OutputFormat::Sum))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::NoMetrics(q)) if q == QUERY
    ));
}

#[tokio::test]
async fn report_propagates_fetch_errors() {
    let client = FakeQuery::new();
    client.set_failing(true);
    let err = run_report(&client, &request(OutputFormat::Sum))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn report_rejects_oversized_window() {
    let client = FakeQuery::new();
    let mut req = request(OutputFormat::Sum);
    req.window_ms = 30 * 24 * 3_600_000;
    assert!(run_report(&client, &req).await.is_err());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn report_renders_sum_json() {
    let client = FakeQuery::new();
    client.respond(QUERY, vec![cpu_user(NOON, &[0.5, 0.25]), cpu_user(NOON, &[0.5])]);
    let report = run_report(&client, &request(OutputFormat::Sum)).await.unwrap();
    assert_eq!(report.items, 2);
    assert_eq!(report.rollup_secs, 60);
    assert_eq!(report.snapshots, None);
    assert_eq!(report.to_string(), "metrics: 2, rollup: 60s");
    let ts: Timeseries = serde_json::from_slice(&report.body).unwrap();
    assert_eq!(ts.values, vec![1.0, 0.25]);
}

#[tokio::test]
async fn report_renders_heatmap_csv_and_counts_snapshots() {
    let client = FakeQuery::new();
    client.respond(QUERY, vec![cpu_user(NOON, &[0.0])]);
    client.set_snapshots(vec![SnapshotItem::default(), SnapshotItem::default()]);
    let mut req = request(OutputFormat::Heatmap);
    req.include_snapshots = true;

    let report = run_report(&client, &req).await.unwrap();
    assert_eq!(report.snapshots, Some(2));
    assert_eq!(report.to_string(), "metrics: 1, snapshots: 2, rollup: 60s");
    let body = String::from_utf8(report.body).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 22);
    assert_eq!(lines[1], "12:00:00,0%,1");
}

#[tokio::test]
async fn report_renders_item_summary() {
    let client = FakeQuery::new();
    client.respond(
        QUERY,
        vec![
            series_item("web-1", CPU_USER, NOON, &[0.2, 0.4]),
            series_item("web-2", "cpu.sys", NOON, &[0.9]),
        ],
    );
    let report = run_report(&client, &request(OutputFormat::Summary))
        .await
        .unwrap();
    let body = String::from_utf8(report.body).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines[0],
        "web-1\tcpu.user\tsamples=2\tmin=0.2000\tmean=0.3000\tmax=0.4000\t12:00:00..12:00:01"
    );
    assert_eq!(lines[1], "web-2\tcpu.user\tno samples");
}

#[test]
fn item_summary_renders_non_finite_series() {
    let items = vec![series_item("web-1", CPU_USER, NOON, &[f64::NAN])];
    let body = String::from_utf8(ItemSummary.render(&items, CPU_USER).unwrap()).unwrap();
    assert_eq!(
        body,
        "web-1\tcpu.user\tsamples=1\tmin=inf\tmean=NaN\tmax=-inf\t12:00:00..12:00:00\n"
    );
}

#[test]
fn write_csv_quotes_special_fields() {
    let rows = vec![
        TabularRow::header(),
        TabularRow::new("a,b", "say \"hi\"", "1"),
    ];
    assert_eq!(
        write_csv(&rows),
        "group,variable,value\n\"a,b\",\"say \"\"hi\"\"\",1\n"
    );
}
