// Integration tests: HTTP endpoints over a pre-populated cache

mod common;

use axum_test::TestServer;
use common::{CPU_USER, NOON, cpu_user};
use infraheat::cache::MetricsCache;
use infraheat::models::{EntityGroup, Snapshot};
use infraheat::pipeline::Timeseries;
use infraheat::poller::PollStats;
use infraheat::routes;
use std::collections::BTreeMap;
use std::sync::Arc;

fn test_server(cache: Arc<MetricsCache>) -> TestServer {
    let app = routes::app(cache, Arc::new(PollStats::default()), None);
    TestServer::new(app)
}

fn populated_cache() -> Arc<MetricsCache> {
    let cache = Arc::new(MetricsCache::new());
    let mut groups = BTreeMap::new();
    groups.insert(
        EntityGroup::Host,
        vec![
            cpu_user(NOON, &[0.01, 0.01, 0.01]),
            cpu_user(NOON + 1, &[0.01, 0.02]),
        ],
    );
    groups.insert(EntityGroup::Filler, vec![]);
    cache.store(Snapshot::new(NOON * 1000, groups));
    cache
}

#[tokio::test]
async fn test_ts_sum_returns_aligned_values() {
    let server = test_server(populated_cache());
    let response = server
        .get("/ts_sum")
        .add_query_param("entity", "host")
        .add_query_param("metric", CPU_USER)
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/json");
    let ts: Timeseries = response.json();
    assert_eq!(ts.values.len(), 3);
    assert!((ts.values[0] - 0.01).abs() < 1e-12);
    assert!((ts.values[1] - 0.02).abs() < 1e-12);
    assert!((ts.values[2] - 0.03).abs() < 1e-12);
}

#[tokio::test]
async fn test_heatmap_data_returns_dense_csv() {
    let server = test_server(populated_cache());
    let response = server
        .get("/heatmap_data")
        .add_query_param("entity", "host")
        .add_query_param("metric", CPU_USER)
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "text/csv");
    let body = response.text();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 1 + 21 * 3);
    assert_eq!(lines[0], "group,variable,value");
    assert_eq!(lines[1], "12:00:00,0%,0");
    assert_eq!(lines[2], "12:00:00,5%,1");
    assert_eq!(lines[23], "12:00:01,5%,2");
    assert_eq!(lines[63], "12:00:02,100%,0");
}

#[tokio::test]
async fn test_rejects_invalid_metric_name() {
    let server = test_server(populated_cache());
    for path in ["/ts_sum", "/heatmap_data"] {
        let response = server
            .get(path)
            .add_query_param("entity", "host")
            .add_query_param("metric", "cpu user;drop")
            .await;
        response.assert_status_bad_request();
        response.assert_text("invalid metric name");
    }
}

#[tokio::test]
async fn test_rejects_missing_metric() {
    let server = test_server(populated_cache());
    let response = server.get("/ts_sum").add_query_param("entity", "host").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_rejects_unknown_entity() {
    let server = test_server(populated_cache());
    let response = server
        .get("/heatmap_data")
        .add_query_param("entity", "database")
        .add_query_param("metric", CPU_USER)
        .await;
    response.assert_status_bad_request();
    response.assert_text("invalid entity name");
}

#[tokio::test]
async fn test_empty_cache_serves_empty_views() {
    let server = test_server(Arc::new(MetricsCache::new()));
    let response = server
        .get("/ts_sum")
        .add_query_param("entity", "host")
        .add_query_param("metric", CPU_USER)
        .await;
    response.assert_status_ok();
    let ts: Timeseries = response.json();
    assert!(ts.values.is_empty());

    let response = server
        .get("/heatmap_data")
        .add_query_param("entity", "filler")
        .add_query_param("metric", CPU_USER)
        .await;
    response.assert_status_ok();
    response.assert_text("group,variable,value\n");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = test_server(Arc::new(MetricsCache::new()));
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("infraheat"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_status_endpoint_reports_snapshot() {
    let server = test_server(populated_cache());
    let response = server.get("/api/status").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["fetchedAt"], serde_json::json!(NOON * 1000));
    assert_eq!(json["pollsOk"], serde_json::json!(0));
    assert_eq!(json["groups"]["host"], serde_json::json!(2));
    assert_eq!(json["groups"]["filler"], serde_json::json!(0));
}

#[tokio::test]
async fn test_status_endpoint_before_first_poll() {
    let server = test_server(Arc::new(MetricsCache::new()));
    let json: serde_json::Value = server.get("/api/status").await.json();
    assert!(json["fetchedAt"].is_null());
    assert_eq!(json["groups"], serde_json::json!({}));
}
