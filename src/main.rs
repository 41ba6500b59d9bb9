use anyhow::Result;
use infraheat::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init("info");

    let app_config = config::AppConfig::load()?;
    let poller_config = poller::PollerConfig::from_app_config(&app_config)?;
    tracing::info!(
        url = %app_config.api.url,
        window_ms = poller_config.window_ms,
        rollup_secs = poller_config.rollup_secs,
        groups = poller_config.groups.len(),
        "starting poller"
    );

    let client = Arc::new(infra_repo::InstanaClient::new(
        &app_config.api.url,
        &app_config.api.token,
        app_config.api.insecure,
        Duration::from_millis(poller_config.fetch_timeout_ms),
    )?);
    let cache = Arc::new(cache::MetricsCache::new());
    let stats = Arc::new(poller::PollStats::default());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let poller_handle = poller::spawn(
        poller::PollerDeps {
            client,
            cache: cache.clone(),
            stats: stats.clone(),
            shutdown_rx,
        },
        poller_config,
    );

    let app = routes::app(cache, stats, app_config.server.static_dir.as_deref());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = poller_handle.await;
        }
    }

    Ok(())
}
