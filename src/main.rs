//! Rakshak Monitor - Main Entry Point
//!
//! Without arguments, polls `/analytics` and logs the dashboard on every
//! change until Ctrl-C. With `message|url|job <text>`, classifies once.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use rakshak_core::config::Config;
use rakshak_core::constants::{APP_NAME, APP_VERSION};
use rakshak_core::logic::analytics::DashboardSeries;
use rakshak_core::logic::detection::{DetectionClient, JobPosting};
use rakshak_core::logic::refresh::{OneShot, Phase, RefreshScheduler};
use rakshak_core::logic::scan::ScanOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    log::info!("Starting {} monitor v{}...", APP_NAME, APP_VERSION);

    let config = Config::from_env();
    let client = DetectionClient::new(&config).context("Failed to build HTTP client")?;
    log::info!("Upstream: {}", client.base_url());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        None => monitor(client, &config).await,
        Some((kind, rest)) => classify_once(&client, kind, &rest.join(" ")).await,
    }
}

async fn classify_once(client: &DetectionClient, kind: &str, text: &str) -> Result<()> {
    let request: OneShot<ScanOutcome> = OneShot::new();
    let phase = match kind {
        "message" => request.run(|| client.detect_message(text)).await,
        "url" => request.run(|| client.scan_url(text)).await,
        "job" => {
            let posting = JobPosting {
                title: text.to_string(),
                ..Default::default()
            };
            request.run(|| async move { client.detect_job(&posting).await }).await
        }
        other => bail!("Unknown scan type '{}' (expected message, url or job)", other),
    };

    let state = request.state();
    match (phase, state.value, state.error) {
        (Some(Phase::Settled), Some(outcome), _) => {
            let badge = outcome.badge();
            log::info!(
                "{}: {} ({}%, {})",
                outcome.kind.scan_title(),
                outcome.result_label(),
                outcome.percentage(),
                badge.label
            );
            for line in &outcome.explanations {
                log::info!("  - {}", line);
            }
            Ok(())
        }
        (_, _, Some(e)) => Err(e).context("Scan failed"),
        _ => bail!("Scan did not complete"),
    }
}

async fn monitor(client: DetectionClient, config: &Config) -> Result<()> {
    match client.health().await {
        Ok(health) if health.is_healthy() => {
            log::info!("Service healthy: {} models loaded", health.models_loaded)
        }
        Ok(health) => log::warn!("Service reports status '{}'", health.status),
        Err(e) => log::warn!("Service not reachable: {}", e),
    }

    if let Ok(status) = client.model_status().await {
        for name in status.missing() {
            log::warn!("Model not loaded: {}", name);
        }
    }

    let handle = RefreshScheduler::spawn(Arc::new(client), config.refresh_interval());
    let mut updates = handle.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.is_fetching() {
                    continue;
                }
                if let Some(e) = &state.error {
                    log::warn!("Dashboard stale: {}", e);
                }
                if let Some(snapshot) = &state.value {
                    report(&DashboardSeries::from_snapshot(snapshot));
                }
            }
        }
    }

    handle.shutdown();
    Ok(())
}

fn report(series: &DashboardSeries) {
    let stats: Vec<String> = series
        .stats
        .iter()
        .map(|card| format!("{}: {}", card.label, card.value))
        .collect();
    log::info!("{}", stats.join(" | "));

    for point in &series.risks {
        log::info!("  {:<12} {}", point.label, point.value);
    }
    if !series.trend.has_data() {
        log::info!("  No scans in the last 7 days");
    }
    if let Some(latest) = series.recent.first() {
        log::info!("  Latest: {} - {} [{}]", latest.title, latest.detail, latest.badge.label);
    }
}
