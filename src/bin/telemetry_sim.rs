//! Standalone asset telemetry simulator.
//!
//! Mirrors the original `scripts/simulate_assets.py`: drifts each seeded
//! asset's position, drains its battery, fluctuates its signal, and posts
//! the result to a running server's `/assets/telemetry` endpoint on a
//! fixed interval. Grounded in the teacher's `src/bin/anomaly_engine.rs`
//! shape — a small standalone binary configured from env vars, no CLI
//! argument parsing.

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use tracing_subscriber::EnvFilter;

const ASSET_IDS: [&str; 3] = ["drone-alpha", "drone-beta", "ugv-sierra"];
const TICK: Duration = Duration::from_secs(2);
const DRIFT_DEG: f64 = 0.0001;
const BATTERY_DRAIN: f64 = 0.001;
const SIGNAL_JITTER: f64 = 0.05;
const SIGNAL_FLOOR: f64 = 0.2;

struct AssetState {
    lat: f64,
    lon: f64,
    battery: f64,
    signal: f64,
}

fn seed_states() -> HashMap<&'static str, AssetState> {
    HashMap::from([
        (
            "drone-alpha",
            AssetState { lat: 33.94, lon: -118.41, battery: 1.0, signal: 1.0 },
        ),
        (
            "drone-beta",
            AssetState { lat: 33.95, lon: -118.40, battery: 1.0, signal: 1.0 },
        ),
        (
            "ugv-sierra",
            AssetState { lat: 33.93, lon: -118.42, battery: 1.0, signal: 1.0 },
        ),
    ])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ghost_sentry_telemetry_sim=info")),
        )
        .init();

    let base_url = std::env::var("GHOST_SENTRY_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());

    tracing::info!(base_url, "starting asset telemetry simulation");

    let client = reqwest::Client::new();
    let mut states = seed_states();
    let mut rng = rand::rng();

    loop {
        for asset_id in ASSET_IDS {
            let state = states.get_mut(asset_id).expect("seeded above");
            state.lat += rng.random_range(-DRIFT_DEG..DRIFT_DEG);
            state.lon += rng.random_range(-DRIFT_DEG..DRIFT_DEG);
            state.battery = (state.battery - BATTERY_DRAIN).max(0.0);
            state.signal = (state.signal + rng.random_range(-SIGNAL_JITTER..SIGNAL_JITTER))
                .clamp(SIGNAL_FLOOR, 1.0);

            let response = client
                .post(format!("{base_url}/assets/telemetry"))
                .query(&[
                    ("asset_id", asset_id.to_string()),
                    ("lat", state.lat.to_string()),
                    ("lon", state.lon.to_string()),
                    ("battery", state.battery.to_string()),
                    ("signal", state.signal.to_string()),
                ])
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!(
                        asset_id,
                        lat = state.lat,
                        lon = state.lon,
                        battery = state.battery,
                        "pushed telemetry"
                    );
                }
                Ok(resp) => {
                    tracing::warn!(asset_id, status = %resp.status(), "telemetry push rejected");
                }
                Err(err) => {
                    tracing::error!(asset_id, %err, "failed to reach ghost-sentry");
                }
            }
        }
        tokio::time::sleep(TICK).await;
    }
}
