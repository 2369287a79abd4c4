//! Runtime configuration (spec.md §6 Environment).
//!
//! A `ghost_sentry.toml` file supplies defaults, the way the teacher's
//! `WideConfig::load` does; environment variables override it, matching
//! spec.md's `CORS_ORIGINS` / `LATTICE_ENDPOINT` contract.

use std::path::Path;

use serde::Deserialize;

use crate::sink::SinkMode;

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_db_path")]
    db_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./ghost_sentry.db".to_string()
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: String,
    /// `None` means "no `CORS_ORIGINS` set" — callers fall back to a
    /// permissive CORS layer, matching the teacher's unset-env behavior.
    pub cors_origins: Option<Vec<String>>,
    pub sink_mode: SinkMode,
    pub lattice_endpoint: Option<String>,
    pub version: String,
}

impl Config {
    /// Load from `path` (if present) and layer environment overrides on
    /// top. A `prod` sink mode without `LATTICE_ENDPOINT` is a fatal
    /// configuration error raised here, before serving traffic (spec.md §7).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<FileConfig>(&contents)?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            FileConfig::default()
        };

        let cors_origins = std::env::var("CORS_ORIGINS")
            .ok()
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect());

        let sink_mode = match std::env::var("GHOST_SENTRY_MODE").as_deref() {
            Ok("prod") => SinkMode::Prod,
            _ => SinkMode::Dev,
        };
        let lattice_endpoint = std::env::var("LATTICE_ENDPOINT").ok();

        if sink_mode == SinkMode::Prod && lattice_endpoint.is_none() {
            return Err(crate::sink::SinkConfigError::MissingLatticeEndpoint.into());
        }

        let port = std::env::var("GHOST_SENTRY_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(file.server.port);
        let db_path = std::env::var("GHOST_SENTRY_DB").unwrap_or(file.server.db_path);

        Ok(Config {
            port,
            db_path,
            cors_origins,
            sink_mode,
            lattice_endpoint,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
