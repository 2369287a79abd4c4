use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ghost_sentry::config::Config;
use ghost_sentry::core::assets::AssetRegistry;
use ghost_sentry::core::events::EventBus;
use ghost_sentry::core::sentry::Sentry;
use ghost_sentry::gateway::Gateway;
use ghost_sentry::handlers;
use ghost_sentry::sink::Sink;
use ghost_sentry::store::sqlite_store::SqliteStore;
use ghost_sentry::store::Store;
use ghost_sentry::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ghost_sentry=debug,tower_http=debug")),
        )
        .init();

    let config = Config::load("ghost_sentry.toml")?;
    tracing::info!(port = config.port, db_path = %config.db_path, sink_mode = ?config.sink_mode, "starting ghost-sentry");

    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&config.db_path)?);
    let bus = Arc::new(EventBus::new());
    let assets = Arc::new(AssetRegistry::new());
    let sentry = Arc::new(Sentry::new());
    let sink = Arc::new(Sink::new(
        config.sink_mode,
        store.clone(),
        bus.clone(),
        config.lattice_endpoint.clone(),
    )?);
    let gateway = Arc::new(Gateway::new(store.clone(), bus.clone(), assets.clone()));
    let config = Arc::new(config);

    let state = AppState {
        store,
        bus,
        assets,
        sentry,
        sink,
        gateway,
        config: config.clone(),
    };

    let cors = match &state.config.cors_origins {
        Some(origins) => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new().allow_origin(parsed).allow_methods(Any).allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    };

    let api = Router::new()
        .route("/health", get(handlers::health::healthz))
        .route("/tracks", get(handlers::tracks::get_tracks))
        .route(
            "/tracks/cot",
            get(handlers::tracks::get_tracks_cot),
        )
        .route(
            "/tracks/{entity_id}/history",
            get(handlers::tracks::get_track_history),
        )
        .route("/tasks", get(handlers::tasks::get_tasks))
        .route(
            "/tasks/{task_id}/state",
            patch(handlers::tasks::update_task_state),
        )
        .route(
            "/tasks/{task_id}/ack",
            post(handlers::tasks::acknowledge_task),
        )
        .route("/timeline", get(handlers::timeline::get_timeline))
        .route("/assets", get(handlers::assets::get_assets))
        .route(
            "/assets/telemetry",
            post(handlers::assets::update_asset_telemetry),
        )
        .route(
            "/missions",
            get(handlers::missions::get_missions).post(handlers::missions::create_mission),
        );

    // spec.md §9 Open Question (c): serve both the versioned and legacy
    // unversioned paths with identical semantics.
    let app = Router::new()
        .nest("/v1", api.clone())
        .merge(api)
        .route("/ws/tracks", get(handlers::ws::ws_tracks))
        .route("/ws/cot", get(handlers::ws::ws_cot))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("ghost-sentry listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
