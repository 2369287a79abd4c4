pub mod config;
pub mod core;
pub mod gateway;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod sink;
pub mod store;

use std::sync::Arc;

use crate::config::Config;
use crate::core::assets::AssetRegistry;
use crate::core::events::EventBus;
use crate::core::sentry::Sentry;
use crate::gateway::Gateway;
use crate::sink::Sink;
use crate::store::Store;

/// Shared application state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub bus: Arc<EventBus>,
    pub assets: Arc<AssetRegistry>,
    pub sentry: Arc<Sentry>,
    pub sink: Arc<Sink>,
    pub gateway: Arc<Gateway>,
    pub config: Arc<Config>,
}
