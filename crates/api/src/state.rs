use std::sync::Arc;

use crate::config::ServerConfig;
use crate::documents::DocumentStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lernix_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<lernix_events::EventBus>,
    /// External document/CDN store for certificate artifacts.
    pub documents: Arc<dyn DocumentStore>,
}
