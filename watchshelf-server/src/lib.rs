//! # Watchshelf Server
//!
//! HTTP surface, periodic scheduler and configuration-backed library host
//! around `watchshelf-core`. The `watchshelf` binary wires them together.

pub mod errors;
pub mod handlers;
pub mod library_host;
pub mod scheduler;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use errors::{AppError, AppResult};
pub use library_host::ConfigLibraryHost;
pub use scheduler::ImportScheduler;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/import/plan-to-watch", post(handlers::import_handler))
        .route("/libraries", get(handlers::libraries_handler))
        .route("/scrobble", post(handlers::scrobble_handler))
        .route("/placeholders", get(handlers::placeholders_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
