//! Route table

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::session::SessionManager;

/// Build the HTTP router
pub fn create_router(manager: Arc<SessionManager>) -> Router {
    let request_timeout = Duration::from_secs(manager.settings().server.request_timeout_secs);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/providers", get(handlers::list_providers))
        .route("/styles", get(handlers::list_styles))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id", delete(handlers::delete_session))
        // Profiles
        .route(
            "/sessions/:id/profiles",
            get(handlers::list_profiles).put(handlers::save_profile),
        )
        .route("/sessions/:id/active_profile", get(handlers::active_profile))
        .route("/sessions/:id/profiles/:name", delete(handlers::delete_profile))
        .route(
            "/sessions/:id/profiles/:name/activate",
            post(handlers::activate_profile),
        )
        .route(
            "/sessions/:id/profiles/:name/validate",
            post(handlers::validate_profile),
        )
        // Models
        .route("/sessions/:id/models", get(handlers::list_models))
        .route("/sessions/:id/models/discover", post(handlers::discover_models))
        // Generation
        .route("/sessions/:id/generate", post(handlers::generate))
        // History
        .route(
            "/sessions/:id/history",
            get(handlers::list_history).delete(handlers::clear_history),
        )
        .route("/sessions/:id/history/:entry_id", delete(handlers::remove_history))
        .route("/sessions/:id/history/:entry_id/vary", get(handlers::vary))
        .route("/sessions/:id/history/:entry_id/images", get(handlers::entry_images))
        // Favorites
        .route("/sessions/:id/favorites", get(handlers::list_favorites))
        .route("/sessions/:id/favorites/:image_id", post(handlers::toggle_favorite))
        // Download
        .route("/sessions/:id/images/:image_id", get(handlers::download_image))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(manager)
}
