use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{audit, creators, handlers, packs};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes, all behind the authenticator
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Audit
        .route("/audit", get(audit::query_audit))
        // Packs (mutations act as the forwarded creator)
        .route("/packs", post(packs::publish_pack))
        .route("/packs/{slug}", put(packs::update_pack))
        .route("/packs/{slug}", delete(packs::delete_pack))
        // Creators and their public storefront reads
        .route("/creators", post(creators::register_creator))
        .route("/creators/{username}", get(creators::get_creator))
        .route("/creators/{username}/packs", get(packs::list_creator_packs))
        .route(
            "/creators/{username}/packs/{slug}",
            get(packs::get_creator_pack),
        )
        // Payment onboarding (always self-service)
        .route("/onboarding", post(creators::start_onboarding))
        .route("/onboarding", get(creators::onboarding_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Liveness and metrics stay outside the authenticator so probes and
    // scrapers need no credentials.
    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
