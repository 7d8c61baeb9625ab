//! Router assembly. Three rings: open routes (health, key minting),
//! API-key-gated routes, and routes that additionally require a live
//! session.

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api_key_gate =
        axum_middleware::from_fn_with_state(state.clone(), middleware::require_api_key);
    let session_gate =
        axum_middleware::from_fn_with_state(state.clone(), middleware::require_session);

    let open_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/generate-api-key",
            post(handlers::api_key::generate_api_key),
        );

    let keyed_routes = Router::new()
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/verify", post(handlers::auth::verify))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route(
            "/api/v1/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route(
            "/api/v1/auth/reset-password",
            post(handlers::auth::reset_password),
        )
        .route(
            "/api/v1/auth/resend-verification",
            post(handlers::auth::resend_verification),
        )
        .route("/api/v1/event", get(handlers::events::list_events))
        .route("/api/v1/event/{id}", get(handlers::events::get_event))
        .route("/api/v1/updates", get(handlers::updates::list_updates))
        .route_layer(api_key_gate.clone());

    let session_routes = Router::new()
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/v1/auth",
            get(handlers::auth::list_users)
                .put(handlers::auth::update_profile)
                .delete(handlers::auth::delete_account),
        )
        .route("/api/v1/auth/{id}", get(handlers::auth::get_user))
        .route("/api/v1/event", post(handlers::events::create_event))
        .route(
            "/api/v1/event/{id}",
            put(handlers::events::update_event).delete(handlers::events::delete_event),
        )
        .route(
            "/api/v1/event/{id}/feature",
            put(handlers::events::feature_event),
        )
        .route(
            "/api/v1/event/{id}/unfeature",
            put(handlers::events::unfeature_event),
        )
        .route("/api/v1/updates", post(handlers::updates::create_update))
        .route("/api/v1/updates/mine", get(handlers::updates::my_updates))
        .route(
            "/api/v1/updates/{id}",
            get(handlers::updates::get_update)
                .patch(handlers::updates::edit_update)
                .delete(handlers::updates::delete_update),
        )
        .route(
            "/api/v1/updates/{id}/disable",
            patch(handlers::updates::disable_update),
        )
        .route_layer(session_gate)
        .route_layer(api_key_gate);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(open_routes)
        .merge(keyed_routes)
        .merge(session_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
