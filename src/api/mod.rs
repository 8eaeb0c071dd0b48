pub mod contact;
pub mod health;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::health_routes())
        .merge(contact::contact_routes())
        .with_state(state)
}

/// Routes wrapped in request tracing, permissive CORS and the whole-request timeout
pub fn create_app(state: AppState) -> Router {
    let request_timeout = state.request_timeout();

    create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
