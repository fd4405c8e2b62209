//! Route table assembly.

use axum::routing::{get, post};
use axum::{Router, middleware};
use surrealdb::Connection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;

pub mod auth;
pub mod patients;

/// Assemble the application router: public auth/health endpoints
/// plus the bearer-token-protected patient endpoints.
pub fn router<C: Connection>(state: AppState<C>) -> Router {
    let protected = Router::new()
        .route(
            "/patients",
            get(patients::list_patients::<C>).post(patients::create_patient::<C>),
        )
        .route("/patients/:id", get(patients::get_patient::<C>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<C>,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/auth/token", post(auth::login::<C>))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
