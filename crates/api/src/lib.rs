//! HTTP API server for the booking service.
//!
//! Exposes the event catalog, the booking engine and user accounts over REST,
//! with structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{BookingService, EventService, UserService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::BookingStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenIssuer;
use config::Config;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: BookingStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/", get(routes::health::welcome))
        .route("/health", get(routes::health::check))
        .route("/events", get(routes::events::list::<S>))
        .route("/events/{id}", get(routes::events::get::<S>))
        .route("/event/{id}", get(routes::events::get::<S>))
        .route("/booking", post(routes::bookings::create::<S>))
        .route("/booking/{id}", get(routes::bookings::get::<S>))
        .route("/user", post(routes::users::register::<S>))
        .route("/user/{id}", get(routes::users::get::<S>))
        .route("/login", post(routes::users::login::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the services over a single store.
pub fn create_state<S: BookingStore + Clone + 'static>(
    store: S,
    config: &Config,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        bookings: BookingService::new(store.clone()),
        events: EventService::new(store.clone()),
        users: UserService::new(store),
        tokens: TokenIssuer::new(&config.jwt_secret, config.jwt_expiry_minutes),
    })
}
