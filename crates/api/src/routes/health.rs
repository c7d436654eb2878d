//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
    pub endpoints: &'static [&'static str],
}

const ENDPOINTS: &[&str] = &[
    "GET /events",
    "GET /events/{id}",
    "POST /booking",
    "GET /booking/{id}",
    "POST /user",
    "POST /login",
    "GET /user/{id}",
    "GET /health",
    "GET /metrics",
];

/// GET /: greets the caller and lists the available endpoints.
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the booking service",
        endpoints: ENDPOINTS,
    })
}

/// GET /health: returns system health status.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
