//! Registration, login and user lookup.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{RegisterUser, User, UserId};
use serde::{Deserialize, Serialize};
use store::BookingStore;

use super::{AppState, parse_id};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserCreatedResponse {
    pub user_id: UserId,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /user
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register<S: BookingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ApiError> {
    let user_id = state
        .users
        .register(RegisterUser {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserCreatedResponse { user_id })))
}

/// POST /login: exchanges credentials for a bearer token.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login<S: BookingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state.users.login(&req.email, &req.password).await?;
    let access_token = state.tokens.issue(user.user_id)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// GET /user/{id}: requires a valid bearer token.
#[tracing::instrument(skip(state, caller), fields(caller = %caller.0))]
pub async fn get<S: BookingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user_id = UserId::new(parse_id("User", id)?);
    Ok(Json(state.users.get_user(user_id).await?))
}
