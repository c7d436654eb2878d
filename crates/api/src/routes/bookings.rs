//! Booking endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Booking, BookingId, EventId, NewBooking};
use serde::{Deserialize, Serialize};
use store::BookingStore;

use super::{AppState, parse_id};
use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub event_id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub number_of_tickets: i32,
}

#[derive(Serialize)]
pub struct BookingCreatedResponse {
    pub booking_id: BookingId,
}

/// POST /booking: reserves tickets and records the booking atomically.
#[tracing::instrument(skip(state, req), fields(event_id = req.event_id))]
pub async fn create<S: BookingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), ApiError> {
    let request = NewBooking::new(
        EventId::new(req.event_id),
        req.email,
        req.first_name,
        req.last_name,
        req.number_of_tickets,
    );

    let booking_id = state.bookings.book(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse { booking_id }),
    ))
}

/// GET /booking/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: BookingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, ApiError> {
    let booking_id = BookingId::new(parse_id("Booking", id)?);
    Ok(Json(state.bookings.get_booking(booking_id).await?))
}
