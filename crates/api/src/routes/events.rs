//! Event catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{Event, EventId};
use store::BookingStore;

use super::{AppState, parse_id};
use crate::error::ApiError;

/// GET /events: every event with its remaining tickets.
#[tracing::instrument(skip(state))]
pub async fn list<S: BookingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.events.get_event_list().await?))
}

/// GET /events/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: BookingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    let event_id = EventId::new(parse_id("Event", id)?);
    Ok(Json(state.events.get_event(event_id).await?))
}
