//! Read-only event lookups.

use store::{BookingStore, Event, EventId};

use crate::error::DomainError;

/// Service for looking up events.
#[derive(Clone)]
pub struct EventService<S: BookingStore> {
    store: S,
}

impl<S: BookingStore> EventService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads an event by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_event(&self, event_id: EventId) -> Result<Event, DomainError> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "event",
                id: event_id.as_i64(),
            })
    }

    /// Lists every event with its current availability.
    #[tracing::instrument(skip(self))]
    pub async fn get_event_list(&self) -> Result<Vec<Event>, DomainError> {
        Ok(self.store.list_events().await?)
    }
}
