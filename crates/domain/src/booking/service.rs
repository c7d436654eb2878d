//! Booking service: the atomic booking operation and booking lookup.

use std::time::Instant;

use store::{Booking, BookingId, BookingStore, NewBooking, validate_new_booking};

use super::BookingError;
use crate::error::DomainError;

/// Service for booking tickets.
///
/// Holds no locks or counters of its own: every booking is a single call to
/// [`BookingStore::book`], so any number of service instances, in any number
/// of processes, can share one store.
#[derive(Clone)]
pub struct BookingService<S: BookingStore> {
    store: S,
}

impl<S: BookingStore> BookingService<S> {
    /// Creates a new booking service on the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Books `number_of_tickets` for the user identified by `email`.
    ///
    /// Malformed requests are rejected before any store interaction. The
    /// inventory decrement, user resolution and booking insert then happen as
    /// one transaction in the store. Dropping the returned future before it
    /// completes rolls the transaction back.
    #[tracing::instrument(
        skip(self, request),
        fields(event_id = %request.event_id, tickets = request.number_of_tickets)
    )]
    pub async fn book(&self, request: NewBooking) -> Result<BookingId, BookingError> {
        Ok(self.book_detailed(request).await?.booking_id)
    }

    /// Same as [`BookingService::book`] but returns the whole booking row.
    pub async fn book_detailed(&self, request: NewBooking) -> Result<Booking, BookingError> {
        if let Err(e) = validate_new_booking(&request) {
            let err = BookingError::InvalidRequest(e.message);
            record_rejection(&err);
            return Err(err);
        }

        let started = Instant::now();
        let result = self.store.book(&request).await;
        metrics::histogram!("booking_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(booking) => {
                metrics::counter!("bookings_created_total").increment(1);
                tracing::info!(
                    booking_id = %booking.booking_id,
                    user_id = %booking.user_id,
                    "booking created"
                );
                Ok(booking)
            }
            Err(e) => {
                let err = BookingError::from(e);
                record_rejection(&err);
                Err(err)
            }
        }
    }

    /// Loads a booking by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_booking(&self, booking_id: BookingId) -> Result<Booking, DomainError> {
        self.store
            .get_booking(booking_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "booking",
                id: booking_id.as_i64(),
            })
    }
}

fn record_rejection(err: &BookingError) {
    metrics::counter!("bookings_rejected_total", "reason" => err.reason()).increment(1);
    if err.is_infrastructure() {
        tracing::error!(error = %err, "booking failed");
    } else {
        tracing::warn!(reason = err.reason(), error = %err, "booking rejected");
    }
}
