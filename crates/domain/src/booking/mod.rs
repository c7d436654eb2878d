//! The booking engine and its failure taxonomy.

mod service;

pub use service::BookingService;

use store::{EventId, StoreError};
use thiserror::Error;

/// Why a booking was not made.
///
/// `InvalidRequest`, `EventNotFound` and `InsufficientInventory` are
/// rejections the caller can act on. `Infrastructure` means the store could
/// not be reached or failed mid-transaction; the outcome of the booking is
/// then unknown to the caller.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The request is malformed. No store interaction took place.
    #[error("Invalid booking request: {0}")]
    InvalidRequest(String),

    /// No event exists with the given id.
    #[error("No event with id {0} found")]
    EventNotFound(EventId),

    /// Fewer tickets are available than requested.
    #[error("Not enough tickets available for event {event_id}: requested {requested}")]
    InsufficientInventory { event_id: EventId, requested: i32 },

    /// The store failed.
    #[error("Booking could not be completed: {0}")]
    Infrastructure(StoreError),
}

impl BookingError {
    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            BookingError::InvalidRequest(_) => "invalid_request",
            BookingError::EventNotFound(_) => "event_not_found",
            BookingError::InsufficientInventory { .. } => "insufficient_inventory",
            BookingError::Infrastructure(_) => "infrastructure",
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(self, BookingError::Infrastructure(_))
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound(event_id) => BookingError::EventNotFound(event_id),
            StoreError::InsufficientInventory {
                event_id,
                requested,
            } => BookingError::InsufficientInventory {
                event_id,
                requested,
            },
            StoreError::InvalidBooking(message) => BookingError::InvalidRequest(message),
            other => BookingError::Infrastructure(other),
        }
    }
}
