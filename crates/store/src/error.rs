use thiserror::Error;

use crate::EventId;

/// Errors that can occur when interacting with the booking store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No event exists with the given id.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// The conditional decrement would have driven `available_tickets` below zero.
    #[error("Insufficient inventory for event {event_id}: requested {requested} tickets")]
    InsufficientInventory { event_id: EventId, requested: i32 },

    /// A user with a password already owns this email.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// The booking was rejected before touching the store.
    #[error("Invalid booking: {0}")]
    InvalidBooking(String),

    /// The event was rejected before touching the store.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true for operational failures (connectivity, pool exhaustion,
    /// migrations) as opposed to business-rule rejections.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, StoreError::Database(_) | StoreError::Migration(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
