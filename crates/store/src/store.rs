use async_trait::async_trait;

use crate::{
    Booking, BookingId, Event, EventId, NewBooking, NewEvent, NewUser, Result, StoreError, User,
    UserId,
};

/// Core trait for booking store implementations.
///
/// The store owns the only mutable shared resource of the system, an event's
/// `available_tickets` counter. Implementations must change it exclusively
/// inside [`BookingStore::book`], as one atomic unit with the user upsert and
/// the booking insert. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Books tickets atomically.
    ///
    /// In a single transaction: decrements the event's inventory on the
    /// condition that it stays non-negative, resolves the user by email
    /// (creating it if absent, leaving it untouched otherwise) and inserts the
    /// booking. Either every effect is committed or none is.
    ///
    /// Fails with `EventNotFound` or `InsufficientInventory` without side
    /// effects when the conditional decrement cannot apply.
    async fn book(&self, booking: &NewBooking) -> Result<Booking>;

    /// Retrieves an event by id.
    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>>;

    /// Retrieves all events, ordered by id.
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// Creates an event with all of its tickets available.
    async fn create_event(&self, event: NewEvent) -> Result<Event>;

    /// Retrieves a booking by id.
    async fn get_booking(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// Retrieves all bookings for an event, ordered by id.
    async fn get_bookings_for_event(&self, event_id: EventId) -> Result<Vec<Booking>>;

    /// Registers a user with credentials.
    ///
    /// A user previously created by a booking (no password yet) is claimed:
    /// its names and password hash are set. Fails with `DuplicateEmail` if the
    /// email already has a password.
    async fn register_user(&self, user: NewUser) -> Result<UserId>;

    /// Retrieves an active user by id.
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Retrieves an active user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Enables or disables a user. Returns false if the user doesn't exist.
    async fn set_user_active(&self, user_id: UserId, active: bool) -> Result<bool>;
}

/// Extension trait providing convenience methods for booking stores.
#[async_trait]
pub trait BookingStoreExt: BookingStore {
    /// Retrieves an event, failing with `EventNotFound` if it doesn't exist.
    async fn require_event(&self, event_id: EventId) -> Result<Event> {
        self.get_event(event_id)
            .await?
            .ok_or(StoreError::EventNotFound(event_id))
    }

    /// Sums the tickets of all bookings for an event.
    async fn booked_ticket_count(&self, event_id: EventId) -> Result<i64> {
        Ok(self
            .get_bookings_for_event(event_id)
            .await?
            .iter()
            .map(|b| i64::from(b.number_of_tickets))
            .sum())
    }
}

// Blanket implementation for all BookingStore implementations
impl<T: BookingStore + ?Sized> BookingStoreExt for T {}

/// Error returned when a booking request is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingValidationError {
    pub message: String,
}

impl std::fmt::Display for BookingValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BookingValidationError {}

impl From<BookingValidationError> for StoreError {
    fn from(err: BookingValidationError) -> Self {
        StoreError::InvalidBooking(err.message)
    }
}

/// Validates a booking request before it reaches the store.
pub fn validate_new_booking(
    booking: &NewBooking,
) -> std::result::Result<(), BookingValidationError> {
    if !booking.event_id.is_valid() {
        return Err(BookingValidationError {
            message: format!(
                "Event id has to be larger than 0, got {}",
                booking.event_id
            ),
        });
    }

    if booking.number_of_tickets <= 0 {
        return Err(BookingValidationError {
            message: format!(
                "Number of tickets has to be larger than 0, got {}",
                booking.number_of_tickets
            ),
        });
    }

    Ok(())
}

/// Validates an event before it is created. An event needs at least one ticket.
pub fn validate_new_event(event: &NewEvent) -> Result<()> {
    if event.total_tickets <= 0 {
        return Err(StoreError::InvalidEvent(format!(
            "Total tickets has to be larger than 0, got {}",
            event.total_tickets
        )));
    }
    Ok(())
}
