//! Rows persisted by the booking store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{BookingId, EventId, UserId};

/// A ticketed event and its remaining inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub event_id: EventId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub location: String,
    pub total_tickets: i32,
    /// Always within `0..=total_tickets`.
    pub available_tickets: i32,
}

impl Event {
    /// Tickets already committed to bookings.
    pub fn booked_tickets(&self) -> i32 {
        self.total_tickets - self.available_tickets
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_tickets == 0
    }
}

/// Data needed to create an event. All tickets start out available.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub location: String,
    pub total_tickets: i32,
}

impl NewEvent {
    pub fn new(
        name: impl Into<String>,
        start_time: DateTime<Utc>,
        location: impl Into<String>,
        total_tickets: i32,
    ) -> Self {
        Self {
            name: name.into(),
            start_time,
            location: location.into(),
            total_tickets,
        }
    }
}

/// A user account.
///
/// Users created implicitly by a booking have no password hash until
/// they register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register a user with credentials.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// A confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub number_of_tickets: i32,
    pub timestamp: DateTime<Utc>,
}

/// A request to book tickets on behalf of the user identified by `email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub event_id: EventId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub number_of_tickets: i32,
}

impl NewBooking {
    pub fn new(
        event_id: EventId,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        number_of_tickets: i32,
    ) -> Self {
        Self {
            event_id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            number_of_tickets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booked_tickets_is_total_minus_available() {
        let event = Event {
            event_id: EventId::new(1),
            name: "Concert".to_string(),
            start_time: Utc::now(),
            location: "Hall".to_string(),
            total_tickets: 10,
            available_tickets: 4,
        };
        assert_eq!(event.booked_tickets(), 6);
        assert!(!event.is_sold_out());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            user_id: UserId::new(1),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: Some("$argon2id$secret".to_string()),
            active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
