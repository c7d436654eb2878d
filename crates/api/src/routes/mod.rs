//! HTTP route handlers and shared state.

pub mod bookings;
pub mod events;
pub mod health;
pub mod metrics;
pub mod users;

use domain::{BookingService, EventService, UserService};
use store::BookingStore;

use crate::auth::TokenIssuer;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: BookingStore> {
    pub bookings: BookingService<S>,
    pub events: EventService<S>,
    pub users: UserService<S>,
    pub tokens: TokenIssuer,
}

/// Checks a numeric path id, rejecting non-positive values.
pub(crate) fn parse_id(entity: &str, id: i64) -> Result<i64, ApiError> {
    if id > 0 {
        Ok(id)
    } else {
        Err(ApiError::BadRequest(format!(
            "{entity} id has to be larger than 0, got {id}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("Event", 3).unwrap(), 3);
        assert!(matches!(parse_id("Event", 0), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_id("Booking", -4), Err(ApiError::BadRequest(_))));
    }
}
