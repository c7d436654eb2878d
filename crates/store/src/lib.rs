pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{BookingId, EventId, UserId};
pub use error::{Result, StoreError};
pub use memory::InMemoryBookingStore;
pub use postgres::PostgresBookingStore;
pub use record::{Booking, Event, NewBooking, NewEvent, NewUser, User};
pub use store::{
    BookingStore, BookingStoreExt, BookingValidationError, validate_new_booking, validate_new_event,
};
