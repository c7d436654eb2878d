//! Domain layer for the booking service.
//!
//! This crate provides:
//! - The booking engine, which books tickets as one atomic store operation
//! - Event and booking lookups
//! - Identity: registration, credential checks and user lookup

pub mod booking;
pub mod catalog;
pub mod error;
pub mod user;

pub use booking::{BookingError, BookingService};
pub use catalog::EventService;
pub use error::DomainError;
pub use store::{Booking, BookingId, Event, EventId, NewBooking, User, UserId};
pub use user::{RegisterUser, UserError, UserService};
