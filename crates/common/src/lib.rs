//! Shared types for the booking service.

pub mod ids;

pub use ids::{BookingId, EventId, UserId};
