use serde::{Deserialize, Serialize};

/// Defines a database-assigned integer identifier.
///
/// Each identifier wraps an `i64` to provide type safety and prevent
/// mixing up event, user, and booking ids.
macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier value.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier value.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }

            /// Store-assigned identifiers start at 1; anything else can never exist.
            pub const fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

integer_id!(
    /// Identifier of a ticketed event.
    EventId
);

integer_id!(
    /// Identifier of a user account.
    UserId
);

integer_id!(
    /// Identifier of a confirmed booking.
    BookingId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_preserves_value() {
        let id = EventId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(EventId::from(42), id);
    }

    #[test]
    fn only_positive_ids_are_valid() {
        assert!(BookingId::new(1).is_valid());
        assert!(!BookingId::new(0).is_valid());
        assert!(!UserId::new(-3).is_valid());
    }

    #[test]
    fn id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let id: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(id, UserId::new(7));
    }

    #[test]
    fn id_displays_raw_value() {
        assert_eq!(BookingId::new(19).to_string(), "19");
    }
}
