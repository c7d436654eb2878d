use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Booking, BookingId, Event, EventId, NewBooking, NewEvent, NewUser, Result, StoreError, User,
    UserId,
    store::{BookingStore, validate_new_booking, validate_new_event},
};

#[derive(Debug, Default)]
struct Tables {
    events: BTreeMap<EventId, Event>,
    users: BTreeMap<UserId, User>,
    bookings: BTreeMap<BookingId, Booking>,
    last_event_id: i64,
    last_user_id: i64,
    last_booking_id: i64,
}

impl Tables {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    fn insert_user(&mut self, email: &str, first_name: &str, last_name: &str) -> UserId {
        self.last_user_id += 1;
        let user_id = UserId::new(self.last_user_id);
        self.users.insert(
            user_id,
            User {
                user_id,
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                password_hash: None,
                active: true,
                created_at: Utc::now(),
            },
        );
        user_id
    }
}

/// In-memory booking store for testing.
///
/// Every operation runs under one table-wide lock, which plays the role of the
/// database transaction. It provides the same interface and rejection
/// semantics as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    tables: Arc<RwLock<Tables>>,
    transactions: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryBookingStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many store operations have been started.
    pub fn transactions_opened(&self) -> u64 {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Makes every subsequent operation fail as if the connection pool were exhausted.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of users, active or not.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Returns the number of bookings across all events.
    pub async fn booking_count(&self) -> usize {
        self.tables.read().await.bookings.len()
    }

    fn begin(&self) -> Result<()> {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn book(&self, booking: &NewBooking) -> Result<Booking> {
        validate_new_booking(booking)?;
        self.begin()?;

        let mut tables = self.tables.write().await;
        let event_id = booking.event_id;
        let requested = booking.number_of_tickets;

        // Every rejection happens before the first write.
        let event = tables
            .events
            .get(&event_id)
            .ok_or(StoreError::EventNotFound(event_id))?;
        if event.available_tickets < requested {
            return Err(StoreError::InsufficientInventory {
                event_id,
                requested,
            });
        }

        if let Some(event) = tables.events.get_mut(&event_id) {
            event.available_tickets -= requested;
        }

        let existing = tables.user_by_email(&booking.email).map(|u| u.user_id);
        let user_id = match existing {
            Some(user_id) => user_id,
            None => tables.insert_user(&booking.email, &booking.first_name, &booking.last_name),
        };

        tables.last_booking_id += 1;
        let created = Booking {
            booking_id: BookingId::new(tables.last_booking_id),
            event_id,
            user_id,
            number_of_tickets: requested,
            timestamp: Utc::now(),
        };
        tables.bookings.insert(created.booking_id, created.clone());

        Ok(created)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>> {
        self.begin()?;
        Ok(self.tables.read().await.events.get(&event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        self.begin()?;
        Ok(self.tables.read().await.events.values().cloned().collect())
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        validate_new_event(&event)?;
        self.begin()?;
        let mut tables = self.tables.write().await;

        tables.last_event_id += 1;
        let created = Event {
            event_id: EventId::new(tables.last_event_id),
            name: event.name,
            start_time: event.start_time,
            location: event.location,
            total_tickets: event.total_tickets,
            available_tickets: event.total_tickets,
        };
        tables.events.insert(created.event_id, created.clone());

        Ok(created)
    }

    async fn get_booking(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        self.begin()?;
        Ok(self.tables.read().await.bookings.get(&booking_id).cloned())
    }

    async fn get_bookings_for_event(&self, event_id: EventId) -> Result<Vec<Booking>> {
        self.begin()?;
        Ok(self
            .tables
            .read()
            .await
            .bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn register_user(&self, user: NewUser) -> Result<UserId> {
        self.begin()?;
        let mut tables = self.tables.write().await;

        let existing = tables
            .user_by_email(&user.email)
            .map(|u| (u.user_id, u.active && u.password_hash.is_none()));

        // Only an active account without a password can be claimed.
        match existing {
            Some((_, false)) => Err(StoreError::DuplicateEmail(user.email)),
            Some((user_id, true)) => {
                if let Some(row) = tables.users.get_mut(&user_id) {
                    row.first_name = user.first_name;
                    row.last_name = user.last_name;
                    row.password_hash = Some(user.password_hash);
                }
                Ok(user_id)
            }
            None => {
                let user_id = tables.insert_user(&user.email, &user.first_name, &user.last_name);
                if let Some(row) = tables.users.get_mut(&user_id) {
                    row.password_hash = Some(user.password_hash);
                }
                Ok(user_id)
            }
        }
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.begin()?;
        Ok(self
            .tables
            .read()
            .await
            .users
            .get(&user_id)
            .filter(|u| u.active)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.begin()?;
        Ok(self
            .tables
            .read()
            .await
            .user_by_email(email)
            .filter(|u| u.active)
            .cloned())
    }

    async fn set_user_active(&self, user_id: UserId, active: bool) -> Result<bool> {
        self.begin()?;
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
