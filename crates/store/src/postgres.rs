use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Booking, BookingId, Event, EventId, NewBooking, NewEvent, NewUser, Result, StoreError, User,
    UserId,
    store::{BookingStore, validate_new_booking, validate_new_event},
};

/// CHECK constraint that keeps `events.available_tickets` non-negative.
const AVAILABLE_NON_NEGATIVE: &str = "available_tickets_non_negative";

/// PostgreSQL-backed booking store.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Creates a new PostgreSQL booking store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<Event> {
        Ok(Event {
            event_id: EventId::new(row.try_get("event_id")?),
            name: row.try_get("name")?,
            start_time: row.try_get("start_time")?,
            location: row.try_get("location")?,
            total_tickets: row.try_get("total_tickets")?,
            available_tickets: row.try_get("available_tickets")?,
        })
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            user_id: UserId::new(row.try_get("user_id")?),
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            password_hash: row.try_get("password_hash")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_booking(row: PgRow) -> Result<Booking> {
        Ok(Booking {
            booking_id: BookingId::new(row.try_get("booking_id")?),
            event_id: EventId::new(row.try_get("event_id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            number_of_tickets: row.try_get("number_of_tickets")?,
            timestamp: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    #[tracing::instrument(skip(self, booking), fields(event_id = %booking.event_id, tickets = booking.number_of_tickets))]
    async fn book(&self, booking: &NewBooking) -> Result<Booking> {
        validate_new_booking(booking)?;

        let event_id = booking.event_id;
        let requested = booking.number_of_tickets;

        // Dropping `tx` without commit rolls back and returns the connection.
        let mut tx = self.pool.begin().await?;

        // The decrement is the inventory check: the row lock serializes
        // concurrent bookings and the CHECK constraint aborts on oversell.
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE events
            SET available_tickets = available_tickets - $2
            WHERE event_id = $1
            RETURNING available_tickets
            "#,
        )
        .bind(event_id.as_i64())
        .bind(requested)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(AVAILABLE_NON_NEGATIVE) =>
            {
                StoreError::InsufficientInventory {
                    event_id,
                    requested,
                }
            }
            e => StoreError::Database(e),
        })?;

        let Some(remaining) = remaining else {
            return Err(StoreError::EventNotFound(event_id));
        };

        // Existing users are left untouched.
        sqlx::query(
            r#"
            INSERT INTO users (email, first_name, last_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&booking.email)
        .bind(&booking.first_name)
        .bind(&booking.last_name)
        .execute(&mut *tx)
        .await?;

        // Separate statement so a row committed by a concurrent booking for
        // the same email is visible here.
        let user_id: i64 = sqlx::query_scalar("SELECT user_id FROM users WHERE email = $1")
            .bind(&booking.email)
            .fetch_one(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            INSERT INTO bookings (event_id, user_id, number_of_tickets)
            VALUES ($1, $2, $3)
            RETURNING booking_id, event_id, user_id, number_of_tickets, created_at
            "#,
        )
        .bind(event_id.as_i64())
        .bind(user_id)
        .bind(requested)
        .fetch_one(&mut *tx)
        .await?;

        let created = Self::row_to_booking(row)?;
        tx.commit().await?;

        tracing::debug!(booking_id = %created.booking_id, remaining, "booking committed");
        Ok(created)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT event_id, name, start_time, location, total_tickets, available_tickets
            FROM events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, name, start_time, location, total_tickets, available_tickets
            FROM events
            ORDER BY event_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        validate_new_event(&event)?;

        let row = sqlx::query(
            r#"
            INSERT INTO events (name, start_time, location, total_tickets, available_tickets)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING event_id, name, start_time, location, total_tickets, available_tickets
            "#,
        )
        .bind(&event.name)
        .bind(event.start_time)
        .bind(&event.location)
        .bind(event.total_tickets)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_event(row)
    }

    async fn get_booking(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT booking_id, event_id, user_id, number_of_tickets, created_at
            FROM bookings
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_booking).transpose()
    }

    async fn get_bookings_for_event(&self, event_id: EventId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT booking_id, event_id, user_id, number_of_tickets, created_at
            FROM bookings
            WHERE event_id = $1
            ORDER BY booking_id ASC
            "#,
        )
        .bind(event_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn register_user(&self, user: NewUser) -> Result<UserId> {
        // Claims an active row created by a booking; refuses one that already
        // has a password or has been deactivated.
        let user_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                password_hash = EXCLUDED.password_hash
            WHERE users.password_hash IS NULL AND users.active
            RETURNING user_id
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await?;

        user_id
            .map(UserId::new)
            .ok_or(StoreError::DuplicateEmail(user.email))
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT user_id, email, first_name, last_name, password_hash, active, created_at
            FROM users
            WHERE user_id = $1 AND active = TRUE
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT user_id, email, first_name, last_name, password_hash, active, created_at
            FROM users
            WHERE email = $1 AND active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn set_user_active(&self, user_id: UserId, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET active = $2 WHERE user_id = $1")
            .bind(user_id.as_i64())
            .bind(active)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
