//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency. Each test
//! works on its own freshly created event and unique emails, so no table
//! truncation is needed. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use sqlx::PgPool;
use store::{
    BookingId, BookingStore, BookingStoreExt, EventId, NewBooking, NewEvent, NewUser,
    PostgresBookingStore, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use tokio::task::JoinSet;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

static EMAIL_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations, applied the same
            // way the server applies them at startup.
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresBookingStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a store with its own pool, bound to the current test's runtime
async fn get_test_store() -> PostgresBookingStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(16)
        .connect(&info.connection_string)
        .await
        .unwrap();

    PostgresBookingStore::new(pool)
}

async fn create_event(store: &PostgresBookingStore, tickets: i32) -> EventId {
    store
        .create_event(NewEvent::new(
            "Integration Concert",
            Utc::now(),
            "Test Hall",
            tickets,
        ))
        .await
        .unwrap()
        .event_id
}

fn unique_email(tag: &str) -> String {
    let n = EMAIL_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!(
        "{tag}-{}-{n}@example.com",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

fn request(event_id: EventId, email: &str, tickets: i32) -> NewBooking {
    NewBooking::new(event_id, email, "Grace", "Hopper", tickets)
}

#[tokio::test]
async fn book_and_retrieve() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 10).await;
    let email = unique_email("retrieve");

    let booking = store.book(&request(event_id, &email, 3)).await.unwrap();

    let fetched = store.get_booking(booking.booking_id).await.unwrap().unwrap();
    assert_eq!(fetched, booking);
    assert_eq!(fetched.number_of_tickets, 3);

    let event = store.require_event(event_id).await.unwrap();
    assert_eq!(event.available_tickets, 7);

    let user = store.get_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(user.user_id, booking.user_id);
    assert!(user.password_hash.is_none());
    assert!(user.active);
}

#[tokio::test]
async fn insufficient_inventory_rolls_back() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 5).await;
    let email = unique_email("oversell");

    let err = store.book(&request(event_id, &email, 6)).await.unwrap_err();

    assert!(matches!(err, StoreError::InsufficientInventory { .. }));
    assert_eq!(
        store.require_event(event_id).await.unwrap().available_tickets,
        5
    );
    assert!(store.get_user_by_email(&email).await.unwrap().is_none());
    assert!(
        store
            .get_bookings_for_event(event_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn unknown_event_creates_nothing() {
    let store = get_test_store().await;
    let email = unique_email("missing");

    let err = store
        .book(&request(EventId::new(i64::MAX), &email, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::EventNotFound(_)));
    assert!(store.get_user_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_booking_returns_none() {
    let store = get_test_store().await;
    let result = store.get_booking(BookingId::new(i64::MAX)).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn concurrent_full_bookings_admit_exactly_one() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 5).await;

    let mut tasks = JoinSet::new();
    for tag in ["first", "second"] {
        let store = store.clone();
        let email = unique_email(tag);
        tasks.spawn(async move { store.book(&request(event_id, &email, 5)).await });
    }

    let mut accepted = 0;
    let mut rejected = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => accepted += 1,
            Err(StoreError::InsufficientInventory { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(rejected, 1);
    assert_eq!(
        store.require_event(event_id).await.unwrap().available_tickets,
        0
    );
}

#[tokio::test]
async fn concurrent_bookings_conserve_tickets() {
    let store = get_test_store().await;
    let total = 25;
    let event_id = create_event(&store, total).await;

    let mut tasks = JoinSet::new();
    for i in 0..20 {
        let store = store.clone();
        let email = unique_email("conserve");
        let tickets = (i % 3) + 1;
        tasks.spawn(async move { store.book(&request(event_id, &email, tickets)).await });
    }

    let mut accepted_tickets = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(booking) => accepted_tickets += booking.number_of_tickets,
            Err(StoreError::InsufficientInventory { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let event = store.require_event(event_id).await.unwrap();
    assert!(event.available_tickets >= 0);
    assert_eq!(event.available_tickets, total - accepted_tickets);
    assert_eq!(
        store.booked_ticket_count(event_id).await.unwrap(),
        i64::from(accepted_tickets)
    );
}

#[tokio::test]
async fn concurrent_bookings_by_same_email_share_one_user() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 10).await;
    let email = unique_email("same");

    let mut tasks = JoinSet::new();
    for _ in 0..2 {
        let store = store.clone();
        let email = email.clone();
        tasks.spawn(async move { store.book(&request(event_id, &email, 2)).await });
    }

    let mut user_ids = Vec::new();
    while let Some(result) = tasks.join_next().await {
        user_ids.push(result.unwrap().unwrap().user_id);
    }

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(store.pool())
        .await
        .unwrap();

    assert_eq!(user_count, 1);
    assert_eq!(user_ids[0], user_ids[1]);
}

#[tokio::test]
async fn booking_does_not_overwrite_existing_user() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 10).await;
    let email = unique_email("keep");

    store.book(&request(event_id, &email, 1)).await.unwrap();
    store
        .book(&NewBooking::new(event_id, &email, "Someone", "Else", 1))
        .await
        .unwrap();

    let user = store.get_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(user.first_name, "Grace");
    assert_eq!(user.last_name, "Hopper");
}

#[tokio::test]
async fn register_claims_booking_user_then_rejects_duplicates() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 10).await;
    let email = unique_email("register");

    let booking = store.book(&request(event_id, &email, 1)).await.unwrap();

    let new_user = NewUser {
        email: email.clone(),
        first_name: "Grace".to_string(),
        last_name: "Brewster".to_string(),
        password_hash: "hash".to_string(),
    };
    let user_id = store.register_user(new_user.clone()).await.unwrap();
    assert_eq!(user_id, booking.user_id);

    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.last_name, "Brewster");
    assert_eq!(user.password_hash.as_deref(), Some("hash"));

    let err = store.register_user(new_user).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(_)));
}

#[tokio::test]
async fn deactivated_user_is_hidden() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 10).await;
    let email = unique_email("inactive");

    let booking = store.book(&request(event_id, &email, 1)).await.unwrap();
    assert!(store.set_user_active(booking.user_id, false).await.unwrap());

    assert!(store.get_user(booking.user_id).await.unwrap().is_none());
    assert!(store.get_user_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
async fn register_refuses_deactivated_account() {
    let store = get_test_store().await;
    let event_id = create_event(&store, 10).await;
    let email = unique_email("deactivated-register");

    let booking = store.book(&request(event_id, &email, 1)).await.unwrap();
    assert!(store.set_user_active(booking.user_id, false).await.unwrap());

    let err = store
        .register_user(NewUser {
            email: email.clone(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(_)));

    let password_hash: Option<String> =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert!(password_hash.is_none());
}

#[tokio::test]
async fn create_event_rejects_non_positive_totals() {
    let store = get_test_store().await;

    for tickets in [0, -5] {
        let err = store
            .create_event(NewEvent::new("Empty", Utc::now(), "Test Hall", tickets))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidEvent(_)));
    }
}

#[tokio::test]
async fn migrations_can_run_again_at_startup() {
    let store = get_test_store().await;

    store.run_migrations().await.unwrap();

    let event_id = create_event(&store, 3).await;
    assert_eq!(
        store.require_event(event_id).await.unwrap().available_tickets,
        3
    );
}

#[tokio::test]
async fn pool_exhaustion_surfaces_as_infrastructure_error() {
    let info = get_container_info().await;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect(&info.connection_string)
        .await
        .unwrap();
    let store = PostgresBookingStore::new(pool);
    let event_id = create_event(&store, 10).await;

    // Hold the only connection for the duration of the booking attempt.
    let held = store.pool().acquire().await.unwrap();
    let err = store
        .book(&request(event_id, &unique_email("exhausted"), 1))
        .await
        .unwrap_err();
    drop(held);

    assert!(err.is_infrastructure());
    assert_eq!(
        store.require_event(event_id).await.unwrap().available_tickets,
        10
    );
}
