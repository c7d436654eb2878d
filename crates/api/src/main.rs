//! API server entry point.

use api::config::{Config, StoreBackend};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use store::{InMemoryBookingStore, PostgresBookingStore};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(app: axum::Router, config: &Config) {
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn run_postgres(config: &Config, url: &str, metrics_handle: PrometheusHandle) {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(config.db_acquire_timeout())
        .connect(url)
        .await
        .expect("failed to connect to database");

    let store = PostgresBookingStore::new(pool.clone());
    store
        .run_migrations()
        .await
        .expect("failed to run migrations");
    tracing::info!("database migrations applied");

    let state = api::create_state(store, config);
    serve(api::create_app(state, metrics_handle), config).await;

    pool.close().await;
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    // 2. Initialize tracing
    init_tracing(&config);

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Pick the store and serve
    let backend = match config.store_backend() {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    match backend {
        StoreBackend::Postgres(url) => run_postgres(&config, &url, metrics_handle).await,
        StoreBackend::Memory => {
            tracing::warn!(
                "STORE=memory: bookings are kept in this process only, run a single instance"
            );
            let state = api::create_state(InMemoryBookingStore::new(), &config);
            serve(api::create_app(state, metrics_handle), &config).await;
        }
    }

    tracing::info!("server shut down gracefully");
}
