//! # Taskboard API Server
//!
//! Entry point for the Taskboard API: a task/project tracker with JWT
//! authentication, role-based authorization, and a per-task activity log.
//!
//! ## Startup sequence
//!
//! 1. Initialize tracing
//! 2. Load configuration from the environment
//! 3. Create the database pool (fails fast if unreachable)
//! 4. Run pending migrations
//! 5. Bootstrap the seed admin account, if configured
//! 6. Serve until SIGINT
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! ```

use taskboard_api::{app, config::Config, seed};
use taskboard_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    seed::bootstrap_admin(&db, &config.seed).await?;

    let bind_address = config.bind_address();
    let state = app::AppState::new(db.clone(), config);
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, exiting...");
    pool::close_pool(db).await;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}
