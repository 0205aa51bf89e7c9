//! Kontor API Server
//!
//! Main entry point for the Kontor backend service.

use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kontor_api::{AppState, create_router};
use kontor_db::{InvoiceRepository, connect_with_pool};
use kontor_shared::{AppConfig, JwtConfig, JwtService};
use sea_orm::DatabaseConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kontor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_secs: i64::try_from(config.jwt.access_token_expiry_secs)
            .unwrap_or(i64::MAX),
    });

    if config.jobs.overdue_check_interval_secs > 0 {
        tokio::spawn(overdue_sweep(
            db.clone(),
            Duration::from_secs(config.jobs.overdue_check_interval_secs),
        ));
    } else {
        info!("Overdue invoice sweep disabled");
    }

    let app = create_router(AppState::new(db, jwt_service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically flags sent invoices whose due date has passed, across all
/// organizations.
async fn overdue_sweep(db: DatabaseConnection, every: Duration) {
    let repo = InvoiceRepository::new(db);
    let mut ticker = tokio::time::interval(every);
    info!(interval_secs = every.as_secs(), "Overdue invoice sweep started");

    loop {
        ticker.tick().await;
        let today = chrono::Utc::now().date_naive();
        match repo.mark_overdue(None, today).await {
            Ok(0) => {}
            Ok(count) => info!(count, "Invoices marked overdue"),
            Err(e) => error!(error = %e, "Overdue invoice sweep failed"),
        }
    }
}
