use ledger_engine::api::{create_router, handlers, AppState};
use ledger_engine::config::Settings;
use ledger_engine::observability::{init_logging, LogConfig, LogFormat};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;

    let log_config = LogConfig {
        level: settings.application.log_level.clone(),
        format: LogFormat::from(std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()).as_str()),
        include_target: true,
        include_file: false,
        include_line: false,
    };
    init_logging(&log_config);

    info!("Configuration loaded");

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(settings.database.pool_size)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
        .connect(&settings.database.url)
        .await?;
    info!("Database connection established");

    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied successfully");

    let state = AppState::new(pool);

    if let Some(bootstrap) = &settings.bootstrap {
        let created = handlers::bootstrap(
            &state,
            ledger_engine::api::requests::BootstrapRequest {
                tenant_name: bootstrap.tenant_name.clone(),
                key_name: bootstrap.key_name.clone(),
                raw_api_key: bootstrap.raw_api_key.clone(),
            },
        )
        .await?;
        if created {
            info!("Bootstrapped initial tenant and admin key");
        } else {
            info!("Bootstrap skipped: an API key already exists");
        }
    }

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", settings.application.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received, draining in-flight requests");
}
