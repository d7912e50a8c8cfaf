use anyhow::Context;
use orphanages::{config::AppConfig, create_app, db, AppState};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let db_conn = db::connect(&config)
        .await
        .context("failed to connect to database")?;
    if config.run_migrations {
        db::migrate(&db_conn)
            .await
            .context("failed to apply migrations")?;
    }

    let bind_addr = config.bind_addr;
    let app = create_app(AppState::new(db_conn.clone(), config));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Server running on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    tracing::info!("Shutting down; closing database connections");
    db_conn.close().await.context("failed to close database")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
