use expense_tracker::config::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("expense_tracker=debug,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!("exchange rates provider: {}", settings.exchange_api_base);
    let storage = expense_tracker::open_storage(&settings).await?;
    let state = expense_tracker::build_state(storage, &settings)?;
    let app = expense_tracker::app(state, &settings);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e:?}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
