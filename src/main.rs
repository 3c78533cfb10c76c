use std::sync::Arc;

use stock_ledger::api::routes::{AppState, app_router};
use stock_ledger::config::Settings;
use stock_ledger::ledger::Ledger;
use stock_ledger::persistence::open_store;
use stock_ledger::quotes::StaticQuoteSource;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stock_ledger=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let store = open_store(&settings.storage).await?;
    let quotes = Arc::new(StaticQuoteSource::with_default_catalog());
    let ledger = Arc::new(Ledger::load(store, quotes, settings.ledger_config()).await?);

    if let Some(admin) = &settings.admin {
        ledger
            .seed_admin(&admin.email, &admin.name, &admin.password)
            .await?;
    }

    let app = app_router(AppState::new(ledger, settings.jwt_secret.clone()));
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
