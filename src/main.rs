// src/main.rs
//
// Bootstrap: configuration, logging, pool, schema, then one listing call.
// An HTTP host embeds the library the same way and keeps the AppState.

use anyhow::Context;
use log::info;

use catalog::config::CatalogConfig;
use catalog::db::{
    create_connection_pool, get_connection, get_database_stats, initialize_database,
    verify_database_integrity,
};
use catalog::logging::init_logging;
use catalog::{AppState, CancellationSignal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. CONFIGURATION & LOGGING
    let config = CatalogConfig::load().context("failed to load configuration")?;
    init_logging(&config.logging.level).context("failed to initialize logging")?;

    // 2. INFRASTRUCTURE
    let pool = create_connection_pool(&config.database).context("failed to open database")?;

    // Initialize schema (idempotent)
    {
        let conn = get_connection(&pool)?;
        initialize_database(&conn).context("failed to initialize schema")?;
        verify_database_integrity(&conn).context("database failed its integrity check")?;

        let stats = get_database_stats(&conn)?;
        info!(
            "event=startup module=main status=ok path={} categories={} products={} size_bytes={}",
            config.database.path.display(),
            stats.category_count - stats.deleted_category_count,
            stats.product_count - stats.deleted_product_count,
            stats.size_bytes
        );
    }

    // 3. SERVICES
    let state = AppState::new(pool, config.paging.clone());

    // 4. SMOKE CALL
    let categories = state
        .category_service
        .get_all(CancellationSignal::never())
        .await;
    println!("{}", serde_json::to_string_pretty(&categories)?);

    Ok(())
}
