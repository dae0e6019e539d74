//! Loads the current stock picture from the remote store and prints the
//! dashboard snapshot as JSON.

use anyhow::Context;

use stockflow_sync::{HttpRemote, ReconciliationController, SyncConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockflow_observability::init();

    let config = SyncConfig::from_env();
    tracing::info!(api_url = %config.api_url, "connecting to stock store");

    let remote = HttpRemote::new(config).context("failed to build HTTP client")?;
    let controller = ReconciliationController::new(remote);

    controller
        .refresh()
        .await
        .context("failed to load products and movements")?;

    let snapshot = controller.snapshot();
    tracing::info!(
        products = snapshot.stats.total_products,
        low_stock = snapshot.stats.low_stock_products,
        out_of_stock = snapshot.stats.out_of_stock_products,
        "snapshot loaded"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
