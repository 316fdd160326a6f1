use crate::{accounts::AccountService, api, cli::telemetry, store::StoreConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub store: StoreConfig,
    pub bcrypt_cost: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let store = args
        .store
        .open()
        .await
        .with_context(|| format!("Failed to open account store: {:?}", args.store))?;

    info!("Using {} store, bcrypt cost {}", store.kind(), args.bcrypt_cost);

    let service = AccountService::new(store, args.bcrypt_cost)
        .await
        .context("Failed to initialize account service")?;

    let result = api::new(args.port, Arc::new(service)).await;

    telemetry::shutdown_tracer();

    result
}
