use std::sync::Arc;

use alloy::providers::ProviderBuilder;
use pairswap::{chain::RpcChainClient, config::SwapConfig, executor::SwapExecutor};
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let config = SwapConfig::load()?;
    info!(target = "pairswap", config = ?config, "Loaded config");

    let signer = config.signer()?;
    let provider = Arc::new(ProviderBuilder::new().on_http(config.rpc_url.parse()?));
    let client = RpcChainClient::new(provider, signer).await?;

    let mut executor = SwapExecutor::new(config, client);
    let report = executor.run().await?;

    info!(
        target = "pairswap",
        pair = ?report.pair,
        approval_tx = ?report.approval_tx,
        swap_tx = ?report.swap_tx,
        token_in_before = %report.reserves_before.token_a,
        token_in_after = %report.reserves_after.token_a,
        token_out_before = %report.reserves_before.token_b,
        token_out_after = %report.reserves_after.token_b,
        "Swap complete"
    );

    Ok(())
}
