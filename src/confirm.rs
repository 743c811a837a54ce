use std::time::Duration;

use alloy::primitives::TxHash;
use tracing::{debug, info, warn};

use crate::{
    chain::{with_timeout, ChainClient, TransactionStatus},
    errors::SwapError,
};

/// Polls for the receipt of `tx_hash` every `poll_interval` until it is mined.
///
/// `timeout` bounds the whole wait, including a receipt poll that never returns.
/// Without it the wait is unbounded: a dropped or underpriced transaction keeps
/// the caller waiting.
pub async fn wait_for_confirmation<C>(
    client: &C,
    tx_hash: TxHash,
    poll_interval: Duration,
    timeout: Option<Duration>,
) -> Result<(), SwapError>
where
    C: ChainClient + ?Sized,
{
    let polling = poll_until_mined(client, tx_hash, poll_interval);

    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, polling)
            .await
            .map_err(|_| SwapError::ConfirmationTimeout(tx_hash))?,
        None => polling.await,
    }
}

async fn poll_until_mined<C>(
    client: &C,
    tx_hash: TxHash,
    poll_interval: Duration,
) -> Result<(), SwapError>
where
    C: ChainClient + ?Sized,
{
    let mut polls = 0u64;

    loop {
        polls += 1;
        // A stalled receipt read counts as a pending poll
        match with_timeout("receipt", client.transaction_status(tx_hash)).await {
            Ok(TransactionStatus::Success) => {
                info!(target = "pairswap::confirm", tx_hash = ?tx_hash, polls, "Transaction mined");
                return Ok(());
            }
            Ok(TransactionStatus::Reverted) => return Err(SwapError::Reverted(tx_hash)),
            Ok(TransactionStatus::Pending) => {
                debug!(target = "pairswap::confirm", tx_hash = ?tx_hash, polls, "Pending");
            }
            Err(SwapError::RpcTimeout(label)) => {
                warn!(target = "pairswap::confirm", tx_hash = ?tx_hash, polls, label, "Receipt read timed out");
            }
            Err(e) => return Err(e),
        }

        tokio::time::sleep(poll_interval).await;
    }
}
