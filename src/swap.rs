use std::time::{SystemTime, UNIX_EPOCH};

use alloy::{
    primitives::{Address, TxHash, U256},
    sol_types::SolCall,
};
use tracing::{debug, info};

use crate::{
    chain::{with_timeout, ChainClient, TransactionCall},
    consts::{GAS_LIMIT, SWAP_DEADLINE},
    contracts::IUniswapV2Router02,
    errors::SwapError,
    token::{Token, TokenAmount},
};

/// Arguments of `swapExactTokensForTokens` for a direct `token_in -> token_out` swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub amount_in: U256,
    /// Zero accepts any output amount.
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: U256,
}

impl SwapParams {
    pub fn new(
        token_in: &Token,
        token_out: &Token,
        amount_in: TokenAmount,
        amount_out_min: TokenAmount,
        to: Address,
        deadline: U256,
    ) -> Self {
        Self {
            amount_in: amount_in.raw,
            amount_out_min: amount_out_min.raw,
            path: vec![token_in.address, token_out.address],
            to,
            deadline,
        }
    }

    pub fn calldata(&self) -> Vec<u8> {
        IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: self.amount_in,
            amountOutMin: self.amount_out_min,
            path: self.path.clone(),
            to: self.to,
            deadline: self.deadline,
        }
        .abi_encode()
    }
}

/// Unix timestamp after which the router rejects the swap.
pub fn swap_deadline(now: SystemTime) -> Result<U256, SwapError> {
    let deadline = (now + SWAP_DEADLINE)
        .duration_since(UNIX_EPOCH)
        .map_err(|e| SwapError::SwapBuild(format!("deadline: {e}")))?;

    Ok(U256::from(deadline.as_secs()))
}

/// Signs and broadcasts the swap through `router` from `from`.
pub async fn submit_swap<C>(
    client: &C,
    router: Address,
    from: Address,
    params: &SwapParams,
    gas_price: u128,
) -> Result<TxHash, SwapError>
where
    C: ChainClient + ?Sized,
{
    let nonce = with_timeout("nonce", client.nonce(from)).await?;
    debug!(target = "pairswap::swap", nonce, "Current nonce");

    let tx = TransactionCall {
        to: router,
        input: params.calldata().into(),
        nonce,
        gas_price,
        gas_limit: GAS_LIMIT,
    };
    let signed = client.sign_transaction(&tx)?;
    let tx_hash = client.send_raw_transaction(&signed.raw).await?;

    info!(
        target = "pairswap::swap",
        amount_in = %params.amount_in,
        amount_out_min = %params.amount_out_min,
        deadline = %params.deadline,
        tx_hash = ?tx_hash,
        "Swap sent"
    );

    Ok(tx_hash)
}
