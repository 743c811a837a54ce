use alloy::{
    primitives::{Address, TxHash, U256},
    sol_types::SolCall,
};
use tracing::{debug, info};

use crate::{
    chain::{with_timeout, ChainClient, TransactionCall},
    consts::{GAS_LIMIT, MAX_APPROVAL},
    contracts::IERC20,
    errors::SwapError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceStatus {
    pub allowance: U256,
    pub is_approved: bool,
}

impl AllowanceStatus {
    pub fn new(allowance: U256) -> Self {
        Self {
            allowance,
            is_approved: allowance >= MAX_APPROVAL,
        }
    }
}

/// Reads how much of `token` the `spender` may move on behalf of `owner`.
pub async fn check_allowance<C>(
    client: &C,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<AllowanceStatus, SwapError>
where
    C: ChainClient + ?Sized,
{
    let input = IERC20::allowanceCall { owner, spender }.abi_encode();
    let data = with_timeout("allowance", client.call(token, input.into())).await?;
    let allowance = IERC20::allowanceCall::abi_decode_returns(&data, true)?._0;

    let status = AllowanceStatus::new(allowance);
    info!(
        target = "pairswap::allowance",
        token = ?token,
        spender = ?spender,
        allowance = %status.allowance,
        max_approval = %MAX_APPROVAL,
        "Allowance"
    );

    Ok(status)
}

pub fn approve_calldata(spender: Address) -> Vec<u8> {
    IERC20::approveCall {
        spender,
        amount: MAX_APPROVAL,
    }
    .abi_encode()
}

/// Signs and broadcasts `approve(spender, MAX_APPROVAL)` on `token` from `owner`.
///
/// Every failure is reported as [`SwapError::ApprovalFailure`].
pub async fn approve<C>(
    client: &C,
    token: Address,
    spender: Address,
    owner: Address,
    gas_price: u128,
) -> Result<TxHash, SwapError>
where
    C: ChainClient + ?Sized,
{
    submit_approval(client, token, spender, owner, gas_price)
        .await
        .map_err(|e| SwapError::ApprovalFailure(Box::new(e)))
}

async fn submit_approval<C>(
    client: &C,
    token: Address,
    spender: Address,
    owner: Address,
    gas_price: u128,
) -> Result<TxHash, SwapError>
where
    C: ChainClient + ?Sized,
{
    let nonce = with_timeout("nonce", client.nonce(owner)).await?;
    debug!(target = "pairswap::allowance", nonce, "Current nonce");

    let tx = TransactionCall {
        to: token,
        input: approve_calldata(spender).into(),
        nonce,
        gas_price,
        gas_limit: GAS_LIMIT,
    };
    let signed = client.sign_transaction(&tx)?;
    let tx_hash = client.send_raw_transaction(&signed.raw).await?;

    info!(
        target = "pairswap::allowance",
        token = ?token,
        spender = ?spender,
        tx_hash = ?tx_hash,
        "Approval sent"
    );

    Ok(tx_hash)
}
