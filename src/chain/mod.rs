#[cfg(test)]
pub(crate) mod mock;

use std::{future::IntoFuture, marker::PhantomData, sync::Arc, time::Duration};

use alloy::{
    consensus::{SignableTransaction, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    network::{Ethereum, ReceiptResponse, TransactionBuilder, TxSignerSync},
    primitives::{Address, Bytes, TxHash, TxKind, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
    transports::Transport,
};
use async_trait::async_trait;
use tracing::debug;

use crate::{consts::READ_TIMEOUT, contracts::IERC20, errors::SwapError};

/// Unsigned contract call transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCall {
    pub to: Address,
    pub input: Bytes,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// EIP-2718 encoded transaction, ready for `eth_sendRawTransaction`.
    pub raw: Bytes,
    pub hash: TxHash,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Reverted,
}

/// The subset of node and wallet functionality a swap needs.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native currency balance of `address`.
    async fn balance(&self, address: Address) -> Result<U256, SwapError>;

    /// Next transaction sequence number of `address`.
    async fn nonce(&self, address: Address) -> Result<u64, SwapError>;

    /// Gas price suggested by the node.
    async fn gas_price(&self) -> Result<u128, SwapError>;

    /// Executes a read-only call and returns the raw return data.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, SwapError>;

    fn sign_transaction(&self, tx: &TransactionCall) -> Result<SignedTransaction, SwapError>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, SwapError>;

    async fn transaction_status(&self, tx_hash: TxHash) -> Result<TransactionStatus, SwapError>;

    /// ERC-20 balance of `owner`.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, SwapError> {
        let input = IERC20::balanceOfCall { account: owner }.abi_encode();
        let data = with_timeout("balanceOf", self.call(token, input.into())).await?;

        Ok(IERC20::balanceOfCall::abi_decode_returns(&data, true)?._0)
    }
}

/// Bounds a read against the node by [`READ_TIMEOUT`].
pub async fn with_timeout<F, T, E>(label: &'static str, fut: F) -> Result<T, SwapError>
where
    F: IntoFuture<Output = Result<T, E>>,
    SwapError: From<E>,
{
    with_timeout_of(label, READ_TIMEOUT, fut).await
}

pub async fn with_timeout_of<F, T, E>(
    label: &'static str,
    duration: Duration,
    fut: F,
) -> Result<T, SwapError>
where
    F: IntoFuture<Output = Result<T, E>>,
    SwapError: From<E>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(res) => Ok(res?),
        Err(_) => Err(SwapError::RpcTimeout(label)),
    }
}

/// [`ChainClient`] backed by an alloy provider and a local private key.
///
/// Transactions are signed as legacy (gas price) transactions for the chain id
/// reported by the node when the client is created.
#[derive(Debug)]
pub struct RpcChainClient<T, P> {
    provider: Arc<P>,
    signer: PrivateKeySigner,
    chain_id: u64,
    phantom: PhantomData<T>,
}

impl<T, P> RpcChainClient<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum>,
{
    pub async fn new(provider: Arc<P>, signer: PrivateKeySigner) -> Result<Self, SwapError> {
        let chain_id = with_timeout("eth_chainId", provider.get_chain_id()).await?;

        debug!(
            target = "pairswap::chain",
            chain_id,
            signer = ?signer.address(),
            "Connected"
        );

        Ok(Self {
            provider,
            signer,
            chain_id,
            phantom: PhantomData,
        })
    }
}

#[async_trait]
impl<T, P> ChainClient for RpcChainClient<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + 'static,
{
    async fn balance(&self, address: Address) -> Result<U256, SwapError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn nonce(&self, address: Address) -> Result<u64, SwapError> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    async fn gas_price(&self) -> Result<u128, SwapError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, SwapError> {
        let tx = TransactionRequest::default().with_to(to).with_input(input);
        Ok(self.provider.call(&tx).await?)
    }

    fn sign_transaction(&self, tx: &TransactionCall) -> Result<SignedTransaction, SwapError> {
        let mut legacy = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit.into(),
            to: TxKind::Call(tx.to),
            value: U256::ZERO,
            input: tx.input.clone(),
        };

        let signature = self
            .signer
            .sign_transaction_sync(&mut legacy)
            .map_err(|e| SwapError::SwapBuild(format!("sign transaction: {e}")))?;
        let signed: TxEnvelope = legacy.into_signed(signature).into();

        Ok(SignedTransaction {
            raw: signed.encoded_2718().into(),
            hash: *signed.tx_hash(),
        })
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, SwapError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| SwapError::Broadcast(e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> Result<TransactionStatus, SwapError> {
        let status = match self.provider.get_transaction_receipt(tx_hash).await? {
            None => TransactionStatus::Pending,
            Some(receipt) if receipt.status() => TransactionStatus::Success,
            Some(_) => TransactionStatus::Reverted,
        };

        Ok(status)
    }
}
