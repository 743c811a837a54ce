use std::fmt;

use alloy::{
    primitives::{TxHash, U256},
    transports::TransportError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Rpc(#[from] TransportError),
    #[error("RPC call timed out: {0}")]
    RpcTimeout(&'static str),
    #[error(transparent)]
    AbiDecode(#[from] alloy::sol_types::Error),
    #[error("Insufficient {kind} balance: {balance}, required {required}")]
    InsufficientBalance {
        kind: BalanceKind,
        balance: U256,
        required: U256,
    },
    #[error("Approval failed: {0}")]
    ApprovalFailure(#[source] Box<SwapError>),
    #[error("Could not build swap transaction: {0}")]
    SwapBuild(String),
    #[error("Broadcast failed: {0}")]
    Broadcast(String),
    #[error("Transaction {0} was not confirmed in time")]
    ConfirmationTimeout(TxHash),
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    /// The token being sold.
    SpendToken,
    /// Native currency paying for gas.
    Native,
}

impl fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceKind::SpendToken => write!(f, "spend token"),
            BalanceKind::Native => write!(f, "native"),
        }
    }
}
