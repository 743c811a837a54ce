use std::{collections::HashMap, sync::Mutex};

use alloy::{
    primitives::{keccak256, Address, Bytes, TxHash, U256},
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;

use super::{ChainClient, SignedTransaction, TransactionCall, TransactionStatus};
use crate::{
    contracts::{IUniswapV2Pair, IERC20},
    errors::SwapError,
};

/// In-memory chain answering the calls a swap makes.
///
/// Unknown contract calls return empty data, like a call to an address without code.
#[derive(Debug, Default)]
pub struct MockChain {
    pub native_balance: U256,
    pub gas_price: u128,
    pub nonce: u64,
    pub token_balances: HashMap<Address, U256>,
    pub allowances: HashMap<Address, U256>,
    pub reserves: HashMap<Address, (u128, u128)>,
    /// Polls answered with `Pending` before a transaction is reported mined.
    pub pending_polls: u32,
    pub never_confirm: bool,
    /// Receipt reads never return.
    pub stall_receipts: bool,
    pub revert: bool,
    pub fail_broadcast: bool,
    signed: Mutex<HashMap<TxHash, TransactionCall>>,
    broadcast: Mutex<Vec<TransactionCall>>,
    polls: Mutex<HashMap<TxHash, u32>>,
}

impl MockChain {
    pub fn with_native_balance(mut self, balance: U256) -> Self {
        self.native_balance = balance;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_token_balance(mut self, token: Address, balance: U256) -> Self {
        self.token_balances.insert(token, balance);
        self
    }

    pub fn with_allowance(mut self, token: Address, allowance: U256) -> Self {
        self.allowances.insert(token, allowance);
        self
    }

    pub fn with_reserves(mut self, pair: Address, reserve_0: u128, reserve_1: u128) -> Self {
        self.reserves.insert(pair, (reserve_0, reserve_1));
        self
    }

    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    pub fn never_confirming(mut self) -> Self {
        self.never_confirm = true;
        self
    }

    pub fn stalling_receipts(mut self) -> Self {
        self.stall_receipts = true;
        self
    }

    pub fn reverting(mut self) -> Self {
        self.revert = true;
        self
    }

    pub fn failing_broadcast(mut self) -> Self {
        self.fail_broadcast = true;
        self
    }

    /// Transactions that reached `send_raw_transaction`, in order.
    pub fn broadcast(&self) -> Vec<TransactionCall> {
        self.broadcast.lock().unwrap().clone()
    }

    /// Receipt reads started so far, across all transactions.
    pub fn receipt_polls(&self) -> u32 {
        self.polls.lock().unwrap().values().sum()
    }

    fn answer(&self, to: Address, input: &[u8]) -> Vec<u8> {
        if input.len() < 4 {
            return vec![];
        }

        let selector: [u8; 4] = input[..4].try_into().unwrap();
        let data = if selector == IERC20::balanceOfCall::SELECTOR {
            self.token_balances
                .get(&to)
                .map(|balance| balance.abi_encode())
        } else if selector == IERC20::allowanceCall::SELECTOR {
            self.allowances
                .get(&to)
                .map(|allowance| allowance.abi_encode())
        } else if selector == IUniswapV2Pair::getReservesCall::SELECTOR {
            self.reserves.get(&to).map(|(reserve_0, reserve_1)| {
                (U256::from(*reserve_0), U256::from(*reserve_1), 0u32).abi_encode_params()
            })
        } else {
            None
        };

        data.unwrap_or_default()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn balance(&self, _address: Address) -> Result<U256, SwapError> {
        Ok(self.native_balance)
    }

    async fn nonce(&self, _address: Address) -> Result<u64, SwapError> {
        Ok(self.nonce + self.broadcast.lock().unwrap().len() as u64)
    }

    async fn gas_price(&self) -> Result<u128, SwapError> {
        Ok(self.gas_price)
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, SwapError> {
        Ok(self.answer(to, &input).into())
    }

    fn sign_transaction(&self, tx: &TransactionCall) -> Result<SignedTransaction, SwapError> {
        let mut raw = tx.input.to_vec();
        raw.extend_from_slice(&tx.nonce.to_be_bytes());
        let hash = keccak256(&raw);

        self.signed.lock().unwrap().insert(hash, tx.clone());
        Ok(SignedTransaction {
            raw: raw.into(),
            hash,
        })
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, SwapError> {
        if self.fail_broadcast {
            return Err(SwapError::Broadcast("nonce too low".to_string()));
        }

        let hash = keccak256(raw);
        let tx = self
            .signed
            .lock()
            .unwrap()
            .get(&hash)
            .cloned()
            .ok_or_else(|| SwapError::Broadcast("unknown transaction".to_string()))?;

        self.broadcast.lock().unwrap().push(tx);
        Ok(hash)
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> Result<TransactionStatus, SwapError> {
        let count = {
            let mut polls = self.polls.lock().unwrap();
            let count = polls.entry(tx_hash).or_insert(0);
            *count += 1;
            *count
        };

        if self.stall_receipts {
            std::future::pending::<()>().await;
        }
        if self.never_confirm || count <= self.pending_polls {
            Ok(TransactionStatus::Pending)
        } else if self.revert {
            Ok(TransactionStatus::Reverted)
        } else {
            Ok(TransactionStatus::Success)
        }
    }
}
