use std::time::SystemTime;

use alloy::primitives::{Address, TxHash, U256};
use tracing::{error, info, instrument};

use crate::{
    allowance::{approve, check_allowance},
    chain::{with_timeout, ChainClient},
    config::SwapConfig,
    confirm::wait_for_confirmation,
    consts::{CONFIRMATION_POLL_INTERVAL, GAS_FEE_TX_COUNT, GAS_LIMIT, NATIVE_DECIMALS},
    errors::{BalanceKind, SwapError},
    pair::pair_address,
    reserves::{query_pool, PoolReserves},
    swap::{submit_swap, swap_deadline, SwapParams},
    token::TokenAmount,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Before,
    After,
}

/// Progress of a swap run. Any failure ends the run in `Aborted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapState {
    Idle,
    ReservesQueried(Snapshot),
    BalanceChecked,
    ApprovalChecked,
    Approving,
    Approved,
    Swapping,
    Swapped,
    Done,
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReport {
    pub pair: Address,
    pub reserves_before: PoolReserves,
    pub reserves_after: PoolReserves,
    pub approval_tx: Option<TxHash>,
    pub swap_tx: TxHash,
}

/// Native balance needed to pay for both the approval and the swap at `gas_price`.
pub fn required_gas_fee(gas_price: u128) -> U256 {
    U256::from(gas_price) * U256::from(GAS_LIMIT) * U256::from(GAS_FEE_TX_COUNT)
}

/// Runs one `token_in -> token_out` swap:
/// reserves, balances, allowance, optional approval, swap, reserves again.
#[derive(Debug)]
pub struct SwapExecutor<C> {
    config: SwapConfig,
    client: C,
    history: Vec<SwapState>,
}

impl<C> SwapExecutor<C>
where
    C: ChainClient,
{
    pub fn new(config: SwapConfig, client: C) -> Self {
        Self {
            config,
            client,
            history: vec![SwapState::Idle],
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn state(&self) -> &SwapState {
        self.history.last().unwrap_or(&SwapState::Idle)
    }

    /// Every state visited so far, starting with `Idle`.
    pub fn history(&self) -> &[SwapState] {
        &self.history
    }

    pub fn pair_address(&self) -> Address {
        pair_address(
            self.config.factory,
            self.config.token_in.address,
            self.config.token_out.address,
            &self.config.init_code_hash,
        )
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn run(&mut self) -> Result<SwapReport, SwapError> {
        match self.execute().await {
            Ok(report) => {
                self.transition(SwapState::Done);
                Ok(report)
            }
            Err(e) => {
                error!(target = "pairswap::executor", error = %e, "Swap aborted");
                self.transition(SwapState::Aborted(e.to_string()));
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<SwapReport, SwapError> {
        let amount_in = self.config.amount_in()?;
        let amount_out_min = self.config.amount_out_min()?;

        info!(target = "pairswap::executor", "Reserves before swap");
        let reserves_before = self.query_reserves().await?;
        self.transition(SwapState::ReservesQueried(Snapshot::Before));

        let gas_price = with_timeout("gas_price", self.client.gas_price()).await?;
        info!(target = "pairswap::executor", gas_price, "Suggested gas price");
        self.check_balances(gas_price, amount_in).await?;
        self.transition(SwapState::BalanceChecked);

        let allowance = check_allowance(
            &self.client,
            self.config.token_in.address,
            self.config.wallet,
            self.config.router,
        )
        .await?;
        self.transition(SwapState::ApprovalChecked);

        let approval_tx = if allowance.is_approved {
            None
        } else {
            info!(
                target = "pairswap::executor",
                router = ?self.config.router,
                "Router not approved, approving"
            );
            self.transition(SwapState::Approving);
            Some(self.approve_router(gas_price).await?)
        };
        self.transition(SwapState::Approved);

        let gas_price = with_timeout("gas_price", self.client.gas_price()).await?;
        info!(target = "pairswap::executor", gas_price, "Suggested gas price");
        self.transition(SwapState::Swapping);
        let swap_tx = self.swap(gas_price, amount_in, amount_out_min).await?;
        self.transition(SwapState::Swapped);

        info!(target = "pairswap::executor", "Reserves after swap");
        let reserves_after = self.query_reserves().await?;
        self.transition(SwapState::ReservesQueried(Snapshot::After));

        Ok(SwapReport {
            pair: reserves_before.pair,
            reserves_before,
            reserves_after,
            approval_tx,
            swap_tx,
        })
    }

    async fn query_reserves(&self) -> Result<PoolReserves, SwapError> {
        query_pool(
            &self.client,
            self.config.factory,
            &self.config.token_in,
            &self.config.token_out,
            &self.config.init_code_hash,
        )
        .await
    }

    async fn check_balances(
        &self,
        gas_price: u128,
        amount_in: TokenAmount,
    ) -> Result<(), SwapError> {
        let wallet = self.config.wallet;
        let native = TokenAmount::new(
            with_timeout("balance", self.client.balance(wallet)).await?,
            NATIVE_DECIMALS,
        );
        let token = self.config.token_in.amount(
            self.client
                .token_balance(self.config.token_in.address, wallet)
                .await?,
        );

        if token.is_zero() {
            return Err(SwapError::InsufficientBalance {
                kind: BalanceKind::SpendToken,
                balance: token.raw,
                required: amount_in.raw,
            });
        }

        let required = required_gas_fee(gas_price);
        if native.raw < required {
            return Err(SwapError::InsufficientBalance {
                kind: BalanceKind::Native,
                balance: native.raw,
                required,
            });
        }

        info!(
            target = "pairswap::executor",
            wallet = ?wallet,
            native = %native,
            token = %token,
            "Balances"
        );

        Ok(())
    }

    async fn approve_router(&self, gas_price: u128) -> Result<TxHash, SwapError> {
        let tx_hash = approve(
            &self.client,
            self.config.token_in.address,
            self.config.router,
            self.config.wallet,
            gas_price,
        )
        .await?;

        wait_for_confirmation(
            &self.client,
            tx_hash,
            CONFIRMATION_POLL_INTERVAL,
            self.config.confirmation_timeout(),
        )
        .await
        .map_err(|e| SwapError::ApprovalFailure(Box::new(e)))?;

        info!(target = "pairswap::executor", tx_hash = ?tx_hash, "Approval mined");
        Ok(tx_hash)
    }

    async fn swap(
        &self,
        gas_price: u128,
        amount_in: TokenAmount,
        amount_out_min: TokenAmount,
    ) -> Result<TxHash, SwapError> {
        let params = SwapParams::new(
            &self.config.token_in,
            &self.config.token_out,
            amount_in,
            amount_out_min,
            self.config.wallet,
            swap_deadline(SystemTime::now())?,
        );

        let tx_hash = submit_swap(
            &self.client,
            self.config.router,
            self.config.wallet,
            &params,
            gas_price,
        )
        .await?;

        wait_for_confirmation(
            &self.client,
            tx_hash,
            CONFIRMATION_POLL_INTERVAL,
            self.config.confirmation_timeout(),
        )
        .await?;

        info!(target = "pairswap::executor", tx_hash = ?tx_hash, "Swap mined");
        Ok(tx_hash)
    }

    fn transition(&mut self, state: SwapState) {
        info!(target = "pairswap::executor", state = ?state, "State");
        self.history.push(state);
    }
}
