use std::time::Duration;

use alloy::primitives::{b256, B256, U256};

/// Gas limit attached to both the approval and the swap transaction.
pub const GAS_LIMIT: u64 = 300_000;

/// The native balance must cover this many transactions at `GAS_LIMIT`.
pub const GAS_FEE_TX_COUNT: u64 = 2;

pub const READ_TIMEOUT: Duration = Duration::from_secs(5);
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const SWAP_DEADLINE: Duration = Duration::from_secs(10 * 60);

/// Allowance granted to the router, and the threshold below which it is re-approved.
pub const MAX_APPROVAL: U256 = U256::MAX;

/// `swapExactTokensForTokens(uint256,uint256,address[],address,uint256)`
pub const SWAP_EXACT_TOKENS_FOR_TOKENS_SELECTOR: [u8; 4] = [0x38, 0xed, 0x17, 0x39];

/// Uniswap V2 pair bytecode hash.
pub const UNISWAP_V2_INIT_CODE_HASH: B256 =
    b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");

pub const NATIVE_DECIMALS: u8 = 18;
