use alloy::{
    primitives::{Address, U256},
    sol_types::SolCall,
};
use tracing::info;

use crate::{
    chain::{with_timeout, ChainClient},
    contracts::IUniswapV2Pair,
    errors::SwapError,
    pair::{pair_address, InitCodeHash},
    token::{Token, TokenAmount},
};

/// Reads `(reserve0, reserve1)` of a pair, in the order the pair stores them.
pub async fn get_reserves<C>(client: &C, pair: Address) -> Result<(u128, u128), SwapError>
where
    C: ChainClient + ?Sized,
{
    let input = IUniswapV2Pair::getReservesCall {}.abi_encode();
    let data = with_timeout("getReserves", client.call(pair, input.into())).await?;
    let reserves = IUniswapV2Pair::getReservesCall::abi_decode_returns(&data, true)?;

    Ok((reserves.reserve0.to::<u128>(), reserves.reserve1.to::<u128>()))
}

/// Maps storage-ordered reserves onto `(token_a, token_b)`.
///
/// The pair stores the numerically smaller token first, so the reserves are
/// swapped when `token_a > token_b`.
pub fn resolve_reserves(
    token_a: Address,
    token_b: Address,
    reserve_0: u128,
    reserve_1: u128,
) -> (u128, u128) {
    if token_a > token_b {
        (reserve_1, reserve_0)
    } else {
        (reserve_0, reserve_1)
    }
}

/// Reserves of a pair, expressed per requested token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
    pub pair: Address,
    pub token_a: TokenAmount,
    pub token_b: TokenAmount,
}

impl PoolReserves {
    pub fn new(pair: Address, token_a: &Token, token_b: &Token, reserves: (u128, u128)) -> Self {
        let (amount_a, amount_b) =
            resolve_reserves(token_a.address, token_b.address, reserves.0, reserves.1);

        Self {
            pair,
            token_a: token_a.amount(U256::from(amount_a)),
            token_b: token_b.amount(U256::from(amount_b)),
        }
    }
}

/// Derives the pair for `token_a`/`token_b`, reads its reserves and logs them.
pub async fn query_pool<C>(
    client: &C,
    factory: Address,
    token_a: &Token,
    token_b: &Token,
    init_code_hash: &InitCodeHash,
) -> Result<PoolReserves, SwapError>
where
    C: ChainClient + ?Sized,
{
    let pair = pair_address(factory, token_a.address, token_b.address, init_code_hash);
    let reserves = PoolReserves::new(pair, token_a, token_b, get_reserves(client, pair).await?);

    info!(
        target = "pairswap::reserves",
        pair = ?pair,
        token_a = %reserves.token_a,
        token_b = %reserves.token_b,
        "Pool reserves"
    );

    Ok(reserves)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address, U256};

    use super::{get_reserves, query_pool, resolve_reserves};
    use crate::{
        chain::mock::MockChain,
        errors::SwapError,
        pair::{pair_address, InitCodeHash},
        token::Token,
    };

    const FACTORY: Address = address!("abc0000000000000000000000000000000000abc");
    const LOW: Address = address!("1000000000000000000000000000000000000001");
    const HIGH: Address = address!("f000000000000000000000000000000000000001");

    #[test]
    fn test_resolve_reserves() {
        assert_eq!(resolve_reserves(LOW, HIGH, 100, 200), (100, 200));
        assert_eq!(resolve_reserves(HIGH, LOW, 100, 200), (200, 100));
    }

    #[tokio::test]
    async fn test_get_reserves() {
        let pair = address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc");
        let chain = MockChain::default().with_reserves(
            pair,
            23595096345912178729927,
            154664232014390554564,
        );

        assert_eq!(
            get_reserves(&chain, pair).await.unwrap(),
            (23595096345912178729927, 154664232014390554564)
        );
    }

    #[tokio::test]
    async fn test_get_reserves_missing_pair() {
        let chain = MockChain::default();
        let res = get_reserves(&chain, Address::ZERO).await;

        assert!(matches!(res, Err(SwapError::AbiDecode(_))));
    }

    #[tokio::test]
    async fn test_query_pool_token_a_above_token_b() {
        let hash = InitCodeHash::default();
        let token_a = Token::new(HIGH, 18);
        let token_b = Token::new(LOW, 6);
        let pair = pair_address(FACTORY, HIGH, LOW, &hash);
        let chain = MockChain::default().with_reserves(pair, 100, 200);

        let reserves = query_pool(&chain, FACTORY, &token_a, &token_b, &hash)
            .await
            .unwrap();

        assert_eq!(reserves.pair, pair);
        assert_eq!(reserves.token_a.raw, U256::from(200));
        assert_eq!(reserves.token_a.decimals, 18);
        assert_eq!(reserves.token_b.raw, U256::from(100));
        assert_eq!(reserves.token_b.decimals, 6);
    }

    #[tokio::test]
    async fn test_query_pool_token_a_below_token_b() {
        let hash = InitCodeHash::default();
        let token_a = Token::new(LOW, 18);
        let token_b = Token::new(HIGH, 18);
        let pair = pair_address(FACTORY, LOW, HIGH, &hash);
        let chain = MockChain::default().with_reserves(pair, 100, 200);

        let reserves = query_pool(&chain, FACTORY, &token_a, &token_b, &hash)
            .await
            .unwrap();

        assert_eq!(reserves.token_a.raw, U256::from(100));
        assert_eq!(reserves.token_b.raw, U256::from(200));
    }
}
