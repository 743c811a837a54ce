use std::fmt;

use alloy::primitives::{
    utils::{format_units, parse_units},
    Address, U256,
};
use serde::{Deserialize, Serialize};

use crate::errors::SwapError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
}

impl Token {
    pub const fn new(address: Address, decimals: u8) -> Self {
        Self { address, decimals }
    }

    /// Wraps a raw on-chain quantity of this token.
    pub const fn amount(&self, raw: U256) -> TokenAmount {
        TokenAmount::new(raw, self.decimals)
    }

    /// Shifts a human-readable quantity by the token decimals.
    pub fn parse_amount(&self, human: &str) -> Result<TokenAmount, SwapError> {
        TokenAmount::from_human(human, self.decimals)
    }
}

/// Orders two tokens the way the pair contract stores them, ascending by numeric value.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a > token_b {
        (token_b, token_a)
    } else {
        (token_a, token_b)
    }
}

/// An on-chain integer amount paired with the decimals needed to display it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    pub const fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn from_human(human: &str, decimals: u8) -> Result<Self, SwapError> {
        let human = human.trim();
        if human.starts_with('-') {
            return Err(SwapError::Config(format!("negative amount {human}")));
        }

        let raw = parse_units(human, decimals)
            .map_err(|e| SwapError::Config(format!("invalid amount {human}: {e}")))?
            .get_absolute();

        Ok(Self { raw, decimals })
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    pub fn human(&self) -> String {
        format_units(self.raw, self.decimals).unwrap_or_else(|_| self.raw.to_string())
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.human())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, U256};

    use super::{sort_tokens, Token, TokenAmount};
    use crate::errors::SwapError;

    #[test]
    fn test_sort_tokens() {
        let usdc = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        let weth = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

        assert_eq!(sort_tokens(usdc, weth), (usdc, weth));
        assert_eq!(sort_tokens(weth, usdc), (usdc, weth));
    }

    #[test]
    fn test_parse_amount() {
        let usdc = Token::new(address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6);

        assert_eq!(usdc.parse_amount("1.5").unwrap().raw, U256::from(1_500_000));
        assert_eq!(usdc.parse_amount("0").unwrap().raw, U256::ZERO);
        assert_eq!(
            usdc.parse_amount("1000000").unwrap().raw,
            U256::from(1_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_invalid_amount() {
        assert!(matches!(
            TokenAmount::from_human("-1", 18),
            Err(SwapError::Config(_))
        ));
        assert!(matches!(
            TokenAmount::from_human("ten", 18),
            Err(SwapError::Config(_))
        ));
    }

    #[test]
    fn test_zero_amount() {
        assert!(TokenAmount::new(U256::ZERO, 18).is_zero());
        // One wei still displays as a positive human amount
        assert!(!TokenAmount::new(U256::from(1), 18).is_zero());
    }
}
