use std::str::FromStr;

use alloy::{
    hex,
    primitives::{keccak256, Address, B256},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{consts::UNISWAP_V2_INIT_CODE_HASH, errors::SwapError, token::sort_tokens};

/// Keccak-256 of the pair contract creation code, specific to each exchange deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitCodeHash(pub B256);

impl InitCodeHash {
    pub fn from_hex(value: &str) -> Result<Self, SwapError> {
        let bytes = hex::decode(value.trim())
            .map_err(|e| SwapError::Decode(format!("init code hash {value}: {e}")))?;

        if bytes.len() != 32 {
            return Err(SwapError::Decode(format!(
                "init code hash {value}: expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self(B256::from_slice(&bytes)))
    }

    pub const fn uniswap_v2() -> Self {
        Self(UNISWAP_V2_INIT_CODE_HASH)
    }
}

impl Default for InitCodeHash {
    fn default() -> Self {
        Self::uniswap_v2()
    }
}

impl FromStr for InitCodeHash {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl<'de> Deserialize<'de> for InitCodeHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_hex(&value).map_err(serde::de::Error::custom)
    }
}

/// Computes the CREATE2 address of the pair for `token_a`/`token_b` deployed by `factory`.
///
/// The tokens are sorted before hashing, so argument order does not matter:
/// `keccak256(0xff ++ factory ++ keccak256(token0 ++ token1) ++ init_code_hash)[12..]`
pub fn pair_address(
    factory: Address,
    token_a: Address,
    token_b: Address,
    init_code_hash: &InitCodeHash,
) -> Address {
    let (token_0, token_1) = sort_tokens(token_a, token_b);
    let salt = keccak256([token_0.as_slice(), token_1.as_slice()].concat());

    factory.create2(salt, init_code_hash.0)
}

/// Same as [`pair_address`], decoding the init code hash from hex first.
pub fn pair_address_from_hex(
    factory: Address,
    token_a: Address,
    token_b: Address,
    init_code_hash: &str,
) -> Result<Address, SwapError> {
    let init_code_hash = InitCodeHash::from_hex(init_code_hash)?;
    Ok(pair_address(factory, token_a, token_b, &init_code_hash))
}
