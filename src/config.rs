use std::{env, fmt, path::Path, str::FromStr, time::Duration};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use serde::Deserialize;

use crate::{
    errors::SwapError,
    pair::InitCodeHash,
    token::{Token, TokenAmount},
};

/// Names a JSON config file to read instead of the environment.
pub const CONFIG_PATH_VAR: &str = "PAIRSWAP_CONFIG";

/// Everything a swap run needs, fixed for the lifetime of the process.
#[derive(Clone, Deserialize)]
pub struct SwapConfig {
    pub rpc_url: String,
    pub router: Address,
    pub factory: Address,
    #[serde(default)]
    pub init_code_hash: InitCodeHash,
    pub token_in: Token,
    /// Human-readable amount of `token_in` to sell.
    pub amount_in: String,
    pub token_out: Token,
    /// Human-readable minimum amount of `token_out` to accept, `0` for no limit.
    pub amount_out_min: String,
    pub wallet: Address,
    pub private_key: String,
    #[serde(default)]
    pub confirmation_timeout_secs: Option<u64>,
}

impl fmt::Debug for SwapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapConfig")
            .field("rpc_url", &self.rpc_url)
            .field("router", &self.router)
            .field("factory", &self.factory)
            .field("init_code_hash", &self.init_code_hash)
            .field("token_in", &self.token_in)
            .field("amount_in", &self.amount_in)
            .field("token_out", &self.token_out)
            .field("amount_out_min", &self.amount_out_min)
            .field("wallet", &self.wallet)
            .field("private_key", &"<redacted>")
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .finish()
    }
}

impl SwapConfig {
    /// Loads `.env`, then reads the file named by `PAIRSWAP_CONFIG` if set,
    /// otherwise the individual environment variables.
    pub fn load() -> Result<Self, SwapError> {
        dotenv::dotenv().ok();

        match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_json_file(path),
            Err(_) => Self::from_env(),
        }
    }

    pub fn from_env() -> Result<Self, SwapError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SwapError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SwapError::Config(format!("{}: {e}", path.display())))?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, SwapError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| SwapError::Config(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, SwapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .ok_or_else(|| SwapError::Config(format!("{key} environment variable not set")))
        };
        let parsed = |key: &str| -> Result<Address, SwapError> {
            parse_value(key, &required(key)?)
        };

        let init_code_hash = match lookup("INIT_CODE_HASH") {
            Some(value) => InitCodeHash::from_hex(&value)?,
            None => InitCodeHash::default(),
        };
        let confirmation_timeout_secs = lookup("CONFIRMATION_TIMEOUT_SECS")
            .map(|value| parse_value("CONFIRMATION_TIMEOUT_SECS", &value))
            .transpose()?;

        let config = Self {
            rpc_url: required("RPC_URL")?,
            router: parsed("ROUTER_ADDRESS")?,
            factory: parsed("FACTORY_ADDRESS")?,
            init_code_hash,
            token_in: Token::new(
                parsed("TOKEN_IN_ADDRESS")?,
                parse_value("TOKEN_IN_DECIMALS", &required("TOKEN_IN_DECIMALS")?)?,
            ),
            amount_in: required("AMOUNT_IN")?,
            token_out: Token::new(
                parsed("TOKEN_OUT_ADDRESS")?,
                parse_value("TOKEN_OUT_DECIMALS", &required("TOKEN_OUT_DECIMALS")?)?,
            ),
            amount_out_min: lookup("AMOUNT_OUT_MIN").unwrap_or_else(|| "0".to_string()),
            wallet: parsed("WALLET_ADDRESS")?,
            private_key: required("PRIVATE_KEY")?,
            confirmation_timeout_secs,
        };
        config.validate()?;

        Ok(config)
    }

    /// Rejects values that would only fail later, mid-run.
    pub fn validate(&self) -> Result<(), SwapError> {
        reqwest::Url::parse(&self.rpc_url)
            .map_err(|e| SwapError::Config(format!("RPC_URL {}: {e}", self.rpc_url)))?;

        if self.token_in.address == self.token_out.address {
            return Err(SwapError::Config(
                "token_in and token_out must differ".to_string(),
            ));
        }

        self.amount_in()?;
        self.amount_out_min()?;

        Ok(())
    }

    pub fn amount_in(&self) -> Result<TokenAmount, SwapError> {
        self.token_in.parse_amount(&self.amount_in)
    }

    pub fn amount_out_min(&self) -> Result<TokenAmount, SwapError> {
        self.token_out.parse_amount(&self.amount_out_min)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }

    /// Parses the private key, which must belong to `wallet`.
    pub fn signer(&self) -> Result<PrivateKeySigner, SwapError> {
        let signer = PrivateKeySigner::from_str(self.private_key.trim())
            .map_err(|e| SwapError::Config(format!("PRIVATE_KEY: {e}")))?;

        if signer.address() != self.wallet {
            return Err(SwapError::Config(format!(
                "PRIVATE_KEY belongs to {}, not WALLET_ADDRESS {}",
                signer.address(),
                self.wallet
            )));
        }

        Ok(signer)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, SwapError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SwapError::Config(format!("{key} {value}: {e}")))
}
