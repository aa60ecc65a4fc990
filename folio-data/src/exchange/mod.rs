pub mod binance;
pub mod bitget;
pub mod coingecko;

use async_trait::async_trait;
use hmac::Hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt::Display;

use crate::{
    error::ClientError,
    model::{balance::AssetBalance, price::PriceBook},
    protocols::http::client::RetryPolicy,
};

/*----- */
// Convenient types
/*----- */
pub type HmacSha256 = Hmac<Sha256>;

/*----- */
// Exchange Id
/*----- */
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeId {
    Binance,
    Bitget,
}

impl ExchangeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "binance",
            ExchangeId::Bitget => "bitget",
        }
    }
}

impl Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/*----- */
// Client Options
/*----- */
// Exchanges cap recvWindow at one minute
pub const MAX_RECV_WINDOW_MS: u64 = 60_000;
pub const DEFAULT_RECV_WINDOW_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub proxy_url: Option<String>,
    pub retry_policy: RetryPolicy,
    pub recv_window_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy_url: None,
            retry_policy: RetryPolicy::default(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
        }
    }
}

/*----- */
// Balance Source
/*----- */
// Everything the server needs from an exchange account: every wallet's
// balances plus a price book to value them with.
#[async_trait]
pub trait BalanceSource {
    const EXCHANGE: ExchangeId;

    async fn sync_server_time(&self) -> Result<i64, ClientError>;

    async fn all_balances(&self) -> Result<Vec<AssetBalance>, ClientError>;

    async fn prices(&self) -> Result<PriceBook, ClientError>;
}
