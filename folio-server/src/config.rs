use std::{path::PathBuf, str::FromStr, time::Duration};

use folio_data::{
    exchange::{
        binance::request_builder::BinanceAuthParams, bitget::request_builder::BitgetAuthParams,
        ClientOptions, DEFAULT_RECV_WINDOW_MS, MAX_RECV_WINDOW_MS,
    },
    protocols::http::client::RetryPolicy,
};
use thiserror::Error;
use url::Url;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_LEDGER_PATH: &str = "trade_ledger.json";
pub const DEFAULT_TOP_ASSETS_PATH: &str = "public/top_500_assets.json";

/*----- */
// Config Error
/*----- */
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{missing} must be set together with {present}")]
    PartialCredentials {
        present: &'static str,
        missing: &'static str,
    },

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("invalid PROXY_URL: {0}")]
    ProxyUrl(#[from] url::ParseError),
}

/*----- */
// Config
/*----- */
#[derive(Debug, Clone)]
pub struct Config {
    pub binance: Option<BinanceAuthParams>,
    pub bitget: Option<BitgetAuthParams>,
    pub coingecko_api_key: Option<String>,
    pub proxy_url: Option<Url>,
    pub host: String,
    pub port: u16,
    pub server_api_key: Option<String>,
    pub cache_ttl: Duration,
    pub recv_window_ms: u64,
    pub retry_policy: RetryPolicy,
    pub ledger_path: PathBuf,
    pub top_assets_path: PathBuf,
}

impl Config {
    // A .env file is optional, variables already in the environment win
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let binance = credentials(["BINANCE_API_KEY", "BINANCE_API_SECRET"], &var)?
            .map(|[key, secret]| BinanceAuthParams::new(key, secret));

        let bitget = credentials(
            [
                "BITGET_API_KEY",
                "BITGET_API_SECRET",
                "BITGET_API_PASSPHRASE",
            ],
            &var,
        )?
        .map(|[key, secret, passphrase]| BitgetAuthParams::new(key, secret, passphrase));

        let proxy_url = var("PROXY_URL")
            .map(|proxy_url| Url::parse(&proxy_url))
            .transpose()?;

        let recv_window_ms = parse("RECV_WINDOW_MS", var("RECV_WINDOW_MS"), DEFAULT_RECV_WINDOW_MS)?;
        if !(1..=MAX_RECV_WINDOW_MS).contains(&recv_window_ms) {
            return Err(ConfigError::Invalid {
                name: "RECV_WINDOW_MS",
                value: recv_window_ms.to_string(),
            });
        }

        let retry_policy = RetryPolicy::new(
            parse("RETRY_MAX", var("RETRY_MAX"), RetryPolicy::default().max_retries)?,
            Duration::from_millis(parse("RETRY_BACKOFF_MS", var("RETRY_BACKOFF_MS"), 1_000)?),
        );

        Ok(Self {
            binance,
            bitget,
            coingecko_api_key: var("COINGECKO_API_KEY"),
            proxy_url,
            host: var("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse("SERVER_PORT", var("SERVER_PORT"), DEFAULT_PORT)?,
            server_api_key: var("SERVER_API_KEY"),
            cache_ttl: Duration::from_secs(parse(
                "CACHE_TTL_SECS",
                var("CACHE_TTL_SECS"),
                DEFAULT_CACHE_TTL_SECS,
            )?),
            recv_window_ms,
            retry_policy,
            ledger_path: var("LEDGER_PATH")
                .unwrap_or_else(|| DEFAULT_LEDGER_PATH.to_string())
                .into(),
            top_assets_path: var("TOP_ASSETS_PATH")
                .unwrap_or_else(|| DEFAULT_TOP_ASSETS_PATH.to_string())
                .into(),
        })
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            proxy_url: self.proxy_url.as_ref().map(Url::to_string),
            retry_policy: self.retry_policy,
            recv_window_ms: self.recv_window_ms,
        }
    }
}

// All or nothing: a key without its secret is a mistake worth refusing to start over
fn credentials<const N: usize, F>(
    names: [&'static str; N],
    var: F,
) -> Result<Option<[String; N]>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let values = names.map(|name| var(name));

    if values.iter().all(Option::is_none) {
        return Ok(None);
    }

    if let Some(index) = values.iter().position(Option::is_none) {
        let present = values
            .iter()
            .position(Option::is_some)
            .map(|index| names[index])
            .unwrap_or_default();

        return Err(ConfigError::PartialCredentials {
            present,
            missing: names[index],
        });
    }

    Ok(Some(values.map(Option::unwrap_or_default)))
}

fn parse<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
