//! Exchange data layer for the portfolio service: signed REST plumbing with
//! endpoint failover, Binance / Bitget / CoinGecko clients, and the
//! normalised balance and valuation model they all map into.

pub mod error;
pub mod exchange;
#[cfg(any(test, feature = "mock-server"))]
pub mod mock_server;
pub mod model;
pub mod protocols;
pub mod shared;
