use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{exchange::ExchangeId, shared::utils::is_non_zero};

/*----- */
// Wallet
/*----- */
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Wallet {
    BinanceSpot,
    BinanceMargin,
    BinanceFutures,
    BitgetSpot,
    BitgetMargin,
    BitgetFutures,
    BitgetP2p,
}

impl Wallet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Wallet::BinanceSpot => "binance_spot",
            Wallet::BinanceMargin => "binance_margin",
            Wallet::BinanceFutures => "binance_futures",
            Wallet::BitgetSpot => "bitget_spot",
            Wallet::BitgetMargin => "bitget_margin",
            Wallet::BitgetFutures => "bitget_futures",
            Wallet::BitgetP2p => "bitget_p2p",
        }
    }

    pub fn exchange(&self) -> ExchangeId {
        match self {
            Wallet::BinanceSpot | Wallet::BinanceMargin | Wallet::BinanceFutures => {
                ExchangeId::Binance
            }
            Wallet::BitgetSpot | Wallet::BitgetMargin | Wallet::BitgetFutures | Wallet::BitgetP2p => {
                ExchangeId::Bitget
            }
        }
    }
}

impl Display for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/*----- */
// Asset Balance
/*----- */
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct AssetBalance {
    pub asset: String,
    pub wallet: Wallet,
    pub free: f64,
    pub locked: f64,
    pub borrowed: f64,
    pub unrealized_pnl: f64,
}

impl AssetBalance {
    pub fn new<S>(asset: S, wallet: Wallet, free: f64, locked: f64) -> Self
    where
        S: Into<String>,
    {
        Self {
            asset: asset.into().to_uppercase(),
            wallet,
            free,
            locked,
            borrowed: 0.0,
            unrealized_pnl: 0.0,
        }
    }

    pub fn with_borrowed(self, borrowed: f64) -> Self {
        Self { borrowed, ..self }
    }

    pub fn with_unrealized_pnl(self, unrealized_pnl: f64) -> Self {
        Self {
            unrealized_pnl,
            ..self
        }
    }

    pub fn total(&self) -> f64 {
        self.free + self.locked
    }

    pub fn net(&self) -> f64 {
        self.total() - self.borrowed
    }

    // Margin rows with only debt still matter, everything else needs a holding
    pub fn is_empty(&self) -> bool {
        !is_non_zero(self.total()) && !is_non_zero(self.borrowed)
    }
}
