use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{
    model::balance::{AssetBalance, Wallet},
    protocols::http::rest_request::RestRequest,
    shared::{de::de_str, utils::strip_earn_prefix},
};

/*----- */
// Binance Spot Account
/*----- */
#[derive(Debug, Clone, Serialize)]
pub struct BinanceSpotAccount {
    #[serde(rename = "omitZeroBalances")]
    pub omit_zero_balances: bool,
}

impl Default for BinanceSpotAccount {
    fn default() -> Self {
        Self {
            omit_zero_balances: true,
        }
    }
}

impl RestRequest for BinanceSpotAccount {
    type Response = BinanceSpotAccountResponse;
    type QueryParams = Self;
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v3/account")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn query_params(&self) -> Option<&Self> {
        Some(self)
    }
}

/*----- */
// Binance Spot Account - Response
/*----- */
#[derive(Debug, Default, Deserialize)]
pub struct BinanceSpotAccountResponse {
    #[serde(alias = "accountType", default)]
    pub account_type: String,
    pub balances: Vec<BinanceSpotBalance>,
    #[serde(alias = "canTrade", default)]
    pub can_trade: bool,
    #[serde(alias = "updateTime", default)]
    pub update_time: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinanceSpotBalance {
    pub asset: String,
    #[serde(deserialize_with = "de_str")]
    pub free: f64,
    #[serde(deserialize_with = "de_str")]
    pub locked: f64,
}

impl From<BinanceSpotAccountResponse> for Vec<AssetBalance> {
    fn from(account: BinanceSpotAccountResponse) -> Self {
        account
            .balances
            .into_iter()
            .map(|balance| {
                AssetBalance::new(
                    strip_earn_prefix(&balance.asset),
                    Wallet::BinanceSpot,
                    balance.free,
                    balance.locked,
                )
            })
            .filter(|balance| !balance.is_empty())
            .collect()
    }
}
