use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{
    model::balance::{AssetBalance, Wallet},
    protocols::http::rest_request::RestRequest,
    shared::de::de_str_or_default,
};

use super::BitgetResponse;

/*----- */
// Bitget Futures Accounts
/*----- */
#[derive(Debug, Clone, Serialize)]
pub struct BitgetFuturesAccounts {
    #[serde(rename = "productType")]
    pub product_type: &'static str,
}

impl Default for BitgetFuturesAccounts {
    fn default() -> Self {
        Self {
            product_type: "USDT-FUTURES",
        }
    }
}

impl RestRequest for BitgetFuturesAccounts {
    type Response = BitgetResponse<Vec<BitgetFuturesAccount>>;
    type QueryParams = Self;
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v2/mix/account/accounts")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn query_params(&self) -> Option<&Self> {
        Some(self)
    }
}

/*----- */
// Bitget Futures Accounts - Response
/*----- */
#[derive(Debug, Default, Deserialize)]
pub struct BitgetFuturesAccount {
    #[serde(alias = "marginCoin")]
    pub margin_coin: String,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub locked: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub available: f64,
    #[serde(alias = "accountEquity", default, deserialize_with = "de_str_or_default")]
    pub account_equity: f64,
    #[serde(alias = "usdtEquity", default, deserialize_with = "de_str_or_default")]
    pub usdt_equity: f64,
    #[serde(alias = "unrealizedPL", default, deserialize_with = "de_str_or_default")]
    pub unrealized_pl: f64,
}

impl From<BitgetFuturesAccount> for AssetBalance {
    fn from(account: BitgetFuturesAccount) -> Self {
        AssetBalance::new(
            account.margin_coin,
            Wallet::BitgetFutures,
            account.available,
            account.locked,
        )
        .with_unrealized_pnl(account.unrealized_pl)
    }
}
