use serde::Deserialize;
use std::borrow::Cow;

use crate::{
    model::balance::{AssetBalance, Wallet},
    protocols::http::rest_request::RestRequest,
    shared::{de::de_str, utils::is_non_zero},
};

/*----- */
// Binance USD-M Futures Account
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BinanceFuturesAccount;

impl RestRequest for BinanceFuturesAccount {
    type Response = BinanceFuturesAccountResponse;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/fapi/v2/account")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }
}

/*----- */
// Binance USD-M Futures Account - Response
/*----- */
#[derive(Debug, Default, Deserialize)]
pub struct BinanceFuturesAccountResponse {
    #[serde(alias = "totalWalletBalance", deserialize_with = "de_str")]
    pub total_wallet_balance: f64,
    #[serde(alias = "totalUnrealizedProfit", deserialize_with = "de_str")]
    pub total_unrealized_profit: f64,
    pub assets: Vec<BinanceFuturesAsset>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinanceFuturesAsset {
    pub asset: String,
    #[serde(alias = "walletBalance", deserialize_with = "de_str")]
    pub wallet_balance: f64,
    #[serde(alias = "unrealizedProfit", deserialize_with = "de_str")]
    pub unrealized_profit: f64,
    #[serde(alias = "marginBalance", deserialize_with = "de_str")]
    pub margin_balance: f64,
    #[serde(alias = "availableBalance", deserialize_with = "de_str")]
    pub available_balance: f64,
}

// Wallet balance is the holding, unrealised profit rides along separately
impl From<BinanceFuturesAccountResponse> for Vec<AssetBalance> {
    fn from(account: BinanceFuturesAccountResponse) -> Self {
        account
            .assets
            .into_iter()
            .filter(|asset| is_non_zero(asset.wallet_balance) && asset.wallet_balance > 0.0)
            .map(|asset| {
                AssetBalance::new(asset.asset, Wallet::BinanceFutures, asset.wallet_balance, 0.0)
                    .with_unrealized_pnl(asset.unrealized_profit)
            })
            .collect()
    }
}
