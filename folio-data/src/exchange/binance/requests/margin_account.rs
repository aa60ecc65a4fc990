use serde::Deserialize;
use std::borrow::Cow;

use crate::{
    model::balance::{AssetBalance, Wallet},
    protocols::http::rest_request::RestRequest,
    shared::de::de_str,
};

/*----- */
// Binance Cross Margin Account
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BinanceMarginAccount;

impl RestRequest for BinanceMarginAccount {
    type Response = BinanceMarginAccountResponse;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/sapi/v1/margin/account")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }
}

/*----- */
// Binance Cross Margin Account - Response
/*----- */
#[derive(Debug, Default, Deserialize)]
pub struct BinanceMarginAccountResponse {
    #[serde(alias = "marginLevel", deserialize_with = "de_str")]
    pub margin_level: f64,
    #[serde(alias = "totalNetAssetOfBtc", deserialize_with = "de_str")]
    pub total_net_asset_of_btc: f64,
    #[serde(alias = "userAssets")]
    pub user_assets: Vec<BinanceMarginAsset>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinanceMarginAsset {
    pub asset: String,
    #[serde(deserialize_with = "de_str")]
    pub borrowed: f64,
    #[serde(deserialize_with = "de_str")]
    pub free: f64,
    #[serde(deserialize_with = "de_str")]
    pub interest: f64,
    #[serde(deserialize_with = "de_str")]
    pub locked: f64,
    #[serde(alias = "netAsset", deserialize_with = "de_str")]
    pub net_asset: f64,
}

impl From<BinanceMarginAccountResponse> for Vec<AssetBalance> {
    fn from(account: BinanceMarginAccountResponse) -> Self {
        account
            .user_assets
            .into_iter()
            .map(|asset| {
                AssetBalance::new(asset.asset, Wallet::BinanceMargin, asset.free, asset.locked)
                    .with_borrowed(asset.borrowed + asset.interest)
            })
            .filter(|balance| !balance.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_margin_account_response() {
        let response = r#"{
            "borrowEnabled": true,
            "marginLevel": "11.64405625",
            "totalAssetOfBtc": "6.82728457",
            "totalLiabilityOfBtc": "0.58633215",
            "totalNetAssetOfBtc": "6.24095242",
            "tradeEnabled": true,
            "transferEnabled": true,
            "userAssets": [
                {"asset": "BTC", "borrowed": "0.00000000", "free": "0.00499500", "interest": "0.00000000", "locked": "0.00000000", "netAsset": "0.00499500"},
                {"asset": "BNB", "borrowed": "201.66666672", "free": "2346.50000000", "interest": "0.00000000", "locked": "0.00000000", "netAsset": "2144.83333328"},
                {"asset": "USDT", "borrowed": "10.00000000", "free": "0.00000000", "interest": "0.50000000", "locked": "0.00000000", "netAsset": "-10.50000000"},
                {"asset": "ETH", "borrowed": "0.00000000", "free": "0.00000000", "interest": "0.00000000", "locked": "0.00000000", "netAsset": "0.00000000"}
            ]
        }"#;

        let response_de = serde_json::from_str::<BinanceMarginAccountResponse>(response).unwrap();
        assert_eq!(response_de.total_net_asset_of_btc, 6.24095242);

        let balances = Vec::<AssetBalance>::from(response_de);
        assert_eq!(balances.len(), 3);

        let usdt = balances.iter().find(|balance| balance.asset == "USDT").unwrap();
        assert_eq!(usdt.total(), 0.0);
        assert_eq!(usdt.borrowed, 10.5);
        assert_eq!(usdt.net(), -10.5);
    }
}
