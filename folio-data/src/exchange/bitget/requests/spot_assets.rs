use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{
    model::balance::{AssetBalance, Wallet},
    protocols::http::rest_request::RestRequest,
    shared::de::de_str_or_default,
};

use super::BitgetResponse;

/*----- */
// Bitget Spot Assets
/*----- */
#[derive(Debug, Clone, Serialize)]
pub struct BitgetSpotAssets {
    #[serde(rename = "assetType")]
    pub asset_type: &'static str,
}

impl Default for BitgetSpotAssets {
    fn default() -> Self {
        Self {
            asset_type: "hold_only",
        }
    }
}

impl RestRequest for BitgetSpotAssets {
    type Response = BitgetResponse<Vec<BitgetSpotAsset>>;
    type QueryParams = Self;
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v2/spot/account/assets")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn query_params(&self) -> Option<&Self> {
        Some(self)
    }
}

/*----- */
// Bitget Spot Assets - Response
/*----- */
#[derive(Debug, Default, Deserialize)]
pub struct BitgetSpotAsset {
    pub coin: String,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub available: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub frozen: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub locked: f64,
}

impl From<BitgetSpotAsset> for AssetBalance {
    fn from(asset: BitgetSpotAsset) -> Self {
        AssetBalance::new(
            asset.coin,
            Wallet::BitgetSpot,
            asset.available,
            asset.frozen + asset.locked,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_spot_assets_response() {
        let response = r#"{
            "code": "00000",
            "msg": "success",
            "requestTime": 1695808949356,
            "data": [
                {"coin": "usdt", "available": "120.5", "limitAvailable": "0", "frozen": "4.5", "locked": "0", "uTime": "1622697148"},
                {"coin": "BGB", "available": "0", "limitAvailable": "0", "frozen": "", "locked": "", "uTime": "1622697148"}
            ]
        }"#;

        let assets = serde_json::from_str::<BitgetResponse<Vec<BitgetSpotAsset>>>(response)
            .unwrap()
            .into_data()
            .unwrap();

        let balances = assets.into_iter().map(AssetBalance::from).collect::<Vec<_>>();
        assert_eq!(balances[0].asset, "USDT");
        assert_eq!(balances[0].total(), 125.0);
        assert!(balances[1].is_empty());
    }
}
