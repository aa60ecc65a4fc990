use serde::Deserialize;
use std::borrow::Cow;

use crate::{
    model::balance::{AssetBalance, Wallet},
    protocols::http::rest_request::RestRequest,
    shared::de::de_str_or_default,
};

use super::BitgetResponse;

/*----- */
// Bitget Funding (P2P) Assets
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BitgetFundingAssets;

impl RestRequest for BitgetFundingAssets {
    type Response = BitgetResponse<Vec<BitgetFundingAsset>>;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v2/account/funding-assets")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }
}

/*----- */
// Bitget Funding (P2P) Assets - Response
/*----- */
#[derive(Debug, Default, Deserialize)]
pub struct BitgetFundingAsset {
    pub coin: String,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub available: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub frozen: f64,
    #[serde(alias = "usdtValue", default, deserialize_with = "de_str_or_default")]
    pub usdt_value: f64,
}

impl From<BitgetFundingAsset> for AssetBalance {
    fn from(asset: BitgetFundingAsset) -> Self {
        AssetBalance::new(asset.coin, Wallet::BitgetP2p, asset.available, asset.frozen)
    }
}
