use serde::Deserialize;
use std::borrow::Cow;

use crate::{
    model::balance::{AssetBalance, Wallet},
    protocols::http::rest_request::RestRequest,
    shared::de::de_str_or_default,
};

use super::BitgetResponse;

/*----- */
// Bitget Cross Margin Assets
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BitgetCrossMarginAssets;

impl RestRequest for BitgetCrossMarginAssets {
    type Response = BitgetResponse<Vec<BitgetMarginAsset>>;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v2/margin/crossed/account/assets")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }
}

/*----- */
// Bitget Cross Margin Assets - Response
/*----- */
#[derive(Debug, Default, Deserialize)]
pub struct BitgetMarginAsset {
    pub coin: String,
    #[serde(alias = "totalAmount", default, deserialize_with = "de_str_or_default")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub available: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub frozen: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub borrow: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub interest: f64,
    #[serde(default, deserialize_with = "de_str_or_default")]
    pub net: f64,
}

impl From<BitgetMarginAsset> for AssetBalance {
    fn from(asset: BitgetMarginAsset) -> Self {
        AssetBalance::new(asset.coin, Wallet::BitgetMargin, asset.available, asset.frozen)
            .with_borrowed(asset.borrow + asset.interest)
    }
}
