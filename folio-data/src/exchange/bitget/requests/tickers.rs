use serde::Deserialize;
use std::borrow::Cow;

use crate::{
    model::price::PriceBook, protocols::http::rest_request::RestRequest,
    shared::de::de_str_or_default,
};

use super::BitgetResponse;

/*----- */
// Bitget Spot Tickers (all symbols)
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BitgetSpotTickers;

impl RestRequest for BitgetSpotTickers {
    type Response = BitgetResponse<Vec<BitgetSpotTicker>>;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v2/spot/market/tickers")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn signed() -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
pub struct BitgetSpotTicker {
    pub symbol: String,
    #[serde(alias = "lastPr", default, deserialize_with = "de_str_or_default")]
    pub last_price: f64,
}

impl FromIterator<BitgetSpotTicker> for PriceBook {
    fn from_iter<I: IntoIterator<Item = BitgetSpotTicker>>(iter: I) -> Self {
        iter.into_iter()
            .map(|ticker| (ticker.symbol, ticker.last_price))
            .collect()
    }
}
