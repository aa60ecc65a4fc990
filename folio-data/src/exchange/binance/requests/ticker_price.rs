use serde::Deserialize;
use std::borrow::Cow;

use crate::{
    model::price::PriceBook, protocols::http::rest_request::RestRequest, shared::de::de_str,
};

/*----- */
// Binance Ticker Price (all symbols)
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BinanceTickerPrice;

impl RestRequest for BinanceTickerPrice {
    type Response = Vec<BinanceTickerPriceResponse>;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v3/ticker/price")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn signed() -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
pub struct BinanceTickerPriceResponse {
    pub symbol: String,
    #[serde(deserialize_with = "de_str")]
    pub price: f64,
}

impl FromIterator<BinanceTickerPriceResponse> for PriceBook {
    fn from_iter<I: IntoIterator<Item = BinanceTickerPriceResponse>>(iter: I) -> Self {
        iter.into_iter()
            .map(|ticker| (ticker.symbol, ticker.price))
            .collect()
    }
}
