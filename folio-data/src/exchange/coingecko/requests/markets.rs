use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{model::market::TopAsset, protocols::http::rest_request::RestRequest};

/*----- */
// CoinGecko Coins Markets
/*----- */
#[derive(Debug, Clone, Serialize)]
pub struct CoinGeckoMarkets {
    pub vs_currency: &'static str,
    pub order: &'static str,
    pub per_page: u32,
    pub page: u32,
}

impl CoinGeckoMarkets {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            vs_currency: "usd",
            order: "market_cap_desc",
            per_page,
            page,
        }
    }
}

impl RestRequest for CoinGeckoMarkets {
    type Response = Vec<CoinGeckoMarket>;
    type QueryParams = Self;
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/coins/markets")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn query_params(&self) -> Option<&Self> {
        Some(self)
    }

    fn signed() -> bool {
        false
    }
}

/*----- */
// CoinGecko Coins Markets - Response
/*----- */
#[derive(Debug, Clone, Deserialize)]
pub struct CoinGeckoMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

impl From<CoinGeckoMarket> for TopAsset {
    fn from(market: CoinGeckoMarket) -> Self {
        Self {
            name: market.name,
            symbol: market.symbol.to_uppercase(),
            price: market.current_price,
            market_cap: market.market_cap,
            change_24h: market.price_change_percentage_24h,
            image: market.image,
        }
    }
}
