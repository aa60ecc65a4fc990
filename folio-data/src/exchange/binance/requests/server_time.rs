use serde::Deserialize;
use std::borrow::Cow;

use crate::protocols::http::rest_request::RestRequest;

/*----- */
// Binance Server Time
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BinanceServerTime;

impl RestRequest for BinanceServerTime {
    type Response = BinanceServerTimeResponse;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v3/time")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn signed() -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
pub struct BinanceServerTimeResponse {
    #[serde(alias = "serverTime")]
    pub server_time: i64,
}
