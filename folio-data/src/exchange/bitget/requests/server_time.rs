use serde::Deserialize;
use std::borrow::Cow;

use crate::{protocols::http::rest_request::RestRequest, shared::de::de_str};

use super::BitgetResponse;

/*----- */
// Bitget Server Time
/*----- */
#[derive(Debug, Default, Clone, Copy)]
pub struct BitgetServerTime;

impl RestRequest for BitgetServerTime {
    type Response = BitgetResponse<BitgetServerTimeData>;
    type QueryParams = ();
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/api/v2/public/time")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn signed() -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
pub struct BitgetServerTimeData {
    #[serde(alias = "serverTime", deserialize_with = "de_str")]
    pub server_time: i64,
}
