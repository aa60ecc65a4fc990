use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{
    protocols::http::rest_request::RestRequest,
    shared::de::{de_str, de_u64_epoch_ms_as_datetime_utc},
};

/*----- */
// Binance USD-M Futures Open Orders
/*----- */
#[derive(Debug, Default, Clone, Serialize)]
pub struct BinanceFuturesOpenOrders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl RestRequest for BinanceFuturesOpenOrders {
    type Response = Vec<BinanceFuturesOrder>;
    type QueryParams = Self;
    type Body = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("/fapi/v1/openOrders")
    }

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn query_params(&self) -> Option<&Self> {
        Some(self)
    }
}

/*----- */
// Binance USD-M Futures Open Orders - Response
/*----- */
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BinanceFuturesOrder {
    pub symbol: String,
    #[serde(alias = "orderId")]
    pub order_id: u64,
    #[serde(alias = "clientOrderId")]
    pub client_order_id: String,
    #[serde(deserialize_with = "de_str")]
    pub price: f64,
    #[serde(alias = "origQty", deserialize_with = "de_str")]
    pub orig_qty: f64,
    #[serde(alias = "executedQty", deserialize_with = "de_str")]
    pub executed_qty: f64,
    #[serde(alias = "stopPrice", deserialize_with = "de_str")]
    pub stop_price: f64,
    pub status: String,
    #[serde(alias = "type")]
    pub order_type: String,
    pub side: String,
    #[serde(alias = "positionSide", default)]
    pub position_side: String,
    #[serde(alias = "reduceOnly", default)]
    pub reduce_only: bool,
    #[serde(deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
    pub time: DateTime<Utc>,
    #[serde(alias = "updateTime", deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
    pub update_time: DateTime<Utc>,
}
