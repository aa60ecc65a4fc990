pub mod futures_account;
pub mod margin_account;
pub mod open_orders;
pub mod server_time;
pub mod spot_account;
pub mod ticker_price;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BinanceErrorResponse {
    pub code: i64,
    pub msg: String,
}

/*----- */
// Tests
/*----- */
