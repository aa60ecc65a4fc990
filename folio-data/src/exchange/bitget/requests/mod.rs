pub mod funding_assets;
pub mod futures_accounts;
pub mod margin_assets;
pub mod server_time;
pub mod spot_assets;
pub mod tickers;

use serde::Deserialize;

use crate::error::ClientError;

use super::BITGET_SUCCESS_CODE;

/*----- */
// Bitget Response Envelope
/*----- */
#[derive(Debug, Deserialize)]
pub struct BitgetResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(alias = "requestTime", default)]
    pub request_time: i64,
    pub data: T,
}

impl<T> BitgetResponse<T> {
    // A 200 can still carry a failure code, only "00000" yields data
    pub fn into_data(self) -> Result<T, ClientError> {
        if self.code == BITGET_SUCCESS_CODE {
            Ok(self.data)
        } else {
            Err(ClientError::Api {
                exchange: "bitget",
                code: self.code,
                msg: self.msg,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BitgetErrorResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
}
