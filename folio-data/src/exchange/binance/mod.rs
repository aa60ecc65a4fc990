pub mod binance_client;
pub mod request_builder;
pub mod requests;

use reqwest::StatusCode;

use crate::{error::ClientError, protocols::http::http_parser::HttpParser};

use self::requests::BinanceErrorResponse;

pub const BINANCE_SPOT_BASE_URLS: [&str; 2] =
    ["https://api.binance.com", "https://api-gcp.binance.com"];
pub const BINANCE_FUTURES_BASE_URLS: [&str; 1] = ["https://fapi.binance.com"];

// Timestamp for this request is outside of the recvWindow
pub const BINANCE_TIMESTAMP_ERROR_CODE: &str = "-1021";

/*----- */
// Binance Http Parser
/*----- */
#[derive(Debug, Clone, Copy)]
pub struct BinanceParser;

impl HttpParser for BinanceParser {
    type ApiError = BinanceErrorResponse;

    fn parse_api_error(&self, status: StatusCode, error: Self::ApiError) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorised(error.msg),
            // -2014 / -2015: bad api key format, invalid key, ip or permissions
            _ if matches!(error.code, -2014 | -2015) => ClientError::Unauthorised(error.msg),
            _ => ClientError::Api {
                exchange: "binance",
                code: error.code.to_string(),
                msg: error.msg,
            },
        }
    }
}
