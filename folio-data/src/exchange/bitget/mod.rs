pub mod bitget_client;
pub mod request_builder;
pub mod requests;

use reqwest::StatusCode;

use crate::{error::ClientError, protocols::http::http_parser::HttpParser};

use self::requests::BitgetErrorResponse;

pub const BITGET_BASE_URLS: [&str; 1] = ["https://api.bitget.com"];

pub const BITGET_SUCCESS_CODE: &str = "00000";
// Request timestamp expired
pub const BITGET_TIMESTAMP_ERROR_CODE: &str = "40008";
// Invalid key, signature or passphrase
const BITGET_AUTH_ERROR_CODES: [&str; 4] = ["40006", "40009", "40012", "40037"];

/*----- */
// Bitget Http Parser
/*----- */
#[derive(Debug, Clone, Copy)]
pub struct BitgetParser;

impl HttpParser for BitgetParser {
    type ApiError = BitgetErrorResponse;

    fn parse_api_error(&self, status: StatusCode, error: Self::ApiError) -> ClientError {
        if status == StatusCode::UNAUTHORIZED || BITGET_AUTH_ERROR_CODES.contains(&error.code.as_str())
        {
            return ClientError::Unauthorised(error.msg);
        }

        ClientError::Api {
            exchange: "bitget",
            code: error.code,
            msg: error.msg,
        }
    }
}
