use crate::error::ClientError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::error;

pub trait HttpParser {
    type ApiError: DeserializeOwned;

    fn parse<Response>(&self, status: StatusCode, payload: &[u8]) -> Result<Response, ClientError>
    where
        Response: DeserializeOwned,
    {
        // Error statuses go straight to the API error shape, some endpoints
        // return bodies that would otherwise happily deserialise into Response
        let parse_ok_error = if status.is_success() {
            match serde_json::from_slice::<Response>(payload) {
                Ok(response) => return Ok(response),
                Err(serde_error) => Some(serde_error),
            }
        } else {
            None
        };

        // Attempt to deserialise API Error if Ok(Response) deserialisation failed
        let parse_api_error_error = match serde_json::from_slice::<Self::ApiError>(payload) {
            Ok(api_error) => return Err(self.parse_api_error(status, api_error)),
            Err(serde_error) => serde_error,
        };

        match parse_ok_error {
            Some(parse_ok_error) => {
                error!(
                    status_code = ?status,
                    ?parse_ok_error,
                    ?parse_api_error_error,
                    response_body = %String::from_utf8_lossy(payload),
                    "error deserializing HTTP response"
                );

                Err(ClientError::DeserialiseBinary {
                    error: parse_ok_error,
                    payload: payload.to_vec(),
                })
            }
            None => Err(ClientError::HttpResponse(
                status,
                String::from_utf8_lossy(payload).into_owned(),
            )),
        }
    }

    // If [`parse`](Self::parse) fails to deserialise the `Ok(Response)`, this function
    // maps the API [`Self::ApiError`] associated with the response.
    fn parse_api_error(&self, status: StatusCode, error: Self::ApiError) -> ClientError;
}

#[derive(Debug, Clone, Copy)]
pub struct StandardHttpParser;

impl HttpParser for StandardHttpParser {
    type ApiError = serde_json::Value;

    fn parse_api_error(&self, status: StatusCode, api_error: Self::ApiError) -> ClientError {
        let error = api_error.to_string();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorised(error),
            _ => ClientError::HttpResponse(status, error),
        }
    }
}
