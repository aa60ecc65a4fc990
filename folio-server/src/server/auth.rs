use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use folio_data::exchange::HmacSha256;
use futures::future::{ready, Ready};
use hmac::Mac;

use super::{error::ServerError, AppState};

pub const API_KEY_HEADER: &str = "X-API-KEY";

/*----- */
// Api Key guard
/*----- */
// Extracting this in a handler makes the route require X-API-KEY whenever
// the server has an api key configured
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequest for ApiKey {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authorise(request))
    }
}

fn authorise(request: &HttpRequest) -> Result<ApiKey, ServerError> {
    let expected = request
        .app_data::<Data<AppState>>()
        .and_then(|state| state.api_key.as_deref());

    let Some(expected) = expected else {
        return Ok(ApiKey);
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(provided) if keys_match(provided, expected) => Ok(ApiKey),
        _ => Err(ServerError::Unauthorised),
    }
}

// Both keys are MACed under the expected key and the tags compared in
// constant time, so neither content nor length leaks through timing
fn keys_match(provided: &str, expected: &str) -> bool {
    let Ok(mut expected_mac) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    let mut provided_mac = expected_mac.clone();

    expected_mac.update(expected.as_bytes());
    provided_mac.update(provided.as_bytes());

    provided_mac
        .verify_slice(&expected_mac.finalize().into_bytes())
        .is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("Secret", "secret"));
        assert!(!keys_match("secre", "secret"));
        assert!(!keys_match("secret-and-more", "secret"));
        assert!(!keys_match("", "secret"));
    }
}
