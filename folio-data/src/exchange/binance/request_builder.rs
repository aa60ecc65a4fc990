use hmac::Mac;
use std::{fmt, sync::Arc};

use crate::{
    error::ClientError,
    exchange::{HmacSha256, MAX_RECV_WINDOW_MS},
    protocols::http::{
        clock::ServerClock,
        request_builder::{encode_query, Authenticator, ExchangeRequestBuilder},
        rest_request::RestRequest,
    },
};

/*----- */
// Binance API Authentication
/*----- */
#[derive(Clone)]
pub struct BinanceAuthParams {
    key: String,
    secret: String,
}

impl BinanceAuthParams {
    pub fn new<S>(key: S, secret: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

// Keep the secret out of logs
impl fmt::Debug for BinanceAuthParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceAuthParams")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}

impl Authenticator for BinanceAuthParams {
    fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    fn generate_signature(&self, request_str: &str) -> String {
        // HMAC accepts keys of any length, new_from_slice cannot fail for it
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC can take key of any size"));
        mac.update(request_str.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/*----- */
// Impl ExchangeRequestBuilder for Binance
/*----- */
#[derive(Debug, Clone)]
pub struct BinanceRequestBuilder {
    pub auth: BinanceAuthParams,
    pub clock: Arc<ServerClock>,
    pub recv_window_ms: u64,
}

impl BinanceRequestBuilder {
    pub fn new(auth: BinanceAuthParams, clock: Arc<ServerClock>, recv_window_ms: u64) -> Self {
        Self {
            auth,
            clock,
            recv_window_ms: recv_window_ms.clamp(1, MAX_RECV_WINDOW_MS),
        }
    }

    // params first, then timestamp and recvWindow, signature always last
    pub fn signed_query(&self, params: &str, timestamp: i64) -> String {
        let mut query = String::with_capacity(params.len() + 128);
        if !params.is_empty() {
            query.push_str(params);
            query.push('&');
        }
        query.push_str(&format!(
            "timestamp={}&recvWindow={}",
            timestamp, self.recv_window_ms
        ));

        let signature = self.auth.generate_signature(&query);
        query.push_str("&signature=");
        query.push_str(&signature);
        query
    }
}

impl ExchangeRequestBuilder for BinanceRequestBuilder {
    #[inline]
    fn build_signed_request<Request>(
        &self,
        mut builder: reqwest::RequestBuilder,
        request: &Request,
    ) -> Result<reqwest::Request, ClientError>
    where
        Request: RestRequest,
    {
        if !Request::signed() {
            if let Some(query_params) = request.query_params() {
                builder = builder.query(query_params);
            }
            return Ok(builder.build()?);
        }

        let query = self.signed_query(&encode_query(request)?, self.clock.now_ms());
        let mut request = builder.header("X-MBX-APIKEY", self.auth.key()).build()?;
        request.url_mut().set_query(Some(&query));
        Ok(request)
    }
}
