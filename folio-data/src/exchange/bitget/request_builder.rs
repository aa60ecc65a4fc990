use base64::Engine;
use hmac::Mac;
use std::{fmt, sync::Arc};

use crate::{
    error::ClientError,
    exchange::HmacSha256,
    protocols::http::{
        clock::ServerClock,
        request_builder::{encode_body, encode_query, Authenticator, ExchangeRequestBuilder},
        rest_request::RestRequest,
    },
};

/*----- */
// Bitget API Authentication
/*----- */
#[derive(Clone)]
pub struct BitgetAuthParams {
    key: String,
    secret: String,
    passphrase: String,
}

impl BitgetAuthParams {
    pub fn new<S>(key: S, secret: S, passphrase: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl fmt::Debug for BitgetAuthParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitgetAuthParams")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("passphrase", &"***")
            .finish()
    }
}

impl Authenticator for BitgetAuthParams {
    fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    fn generate_signature(&self, request_str: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC can take key of any size"));
        mac.update(request_str.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }
}

/*----- */
// Bitget Sign Payload
/*----- */
#[derive(Debug)]
pub struct BitgetSignPayload<'a> {
    pub timestamp: i64,
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub body: &'a str,
}

impl BitgetSignPayload<'_> {
    // timestamp + METHOD + requestPath + ("?" + queryString) + body
    pub fn prehash(&self) -> String {
        let mut prehash = format!("{}{}{}", self.timestamp, self.method, self.path);
        if !self.query.is_empty() {
            prehash.push('?');
            prehash.push_str(self.query);
        }
        prehash.push_str(self.body);
        prehash
    }
}

/*----- */
// Impl ExchangeRequestBuilder for Bitget
/*----- */
#[derive(Debug, Clone)]
pub struct BitgetRequestBuilder {
    pub auth: BitgetAuthParams,
    pub clock: Arc<ServerClock>,
}

impl BitgetRequestBuilder {
    pub fn new(auth: BitgetAuthParams, clock: Arc<ServerClock>) -> Self {
        Self { auth, clock }
    }
}

impl ExchangeRequestBuilder for BitgetRequestBuilder {
    #[inline]
    fn build_signed_request<Request>(
        &self,
        builder: reqwest::RequestBuilder,
        request: &Request,
    ) -> Result<reqwest::Request, ClientError>
    where
        Request: RestRequest,
    {
        let query = encode_query(request)?;
        let body = encode_body(request)?;

        let mut builder = builder
            .header("Content-Type", "application/json")
            .header("locale", "en-US");

        if Request::signed() {
            let timestamp = self.clock.now_ms();
            let path = request.path();
            let signature = self.auth.generate_signature(
                &BitgetSignPayload {
                    timestamp,
                    method: Request::method().as_str(),
                    path: path.as_ref(),
                    query: &query,
                    body: &body,
                }
                .prehash(),
            );

            builder = builder
                .header("ACCESS-KEY", self.auth.key())
                .header("ACCESS-SIGN", signature)
                .header("ACCESS-TIMESTAMP", timestamp.to_string())
                .header("ACCESS-PASSPHRASE", self.auth.passphrase());
        }

        if !body.is_empty() {
            builder = builder.body(body);
        }

        let mut request = builder.build()?;
        if !query.is_empty() {
            request.url_mut().set_query(Some(&query));
        }
        Ok(request)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Serialize;
    use std::borrow::Cow;

    #[test]
    fn test_prehash_layout() {
        let payload = BitgetSignPayload {
            timestamp: 16273667805456,
            method: "GET",
            path: "/api/v2/mix/account/accounts",
            query: "productType=USDT-FUTURES",
            body: "",
        };
        assert_eq!(
            payload.prehash(),
            "16273667805456GET/api/v2/mix/account/accounts?productType=USDT-FUTURES"
        );

        let payload = BitgetSignPayload {
            timestamp: 1,
            method: "POST",
            path: "/api/v2/spot/trade/place-order",
            query: "",
            body: r#"{"symbol":"BTCUSDT"}"#,
        };
        assert_eq!(
            payload.prehash(),
            r#"1POST/api/v2/spot/trade/place-order{"symbol":"BTCUSDT"}"#
        );
    }

    #[test]
    fn test_signature_is_base64_hmac() {
        let auth = BitgetAuthParams::new("key", "secret", "pass");
        let signature = auth.generate_signature("1GET/api/v2/public/time");

        let raw = base64::engine::general_purpose::STANDARD
            .decode(&signature)
            .unwrap();
        assert_eq!(raw.len(), 32);
        assert_eq!(signature, auth.generate_signature("1GET/api/v2/public/time"));
        assert_ne!(signature, auth.generate_signature("2GET/api/v2/public/time"));
    }

    #[derive(Debug, Serialize)]
    struct ProductQuery {
        #[serde(rename = "productType")]
        product_type: &'static str,
    }

    #[derive(Debug)]
    struct Accounts(ProductQuery);

    impl RestRequest for Accounts {
        type Response = serde_json::Value;
        type QueryParams = ProductQuery;
        type Body = ();

        fn path(&self) -> Cow<'static, str> {
            Cow::Borrowed("/api/v2/mix/account/accounts")
        }

        fn method() -> reqwest::Method {
            reqwest::Method::GET
        }

        fn query_params(&self) -> Option<&ProductQuery> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_build_signed_request_headers() {
        let clock = Arc::new(ServerClock::new());
        let builder = BitgetRequestBuilder::new(BitgetAuthParams::new("key", "secret", "pass"), clock);
        let request = builder
            .build_signed_request(
                reqwest::Client::new().get("https://api.bitget.com/api/v2/mix/account/accounts"),
                &Accounts(ProductQuery {
                    product_type: "USDT-FUTURES",
                }),
            )
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers["ACCESS-KEY"], "key");
        assert_eq!(headers["ACCESS-PASSPHRASE"], "pass");
        assert_eq!(headers["locale"], "en-US");
        assert_eq!(request.url().query(), Some("productType=USDT-FUTURES"));

        // Signature must cover exactly the timestamp that was sent
        let timestamp = headers["ACCESS-TIMESTAMP"]
            .to_str()
            .unwrap()
            .parse::<i64>()
            .unwrap();
        let expected = builder.auth.generate_signature(
            &BitgetSignPayload {
                timestamp,
                method: "GET",
                path: "/api/v2/mix/account/accounts",
                query: "productType=USDT-FUTURES",
                body: "",
            }
            .prehash(),
        );
        assert_eq!(headers["ACCESS-SIGN"], expected.as_str());
    }
}
