use std::fmt::Debug;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::{header::HeaderMap, StatusCode};
use tracing::{debug, warn};

use crate::error::ClientError;

use super::{
    http_parser::HttpParser, request_builder::ExchangeRequestBuilder, rest_request::RestRequest,
};

/*----- */
// Retry Policy
/*----- */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
    // When false only rate limits start another attempt, an attempt that
    // fails on every endpoint for any other reason is final
    pub retry_transport: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
            retry_transport: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
            retry_transport: true,
        }
    }

    pub const fn rate_limits_only(self) -> Self {
        Self {
            retry_transport: false,
            ..self
        }
    }

    // Honour Retry-After only while it stays within a few backoffs, a long
    // ban is better surfaced to the caller than slept through
    pub fn delay(&self, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(retry_after) if retry_after <= self.backoff * 4 => retry_after,
            _ => self.backoff,
        }
    }
}

/*----- */
// Rest Client
/*----- */
#[derive(Debug)]
pub struct RestClient<Parser, RequestBuilder> {
    pub exchange: &'static str,
    pub http_client: reqwest::Client,
    pub direct_client: Option<reqwest::Client>,
    pub base_urls: Vec<String>,
    pub parser: Parser,
    pub request_builder: RequestBuilder,
    pub retry_policy: RetryPolicy,
}

impl<Parser, RequestBuilder> RestClient<Parser, RequestBuilder>
where
    RequestBuilder: ExchangeRequestBuilder,
{
    pub fn new<S>(
        exchange: &'static str,
        base_urls: impl IntoIterator<Item = S>,
        parser: Parser,
        request_builder: RequestBuilder,
    ) -> Self
    where
        S: Into<String>,
    {
        Self {
            exchange,
            http_client: reqwest::Client::new(),
            direct_client: None,
            base_urls: base_urls.into_iter().map(Into::into).collect(),
            parser,
            request_builder,
            retry_policy: RetryPolicy::default(),
        }
    }

    // Route requests through the proxy, keeping a direct client around for
    // the single no-proxy retry on HTTP 429
    pub fn with_proxy(mut self, proxy_url: Option<&str>) -> Result<Self, ClientError> {
        if let Some(proxy_url) = proxy_url {
            self.http_client = reqwest::Client::builder()
                .proxy(reqwest::Proxy::all(proxy_url)?)
                .build()?;
            self.direct_client = Some(reqwest::Client::builder().no_proxy().build()?);
        }
        Ok(self)
    }

    pub fn with_retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self {
            retry_policy,
            ..self
        }
    }

    pub async fn execute<Request>(&self, request: Request) -> Result<Request::Response, ClientError>
    where
        Request: RestRequest,
        Parser: HttpParser,
    {
        let mut last_error = None;

        for attempt in 0..=self.retry_policy.max_retries {
            let mut rate_limited = false;
            let mut retry_after = None;

            for base_url in &self.base_urls {
                match self.send(base_url, &request).await {
                    Ok((status, payload)) => {
                        return self.parser.parse::<Request::Response>(status, &payload)
                    }
                    Err(ClientError::RateLimited {
                        base_url,
                        retry_after: after,
                    }) => {
                        warn!(
                            exchange = self.exchange,
                            %base_url,
                            attempt,
                            path = %request.path(),
                            "rate limited"
                        );
                        rate_limited = true;
                        retry_after = after;
                        last_error = Some(ClientError::RateLimited {
                            base_url,
                            retry_after: after,
                        });
                        break;
                    }
                    Err(error) if error.is_transport() => {
                        warn!(
                            exchange = self.exchange,
                            %base_url,
                            attempt,
                            path = %request.path(),
                            %error,
                            "request failed, trying next endpoint"
                        );
                        last_error = Some(error);
                    }
                    Err(error) => return Err(error),
                }
            }

            if !rate_limited && !self.retry_policy.retry_transport {
                break;
            }

            if attempt < self.retry_policy.max_retries {
                tokio::time::sleep(self.retry_policy.delay(retry_after)).await;
            }
        }

        Err(last_error.unwrap_or(ClientError::NoBaseUrl(self.exchange)))
    }

    async fn send<Request>(
        &self,
        base_url: &str,
        request: &Request,
    ) -> Result<(StatusCode, Bytes), ClientError>
    where
        Request: RestRequest,
    {
        let response = self.dispatch(&self.http_client, base_url, request).await?;

        if is_rate_limit(response.status()) {
            if let Some(direct_client) = &self.direct_client {
                warn!(
                    exchange = self.exchange,
                    base_url,
                    "rate limited through proxy, retrying once without it"
                );
                let response = self.dispatch(direct_client, base_url, request).await?;
                return read_response(base_url, response).await;
            }
        }

        read_response(base_url, response).await
    }

    // Signs on every call so a retried request always carries a fresh timestamp
    async fn dispatch<Request>(
        &self,
        http_client: &reqwest::Client,
        base_url: &str,
        request: &Request,
    ) -> Result<reqwest::Response, ClientError>
    where
        Request: RestRequest,
    {
        let url = format!("{}{}", base_url, request.path());
        let builder = http_client
            .request(Request::method(), url)
            .timeout(Request::timeout());
        let request = self.request_builder.build_signed_request(builder, request)?;

        let start = Instant::now();
        let response = http_client.execute(request).await?;

        debug!(
            exchange = self.exchange,
            base_url,
            status_code = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "http_request_duration"
        );

        Ok(response)
    }
}

/*----- */
// Response checks
/*----- */
// Binance answers 418 once an IP keeps going after 429s
fn is_rate_limit(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

pub fn check_status(
    base_url: &str,
    status: StatusCode,
    headers: &HeaderMap,
) -> Result<(), ClientError> {
    if is_rate_limit(status) {
        return Err(ClientError::RateLimited {
            base_url: base_url.to_string(),
            retry_after: retry_after(headers),
        });
    }
    Ok(())
}

async fn read_response(
    base_url: &str,
    response: reqwest::Response,
) -> Result<(StatusCode, Bytes), ClientError> {
    let status = response.status();
    check_status(base_url, status, response.headers())?;

    let payload = response.bytes().await?;
    if status.is_server_error() {
        return Err(ClientError::HttpResponse(
            status,
            String::from_utf8_lossy(&payload).into_owned(),
        ));
    }

    Ok((status, payload))
}
