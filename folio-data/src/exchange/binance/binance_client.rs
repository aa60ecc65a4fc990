use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::ClientError,
    exchange::{BalanceSource, ClientOptions, ExchangeId},
    model::{balance::AssetBalance, price::PriceBook},
    protocols::http::{client::RestClient, clock::ServerClock, rest_request::RestRequest},
};

use super::{
    request_builder::{BinanceAuthParams, BinanceRequestBuilder},
    requests::{
        futures_account::BinanceFuturesAccount,
        margin_account::BinanceMarginAccount,
        open_orders::{BinanceFuturesOpenOrders, BinanceFuturesOrder},
        server_time::BinanceServerTime,
        spot_account::BinanceSpotAccount,
        ticker_price::BinanceTickerPrice,
    },
    BinanceParser, BINANCE_FUTURES_BASE_URLS, BINANCE_SPOT_BASE_URLS,
    BINANCE_TIMESTAMP_ERROR_CODE,
};

/*----- */
// Convinent types
/*----- */
type BinanceRestClient = RestClient<BinanceParser, BinanceRequestBuilder>;

/*----- */
// Binance Client
/*----- */
#[derive(Debug)]
pub struct BinanceClient {
    pub spot_client: BinanceRestClient,
    pub futures_client: BinanceRestClient,
    pub clock: Arc<ServerClock>,
}

impl BinanceClient {
    pub fn new(auth: BinanceAuthParams, options: &ClientOptions) -> Result<Self, ClientError> {
        Self::with_base_urls(
            auth,
            options,
            BINANCE_SPOT_BASE_URLS,
            BINANCE_FUTURES_BASE_URLS,
        )
    }

    pub fn with_base_urls<S, F>(
        auth: BinanceAuthParams,
        options: &ClientOptions,
        spot_base_urls: impl IntoIterator<Item = S>,
        futures_base_urls: impl IntoIterator<Item = F>,
    ) -> Result<Self, ClientError>
    where
        S: Into<String>,
        F: Into<String>,
    {
        let clock = Arc::new(ServerClock::new());
        let request_builder =
            BinanceRequestBuilder::new(auth, clock.clone(), options.recv_window_ms);

        let spot_client = RestClient::new(
            ExchangeId::Binance.as_str(),
            spot_base_urls,
            BinanceParser,
            request_builder.clone(),
        )
        .with_proxy(options.proxy_url.as_deref())?
        .with_retry_policy(options.retry_policy);

        let futures_client = RestClient::new(
            ExchangeId::Binance.as_str(),
            futures_base_urls,
            BinanceParser,
            request_builder,
        )
        .with_proxy(options.proxy_url.as_deref())?
        .with_retry_policy(options.retry_policy);

        Ok(Self {
            spot_client,
            futures_client,
            clock,
        })
    }

    // A stale clock shows up as -1021, re-sync once and replay the request
    async fn execute_synced<Request>(
        &self,
        http_client: &BinanceRestClient,
        request: Request,
    ) -> Result<Request::Response, ClientError>
    where
        Request: RestRequest + Clone,
    {
        match http_client.execute(request.clone()).await {
            Err(error) if error.api_code() == Some(BINANCE_TIMESTAMP_ERROR_CODE) => {
                warn!(%error, "binance rejected timestamp, re-syncing server time");
                self.sync_server_time().await?;
                http_client.execute(request).await
            }
            result => result,
        }
    }

    pub async fn sync_server_time(&self) -> Result<i64, ClientError> {
        let sent_at = Utc::now().timestamp_millis();
        let response = self.spot_client.execute(BinanceServerTime).await?;
        let received_at = Utc::now().timestamp_millis();

        let offset = self
            .clock
            .sync(response.server_time, sent_at, received_at);
        info!(exchange = "binance", offset_ms = offset, "server time synced");
        Ok(offset)
    }

    #[inline]
    pub async fn spot_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let response = self
            .execute_synced(&self.spot_client, BinanceSpotAccount::default())
            .await?;
        Ok(Vec::<AssetBalance>::from(response))
    }

    #[inline]
    pub async fn margin_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let response = self
            .execute_synced(&self.spot_client, BinanceMarginAccount)
            .await?;
        Ok(Vec::<AssetBalance>::from(response))
    }

    #[inline]
    pub async fn futures_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let response = self
            .execute_synced(&self.futures_client, BinanceFuturesAccount)
            .await?;
        Ok(Vec::<AssetBalance>::from(response))
    }

    #[inline]
    pub async fn open_futures_orders(&self) -> Result<Vec<BinanceFuturesOrder>, ClientError> {
        self.execute_synced(&self.futures_client, BinanceFuturesOpenOrders::default())
            .await
    }

    pub async fn prices(&self) -> Result<PriceBook, ClientError> {
        let tickers = self.spot_client.execute(BinanceTickerPrice).await?;
        Ok(tickers.into_iter().collect())
    }
}

/*----- */
// Impl BalanceSource for Binance
/*----- */
#[async_trait]
impl BalanceSource for BinanceClient {
    const EXCHANGE: ExchangeId = ExchangeId::Binance;

    async fn sync_server_time(&self) -> Result<i64, ClientError> {
        BinanceClient::sync_server_time(self).await
    }

    async fn all_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let (spot, margin, futures) = tokio::try_join!(
            self.spot_balances(),
            self.margin_balances(),
            self.futures_balances()
        )?;

        Ok(spot.into_iter().chain(margin).chain(futures).collect())
    }

    async fn prices(&self) -> Result<PriceBook, ClientError> {
        BinanceClient::prices(self).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        mock_server::{MockResponse, MockServer, RecordedRequest},
        protocols::http::client::RetryPolicy,
    };
    use serde_json::json;
    use std::time::Duration;

    fn local_client(spot: &MockServer, futures: &MockServer) -> BinanceClient {
        BinanceClient::with_base_urls(
            BinanceAuthParams::new("key", "secret"),
            &options(),
            [spot.base_url.clone()],
            [futures.base_url.clone()],
        )
        .unwrap()
    }

    fn timestamp(request: &RecordedRequest) -> i64 {
        request.query_param("timestamp").unwrap().parse().unwrap()
    }

    fn options() -> ClientOptions {
        ClientOptions {
            proxy_url: None,
            retry_policy: RetryPolicy::new(0, Duration::from_millis(1)),
            recv_window_ms: 5_000,
        }
    }

    #[test]
    fn test_clients_share_clock() {
        let client = BinanceClient::new(BinanceAuthParams::new("key", "secret"), &options()).unwrap();

        client.clock.sync(10_000, 0, 0);
        assert_eq!(client.spot_client.request_builder.clock.offset_ms(), 10_000);
        assert_eq!(
            client.futures_client.request_builder.clock.offset_ms(),
            10_000
        );
        assert_eq!(client.spot_client.base_urls.len(), 2);
        assert_eq!(client.futures_client.base_urls.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_exchange_surfaces_transport_error() {
        let client = BinanceClient::with_base_urls(
            BinanceAuthParams::new("key", "secret"),
            &options(),
            ["http://127.0.0.1:9"],
            ["http://127.0.0.1:9"],
        )
        .unwrap();

        let error = client.spot_balances().await.unwrap_err();
        assert!(error.is_transport());
    }

    #[tokio::test]
    async fn test_timestamp_error_resyncs_and_replays_once() {
        let server = MockServer::start(|request, seen| match request.path() {
            "/api/v3/time" => MockResponse::ok(json!({ "serverTime": 1_000_000 })),
            "/api/v3/account" if seen == 0 => MockResponse::json(
                400,
                json!({
                    "code": -1021,
                    "msg": "Timestamp for this request is outside of the recvWindow."
                }),
            ),
            "/api/v3/account" => MockResponse::ok(json!({
                "balances": [{ "asset": "BTC", "free": "0.5", "locked": "0.1" }]
            })),
            _ => MockResponse::status(404),
        })
        .await;
        let client = local_client(&server, &server);

        let balances = client.spot_balances().await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "BTC");
        assert_eq!(server.hits("/api/v3/time"), 1);
        assert_eq!(server.hits("/api/v3/account"), 2);

        let sent = server
            .requests()
            .into_iter()
            .filter(|request| request.path() == "/api/v3/account")
            .collect::<Vec<_>>();
        assert!(sent.iter().all(|request| request.header("X-MBX-APIKEY") == Some("key")));
        // The replay is signed against the re-synced clock
        assert!(timestamp(&sent[1]) < timestamp(&sent[0]));
        assert!(timestamp(&sent[1]) < 2_000_000);
        assert_ne!(
            sent[0].query_param("signature"),
            sent[1].query_param("signature")
        );
    }

    #[tokio::test]
    async fn test_persistent_timestamp_error_is_not_replayed_twice() {
        let server = MockServer::start(|request, _| match request.path() {
            "/api/v3/time" => MockResponse::ok(json!({ "serverTime": 1_000_000 })),
            _ => MockResponse::json(400, json!({ "code": -1021, "msg": "outside recvWindow" })),
        })
        .await;
        let client = local_client(&server, &server);

        let error = client.margin_balances().await.unwrap_err();
        assert_eq!(error.api_code(), Some(BINANCE_TIMESTAMP_ERROR_CODE));
        assert_eq!(server.hits("/sapi/v1/margin/account"), 2);
        assert_eq!(server.hits("/api/v3/time"), 1);
    }

    #[tokio::test]
    async fn test_spot_fails_over_to_second_endpoint() {
        let failing = MockServer::always(MockResponse::status(502)).await;
        let healthy = MockServer::always(MockResponse::ok(json!({
            "balances": [{ "asset": "ETH", "free": "2", "locked": "0" }]
        })))
        .await;
        let client = BinanceClient::with_base_urls(
            BinanceAuthParams::new("key", "secret"),
            &options(),
            [failing.base_url.clone(), healthy.base_url.clone()],
            [healthy.base_url.clone()],
        )
        .unwrap();

        let balances = client.spot_balances().await.unwrap();
        assert_eq!(balances[0].asset, "ETH");

        // Both endpoints received a signed query of their own
        for server in [&failing, &healthy] {
            let requests = server.requests();
            assert_eq!(requests.len(), 1);
            assert!(requests[0].query_param("signature").is_some());
        }
    }
}
