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
    request_builder::{BitgetAuthParams, BitgetRequestBuilder},
    requests::{
        funding_assets::BitgetFundingAssets, futures_accounts::BitgetFuturesAccounts,
        margin_assets::BitgetCrossMarginAssets, server_time::BitgetServerTime,
        spot_assets::BitgetSpotAssets, tickers::BitgetSpotTickers, BitgetResponse,
    },
    BitgetParser, BITGET_BASE_URLS, BITGET_TIMESTAMP_ERROR_CODE,
};

/*----- */
// Convinent types
/*----- */
type BitgetRestClient = RestClient<BitgetParser, BitgetRequestBuilder>;

/*----- */
// Bitget Client
/*----- */
#[derive(Debug)]
pub struct BitgetClient {
    pub http_client: BitgetRestClient,
    pub clock: Arc<ServerClock>,
}

impl BitgetClient {
    pub fn new(auth: BitgetAuthParams, options: &ClientOptions) -> Result<Self, ClientError> {
        Self::with_base_urls(auth, options, BITGET_BASE_URLS)
    }

    pub fn with_base_urls<S>(
        auth: BitgetAuthParams,
        options: &ClientOptions,
        base_urls: impl IntoIterator<Item = S>,
    ) -> Result<Self, ClientError>
    where
        S: Into<String>,
    {
        let clock = Arc::new(ServerClock::new());
        let http_client = RestClient::new(
            ExchangeId::Bitget.as_str(),
            base_urls,
            BitgetParser,
            BitgetRequestBuilder::new(auth, clock.clone()),
        )
        .with_proxy(options.proxy_url.as_deref())?
        .with_retry_policy(options.retry_policy);

        Ok(Self { http_client, clock })
    }

    // Unwraps the envelope, re-syncing the clock once on an expired timestamp
    async fn execute<Request, Data>(&self, request: Request) -> Result<Data, ClientError>
    where
        Request: RestRequest<Response = BitgetResponse<Data>> + Clone,
    {
        let result = self
            .http_client
            .execute(request.clone())
            .await
            .and_then(BitgetResponse::into_data);

        match result {
            Err(error) if error.api_code() == Some(BITGET_TIMESTAMP_ERROR_CODE) => {
                warn!(%error, "bitget rejected timestamp, re-syncing server time");
                self.sync_server_time().await?;
                self.http_client
                    .execute(request)
                    .await
                    .and_then(BitgetResponse::into_data)
            }
            result => result,
        }
    }

    pub async fn sync_server_time(&self) -> Result<i64, ClientError> {
        let sent_at = Utc::now().timestamp_millis();
        let response = self
            .http_client
            .execute(BitgetServerTime)
            .await?
            .into_data()?;
        let received_at = Utc::now().timestamp_millis();

        let offset = self
            .clock
            .sync(response.server_time, sent_at, received_at);
        info!(exchange = "bitget", offset_ms = offset, "server time synced");
        Ok(offset)
    }

    pub async fn spot_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let assets = self.execute(BitgetSpotAssets::default()).await?;
        Ok(non_empty(assets))
    }

    pub async fn margin_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let assets = self.execute(BitgetCrossMarginAssets).await?;
        Ok(non_empty(assets))
    }

    pub async fn futures_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let accounts = self.execute(BitgetFuturesAccounts::default()).await?;
        Ok(non_empty(accounts))
    }

    pub async fn p2p_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let assets = self.execute(BitgetFundingAssets).await?;
        Ok(non_empty(assets))
    }

    pub async fn prices(&self) -> Result<PriceBook, ClientError> {
        let tickers = self.execute(BitgetSpotTickers).await?;
        Ok(tickers.into_iter().collect())
    }
}

fn non_empty<T>(rows: Vec<T>) -> Vec<AssetBalance>
where
    AssetBalance: From<T>,
{
    rows.into_iter()
        .map(AssetBalance::from)
        .filter(|balance| !balance.is_empty())
        .collect()
}

/*----- */
// Impl BalanceSource for Bitget
/*----- */
#[async_trait]
impl BalanceSource for BitgetClient {
    const EXCHANGE: ExchangeId = ExchangeId::Bitget;

    async fn sync_server_time(&self) -> Result<i64, ClientError> {
        BitgetClient::sync_server_time(self).await
    }

    async fn all_balances(&self) -> Result<Vec<AssetBalance>, ClientError> {
        let (spot, margin, futures, p2p) = tokio::try_join!(
            self.spot_balances(),
            self.margin_balances(),
            self.futures_balances(),
            self.p2p_balances()
        )?;

        Ok(spot
            .into_iter()
            .chain(margin)
            .chain(futures)
            .chain(p2p)
            .collect())
    }

    async fn prices(&self) -> Result<PriceBook, ClientError> {
        BitgetClient::prices(self).await
    }
}
