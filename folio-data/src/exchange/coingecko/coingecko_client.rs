use std::time::Duration;

use tracing::{info, warn};

use crate::{
    error::ClientError,
    model::market::{TopAsset, TopAssetsSnapshot},
    protocols::http::{
        client::{RestClient, RetryPolicy},
        http_parser::StandardHttpParser,
        request_builder::PublicRequestBuilder,
    },
};

use super::{
    requests::markets::CoinGeckoMarkets, COINGECKO_API_KEY_HEADER, COINGECKO_BASE_URL,
    COINGECKO_MAX_PER_PAGE,
};

/*----- */
// Convinent types
/*----- */
type CoinGeckoRestClient = RestClient<StandardHttpParser, PublicRequestBuilder>;

// Free tier allows a handful of calls per minute, so wait the full minute out.
// Any other failure skips the page instead of costing another minute.
pub const COINGECKO_RETRY_POLICY: RetryPolicy = RetryPolicy {
    max_retries: 2,
    backoff: Duration::from_secs(60),
    retry_transport: false,
};

/*----- */
// CoinGecko Client
/*----- */
#[derive(Debug)]
pub struct CoinGeckoClient {
    pub http_client: CoinGeckoRestClient,
}

impl CoinGeckoClient {
    pub fn new(api_key: Option<&str>, proxy_url: Option<&str>) -> Result<Self, ClientError> {
        Self::with_base_url(COINGECKO_BASE_URL, api_key, proxy_url)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: Option<&str>,
        proxy_url: Option<&str>,
    ) -> Result<Self, ClientError> {
        let request_builder = match api_key {
            Some(api_key) => PublicRequestBuilder::new().with_header(COINGECKO_API_KEY_HEADER, api_key),
            None => PublicRequestBuilder::new(),
        };

        let http_client = RestClient::new(
            "coingecko",
            [base_url.into()],
            StandardHttpParser,
            request_builder,
        )
        .with_proxy(proxy_url)?
        .with_retry_policy(COINGECKO_RETRY_POLICY);

        Ok(Self { http_client })
    }

    // Only rate limits are ever retried against CoinGecko
    pub fn with_retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self {
            http_client: self
                .http_client
                .with_retry_policy(retry_policy.rate_limits_only()),
        }
    }

    pub async fn markets_page(&self, page: u32, per_page: u32) -> Result<Vec<TopAsset>, ClientError> {
        let markets = self
            .http_client
            .execute(CoinGeckoMarkets::page(page, per_page.min(COINGECKO_MAX_PER_PAGE)))
            .await?;

        Ok(markets.into_iter().map(TopAsset::from).collect())
    }

    // Pages are fetched one after another to stay inside the public rate limit
    pub async fn top_assets(&self, pages: u32, per_page: u32) -> Result<TopAssetsSnapshot, ClientError> {
        let mut assets = Vec::new();

        for page in 1..=pages {
            match self.markets_page(page, per_page).await {
                Ok(page_assets) => {
                    info!(page, count = page_assets.len(), "fetched coingecko markets page");
                    assets.extend(page_assets);
                }
                Err(error) if error.is_rate_limited() => {
                    warn!(page, %error, "coingecko rate limit persisted, aborting");
                    return Err(error);
                }
                Err(error) => {
                    warn!(page, %error, "skipping coingecko markets page");
                }
            }
        }

        Ok(TopAssetsSnapshot::now(assets))
    }
}
