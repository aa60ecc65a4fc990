pub mod auth;
pub mod error;
pub mod handlers;

use std::path::PathBuf;

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceRequest, ServiceResponse},
    http::Method,
    middleware::DefaultHeaders,
    web, HttpResponse,
};
use folio_data::{
    error::ClientError,
    exchange::{
        binance::binance_client::BinanceClient, bitget::bitget_client::BitgetClient,
        coingecko::coingecko_client::CoinGeckoClient, ExchangeId,
    },
    model::{market::TopAssetsSnapshot, price::PriceBook},
};
use futures::future::{self, FutureExt, LocalBoxFuture};
use tracing::warn;

use crate::{cache::TtlCache, config::Config, ledger::LedgerStore};

use self::{
    error::ServerError,
    handlers::{ExchangePortfolio, FullPortfolio},
};

/*----- */
// App State
/*----- */
#[derive(Debug)]
pub struct AppState {
    pub binance: Option<BinanceClient>,
    pub bitget: Option<BitgetClient>,
    pub coingecko: CoinGeckoClient,
    pub api_key: Option<String>,
    pub ledger: LedgerStore,
    pub top_assets_path: PathBuf,
    pub full_portfolio_cache: TtlCache<FullPortfolio>,
    pub portfolio_cache: TtlCache<ExchangePortfolio>,
    pub price_cache: TtlCache<PriceBook>,
    pub top_assets_cache: TtlCache<TopAssetsSnapshot>,
}

impl AppState {
    // Builds clients only, nothing is sent upstream here
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let options = config.client_options();

        let binance = config
            .binance
            .clone()
            .map(|auth| BinanceClient::new(auth, &options))
            .transpose()?;

        let bitget = config
            .bitget
            .clone()
            .map(|auth| BitgetClient::new(auth, &options))
            .transpose()?;

        let coingecko = CoinGeckoClient::new(
            config.coingecko_api_key.as_deref(),
            options.proxy_url.as_deref(),
        )?;

        Ok(Self {
            binance,
            bitget,
            coingecko,
            api_key: config.server_api_key.clone(),
            ledger: LedgerStore::new(&config.ledger_path),
            top_assets_path: config.top_assets_path.clone(),
            full_portfolio_cache: TtlCache::new(config.cache_ttl),
            portfolio_cache: TtlCache::new(config.cache_ttl),
            price_cache: TtlCache::new(config.cache_ttl),
            top_assets_cache: TtlCache::new(config.cache_ttl),
        })
    }

    pub fn binance(&self) -> Result<&BinanceClient, ServerError> {
        self.binance
            .as_ref()
            .ok_or(ServerError::NotConfigured(ExchangeId::Binance))
    }

    pub fn bitget(&self) -> Result<&BitgetClient, ServerError> {
        self.bitget
            .as_ref()
            .ok_or(ServerError::NotConfigured(ExchangeId::Bitget))
    }

    // Failure is not fatal, the first signed request re-syncs on a timestamp error
    pub async fn sync_server_time(&self) {
        if let Some(binance) = &self.binance {
            if let Err(error) = binance.sync_server_time().await {
                warn!(exchange = "binance", %error, "initial server time sync failed");
            }
        }

        if let Some(bitget) = &self.bitget {
            if let Err(error) = bitget.sync_server_time().await {
                warn!(exchange = "bitget", %error, "initial server time sync failed");
            }
        }
    }
}

/*----- */
// Routing
/*----- */
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|error, _| {
        ServerError::BadRequest(error.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|error, _| {
        ServerError::BadRequest(error.to_string()).into()
    }))
    .service(handlers::health)
    .service(handlers::full_portfolio)
    .service(handlers::binance_data)
    .service(handlers::bitget_assets)
    .service(handlers::top_assets)
    .service(handlers::pnl)
    .service(handlers::get_ledger)
    .service(handlers::record_trade);
}

/*----- */
// CORS
/*----- */
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type, X-API-KEY"))
}

// Answers every OPTIONS request before routing, so preflights never hit
// auth or a 405 from a GET-only resource
pub fn preflight<S, B>(
    request: ServiceRequest,
    service: &S,
) -> LocalBoxFuture<'static, Result<ServiceResponse, actix_web::Error>>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    if request.method() == Method::OPTIONS {
        let response = request.into_response(HttpResponse::NoContent().finish());
        return future::ok(response).boxed_local();
    }

    let response = service.call(request);
    async move { Ok(response.await?.map_into_boxed_body()) }.boxed_local()
}
