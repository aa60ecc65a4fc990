use actix_web::{
    get, post,
    web::{self, Data},
    HttpResponse, Responder,
};
use folio_data::{
    error::ClientError,
    exchange::{
        binance::requests::open_orders::BinanceFuturesOrder,
        coingecko::{COINGECKO_MAX_PER_PAGE, TOP_ASSETS_PAGES},
        BalanceSource, ExchangeId,
    },
    model::{
        balance::AssetBalance,
        market::TopAssetsSnapshot,
        portfolio::{aggregate, PortfolioSummary},
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    ledger::{NewTrade, Trade},
    pnl::pnl_report,
    store::{read_json, write_json},
};

use super::{auth::ApiKey, error::ServerError, AppState};

/*----- */
// Responses
/*----- */
#[derive(Debug, Clone, Serialize)]
pub struct FullPortfolio {
    pub spot: Vec<AssetBalance>,
    pub futures: Vec<AssetBalance>,
    pub open_futures_orders: Vec<BinanceFuturesOrder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangePortfolio {
    pub exchange: ExchangeId,
    pub balances: Vec<AssetBalance>,
    pub summary: PortfolioSummary,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

async fn exchange_portfolio<Source>(source: &Source) -> Result<ExchangePortfolio, ClientError>
where
    Source: BalanceSource + Sync,
{
    let (balances, prices) = tokio::try_join!(source.all_balances(), source.prices())?;
    let summary = aggregate(&balances, &prices);

    Ok(ExchangePortfolio {
        exchange: Source::EXCHANGE,
        balances,
        summary,
    })
}

/*----- */
// Handlers
/*----- */
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/full-portfolio")]
pub async fn full_portfolio(
    _: ApiKey,
    state: Data<AppState>,
    query: web::Query<RefreshQuery>,
) -> Result<HttpResponse, ServerError> {
    let binance = state.binance()?;

    let portfolio = state
        .full_portfolio_cache
        .get_or_fetch("binance", query.refresh, move || async move {
            let (spot, futures, open_futures_orders) = tokio::try_join!(
                binance.spot_balances(),
                binance.futures_balances(),
                binance.open_futures_orders()
            )?;

            Ok::<_, ServerError>(FullPortfolio {
                spot,
                futures,
                open_futures_orders,
            })
        })
        .await?;

    Ok(HttpResponse::Ok().json(portfolio))
}

#[get("/binance-data")]
pub async fn binance_data(
    _: ApiKey,
    state: Data<AppState>,
    query: web::Query<RefreshQuery>,
) -> Result<HttpResponse, ServerError> {
    let binance = state.binance()?;

    let portfolio = state
        .portfolio_cache
        .get_or_fetch(ExchangeId::Binance.as_str(), query.refresh, || {
            exchange_portfolio(binance)
        })
        .await?;

    Ok(HttpResponse::Ok().json(portfolio))
}

#[get("/bitget-assets")]
pub async fn bitget_assets(
    _: ApiKey,
    state: Data<AppState>,
    query: web::Query<RefreshQuery>,
) -> Result<HttpResponse, ServerError> {
    let bitget = state.bitget()?;

    let portfolio = state
        .portfolio_cache
        .get_or_fetch(ExchangeId::Bitget.as_str(), query.refresh, || {
            exchange_portfolio(bitget)
        })
        .await?;

    Ok(HttpResponse::Ok().json(portfolio))
}

// Serves the snapshot file written by update_top_assets, going to CoinGecko
// only when the file is absent or a refresh is forced
#[get("/market/top-assets")]
pub async fn top_assets(
    _: ApiKey,
    state: Data<AppState>,
    query: web::Query<RefreshQuery>,
) -> Result<HttpResponse, ServerError> {
    let state: &AppState = &state;
    let refresh = query.refresh;

    let snapshot = state
        .top_assets_cache
        .get_or_fetch("top_assets", refresh, move || async move {
            if !refresh {
                let path = &state.top_assets_path;
                if let Some(snapshot) = read_json::<TopAssetsSnapshot>(path).await? {
                    return Ok(snapshot);
                }
            }

            let snapshot = state
                .coingecko
                .top_assets(TOP_ASSETS_PAGES, COINGECKO_MAX_PER_PAGE)
                .await?;
            write_json(&state.top_assets_path, &snapshot).await?;

            Ok::<_, ServerError>(snapshot)
        })
        .await?;

    Ok(HttpResponse::Ok().json(snapshot))
}

#[get("/pnl")]
pub async fn pnl(
    _: ApiKey,
    state: Data<AppState>,
    query: web::Query<RefreshQuery>,
) -> Result<HttpResponse, ServerError> {
    let binance = state.binance()?;

    let prices = state
        .price_cache
        .get_or_fetch(ExchangeId::Binance.as_str(), query.refresh, || binance.prices())
        .await?;
    let book = state.ledger.read().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "cached": prices.cached,
        "fetched_at": prices.fetched_at,
        "data": pnl_report(&book, &prices.data),
    })))
}

#[get("/ledger")]
pub async fn get_ledger(_: ApiKey, state: Data<AppState>) -> Result<HttpResponse, ServerError> {
    let book = state.ledger.read().await?;
    Ok(HttpResponse::Ok().json(book))
}

#[post("/ledger/trades")]
pub async fn record_trade(
    _: ApiKey,
    state: Data<AppState>,
    trade: web::Json<NewTrade>,
) -> Result<HttpResponse, ServerError> {
    let recorded = state
        .ledger
        .record_trade(Trade::from(trade.into_inner()))
        .await?;

    Ok(HttpResponse::Ok().json(recorded))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::Config,
        server::{configure, cors_headers, preflight},
    };
    use actix_web::{http::StatusCode, test, App};
    use folio_data::{
        exchange::{
            binance::{binance_client::BinanceClient, request_builder::BinanceAuthParams},
            ClientOptions,
        },
        mock_server::{MockResponse, MockServer},
        protocols::http::client::RetryPolicy,
    };
    use serde_json::json;
    use std::{path::Path, time::Duration};

    fn state(dir: &Path, vars: &[(&str, &str)]) -> AppState {
        let ledger_path = dir.join("trade_ledger.json").display().to_string();
        let top_assets_path = dir.join("top_500_assets.json").display().to_string();

        let mut vars = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<std::collections::HashMap<_, _>>();
        vars.insert("LEDGER_PATH".to_string(), ledger_path);
        vars.insert("TOP_ASSETS_PATH".to_string(), top_assets_path);

        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();
        AppState::new(&config).unwrap()
    }

    fn binance_at(server: &MockServer) -> BinanceClient {
        BinanceClient::with_base_urls(
            BinanceAuthParams::new("key", "secret"),
            &ClientOptions {
                proxy_url: None,
                retry_policy: RetryPolicy::new(0, Duration::from_millis(1)),
                recv_window_ms: 5_000,
            },
            [server.base_url.clone()],
            [server.base_url.clone()],
        )
        .unwrap()
    }

    async fn binance_server() -> MockServer {
        MockServer::start(|request, _| match request.path() {
            "/api/v3/account" => MockResponse::ok(json!({
                "balances": [
                    { "asset": "BTC", "free": "0.5", "locked": "0" },
                    { "asset": "ETH", "free": "0", "locked": "0" }
                ]
            })),
            "/sapi/v1/margin/account" => MockResponse::ok(json!({
                "marginLevel": "999",
                "totalNetAssetOfBtc": "0",
                "userAssets": []
            })),
            "/fapi/v2/account" => MockResponse::ok(json!({
                "totalWalletBalance": "100",
                "totalUnrealizedProfit": "5",
                "assets": [{
                    "asset": "USDT",
                    "walletBalance": "100",
                    "unrealizedProfit": "5",
                    "marginBalance": "105",
                    "availableBalance": "100"
                }]
            })),
            "/fapi/v1/openOrders" => MockResponse::ok(json!([])),
            "/api/v3/ticker/price" => MockResponse::ok(json!([
                { "symbol": "BTCUSDT", "price": "60000" },
                { "symbol": "ETHBTC", "price": "0.05" }
            ])),
            _ => MockResponse::status(404),
        })
        .await
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(Data::new($state))
                    .wrap_fn(preflight)
                    .wrap(cors_headers())
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health_is_open_and_has_cors() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state(dir.path(), &[("SERVER_API_KEY", "secret")]));

        let response = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[actix_web::test]
    async fn test_preflight_answers_no_content() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state(dir.path(), &[("SERVER_API_KEY", "secret")]));

        let request = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/binance-data")
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn test_api_key_required_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state(dir.path(), &[("SERVER_API_KEY", "secret")]));

        let response = test::call_service(&app, test::TestRequest::get().uri("/ledger").to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert!(body["error"].is_string());

        let request = test::TestRequest::get()
            .uri("/ledger")
            .insert_header(("X-API-KEY", "wrong"))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::UNAUTHORIZED);

        let request = test::TestRequest::get()
            .uri("/ledger")
            .insert_header(("X-API-KEY", "secret"))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_unconfigured_exchanges_answer_503() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state(dir.path(), &[]));

        for uri in ["/binance-data", "/full-portfolio", "/pnl", "/bitget-assets?refresh=true"] {
            let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_unreachable_upstream_answers_502() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(dir.path(), &[]);
        state.binance = Some(
            BinanceClient::with_base_urls(
                BinanceAuthParams::new("key", "secret"),
                &ClientOptions {
                    proxy_url: None,
                    retry_policy: RetryPolicy::new(0, Duration::from_millis(1)),
                    recv_window_ms: 5_000,
                },
                ["http://127.0.0.1:9"],
                ["http://127.0.0.1:9"],
            )
            .unwrap(),
        );
        let app = app!(state);

        let response = test::call_service(&app, test::TestRequest::get().uri("/binance-data").to_request()).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn test_record_and_read_trades() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state(dir.path(), &[]));

        let request = test::TestRequest::post()
            .uri("/ledger/trades")
            .set_json(serde_json::json!({
                "asset": "btc",
                "side": "buy",
                "quantity": 0.5,
                "price": 60000.0,
                "fee": 10.0
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["position"]["quantity"], 0.5);
        assert_eq!(body["position"]["cost_basis"], 30010.0);

        let request = test::TestRequest::post()
            .uri("/ledger/trades")
            .set_json(serde_json::json!({
                "asset": "BTC",
                "side": "sell",
                "quantity": 1.0,
                "price": 61000.0
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = test::call_service(&app, test::TestRequest::get().uri("/ledger").to_request()).await;
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["trades"].as_array().unwrap().len(), 1);
        assert_eq!(body["positions"]["BTC"]["quantity"], 0.5);
    }

    #[actix_web::test]
    async fn test_malformed_trade_body_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state(dir.path(), &[]));

        let request = test::TestRequest::post()
            .uri("/ledger/trades")
            .set_json(serde_json::json!({ "asset": "BTC", "side": "hold" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("bad request"));
    }

    #[actix_web::test]
    async fn test_top_assets_served_from_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = TopAssetsSnapshot {
            last_updated: "Monday, 19 October 2026, 03:04 PM".to_string(),
            assets: Vec::new(),
        };
        write_json(&dir.path().join("top_500_assets.json"), &snapshot)
            .await
            .unwrap();
        let app = app!(state(dir.path(), &[]));

        let response = test::call_service(&app, test::TestRequest::get().uri("/market/top-assets").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["cached"], false);
        assert_eq!(body["data"]["last_updated"], snapshot.last_updated);
    }

    #[actix_web::test]
    async fn test_full_portfolio_from_upstream() {
        let dir = tempfile::tempdir().unwrap();
        let server = binance_server().await;
        let mut state = state(dir.path(), &[]);
        state.binance = Some(binance_at(&server));
        let app = app!(state);

        let response = test::call_service(&app, test::TestRequest::get().uri("/full-portfolio").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["cached"], false);
        assert_eq!(body["data"]["spot"][0]["asset"], "BTC");
        assert_eq!(body["data"]["futures"][0]["asset"], "USDT");
        assert_eq!(body["data"]["open_futures_orders"], json!([]));
        assert_eq!(server.hits("/api/v3/account"), 1);
        assert_eq!(server.hits("/fapi/v2/account"), 1);
        assert_eq!(server.hits("/fapi/v1/openOrders"), 1);
    }

    #[actix_web::test]
    async fn test_binance_data_is_cached_until_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let server = binance_server().await;
        let mut state = state(dir.path(), &[]);
        state.binance = Some(binance_at(&server));
        let app = app!(state);

        let mut cached = Vec::new();
        for uri in ["/binance-data", "/binance-data", "/binance-data?refresh=true"] {
            let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let body: serde_json::Value = test::read_body_json(response).await;
            assert_eq!(body["data"]["exchange"], "binance");
            cached.push(body["cached"].as_bool().unwrap());
        }

        assert_eq!(cached, vec![false, true, false]);
        assert_eq!(server.hits("/api/v3/account"), 2);
        assert_eq!(server.hits("/sapi/v1/margin/account"), 2);
        assert_eq!(server.hits("/api/v3/ticker/price"), 2);
    }

    #[actix_web::test]
    async fn test_pnl_values_ledger_at_binance_prices() {
        let dir = tempfile::tempdir().unwrap();
        let server = binance_server().await;
        let mut state = state(dir.path(), &[]);
        state.binance = Some(binance_at(&server));
        let app = app!(state);

        let request = test::TestRequest::post()
            .uri("/ledger/trades")
            .set_json(json!({ "asset": "BTC", "side": "buy", "quantity": 0.5, "price": 50000.0 }))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);

        let response = test::call_service(&app, test::TestRequest::get().uri("/pnl").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["cached"], false);

        let btc = &body["data"]["positions"][0];
        assert_eq!(btc["asset"], "BTC");
        assert_eq!(btc["current_price"], 60000.0);
        assert_eq!(btc["market_value"], 30000.0);
        assert_eq!(btc["unrealized_pnl"], 5000.0);
        assert_eq!(body["data"]["unpriced"], json!([]));

        let response = test::call_service(&app, test::TestRequest::get().uri("/pnl").to_request()).await;
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["cached"], true);
        assert_eq!(server.hits("/api/v3/ticker/price"), 1);
    }
}
