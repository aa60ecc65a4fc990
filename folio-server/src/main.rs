use actix_web::{web::Data, App, HttpServer};
use folio_server::{
    config::Config,
    init_logging,
    server::{configure, cors_headers, preflight, AppState},
};
use tracing::{error, info};

/*----- */
// Main
/*----- */
#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Init
    init_logging();

    let config = Config::from_env().map_err(|error| {
        error!(%error, "invalid configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, error)
    })?;

    let state = AppState::new(&config).map_err(|error| {
        error!(%error, "failed to build exchange clients");
        std::io::Error::other(error)
    })?;

    // Clock offsets before the first signed request
    state.sync_server_time().await;

    info!(
        host = %config.host,
        port = config.port,
        binance = state.binance.is_some(),
        bitget = state.bitget.is_some(),
        api_key_required = state.api_key.is_some(),
        "starting server"
    );

    // Http server
    let state = Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap_fn(preflight)
            .wrap(cors_headers())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
