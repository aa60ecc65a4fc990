use std::process::ExitCode;

use folio_data::exchange::coingecko::{
    coingecko_client::CoinGeckoClient, COINGECKO_MAX_PER_PAGE, TOP_ASSETS_PAGES,
};
use folio_server::{config::Config, init_logging, store::write_json};
use prettytable::{row, Table};
use tracing::error;

// Rows printed to the terminal, the file always holds the full list
const SUMMARY_ROWS: usize = 10;

/*----- */
// Main
/*----- */
// Fetches the CoinGecko top 500 by market cap and writes the snapshot the
// server serves from /market/top-assets
#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let proxy_url = config.proxy_url.as_ref().map(|url| url.to_string());
    let client = match CoinGeckoClient::new(config.coingecko_api_key.as_deref(), proxy_url.as_deref()) {
        Ok(client) => client,
        Err(error) => {
            error!(%error, "failed to build coingecko client");
            return ExitCode::FAILURE;
        }
    };

    let snapshot = match client.top_assets(TOP_ASSETS_PAGES, COINGECKO_MAX_PER_PAGE).await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            error!(%error, "failed to fetch top assets");
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = write_json(&config.top_assets_path, &snapshot).await {
        error!(%error, "failed to write top assets");
        return ExitCode::FAILURE;
    }

    let mut table = Table::new();
    table.add_row(row!["#", "Symbol", "Name", "Price (USD)", "Market cap (USD)", "24h %"]);
    for (rank, asset) in snapshot.assets.iter().take(SUMMARY_ROWS).enumerate() {
        table.add_row(row![
            rank + 1,
            asset.symbol,
            asset.name,
            display(asset.price, 4),
            display(asset.market_cap, 0),
            display(asset.change_24h, 2)
        ]);
    }
    table.printstd();

    println!(
        "Saved {} top assets with timestamp to {} ({})",
        snapshot.assets.len(),
        config.top_assets_path.display(),
        snapshot.last_updated
    );

    ExitCode::SUCCESS
}

fn display(value: Option<f64>, precision: usize) -> String {
    value
        .map(|value| format!("{value:.precision$}"))
        .unwrap_or_else(|| "-".to_string())
}
