pub mod coingecko_client;
pub mod requests;

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const COINGECKO_API_KEY_HEADER: &str = "x-cg-demo-api-key";

// The markets endpoint caps per_page at 250
pub const COINGECKO_MAX_PER_PAGE: u32 = 250;

// Two full pages make up the top 500 snapshot
pub const TOP_ASSETS_PAGES: u32 = 2;
