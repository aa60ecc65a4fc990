use std::collections::HashSet;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

// e.g. "Monday, 19 October 2026, 03:04 PM"
pub const LAST_UPDATED_FORMAT: &str = "%A, %d %B %Y, %I:%M %p";

/*----- */
// Top Assets
/*----- */
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TopAsset {
    pub name: String,
    pub symbol: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub change_24h: Option<f64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TopAssetsSnapshot {
    pub last_updated: String,
    pub assets: Vec<TopAsset>,
}

impl TopAssetsSnapshot {
    // Input must already be ordered by market cap: the first symbol seen wins
    pub fn from_ranked<I, Tz>(assets: I, now: DateTime<Tz>) -> Self
    where
        I: IntoIterator<Item = TopAsset>,
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut seen = HashSet::new();
        let assets = assets
            .into_iter()
            .map(|asset| TopAsset {
                symbol: asset.symbol.to_uppercase(),
                ..asset
            })
            .filter(|asset| seen.insert(asset.symbol.clone()))
            .collect();

        Self {
            last_updated: now.format(LAST_UPDATED_FORMAT).to_string(),
            assets,
        }
    }

    pub fn now<I>(assets: I) -> Self
    where
        I: IntoIterator<Item = TopAsset>,
    {
        Self::from_ranked(assets, Local::now())
    }
}
