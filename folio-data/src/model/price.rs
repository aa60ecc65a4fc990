use std::collections::HashMap;

use serde::Serialize;

pub const STABLECOINS: [&str; 7] = ["USDT", "USDC", "FDUSD", "BUSD", "DAI", "TUSD", "USD"];

// Quote assets tried in order when pricing an asset in USD
const USD_QUOTES: [&str; 3] = ["USDT", "USDC", "FDUSD"];

/*----- */
// Price Book
/*----- */
#[derive(Debug, Default, Clone, Serialize)]
pub struct PriceBook(HashMap<String, f64>);

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S>(&mut self, symbol: S, price: f64)
    where
        S: Into<String>,
    {
        if price.is_finite() && price > 0.0 {
            self.0.insert(symbol.into().to_uppercase(), price);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.0.get(symbol).copied()
    }

    pub fn usd_price(&self, asset: &str) -> Option<f64> {
        let asset = asset.to_uppercase();
        if STABLECOINS.contains(&asset.as_str()) {
            return Some(1.0);
        }

        USD_QUOTES
            .iter()
            .find_map(|quote| self.price(&format!("{asset}{quote}")))
    }
}

impl<S> FromIterator<(S, f64)> for PriceBook
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut book = PriceBook::new();
        for (symbol, price) in iter {
            book.insert(symbol, price);
        }
        book
    }
}
