use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

use super::{
    balance::{AssetBalance, Wallet},
    price::PriceBook,
};

/*----- */
// Aggregated Asset
/*----- */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedAsset {
    pub asset: String,
    pub total: f64,
    pub borrowed: f64,
    pub net: f64,
    pub usd_price: Option<f64>,
    pub usd_value: Option<f64>,
    pub wallets: BTreeMap<Wallet, f64>,
}

impl AggregatedAsset {
    fn new(asset: String) -> Self {
        Self {
            asset,
            total: 0.0,
            borrowed: 0.0,
            net: 0.0,
            usd_price: None,
            usd_value: None,
            wallets: BTreeMap::new(),
        }
    }

    fn add(&mut self, balance: &AssetBalance) {
        self.total += balance.total();
        self.borrowed += balance.borrowed;
        self.net += balance.net();
        *self.wallets.entry(balance.wallet).or_default() += balance.net();
    }

    fn value(&mut self, prices: &PriceBook) {
        self.usd_price = prices.usd_price(&self.asset);
        self.usd_value = self.usd_price.map(|price| price * self.net);
    }
}

/*----- */
// Portfolio Summary
/*----- */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub assets: Vec<AggregatedAsset>,
    pub total_usd_value: f64,
    pub unpriced: Vec<String>,
}

// Priced assets by value descending, then unpriced, ties broken by name
fn by_value(a: &AggregatedAsset, b: &AggregatedAsset) -> Ordering {
    let key = |asset: &AggregatedAsset| Reverse(asset.usd_value.map(OrderedFloat));
    key(a).cmp(&key(b)).then_with(|| a.asset.cmp(&b.asset))
}

pub fn aggregate<'a, I>(balances: I, prices: &PriceBook) -> PortfolioSummary
where
    I: IntoIterator<Item = &'a AssetBalance>,
{
    let mut assets: HashMap<&str, AggregatedAsset> = HashMap::new();
    for balance in balances.into_iter().filter(|balance| !balance.is_empty()) {
        assets
            .entry(balance.asset.as_str())
            .or_insert_with(|| AggregatedAsset::new(balance.asset.clone()))
            .add(balance);
    }

    let assets = assets
        .into_values()
        .map(|mut asset| {
            asset.value(prices);
            asset
        })
        .sorted_by(by_value)
        .collect::<Vec<_>>();

    let total_usd_value = assets.iter().filter_map(|asset| asset.usd_value).sum();
    let unpriced = assets
        .iter()
        .filter(|asset| asset.usd_value.is_none())
        .map(|asset| asset.asset.clone())
        .collect();

    PortfolioSummary {
        assets,
        total_usd_value,
        unpriced,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn prices() -> PriceBook {
        [("BTCUSDT", 60_000.0), ("ETHUSDT", 3_000.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_aggregate_sums_across_wallets() {
        let balances = vec![
            AssetBalance::new("BTC", Wallet::BinanceSpot, 0.5, 0.0),
            AssetBalance::new("BTC", Wallet::BinanceFutures, 0.25, 0.25),
            AssetBalance::new("USDT", Wallet::BinanceSpot, 100.0, 0.0),
            AssetBalance::new("ETH", Wallet::BinanceMargin, 2.0, 0.0).with_borrowed(1.0),
            AssetBalance::new("PEPE", Wallet::BinanceSpot, 1_000.0, 0.0),
            AssetBalance::new("ZERO", Wallet::BinanceSpot, 0.0, 0.0),
        ];

        let summary = aggregate(&balances, &prices());

        let names = summary
            .assets
            .iter()
            .map(|asset| asset.asset.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["BTC", "ETH", "USDT", "PEPE"]);

        let btc = &summary.assets[0];
        assert_eq!(btc.total, 1.0);
        assert_eq!(btc.usd_value, Some(60_000.0));
        assert_eq!(btc.wallets[&Wallet::BinanceSpot], 0.5);
        assert_eq!(btc.wallets[&Wallet::BinanceFutures], 0.5);

        let eth = &summary.assets[1];
        assert_eq!(eth.total, 2.0);
        assert_eq!(eth.borrowed, 1.0);
        assert_eq!(eth.net, 1.0);
        assert_eq!(eth.usd_value, Some(3_000.0));

        assert_eq!(summary.total_usd_value, 63_100.0);
        assert_eq!(summary.unpriced, vec!["PEPE".to_string()]);
    }

    #[test]
    fn test_unpriced_sorted_by_name() {
        let balances = vec![
            AssetBalance::new("ZZZ", Wallet::BitgetSpot, 1.0, 0.0),
            AssetBalance::new("AAA", Wallet::BitgetP2p, 1.0, 0.0),
        ];

        let summary = aggregate(&balances, &PriceBook::new());
        assert_eq!(summary.unpriced, vec!["AAA".to_string(), "ZZZ".to_string()]);
        assert_eq!(summary.total_usd_value, 0.0);
    }
}
