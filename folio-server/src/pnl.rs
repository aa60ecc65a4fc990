use std::cmp::Reverse;

use folio_data::model::price::PriceBook;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::ledger::Ledger;

/*----- */
// P&L Report
/*----- */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionPnl {
    pub asset: String,
    pub quantity: f64,
    pub cost_basis: f64,
    pub avg_cost: Option<f64>,
    pub realized_pnl: f64,
    pub current_price: Option<f64>,
    pub market_value: Option<f64>,
    pub unrealized_pnl: Option<f64>,
    pub unrealized_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PnlTotals {
    // Cost and value cover priced positions only
    pub cost_basis: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pct: Option<f64>,
    pub realized_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlReport {
    pub positions: Vec<PositionPnl>,
    pub totals: PnlTotals,
    pub unpriced: Vec<String>,
}

fn pct(pnl: f64, cost_basis: f64) -> Option<f64> {
    (cost_basis > 0.0).then(|| pnl / cost_basis * 100.0)
}

// Open positions valued at current prices, largest market value first.
// Closed positions only contribute their realised P&L to the totals.
pub fn pnl_report(ledger: &Ledger, prices: &PriceBook) -> PnlReport {
    let positions = ledger
        .positions
        .iter()
        .filter(|(_, position)| position.is_open())
        .map(|(asset, position)| {
            let current_price = prices.usd_price(asset);
            let market_value = current_price.map(|price| price * position.quantity);
            let unrealized_pnl = market_value.map(|value| value - position.cost_basis);

            PositionPnl {
                asset: asset.clone(),
                quantity: position.quantity,
                cost_basis: position.cost_basis,
                avg_cost: position.avg_cost(),
                realized_pnl: position.realized_pnl,
                current_price,
                market_value,
                unrealized_pnl,
                unrealized_pct: unrealized_pnl.and_then(|pnl| pct(pnl, position.cost_basis)),
            }
        })
        .sorted_by_key(|position| {
            (
                Reverse(position.market_value.map(OrderedFloat)),
                position.asset.clone(),
            )
        })
        .collect::<Vec<_>>();

    let mut totals = PnlTotals {
        realized_pnl: ledger
            .positions
            .values()
            .map(|position| position.realized_pnl)
            .sum(),
        ..Default::default()
    };
    for position in &positions {
        if let (Some(market_value), Some(unrealized_pnl)) =
            (position.market_value, position.unrealized_pnl)
        {
            totals.cost_basis += position.cost_basis;
            totals.market_value += market_value;
            totals.unrealized_pnl += unrealized_pnl;
        }
    }
    totals.unrealized_pct = pct(totals.unrealized_pnl, totals.cost_basis);

    let unpriced = positions
        .iter()
        .filter(|position| position.current_price.is_none())
        .map(|position| position.asset.clone())
        .collect();

    PnlReport {
        positions,
        totals,
        unpriced,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ledger::Position;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.positions.insert(
            "BTC".to_string(),
            Position {
                quantity: 2.0,
                cost_basis: 100_000.0,
                realized_pnl: 500.0,
            },
        );
        ledger.positions.insert(
            "ETH".to_string(),
            Position {
                quantity: 10.0,
                cost_basis: 40_000.0,
                realized_pnl: 0.0,
            },
        );
        ledger.positions.insert(
            "OBSCURE".to_string(),
            Position {
                quantity: 1_000.0,
                cost_basis: 250.0,
                realized_pnl: 0.0,
            },
        );
        ledger.positions.insert(
            "SOL".to_string(),
            Position {
                quantity: 0.0,
                cost_basis: 0.0,
                realized_pnl: -25.0,
            },
        );
        ledger
    }

    fn prices() -> PriceBook {
        [("BTCUSDT", 60_000.0), ("ETHUSDC", 3_000.0), ("SOLUSDT", 150.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_report_values_open_positions() {
        let report = pnl_report(&ledger(), &prices());

        let assets = report
            .positions
            .iter()
            .map(|position| position.asset.as_str())
            .collect::<Vec<_>>();
        assert_eq!(assets, vec!["BTC", "ETH", "OBSCURE"]);

        let btc = &report.positions[0];
        assert_eq!(btc.avg_cost, Some(50_000.0));
        assert_eq!(btc.market_value, Some(120_000.0));
        assert_eq!(btc.unrealized_pnl, Some(20_000.0));
        assert_eq!(btc.unrealized_pct, Some(20.0));

        let eth = &report.positions[1];
        assert_eq!(eth.current_price, Some(3_000.0));
        assert_eq!(eth.unrealized_pnl, Some(-10_000.0));
        assert_eq!(eth.unrealized_pct, Some(-25.0));
    }

    #[test]
    fn test_unpriced_positions_listed_without_value() {
        let report = pnl_report(&ledger(), &prices());

        assert_eq!(report.unpriced, vec!["OBSCURE".to_string()]);
        let obscure = &report.positions[2];
        assert_eq!(obscure.avg_cost, Some(0.25));
        assert_eq!(obscure.market_value, None);
        assert_eq!(obscure.unrealized_pct, None);
    }

    #[test]
    fn test_totals() {
        let report = pnl_report(&ledger(), &prices());

        assert_eq!(report.totals.cost_basis, 140_000.0);
        assert_eq!(report.totals.market_value, 150_000.0);
        assert_eq!(report.totals.unrealized_pnl, 10_000.0);
        assert_eq!(report.totals.realized_pnl, 475.0);
        assert!((report.totals.unrealized_pct.unwrap() - 7.142857142857143).abs() < 1e-9);
    }

    #[test]
    fn test_empty_ledger() {
        let report = pnl_report(&Ledger::default(), &PriceBook::new());
        assert!(report.positions.is_empty());
        assert_eq!(report.totals, PnlTotals::default());
    }
}
