use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use folio_data::shared::utils::BALANCE_EPSILON;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::store::{read_json, write_json, StoreError};

/*----- */
// Ledger Error
/*----- */
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid trade: {0}")]
    InvalidTrade(&'static str),

    #[error("cannot sell {requested} {asset}, only {held} held")]
    InsufficientQuantity {
        asset: String,
        requested: f64,
        held: f64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/*----- */
// Trade
/*----- */
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Trade {
    pub id: Uuid,
    pub asset: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    #[serde(default)]
    pub fee: f64,
    pub executed_at: DateTime<Utc>,
}

// Request body for a new trade, id and timestamp are filled in on receipt
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrade {
    pub asset: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    #[serde(default)]
    pub fee: f64,
    pub executed_at: Option<DateTime<Utc>>,
}

impl From<NewTrade> for Trade {
    fn from(trade: NewTrade) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset: trade.asset.trim().to_uppercase(),
            side: trade.side,
            quantity: trade.quantity,
            price: trade.price,
            fee: trade.fee,
            executed_at: trade.executed_at.unwrap_or_else(Utc::now),
        }
    }
}

impl Trade {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.asset.is_empty() {
            return Err(LedgerError::InvalidTrade("asset must not be empty"));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(LedgerError::InvalidTrade("quantity must be positive"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(LedgerError::InvalidTrade("price must be positive"));
        }
        if !self.fee.is_finite() || self.fee < 0.0 {
            return Err(LedgerError::InvalidTrade("fee must not be negative"));
        }
        Ok(())
    }
}

/*----- */
// Position
/*----- */
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub quantity: f64,
    // Total cost of the quantity still held, fees included
    pub cost_basis: f64,
    pub realized_pnl: f64,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.quantity > BALANCE_EPSILON
    }

    pub fn avg_cost(&self) -> Option<f64> {
        self.is_open().then(|| self.cost_basis / self.quantity)
    }

    fn apply(&mut self, trade: &Trade) -> Result<(), LedgerError> {
        match trade.side {
            Side::Buy => {
                self.quantity += trade.quantity;
                self.cost_basis += trade.quantity * trade.price + trade.fee;
            }
            Side::Sell => {
                if trade.quantity > self.quantity + BALANCE_EPSILON {
                    return Err(LedgerError::InsufficientQuantity {
                        asset: trade.asset.clone(),
                        requested: trade.quantity,
                        held: self.quantity,
                    });
                }

                let removed_cost = self.avg_cost().unwrap_or(0.0) * trade.quantity;
                self.realized_pnl += trade.quantity * trade.price - trade.fee - removed_cost;
                self.quantity -= trade.quantity;
                self.cost_basis -= removed_cost;

                if !self.is_open() {
                    self.quantity = 0.0;
                    self.cost_basis = 0.0;
                }
            }
        }
        Ok(())
    }
}

/*----- */
// Ledger
/*----- */
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Ledger {
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub positions: BTreeMap<String, Position>,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl Ledger {
    pub async fn load(path: &Path) -> Result<Self, LedgerError> {
        Ok(read_json(path).await?.unwrap_or_default())
    }

    pub async fn save(&self, path: &Path) -> Result<(), LedgerError> {
        Ok(write_json(path, self).await?)
    }

    // The position is only touched once the trade is known to apply cleanly
    pub fn record_trade(&mut self, trade: Trade) -> Result<&Position, LedgerError> {
        trade.validate()?;

        let mut position = self
            .positions
            .get(&trade.asset)
            .cloned()
            .unwrap_or_default();
        position.apply(&trade)?;

        let asset = trade.asset.clone();
        self.positions.insert(asset.clone(), position);
        self.trades.push(trade);
        self.updated_at = Some(Utc::now());

        Ok(&self.positions[&asset])
    }
}

/*----- */
// Ledger Store
/*----- */
// Serialises read-modify-write cycles on the ledger file within the process
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedTrade {
    pub trade: Trade,
    pub position: Position,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn read(&self) -> Result<Ledger, LedgerError> {
        let _guard = self.lock.lock().await;
        Ledger::load(&self.path).await
    }

    pub async fn record_trade(&self, trade: Trade) -> Result<RecordedTrade, LedgerError> {
        let _guard = self.lock.lock().await;

        let mut ledger = Ledger::load(&self.path).await?;
        let position = ledger.record_trade(trade.clone())?.clone();
        ledger.save(&self.path).await?;

        info!(
            asset = %trade.asset,
            side = ?trade.side,
            quantity = trade.quantity,
            price = trade.price,
            "trade recorded"
        );

        Ok(RecordedTrade { trade, position })
    }
}
