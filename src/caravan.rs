use serde::{Deserialize, Serialize};

use crate::goods::GoodId;
use crate::grid::Position;
use crate::world::TownId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaravanStatus {
    Starting,
    Moving,
    InTown,
}

/// A purchased batch of one good, tracked with the price paid per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoLot {
    pub good: GoodId,
    pub origin: TownId,
    pub quantity: u32,
    pub unit_price: f64,
}

fn default_buy_max_price() -> f64 {
    0.25
}

fn default_true() -> bool {
    true
}

fn default_buy_max_amount() -> f64 {
    0.5
}

fn default_buy_min_amount() -> f64 {
    0.1
}

fn default_sell_min_price() -> f64 {
    0.5
}

/// Caravan-level trading limits. Price fractions are positions inside a
/// good's price band (0 = `price_min`, 1 = `price_max`); amount fractions are
/// shares of the caravan's capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePolicy {
    #[serde(default = "default_buy_max_price")]
    pub buy_max_price: f64,
    #[serde(default = "default_true")]
    pub buy_full_capacity: bool,
    /// Ignored while `buy_full_capacity` is set.
    #[serde(default = "default_buy_max_amount")]
    pub buy_max_amount: f64,
    /// Ignored while `buy_full_capacity` is set.
    #[serde(default = "default_buy_min_amount")]
    pub buy_min_amount: f64,
    #[serde(default = "default_true")]
    pub sell_with_profit: bool,
    #[serde(default = "default_sell_min_price")]
    pub sell_min_price: f64,
}

impl Default for TradePolicy {
    fn default() -> Self {
        Self {
            buy_max_price: default_buy_max_price(),
            buy_full_capacity: true,
            buy_max_amount: default_buy_max_amount(),
            buy_min_amount: default_buy_min_amount(),
            sell_with_profit: true,
            sell_min_price: default_sell_min_price(),
        }
    }
}

impl TradePolicy {
    pub fn fractions(&self) -> [(&'static str, f64); 4] {
        [
            ("buy_max_price", self.buy_max_price),
            ("buy_max_amount", self.buy_max_amount),
            ("buy_min_amount", self.buy_min_amount),
            ("sell_min_price", self.sell_min_price),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Caravan {
    pub name: String,
    pub status: CaravanStatus,
    pub money: f64,
    pub position: Position,
    pub target: TownId,
    pub prev_target: Option<TownId>,
    pub capacity: u32,
    pub policy: TradePolicy,
    pub cargo: Vec<CargoLot>,
}

impl Caravan {
    pub fn new(
        name: impl Into<String>,
        money: f64,
        position: Position,
        target: TownId,
        capacity: u32,
        policy: TradePolicy,
    ) -> Self {
        Self {
            name: name.into(),
            status: CaravanStatus::Starting,
            money,
            position,
            target,
            prev_target: None,
            capacity,
            policy,
            cargo: Vec::new(),
        }
    }

    pub fn cargo_load(&self) -> u32 {
        self.cargo.iter().map(|lot| lot.quantity).sum()
    }

    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.cargo_load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_capacity_subtracts_all_lots() {
        let mut caravan = Caravan::new(
            "Caravan",
            1000.0,
            Position::new(0, 0),
            TownId(0),
            100,
            TradePolicy::default(),
        );
        assert_eq!(caravan.free_capacity(), 100);
        caravan.cargo.push(CargoLot {
            good: GoodId(1),
            origin: TownId(0),
            quantity: 30,
            unit_price: 4.0,
        });
        caravan.cargo.push(CargoLot {
            good: GoodId(2),
            origin: TownId(1),
            quantity: 45,
            unit_price: 7.5,
        });
        assert_eq!(caravan.cargo_load(), 75);
        assert_eq!(caravan.free_capacity(), 25);
    }

    #[test]
    fn policy_defaults_fill_missing_fields() {
        let policy: TradePolicy = serde_yaml::from_str("buy_full_capacity: false").unwrap();
        assert!(!policy.buy_full_capacity);
        assert_eq!(policy.buy_max_amount, 0.5);
        assert!(policy.sell_with_profit);
    }
}
