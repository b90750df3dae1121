use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::goods::{GoodId, GoodsCatalog};
use crate::grid::{Position, SpatialGrid};

/// Town rank. Drives warehouse capacity and the map colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::One, Tier::Two, Tier::Three];

    pub fn level(self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            other => Err(format!("tier must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Tier> for u8 {
    fn from(value: Tier) -> Self {
        value.level()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSpec {
    pub tier: Tier,
    pub warehouse_limit: u32,
    pub color: String,
}

/// Tier lookup table; always holds an entry for every tier.
#[derive(Debug, Clone)]
pub struct TierTable {
    specs: BTreeMap<Tier, TierSpec>,
}

impl TierTable {
    /// Returns `None` when any tier is missing.
    pub fn from_specs(specs: &[TierSpec]) -> Option<Self> {
        let specs: BTreeMap<Tier, TierSpec> =
            specs.iter().map(|spec| (spec.tier, spec.clone())).collect();
        if Tier::ALL.iter().all(|tier| specs.contains_key(tier)) {
            Some(Self { specs })
        } else {
            None
        }
    }

    pub fn warehouse_limit(&self, tier: Tier) -> u32 {
        self.specs.get(&tier).map(|s| s.warehouse_limit).unwrap_or(0)
    }

    pub fn color(&self, tier: Tier) -> &str {
        self.specs.get(&tier).map(|s| s.color.as_str()).unwrap_or("white")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TownId(pub u32);

impl TownId {
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Town {
    id: TownId,
    name: String,
    tier: Tier,
    position: Position,
    warehouse_limit: u32,
    stock: BTreeMap<GoodId, u32>,
    visits: u32,
}

impl Town {
    pub fn new(
        id: TownId,
        name: String,
        position: Position,
        warehouse_limit: u32,
        stock: BTreeMap<GoodId, u32>,
    ) -> Self {
        Self {
            id,
            name,
            tier: Tier::One,
            position,
            warehouse_limit,
            stock,
            visits: 0,
        }
    }

    pub fn id(&self) -> TownId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn warehouse_limit(&self) -> u32 {
        self.warehouse_limit
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn stock(&self, good: GoodId) -> u32 {
        self.stock.get(&good).copied().unwrap_or(0)
    }

    /// Per-good stock in ascending good id order.
    pub fn stock_levels(&self) -> impl Iterator<Item = (GoodId, u32)> + '_ {
        self.stock.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Removes up to `amount` units and returns how many were taken.
    pub fn take_stock(&mut self, good: GoodId, amount: u32) -> u32 {
        let entry = self.stock.entry(good).or_insert(0);
        let taken = amount.min(*entry);
        *entry -= taken;
        taken
    }

    /// Adds up to `amount` units without exceeding the warehouse limit.
    /// Returns how many were accepted.
    pub fn put_stock(&mut self, good: GoodId, amount: u32) -> u32 {
        let limit = self.warehouse_limit;
        let entry = self.stock.entry(good).or_insert(0);
        let accepted = amount.min(limit.saturating_sub(*entry));
        *entry += accepted;
        accepted
    }

    pub(crate) fn promote(&mut self, tier: Tier, warehouse_limit: u32) {
        self.tier = tier;
        self.warehouse_limit = warehouse_limit;
    }

    pub(crate) fn record_visit(&mut self) {
        self.visits += 1;
    }
}

/// Generated world: occupancy grid, towns and the goods they trade.
#[derive(Debug, Clone)]
pub struct World {
    grid: SpatialGrid,
    towns: Vec<Town>,
    catalog: GoodsCatalog,
    tiers: TierTable,
}

impl World {
    pub fn new(
        grid: SpatialGrid,
        towns: Vec<Town>,
        catalog: GoodsCatalog,
        tiers: TierTable,
    ) -> Self {
        Self {
            grid,
            towns,
            catalog,
            tiers,
        }
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn towns(&self) -> &[Town] {
        &self.towns
    }

    pub fn town(&self, id: TownId) -> Option<&Town> {
        self.towns.get(id.index())
    }

    pub fn town_mut(&mut self, id: TownId) -> Option<&mut Town> {
        self.towns.get_mut(id.index())
    }

    pub fn town_count(&self) -> usize {
        self.towns.len()
    }

    pub fn town_ids(&self) -> impl Iterator<Item = TownId> + '_ {
        self.towns.iter().map(Town::id)
    }

    pub fn catalog(&self) -> &GoodsCatalog {
        &self.catalog
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }
}
