use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::world::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodId(pub u32);

impl GoodId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// One ingredient of a tiered good's recipe. Carried in the catalog only;
/// nothing in the simulation produces goods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeInput {
    pub good: GoodId,
    pub per_unit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Good {
    pub id: GoodId,
    pub tier: Tier,
    pub name: String,
    pub unit: String,
    pub price_min: f64,
    pub price_max: f64,
    #[serde(default)]
    pub unit_volume: f64,
    #[serde(default)]
    pub unit_weight: f64,
    #[serde(default)]
    pub inputs: Vec<RecipeInput>,
}

impl Good {
    /// Width of the price band, `price_max - price_min`.
    pub fn price_band(&self) -> f64 {
        self.price_max - self.price_min
    }
}

/// Static goods catalog, iterated in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct GoodsCatalog {
    goods: BTreeMap<GoodId, Good>,
}

impl GoodsCatalog {
    pub fn new(goods: impl IntoIterator<Item = Good>) -> Self {
        Self {
            goods: goods.into_iter().map(|good| (good.id, good)).collect(),
        }
    }

    pub fn get(&self, id: GoodId) -> Option<&Good> {
        self.goods.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Good> {
        self.goods.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = GoodId> + '_ {
        self.goods.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.goods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty()
    }
}
