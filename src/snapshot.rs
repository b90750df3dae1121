//! Read-only views of the simulation for renderers and the JSON dump.

use serde::Serialize;

use crate::caravan::{CaravanStatus, CargoLot};
use crate::engine::Engine;
use crate::goods::GoodId;
use crate::pricing::town_price;
use crate::world::{Town, TownId, World};

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub step: u64,
    pub paused: bool,
    pub map: MapSnapshot,
    pub towns: Vec<TownSnapshot>,
    pub caravan: CaravanSnapshot,
    pub total_visits: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TownSnapshot {
    pub id: TownId,
    pub name: String,
    pub tier: u8,
    pub color: String,
    pub x: i32,
    pub y: i32,
    pub warehouse_limit: u32,
    pub visits: u32,
    pub goods: Vec<StockSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockSnapshot {
    pub good: GoodId,
    pub name: String,
    pub unit: String,
    pub stock: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaravanSnapshot {
    pub name: String,
    pub status: CaravanStatus,
    pub x: i32,
    pub y: i32,
    pub money: f64,
    pub target: TownId,
    pub prev_target: Option<TownId>,
    pub capacity: u32,
    pub load: u32,
    pub cargo: Vec<CargoLot>,
}

impl WorldSnapshot {
    pub fn capture(engine: &Engine) -> Self {
        let world = engine.world();
        let caravan = engine.caravan();
        Self {
            scenario: engine.scenario_name().to_string(),
            step: engine.step(),
            paused: false,
            map: MapSnapshot {
                width: world.grid().width(),
                height: world.grid().height(),
            },
            towns: world.towns().iter().map(|t| town_snapshot(world, t)).collect(),
            caravan: CaravanSnapshot {
                name: caravan.name.clone(),
                status: caravan.status,
                x: caravan.position.x,
                y: caravan.position.y,
                money: caravan.money,
                target: caravan.target,
                prev_target: caravan.prev_target,
                capacity: caravan.capacity,
                load: caravan.cargo_load(),
                cargo: caravan.cargo.clone(),
            },
            total_visits: engine.total_visits(),
        }
    }

    pub fn town(&self, id: TownId) -> Option<&TownSnapshot> {
        self.towns.iter().find(|town| town.id == id)
    }
}

fn town_snapshot(world: &World, town: &Town) -> TownSnapshot {
    let goods = world
        .catalog()
        .iter()
        .map(|good| StockSnapshot {
            good: good.id,
            name: good.name.clone(),
            unit: good.unit.clone(),
            stock: town.stock(good.id),
            price: town_price(town, good),
        })
        .collect();
    TownSnapshot {
        id: town.id(),
        name: town.name().to_string(),
        tier: town.tier().level(),
        color: world.tiers().color(town.tier()).to_string(),
        x: town.position().x,
        y: town.position().y,
        warehouse_limit: town.warehouse_limit(),
        visits: town.visits(),
        goods,
    }
}
