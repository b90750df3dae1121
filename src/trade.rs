//! Destination choice and the buy/sell decisions made at a town.
//!
//! Trading happens in the previous target: by the time trading runs on an
//! arrival tick the next destination has already been drawn, so the town the
//! caravan stands in has moved to `prev_target`.

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::caravan::{Caravan, CaravanStatus, CargoLot};
use crate::goods::GoodId;
use crate::pricing::{cheapest_good, town_price};
use crate::world::{TownId, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeEvent {
    pub step: u64,
    pub kind: TradeKind,
    pub good: GoodId,
    pub town: TownId,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Moves the current target into `prev_target` and draws a new target
/// uniformly from every other town. Returns `None`, leaving the caravan
/// untouched, when no other town exists.
pub fn select_destination<R: Rng + ?Sized>(
    caravan: &mut Caravan,
    world: &World,
    rng: &mut R,
) -> Option<TownId> {
    let current = caravan.target;
    let next = world.town_ids().filter(|id| *id != current).choose(rng)?;
    caravan.prev_target = Some(current);
    caravan.target = next;
    Some(next)
}

/// The town the caravan trades with on this tick, if any.
pub fn trading_town(caravan: &Caravan) -> Option<TownId> {
    if caravan.status != CaravanStatus::InTown {
        return None;
    }
    caravan.prev_target
}

/// Buys as much as possible of the cheapest good in the trading town.
///
/// The amount is bounded by free capacity, the town's stock and what the
/// caravan can afford at the current unit price. Nothing happens when that
/// bound is zero.
pub fn buy_for_best_price(
    step: u64,
    world: &mut World,
    caravan: &mut Caravan,
) -> Option<TradeEvent> {
    let town_id = trading_town(caravan)?;
    let (good, price) = {
        let town = world.town(town_id)?;
        cheapest_good(town, world.catalog())?
    };
    let town = world.town_mut(town_id)?;

    let mut amount = caravan.free_capacity().min(town.stock(good));
    let policy = &caravan.policy;
    if !policy.buy_full_capacity {
        let cap = (policy.buy_max_amount * f64::from(caravan.capacity)).floor() as u32;
        amount = amount.min(cap);
    }
    if price > 0.0 {
        let affordable = (caravan.money / price).floor();
        if affordable < f64::from(amount) {
            amount = affordable.max(0.0) as u32;
        }
    }
    if !policy.buy_full_capacity
        && f64::from(amount) < policy.buy_min_amount * f64::from(caravan.capacity)
    {
        debug!(town = town.name(), amount, "buy below minimum lot size, skipped");
        return None;
    }
    if amount == 0 {
        debug!(town = town.name(), "nothing to buy");
        return None;
    }

    let taken = town.take_stock(good, amount);
    caravan.cargo.push(CargoLot {
        good,
        origin: town_id,
        quantity: taken,
        unit_price: price,
    });
    caravan.money = (caravan.money - f64::from(taken) * price).max(0.0);

    Some(TradeEvent {
        step,
        kind: TradeKind::Buy,
        good,
        town: town_id,
        quantity: taken,
        unit_price: price,
    })
}

/// Hook for liquidating cargo at the trading town.
pub trait SellStrategy: Send {
    fn name(&self) -> &str;
    fn sell(&mut self, step: u64, world: &mut World, caravan: &mut Caravan) -> Vec<TradeEvent>;
}

/// Keeps every lot. The default: caravans only accumulate cargo.
#[derive(Debug, Default)]
pub struct HoldCargo;

impl SellStrategy for HoldCargo {
    fn name(&self) -> &str {
        "hold"
    }

    fn sell(&mut self, _step: u64, _world: &mut World, _caravan: &mut Caravan) -> Vec<TradeEvent>
    {
        Vec::new()
    }
}

/// Sells a lot only where the trading town pays at least the policy floor:
/// `price_min + band * sell_min_price`, raised to the purchase price when
/// `sell_with_profit` is set. Town stock never exceeds its warehouse limit,
/// so lots may be sold partially.
#[derive(Debug, Default)]
pub struct PolicySell;

impl SellStrategy for PolicySell {
    fn name(&self) -> &str {
        "policy"
    }

    fn sell(&mut self, step: u64, world: &mut World, caravan: &mut Caravan) -> Vec<TradeEvent> {
        let mut events = Vec::new();
        let Some(town_id) = trading_town(caravan) else {
            return events;
        };
        let policy = caravan.policy.clone();

        for lot in caravan.cargo.iter_mut() {
            let Some(good) = world.catalog().get(lot.good).cloned() else {
                continue;
            };
            let Some(town) = world.town_mut(town_id) else {
                break;
            };
            let price = town_price(town, &good);
            let mut floor = good.price_min + good.price_band() * policy.sell_min_price;
            if policy.sell_with_profit {
                floor = floor.max(lot.unit_price);
            }
            if price < floor {
                continue;
            }
            let sold = town.put_stock(lot.good, lot.quantity);
            if sold == 0 {
                continue;
            }
            lot.quantity -= sold;
            caravan.money += f64::from(sold) * price;
            events.push(TradeEvent {
                step,
                kind: TradeKind::Sell,
                good: lot.good,
                town: town_id,
                quantity: sold,
                unit_price: price,
            });
        }
        caravan.cargo.retain(|lot| lot.quantity > 0);
        events
    }
}
