//! Stock-driven unit prices.
//!
//! A good is at its maximum price when the warehouse is empty and falls
//! linearly to its minimum price as the warehouse fills.

use crate::goods::{Good, GoodId, GoodsCatalog};
use crate::world::Town;

/// `price_min + (price_max - price_min) * (1 - stock / warehouse_limit)`.
///
/// Stock is expected to lie in `[0, warehouse_limit]`; no clamping is applied.
pub fn unit_price(good: &Good, stock: u32, warehouse_limit: u32) -> f64 {
    let fill = f64::from(stock) / f64::from(warehouse_limit);
    good.price_min + good.price_band() * (1.0 - fill)
}

/// Current price of `good` in `town`.
pub fn town_price(town: &Town, good: &Good) -> f64 {
    unit_price(good, town.stock(good.id), town.warehouse_limit())
}

/// Cheapest good the town stocks, first id wins on ties.
pub fn cheapest_good(town: &Town, catalog: &GoodsCatalog) -> Option<(GoodId, f64)> {
    let mut best: Option<(GoodId, f64)> = None;
    for (id, _) in town.stock_levels() {
        let Some(good) = catalog.get(id) else {
            continue;
        };
        let price = town_price(town, good);
        match best {
            Some((_, lowest)) if price >= lowest => {}
            _ => best = Some((id, price)),
        }
    }
    best
}
