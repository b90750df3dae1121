//! Town placement, initial stock and tier promotion.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::{CountRange, Scenario};
use crate::error::ConfigError;
use crate::grid::{Position, SpatialGrid};
use crate::world::{Tier, TierTable, Town, TownId, World};

pub struct WorldGenerator<'a> {
    scenario: &'a Scenario,
}

impl<'a> WorldGenerator<'a> {
    pub fn new(scenario: &'a Scenario) -> Self {
        Self { scenario }
    }

    /// Builds a world from the scenario. Placement stops early, without
    /// error, when the map runs out of free cells.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<World, ConfigError> {
        let scenario = self.scenario;
        scenario.validate()?;
        let tiers = scenario.tier_table()?;
        let catalog = scenario.catalog();
        let mut grid = SpatialGrid::new(scenario.map.width, scenario.map.height);

        let requested = scenario.effective_town_count();
        let base_limit = tiers.warehouse_limit(Tier::One);
        let stock_range = scenario.generation.initial_stock;
        let mut towns = Vec::with_capacity(requested);

        for name in scenario.town_names.iter().take(requested) {
            let free: Vec<Position> = grid.free_cells().collect();
            let Some(&position) = free.choose(rng) else {
                break;
            };
            grid.mark_exclusion(position, scenario.map.min_distance);

            let stock: BTreeMap<_, _> = catalog
                .ids()
                .map(|id| (id, rng.gen_range(stock_range.min..=stock_range.max)))
                .collect();
            let id = TownId(towns.len() as u32);
            debug!(town = %name, x = position.x, y = position.y, "placed town");
            towns.push(Town::new(id, name.clone(), position, base_limit, stock));
        }

        if towns.len() < requested {
            warn!(
                requested,
                placed = towns.len(),
                "map ran out of free cells before all towns were placed"
            );
        }

        let generation = &scenario.generation;
        promote(&mut towns, Tier::Two, generation.tier2_towns, &tiers, rng);
        promote(&mut towns, Tier::Three, generation.tier3_towns, &tiers, rng);

        Ok(World::new(grid, towns, catalog, tiers))
    }
}

/// Promotes a random number (drawn from `range`) of distinct tier-1 towns.
/// The draw is clamped to however many tier-1 towns remain.
fn promote<R: Rng + ?Sized>(
    towns: &mut [Town],
    tier: Tier,
    range: CountRange,
    tiers: &TierTable,
    rng: &mut R,
) {
    let wanted = rng.gen_range(range.min..=range.max) as usize;
    let candidates: Vec<usize> = towns
        .iter()
        .enumerate()
        .filter(|(_, town)| town.tier() == Tier::One)
        .map(|(index, _)| index)
        .collect();
    let count = wanted.min(candidates.len());
    if count < wanted {
        warn!(%tier, wanted, available = count, "not enough tier 1 towns to promote");
    }
    let chosen: Vec<usize> = candidates.choose_multiple(rng, count).copied().collect();
    let limit = tiers.warehouse_limit(tier);
    for index in chosen {
        towns[index].promote(tier, limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngManager, WORLDGEN_STREAM};
    use std::collections::HashSet;

    fn generate(scenario: &Scenario, seed: u64) -> World {
        let mut rng = RngManager::new(seed);
        WorldGenerator::new(scenario)
            .generate(&mut rng.stream(WORLDGEN_STREAM))
            .unwrap()
    }

    fn roomy() -> Scenario {
        let mut scenario = Scenario::default();
        scenario.map.width = 60;
        scenario.map.height = 40;
        scenario.map.min_distance = 3;
        scenario.map.town_count = 8;
        scenario
    }

    #[test]
    fn places_requested_towns_at_distinct_positions() {
        let scenario = roomy();
        let world = generate(&scenario, 11);
        assert_eq!(world.town_count(), 8);
        let positions: HashSet<_> = world.towns().iter().map(|t| t.position()).collect();
        assert_eq!(positions.len(), 8);
        let names: HashSet<_> = world.towns().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn towns_keep_minimum_separation() {
        let scenario = roomy();
        let world = generate(&scenario, 5);
        let towns = world.towns();
        for (i, a) in towns.iter().enumerate() {
            for b in &towns[i + 1..] {
                let d = a.position().distance(b.position()).round();
                assert!(d > f64::from(scenario.map.min_distance));
            }
        }
    }

    #[test]
    fn tier_counts_within_configured_ranges() {
        let scenario = roomy();
        for seed in 0..20 {
            let world = generate(&scenario, seed);
            let tier2 = world.towns().iter().filter(|t| t.tier() == Tier::Two).count();
            let tier3 = world.towns().iter().filter(|t| t.tier() == Tier::Three).count();
            assert!((2..=3).contains(&tier2), "seed {seed}: {tier2} tier 2 towns");
            assert!((1..=2).contains(&tier3), "seed {seed}: {tier3} tier 3 towns");
        }
    }

    #[test]
    fn warehouse_limit_follows_tier() {
        let world = generate(&roomy(), 3);
        for town in world.towns() {
            let expected = match town.tier() {
                Tier::One => 500,
                Tier::Two => 1000,
                Tier::Three => 2000,
            };
            assert_eq!(town.warehouse_limit(), expected);
        }
    }

    #[test]
    fn initial_stock_within_range_for_every_good() {
        let scenario = roomy();
        let world = generate(&scenario, 8);
        for town in world.towns() {
            assert_eq!(town.stock_levels().count(), scenario.goods.len());
            for (_, qty) in town.stock_levels() {
                assert!((1..=500).contains(&qty));
            }
        }
    }

    #[test]
    fn promoted_towns_keep_stock_within_limit() {
        let mut scenario = roomy();
        scenario.generation.initial_stock = CountRange::new(400, 500);
        for spec in &mut scenario.tiers {
            spec.warehouse_limit = 500;
        }
        let world = generate(&scenario, 17);
        for town in world.towns() {
            for (_, qty) in town.stock_levels() {
                assert!(qty <= town.warehouse_limit());
            }
        }
    }

    #[test]
    fn crowded_map_places_fewer_towns() {
        let mut scenario = Scenario::default();
        scenario.map.width = 5;
        scenario.map.height = 5;
        scenario.map.min_distance = 8;
        let world = generate(&scenario, 1);
        assert_eq!(world.town_count(), 1);
        assert_eq!(world.grid().free_cells().count(), 0);
    }

    #[test]
    fn promotion_clamped_to_available_towns() {
        let mut scenario = roomy();
        scenario.map.town_count = 2;
        let world = generate(&scenario, 4);
        assert_eq!(world.town_count(), 2);
        // Tier 2 asks for at least two towns and takes them all.
        assert!(world.towns().iter().all(|t| t.tier() == Tier::Two));
    }

    #[test]
    fn same_seed_same_world() {
        let scenario = roomy();
        let a = generate(&scenario, 99);
        let b = generate(&scenario, 99);
        let layout = |w: &World| {
            w.towns()
                .iter()
                .map(|t| (t.position(), t.tier(), t.stock_levels().collect::<Vec<_>>()))
                .collect::<Vec<_>>()
        };
        assert_eq!(layout(&a), layout(&b));
    }
}
