use anyhow::{anyhow, Result};
use tracing::info;

use crate::{
    caravan::CaravanStatus,
    engine::{Simulation, System, SystemContext, TickReport},
    navigator,
    rng::SystemRng,
    trade,
};

/// Walks the caravan one cell towards its target. On arrival the town's
/// visit counter is bumped and a new destination is drawn.
pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        sim: &mut Simulation,
        rng: &mut SystemRng<'_>,
        report: &mut TickReport,
    ) -> Result<()> {
        let caravan = &mut sim.caravan;
        let target_id = caravan.target;
        let town = sim
            .world
            .town_mut(target_id)
            .ok_or_else(|| anyhow!("caravan target {} is not a town", target_id.raw()))?;

        caravan.position = navigator::step(caravan.position, town.position());
        if caravan.position != town.position() {
            caravan.status = CaravanStatus::Moving;
            return Ok(());
        }

        caravan.status = CaravanStatus::InTown;
        town.record_visit();
        sim.total_visits += 1;
        report.arrived_at = Some(target_id);
        info!(
            scenario = ctx.scenario_name,
            step = ctx.step,
            caravan = %caravan.name,
            town = town.name(),
            visits = town.visits(),
            "arrived"
        );

        if let Some(next) = trade::select_destination(caravan, &sim.world, rng) {
            let name = sim.world.town(next).map(|t| t.name()).unwrap_or("?");
            info!(step = ctx.step, destination = name, "new destination");
        }
        Ok(())
    }
}
