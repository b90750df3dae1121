use anyhow::Result;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::caravan::{Caravan, CaravanStatus};
use crate::config::{Scenario, SellStrategyKind};
use crate::error::EngineError;
use crate::grid::Position;
use crate::rng::{RngManager, SystemRng, WORLDGEN_STREAM};
use crate::snapshot::WorldSnapshot;
use crate::systems::{MovementSystem, TradeSystem};
use crate::trade::{HoldCargo, PolicySell, SellStrategy, TradeEvent};
use crate::world::{TownId, World};
use crate::worldgen::WorldGenerator;

/// Everything the systems mutate during a tick.
pub struct Simulation {
    pub world: World,
    pub caravan: Caravan,
    pub total_visits: u64,
}

pub struct SystemContext<'a> {
    pub step: u64,
    pub scenario_name: &'a str,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        sim: &mut Simulation,
        rng: &mut SystemRng<'_>,
        report: &mut TickReport,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub step: u64,
    pub status: CaravanStatus,
    pub position: Position,
    pub arrived_at: Option<TownId>,
    pub trades: Vec<TradeEvent>,
}

impl TickReport {
    fn new(step: u64, caravan: &Caravan) -> Self {
        Self {
            step,
            status: caravan.status,
            position: caravan.position,
            arrived_at: None,
            trades: Vec::new(),
        }
    }
}

pub struct EngineBuilder<'a> {
    scenario: &'a Scenario,
    systems: Vec<Box<dyn System>>,
}

impl<'a> EngineBuilder<'a> {
    pub fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Movement followed by trading, with the scenario's sell strategy.
    pub fn with_standard_systems(self) -> Self {
        let sell: Box<dyn SellStrategy> = match self.scenario.caravan.sell_strategy {
            SellStrategyKind::Hold => Box::new(HoldCargo),
            SellStrategyKind::Policy => Box::new(PolicySell),
        };
        debug!(sell_strategy = sell.name(), "standard systems");
        self.with_system(MovementSystem::new())
            .with_system(TradeSystem::new(sell))
    }

    pub fn build(self) -> Result<Engine, EngineError> {
        let scenario = self.scenario;
        scenario.validate()?;

        let mut rng = RngManager::new(scenario.seed);
        let (world, target) = {
            let mut stream = rng.stream(WORLDGEN_STREAM);
            let world = WorldGenerator::new(scenario).generate(&mut stream)?;
            if world.town_count() < 2 {
                return Err(EngineError::TooFewTowns {
                    placed: world.town_count(),
                });
            }
            let target = TownId(stream.gen_range(0..world.town_count() as u32));
            (world, target)
        };

        let config = &scenario.caravan;
        let caravan = Caravan::new(
            config.name.clone(),
            config.money,
            config.start,
            target,
            config.capacity,
            config.trade.clone(),
        );
        info!(
            scenario = %scenario.name,
            seed = scenario.seed,
            towns = world.town_count(),
            goods = world.catalog().len(),
            "world generated"
        );

        Ok(Engine {
            sim: Simulation {
                world,
                caravan,
                total_visits: 0,
            },
            systems: self.systems,
            rng,
            step: 0,
            scenario_name: scenario.name.clone(),
        })
    }
}

pub struct Engine {
    sim: Simulation,
    systems: Vec<Box<dyn System>>,
    rng: RngManager,
    step: u64,
    scenario_name: String,
}

impl Engine {
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, EngineError> {
        EngineBuilder::new(scenario).with_standard_systems().build()
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.step += 1;
        let ctx = SystemContext {
            step: self.step,
            scenario_name: &self.scenario_name,
        };
        let mut report = TickReport::new(self.step, &self.sim.caravan);
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            system.run(&ctx, &mut self.sim, &mut rng_stream, &mut report)?;
        }

        let caravan = &self.sim.caravan;
        report.status = caravan.status;
        report.position = caravan.position;
        debug!(
            step = self.step,
            x = caravan.position.x,
            y = caravan.position.y,
            status = ?caravan.status,
            target = caravan.target.raw(),
            "tick"
        );
        Ok(report)
    }

    pub fn run(&mut self, ticks: u64) -> Result<()> {
        self.run_with_hook(ticks, |_, _| {})
    }

    /// Runs `ticks` steps, handing each tick's report and the resulting
    /// snapshot to `hook`.
    pub fn run_with_hook<F>(&mut self, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&TickReport, &WorldSnapshot),
    {
        for _ in 0..ticks {
            let report = self.tick()?;
            hook(&report, &self.snapshot());
        }
        Ok(())
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn world(&self) -> &World {
        &self.sim.world
    }

    pub fn caravan(&self) -> &Caravan {
        &self.sim.caravan
    }

    pub fn total_visits(&self) -> u64 {
        self.sim.total_visits
    }
}
