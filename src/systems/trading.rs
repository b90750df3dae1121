use anyhow::Result;
use tracing::info;

use crate::{
    engine::{Simulation, System, SystemContext, TickReport},
    rng::SystemRng,
    trade::{self, SellStrategy, TradeEvent, TradeKind},
    world::World,
};

/// Sells through the configured strategy, then buys the cheapest good. Only
/// acts on ticks where the caravan is in town.
pub struct TradeSystem {
    sell: Box<dyn SellStrategy>,
}

impl TradeSystem {
    pub fn new(sell: Box<dyn SellStrategy>) -> Self {
        Self { sell }
    }
}

impl System for TradeSystem {
    fn name(&self) -> &str {
        "trade"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        sim: &mut Simulation,
        _rng: &mut SystemRng<'_>,
        report: &mut TickReport,
    ) -> Result<()> {
        if trade::trading_town(&sim.caravan).is_none() {
            return Ok(());
        }

        let sold = self.sell.sell(ctx.step, &mut sim.world, &mut sim.caravan);
        for event in &sold {
            log_trade(&sim.world, event, sim.caravan.money);
        }
        report.trades.extend(sold);

        let bought = trade::buy_for_best_price(ctx.step, &mut sim.world, &mut sim.caravan);
        if let Some(event) = bought {
            log_trade(&sim.world, &event, sim.caravan.money);
            report.trades.push(event);
        }
        Ok(())
    }
}

fn log_trade(world: &World, event: &TradeEvent, money: f64) {
    let town = world.town(event.town).map(|t| t.name()).unwrap_or("?");
    let good = world
        .catalog()
        .get(event.good)
        .map(|g| g.name.as_str())
        .unwrap_or("?");
    let action = match event.kind {
        TradeKind::Buy => "bought",
        TradeKind::Sell => "sold",
    };
    info!(
        step = event.step,
        town,
        good,
        quantity = event.quantity,
        unit_price = event.unit_price,
        money,
        "{action}"
    );
}
