use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use caravan_sim::{
    clock::{ClockState, SimulationClock, Speed},
    config::{Scenario, ScenarioLoader},
    engine::{Engine, TickReport},
    snapshot::WorldSnapshot,
    trade::TradeKind,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Single trading caravan simulation")]
struct Cli {
    /// Path to the scenario YAML file (built-in defaults when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many steps without the real-time clock and print the final
    /// snapshot as JSON
    #[arg(long)]
    ticks: Option<u64>,

    /// Clock speed multiplier: 1, 2, 4 or 8
    #[arg(long)]
    speed: Option<Speed>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::default(),
    };
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(speed) = cli.speed {
        scenario.clock.speed = speed;
    }

    init_tracing(&scenario.logging.level, cli.ticks.is_some());
    let mut engine = Engine::from_scenario(&scenario)?;

    match cli.ticks {
        Some(ticks) => {
            engine.run(ticks)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        None => run_realtime(engine, &scenario).await?,
    }
    Ok(())
}

/// `RUST_LOG` wins over the scenario's level. Headless runs log to stderr so
/// stdout stays valid JSON.
fn init_tracing(level: &str, headless: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if headless {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
}

async fn run_realtime(engine: Engine, scenario: &Scenario) -> Result<()> {
    let (clock, handle) = SimulationClock::new(engine, ClockState::from_config(&scenario.clock));
    let mut task = tokio::spawn(clock.run(|report, snapshot| {
        println!("{}", status_line(report, snapshot));
    }));

    tokio::select! {
        finished = &mut task => {
            finished??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupt received, stopping clock");
            handle.shutdown().await?;
            let engine = task.await??;
            info!(
                steps = engine.step(),
                visits = engine.total_visits(),
                money = engine.caravan().money,
                "simulation stopped"
            );
        }
    }
    Ok(())
}

fn status_line(report: &TickReport, snapshot: &WorldSnapshot) -> String {
    let caravan = &snapshot.caravan;
    let target = snapshot
        .town(caravan.target)
        .map(|t| t.name.as_str())
        .unwrap_or("?");
    let mut line = format!(
        "[{:>5}] {:?} at ({}, {}) -> {} | money {:.2} | cargo {}/{}",
        report.step,
        caravan.status,
        caravan.x,
        caravan.y,
        target,
        caravan.money,
        caravan.load,
        caravan.capacity
    );
    for trade in &report.trades {
        let town = snapshot.town(trade.town).map(|t| t.name.as_str()).unwrap_or("?");
        let good = snapshot
            .town(trade.town)
            .and_then(|t| t.goods.iter().find(|g| g.good == trade.good))
            .map(|g| g.name.as_str())
            .unwrap_or("?");
        let verb = match trade.kind {
            TradeKind::Buy => "bought",
            TradeKind::Sell => "sold",
        };
        line.push_str(&format!(
            " | {verb} {} {good} @ {:.2} in {town}",
            trade.quantity, trade.unit_price
        ));
    }
    line
}
