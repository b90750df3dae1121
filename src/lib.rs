pub mod caravan;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod goods;
pub mod grid;
pub mod navigator;
pub mod pricing;
pub mod rng;
pub mod snapshot;
pub mod systems;
pub mod trade;
pub mod world;
pub mod worldgen;

pub use config::{Scenario, ScenarioLoader};
pub use engine::{Engine, EngineBuilder, TickReport};
pub use error::{ConfigError, EngineError};
pub use snapshot::WorldSnapshot;
