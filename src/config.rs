use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::caravan::TradePolicy;
use crate::clock::Speed;
use crate::error::ConfigError;
use crate::goods::{Good, GoodId, GoodsCatalog};
use crate::grid::Position;
use crate::world::{Tier, TierSpec, TierTable};

const NATO_ALPHABET: [&str; 26] = [
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliet",
    "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo", "Sierra", "Tango",
    "Uniform", "Victor", "Whiskey", "X-ray", "Yankee", "Zulu",
];

fn default_scenario_name() -> String {
    "default".to_string()
}

fn default_tiers() -> Vec<TierSpec> {
    vec![
        TierSpec {
            tier: Tier::One,
            warehouse_limit: 500,
            color: "red".into(),
        },
        TierSpec {
            tier: Tier::Two,
            warehouse_limit: 1000,
            color: "orange".into(),
        },
        TierSpec {
            tier: Tier::Three,
            warehouse_limit: 2000,
            color: "green".into(),
        },
    ]
}

fn basic_good(
    id: u32,
    name: &str,
    unit: &str,
    band: (f64, f64),
    volume: f64,
    weight: f64,
) -> Good {
    Good {
        id: GoodId(id),
        tier: Tier::One,
        name: name.to_string(),
        unit: unit.to_string(),
        price_min: band.0,
        price_max: band.1,
        unit_volume: volume,
        unit_weight: weight,
        inputs: Vec::new(),
    }
}

fn default_goods() -> Vec<Good> {
    vec![
        basic_good(1, "Grain", "sack", (2.0, 10.0), 0.036, 0.050),
        basic_good(2, "Wood", "cubic metre", (5.0, 20.0), 1.0, 0.640),
        basic_good(3, "Stone", "cubic metre", (4.0, 18.0), 1.0, 1.7),
        basic_good(4, "Ore", "ton", (9.0, 30.0), 0.5, 1.0),
    ]
}

fn default_town_names() -> Vec<String> {
    NATO_ALPHABET.iter().map(|name| name.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_scenario_name")]
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierSpec>,
    #[serde(default = "default_goods")]
    pub goods: Vec<Good>,
    #[serde(default = "default_town_names")]
    pub town_names: Vec<String>,
    #[serde(default)]
    pub caravan: CaravanConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    /// Exclusion radius around every placed town.
    pub min_distance: u32,
    pub town_count: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 15,
            min_distance: 5,
            town_count: 26,
        }
    }
}

/// Inclusive `[min, max]` range for uniform draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "GenerationConfig::default_initial_stock")]
    pub initial_stock: CountRange,
    #[serde(default = "GenerationConfig::default_tier2_towns")]
    pub tier2_towns: CountRange,
    #[serde(default = "GenerationConfig::default_tier3_towns")]
    pub tier3_towns: CountRange,
}

impl GenerationConfig {
    fn default_initial_stock() -> CountRange {
        CountRange::new(1, 500)
    }

    fn default_tier2_towns() -> CountRange {
        CountRange::new(2, 3)
    }

    fn default_tier3_towns() -> CountRange {
        CountRange::new(1, 2)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            initial_stock: Self::default_initial_stock(),
            tier2_towns: Self::default_tier2_towns(),
            tier3_towns: Self::default_tier3_towns(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellStrategyKind {
    /// Keep all cargo.
    #[default]
    Hold,
    /// Sell lots whose current price clears the trade policy floor.
    Policy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaravanConfig {
    pub name: String,
    pub money: f64,
    pub capacity: u32,
    pub start: Position,
    pub trade: TradePolicy,
    pub sell_strategy: SellStrategyKind,
}

impl Default for CaravanConfig {
    fn default() -> Self {
        Self {
            name: "Caravan".to_string(),
            money: 1000.0,
            capacity: 100,
            start: Position::new(1, 1),
            trade: TradePolicy::default(),
            sell_strategy: SellStrategyKind::Hold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "ClockConfig::default_base_interval_ms")]
    pub base_interval_ms: u64,
    #[serde(default)]
    pub speed: Speed,
}

impl ClockConfig {
    fn default_base_interval_ms() -> u64 {
        1000
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: Self::default_base_interval_ms(),
            speed: Speed::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: default_scenario_name(),
            seed: 0,
            map: MapConfig::default(),
            generation: GenerationConfig::default(),
            tiers: default_tiers(),
            goods: default_goods(),
            town_names: default_town_names(),
            caravan: CaravanConfig::default(),
            clock: ClockConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Scenario {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let scenario: Scenario =
            serde_yaml::from_str(text).context("Failed to parse scenario YAML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(ConfigError::EmptyMap {
                width: self.map.width,
                height: self.map.height,
            });
        }

        if self.goods.is_empty() {
            return Err(ConfigError::NoGoods);
        }
        let mut seen = BTreeSet::new();
        for good in &self.goods {
            if !seen.insert(good.id) {
                return Err(ConfigError::DuplicateGood(good.id.raw()));
            }
            if !(good.price_min.is_finite() && good.price_min >= 0.0) {
                return Err(ConfigError::NegativePrice {
                    name: good.name.clone(),
                });
            }
            if !(good.price_max.is_finite() && good.price_min <= good.price_max) {
                return Err(ConfigError::InvertedPriceBand {
                    name: good.name.clone(),
                    min: good.price_min,
                    max: good.price_max,
                });
            }
        }

        self.generation
            .initial_stock
            .check("generation.initial_stock")?;
        self.generation.tier2_towns.check("generation.tier2_towns")?;
        self.generation.tier3_towns.check("generation.tier3_towns")?;

        for tier in Tier::ALL {
            match self.tiers.iter().find(|spec| spec.tier == tier) {
                None => return Err(ConfigError::MissingTier(tier.level())),
                Some(spec) if spec.warehouse_limit == 0 => {
                    return Err(ConfigError::ZeroWarehouseLimit(tier.level()))
                }
                Some(_) => {}
            }
        }
        // Promotion keeps stock, so every tier must hold the largest initial draw.
        let max_stock = self.generation.initial_stock.max;
        if let Some(spec) = self
            .tiers
            .iter()
            .find(|spec| spec.warehouse_limit < max_stock)
        {
            return Err(ConfigError::StockAboveLimit {
                tier: spec.tier.level(),
                max: max_stock,
                limit: spec.warehouse_limit,
            });
        }

        if self.town_names.len() < 2 {
            return Err(ConfigError::TooFewTownNames(self.town_names.len()));
        }

        if self.caravan.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(self.caravan.money.is_finite() && self.caravan.money >= 0.0) {
            return Err(ConfigError::InvalidMoney(self.caravan.money));
        }
        for (field, value) in self.caravan.trade.fractions() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::PolicyOutOfRange { field, value });
            }
        }
        let start = self.caravan.start;
        let inside = start.x >= 0
            && start.y >= 0
            && (start.x as u32) < self.map.width
            && (start.y as u32) < self.map.height;
        if !inside {
            return Err(ConfigError::StartOutsideMap {
                x: start.x,
                y: start.y,
            });
        }

        if self.clock.base_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn catalog(&self) -> GoodsCatalog {
        GoodsCatalog::new(self.goods.iter().cloned())
    }

    pub fn tier_table(&self) -> Result<TierTable, ConfigError> {
        TierTable::from_specs(&self.tiers).ok_or_else(|| {
            let missing = Tier::ALL
                .into_iter()
                .find(|tier| self.tiers.iter().all(|spec| spec.tier != *tier))
                .unwrap_or(Tier::One);
            ConfigError::MissingTier(missing.level())
        })
    }

    /// Town count actually attempted: the request capped by available names.
    pub fn effective_town_count(&self) -> usize {
        self.map.town_count.min(self.town_names.len())
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}
