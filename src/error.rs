use thiserror::Error;

/// Scenario values the simulation cannot run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("map must be at least 1x1, got {width}x{height}")]
    EmptyMap { width: u32, height: u32 },
    #[error("goods catalog is empty")]
    NoGoods,
    #[error("good id {0} defined more than once")]
    DuplicateGood(u32),
    #[error("good '{name}' has price_min {min} above price_max {max}")]
    InvertedPriceBand { name: String, min: f64, max: f64 },
    #[error("good '{name}' has a negative price_min")]
    NegativePrice { name: String },
    #[error("range '{field}' is inverted: {min} > {max}")]
    InvertedRange {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("tier {0} is missing from the tier table")]
    MissingTier(u8),
    #[error("tier {0} has a zero warehouse limit")]
    ZeroWarehouseLimit(u8),
    #[error("initial stock up to {max} exceeds the tier {tier} warehouse limit {limit}")]
    StockAboveLimit { tier: u8, max: u32, limit: u32 },
    #[error("at least two town names are required, got {0}")]
    TooFewTownNames(usize),
    #[error("caravan capacity must be greater than zero")]
    ZeroCapacity,
    #[error("caravan money must be a non-negative number, got {0}")]
    InvalidMoney(f64),
    #[error("trade policy field '{field}' must lie in [0, 1], got {value}")]
    PolicyOutOfRange { field: &'static str, value: f64 },
    #[error("caravan start ({x}, {y}) lies outside the map")]
    StartOutsideMap { x: i32, y: i32 },
    #[error("clock base interval must be greater than zero")]
    ZeroInterval,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Destination selection needs somewhere other than the current target.
    #[error("world generation placed {placed} town(s); at least two are required")]
    TooFewTowns { placed: usize },
}
