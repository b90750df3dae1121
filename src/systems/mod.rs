mod movement;
mod trading;

pub use movement::MovementSystem;
pub use trading::TradeSystem;
