//! Real-time driver: ticks the engine on a tokio interval and takes
//! pause/speed/shutdown commands over a channel.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::info;

use crate::config::ClockConfig;
use crate::engine::{Engine, TickReport};
use crate::snapshot::WorldSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Speed {
    #[default]
    X1,
    X2,
    X4,
    X8,
}

impl Speed {
    pub const ALL: [Speed; 4] = [Speed::X1, Speed::X2, Speed::X4, Speed::X8];

    pub fn multiplier(self) -> u32 {
        match self {
            Speed::X1 => 1,
            Speed::X2 => 2,
            Speed::X4 => 4,
            Speed::X8 => 8,
        }
    }
}

impl TryFrom<u32> for Speed {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Speed::ALL
            .into_iter()
            .find(|speed| speed.multiplier() == value)
            .ok_or_else(|| format!("speed must be 1, 2, 4 or 8, got {value}"))
    }
}

impl From<Speed> for u32 {
    fn from(speed: Speed) -> Self {
        speed.multiplier()
    }
}

impl FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .trim_start_matches(['x', 'X'])
            .parse()
            .map_err(|_| format!("invalid speed '{s}'"))?;
        Speed::try_from(value)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.multiplier())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    pub paused: bool,
    pub speed: Speed,
    pub base_interval: Duration,
}

impl ClockState {
    pub fn new(base_interval: Duration, speed: Speed) -> Self {
        Self {
            paused: false,
            speed,
            base_interval,
        }
    }

    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(Duration::from_millis(config.base_interval_ms), config.speed)
    }

    /// Wall-clock time between steps at the current speed.
    pub fn interval(&self) -> Duration {
        self.base_interval / self.speed.multiplier()
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCommand {
    TogglePause,
    SetSpeed(Speed),
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct ClockHandle {
    commands: mpsc::Sender<ClockCommand>,
}

impl ClockHandle {
    pub async fn toggle_pause(&self) -> Result<()> {
        self.send(ClockCommand::TogglePause).await
    }

    pub async fn set_speed(&self, speed: Speed) -> Result<()> {
        self.send(ClockCommand::SetSpeed(speed)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(ClockCommand::Shutdown).await
    }

    async fn send(&self, command: ClockCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("simulation clock has stopped"))
    }
}

/// Owns the engine while running. Steps happen once per interval unless
/// paused; commands are handled between steps.
pub struct SimulationClock {
    engine: Engine,
    state: ClockState,
    commands: mpsc::Receiver<ClockCommand>,
}

impl SimulationClock {
    pub fn new(engine: Engine, state: ClockState) -> (Self, ClockHandle) {
        let (tx, rx) = mpsc::channel(16);
        let clock = Self {
            engine,
            state,
            commands: rx,
        };
        (clock, ClockHandle { commands: tx })
    }

    /// Runs until shutdown is requested or every handle is dropped, then
    /// hands the engine back. `redraw` sees each step's report and snapshot.
    pub async fn run<F>(self, mut redraw: F) -> Result<Engine>
    where
        F: FnMut(&TickReport, &WorldSnapshot),
    {
        let SimulationClock {
            mut engine,
            mut state,
            mut commands,
        } = self;
        let mut ticker = arm(state.interval());
        info!(
            speed = %state.speed,
            interval_ms = state.interval().as_millis() as u64,
            "clock started"
        );

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ClockCommand::TogglePause) => {
                        state.toggle_pause();
                        if !state.paused {
                            ticker = arm(state.interval());
                        }
                        info!(paused = state.paused, step = engine.step(), "pause toggled");
                    }
                    Some(ClockCommand::SetSpeed(speed)) => {
                        state.set_speed(speed);
                        ticker = arm(state.interval());
                        info!(%speed, "speed changed");
                    }
                    Some(ClockCommand::Shutdown) | None => break,
                },
                _ = ticker.tick(), if !state.paused => {
                    let report = engine.tick()?;
                    let mut snapshot = engine.snapshot();
                    snapshot.paused = state.paused;
                    redraw(&report, &snapshot);
                }
            }
        }

        info!(step = engine.step(), "clock stopped");
        Ok(engine)
    }
}

/// An interval whose first tick is one full period away.
fn arm(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_scales_with_speed() {
        let mut state = ClockState::new(Duration::from_secs(1), Speed::X1);
        assert_eq!(state.interval(), Duration::from_secs(1));
        state.set_speed(Speed::X4);
        assert_eq!(state.interval(), Duration::from_millis(250));
        state.set_speed(Speed::X8);
        assert_eq!(state.interval(), Duration::from_millis(125));
    }

    #[test]
    fn speed_change_keeps_pause() {
        let mut state = ClockState::new(Duration::from_secs(1), Speed::X1);
        state.toggle_pause();
        state.set_speed(Speed::X2);
        assert!(state.paused);
        state.toggle_pause();
        assert!(!state.paused);
        assert_eq!(state.speed, Speed::X2);
    }

    #[test]
    fn speed_parses_from_cli_and_yaml() {
        assert_eq!("4".parse::<Speed>().unwrap(), Speed::X4);
        assert_eq!("x8".parse::<Speed>().unwrap(), Speed::X8);
        assert!("3".parse::<Speed>().is_err());
        let speed: Speed = serde_yaml::from_str("2").unwrap();
        assert_eq!(speed, Speed::X2);
        assert!(serde_yaml::from_str::<Speed>("5").is_err());
    }
}
