//! Request handling on top of the engine
//!
//! A [`Roster`] holds strategy factories. Every request builds fresh strategy
//! instances, validates its parameters and returns records ready to be
//! serialized for the browser.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builtin::Builtin;
use crate::game::MatchResult;
use crate::simulation::{generate_simulation, Simulation};
use crate::stats::{compute_stats, TournamentStats};
use crate::strategy::{Strategy, StrategyError};
use crate::tournament::{run_tournament, RankingEntry};
use crate::{DEFAULT_ROUNDS, DEFAULT_SIMULATION_ROUNDS};

/// Description used for strategies registered without one
pub const CUSTOM_DESCRIPTION: &str = "Custom strategy";

/// Request-level errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A tournament needs at least two strategies.
    InsufficientStrategies { found: usize },
    /// Rounds must be positive.
    InvalidRounds,
    /// No registered strategy has this name.
    UnknownStrategy(String),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::InsufficientStrategies { found } => {
                write!(f, "at least 2 strategies are required for a tournament, found {}", found)
            }
            ArenaError::InvalidRounds => write!(f, "rounds must be a positive integer"),
            ArenaError::UnknownStrategy(name) => write!(f, "strategy not found: {}", name),
        }
    }
}

impl std::error::Error for ArenaError {}

fn default_rounds() -> u32 {
    DEFAULT_ROUNDS
}

fn default_simulation_rounds() -> u32 {
    DEFAULT_SIMULATION_ROUNDS
}

/// Parameters of a tournament run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRequest {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Names to include; empty means every registered strategy
    #[serde(default)]
    pub selected_strategies: Vec<String>,
}

impl Default for TournamentRequest {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            selected_strategies: Vec::new(),
        }
    }
}

/// Parameters of a step-by-step simulation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub strategy_a: String,
    pub strategy_b: String,
    #[serde(default = "default_simulation_rounds")]
    pub rounds: u32,
}

/// Echoed configuration and timing of a tournament run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub rounds: u32,
    pub strategies_count: usize,
    /// Wall-clock milliseconds
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
}

/// Everything the browser needs to render a tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentReport {
    pub ranking: Vec<RankingEntry>,
    pub results: Vec<MatchResult>,
    pub stats: TournamentStats,
    pub config: RunConfig,
}

/// Name and description of a registered strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub name: String,
    pub description: String,
}

type Factory = Box<dyn Fn() -> Strategy>;

struct Entry {
    name: String,
    description: String,
    factory: Factory,
}

/// Registered strategies, instantiated fresh for every run
#[derive(Default)]
pub struct Roster {
    entries: Vec<Entry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A roster holding every builtin strategy
    pub fn builtin() -> Self {
        let mut roster = Self::new();
        for b in Builtin::ALL {
            roster.entries.push(Entry {
                name: b.name().to_string(),
                description: b.description().to_string(),
                factory: Box::new(move || b.strategy()),
            });
        }
        roster
    }

    /// Register a strategy factory.
    ///
    /// The factory is invoked once up front to learn and validate the
    /// strategy's name, then again for every run.
    pub fn register<F>(
        &mut self,
        description: Option<&str>,
        factory: F,
    ) -> Result<(), StrategyError>
    where
        F: Fn() -> Result<Strategy, StrategyError> + 'static,
    {
        let name = factory()?.name().to_string();
        let fallback_name = name.clone();
        let factory: Factory = Box::new(move || match factory() {
            Ok(strategy) => strategy,
            Err(err) => {
                log::warn!(
                    "strategy \"{}\" could not be rebuilt, cooperating instead: {}",
                    fallback_name,
                    err
                );
                always_cooperate(&fallback_name)
            }
        });
        self.entries.push(Entry {
            name,
            description: description.unwrap_or(CUSTOM_DESCRIPTION).to_string(),
            factory,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names and descriptions in registration order
    pub fn describe(&self) -> Vec<StrategyInfo> {
        self.entries
            .iter()
            .map(|e| StrategyInfo {
                name: e.name.clone(),
                description: e.description.clone(),
            })
            .collect()
    }

    /// Fresh instances of the selected strategies, in registration order.
    ///
    /// An empty selection instantiates everything. Unknown names in the
    /// selection are ignored.
    pub fn instantiate(&self, selected: &[String]) -> Vec<Strategy> {
        self.entries
            .iter()
            .filter(|e| selected.is_empty() || selected.iter().any(|s| *s == e.name))
            .map(|e| (e.factory)())
            .collect()
    }

    fn instantiate_one(&self, name: &str) -> Result<Strategy, ArenaError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| (e.factory)())
            .ok_or_else(|| ArenaError::UnknownStrategy(name.to_string()))
    }

    /// Run a round-robin and aggregate its statistics
    pub fn run_tournament(
        &self,
        request: &TournamentRequest,
    ) -> Result<TournamentReport, ArenaError> {
        if request.rounds == 0 {
            return Err(ArenaError::InvalidRounds);
        }
        let mut strategies = self.instantiate(&request.selected_strategies);
        if strategies.len() < 2 {
            return Err(ArenaError::InsufficientStrategies {
                found: strategies.len(),
            });
        }

        log::info!(
            "running tournament with {} strategies and {} rounds",
            strategies.len(),
            request.rounds
        );

        let stopwatch = Stopwatch::start();
        let outcome = run_tournament(&mut strategies, request.rounds);
        let execution_time_ms = stopwatch.elapsed_ms();

        let stats = compute_stats(&outcome.results, &strategies);

        Ok(TournamentReport {
            ranking: outcome.ranking,
            results: outcome.results,
            stats,
            config: RunConfig {
                rounds: request.rounds,
                strategies_count: strategies.len(),
                execution_time_ms,
            },
        })
    }

    /// Trace a single match between two registered strategies
    pub fn simulate(&self, request: &SimulationRequest) -> Result<Simulation, ArenaError> {
        if request.rounds == 0 {
            return Err(ArenaError::InvalidRounds);
        }
        let mut strategy_a = self.instantiate_one(&request.strategy_a)?;
        let mut strategy_b = self.instantiate_one(&request.strategy_b)?;

        Ok(generate_simulation(&mut strategy_a, &mut strategy_b, request.rounds))
    }
}

/// Stand-in for a strategy whose factory failed after registration
fn always_cooperate(name: &str) -> Strategy {
    Strategy {
        name: name.to_string(),
        decider: Box::new(Builtin::AlwaysCooperate),
    }
}

/// Wall-clock timer; `Instant` is unavailable in the browser
#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
struct Stopwatch(std::time::Instant);

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
impl Stopwatch {
    fn start() -> Self {
        Self(std::time::Instant::now())
    }

    fn elapsed_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
struct Stopwatch(f64);

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl Stopwatch {
    fn start() -> Self {
        Self(js_sys::Date::now())
    }

    fn elapsed_ms(&self) -> u64 {
        (js_sys::Date::now() - self.0).max(0.0) as u64
    }
}
