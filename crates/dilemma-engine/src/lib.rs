//! Dilemma Engine
//!
//! Match, tournament and statistics engine for Iterated Prisoner's Dilemma
//! contests between pluggable strategies.
//! This crate is compiled to:
//! - Native (for servers and tooling)
//! - WASM (for in-browser tournaments and match playback)

mod arena;
mod builtin;
mod game;
mod pairing;
mod simulation;
mod stats;
mod strategy;
mod tournament;

#[cfg(feature = "wasm")]
mod wasm;

pub use arena::{
    ArenaError, Roster, RunConfig, SimulationRequest, StrategyInfo, TournamentReport,
    TournamentRequest, CUSTOM_DESCRIPTION,
};
pub use builtin::Builtin;
pub use game::{play_match, MatchResult, Verdict};
pub use pairing::{match_count, round_robin_pairs};
pub use simulation::{generate_simulation, FinalScores, Outcome, RoundStep, Simulation};
pub use stats::{compute_stats, compute_stats_for_names, StrategyStats, TournamentStats};
pub use strategy::{
    cooperation_fraction, render_history, Decide, DecisionFailure, IntoDecision, Move, Strategy,
    StrategyError,
};
pub use tournament::{run_tournament, RankingEntry, TournamentResult};

/// Rounds per match when the caller does not say otherwise
pub const DEFAULT_ROUNDS: u32 = 100;

/// Rounds for step-by-step playback when the caller does not say otherwise
pub const DEFAULT_SIMULATION_ROUNDS: u32 = 20;

/// Payoff matrix for the Prisoner's Dilemma
/// Returns (score_a, score_b)
pub fn payoff(a: Move, b: Move) -> (u8, u8) {
    match (a, b) {
        (Move::Cooperate, Move::Cooperate) => (3, 3),
        (Move::Cooperate, Move::Defect) => (0, 5),
        (Move::Defect, Move::Cooperate) => (5, 0),
        (Move::Defect, Move::Defect) => (1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoff_matrix() {
        assert_eq!(payoff(Move::Cooperate, Move::Cooperate), (3, 3));
        assert_eq!(payoff(Move::Cooperate, Move::Defect), (0, 5));
        assert_eq!(payoff(Move::Defect, Move::Cooperate), (5, 0));
        assert_eq!(payoff(Move::Defect, Move::Defect), (1, 1));
    }

    #[test]
    fn test_end_to_end_tournament() {
        let mut strategies = vec![
            Builtin::TitForTat.strategy(),
            Builtin::AlwaysDefect.strategy(),
            Strategy::from_fn("Alternator", |own: &[Move], _: &[Move]| {
                if own.len() % 2 == 0 {
                    'C'
                } else {
                    'D'
                }
            })
            .unwrap(),
        ];

        let outcome = run_tournament(&mut strategies, DEFAULT_ROUNDS);
        let stats = compute_stats(&outcome.results, &strategies);

        assert_eq!(outcome.results.len(), match_count(strategies.len()));
        for result in &outcome.results {
            assert_eq!(result.rounds(), DEFAULT_ROUNDS as usize);
        }
        assert_eq!(stats.strategies_stats.len(), 3);
        let alternator = stats.strategy("Alternator").unwrap();
        assert!((alternator.cooperation_rate - 0.5).abs() < 1e-9);
        assert_eq!(alternator.matches, 2);
        assert!(stats.cooperation_rate > 0.0 && stats.cooperation_rate < 1.0);
    }
}
