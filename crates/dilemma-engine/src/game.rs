//! Match execution engine

use serde::{Deserialize, Serialize};

use crate::payoff;
use crate::strategy::{cooperation_fraction, Move, Strategy};

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub strategy_a: String,
    pub strategy_b: String,
    pub score_a: u64,
    pub score_b: u64,
    pub history_a: Vec<Move>,
    pub history_b: Vec<Move>,
}

/// Which side came out ahead in a match
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    AWins,
    BWins,
    Tie,
}

impl MatchResult {
    /// Number of rounds played
    pub fn rounds(&self) -> usize {
        self.history_a.len()
    }

    pub fn verdict(&self) -> Verdict {
        match self.score_a.cmp(&self.score_b) {
            std::cmp::Ordering::Greater => Verdict::AWins,
            std::cmp::Ordering::Less => Verdict::BWins,
            std::cmp::Ordering::Equal => Verdict::Tie,
        }
    }

    /// Fraction of side A's moves that were Cooperate
    pub fn cooperation_rate_a(&self) -> f64 {
        cooperation_fraction(&self.history_a)
    }

    /// Fraction of side B's moves that were Cooperate
    pub fn cooperation_rate_b(&self) -> f64 {
        cooperation_fraction(&self.history_b)
    }
}

/// Query both strategies for one round.
///
/// Each side sees the histories as they stood before this round, so neither
/// sees the other's current move.
pub(crate) fn play_round(
    strategy_a: &mut Strategy,
    strategy_b: &mut Strategy,
    history_a: &[Move],
    history_b: &[Move],
) -> (Move, Move) {
    let move_a = strategy_a.next_move(history_a, history_b);
    let move_b = strategy_b.next_move(history_b, history_a);
    (move_a, move_b)
}

/// Run a complete match between two strategies
///
/// # Arguments
/// * `strategy_a` - First player's strategy
/// * `strategy_b` - Second player's strategy
/// * `rounds` - Number of rounds to play
///
/// # Returns
/// Final scores and both full move histories
pub fn play_match(
    strategy_a: &mut Strategy,
    strategy_b: &mut Strategy,
    rounds: u32,
) -> MatchResult {
    strategy_a.reset();
    strategy_b.reset();

    let mut history_a: Vec<Move> = Vec::with_capacity(rounds as usize);
    let mut history_b: Vec<Move> = Vec::with_capacity(rounds as usize);
    let mut total_a = 0u64;
    let mut total_b = 0u64;

    for _ in 0..rounds {
        let (move_a, move_b) = play_round(strategy_a, strategy_b, &history_a, &history_b);

        let (score_a, score_b) = payoff(move_a, move_b);
        total_a += score_a as u64;
        total_b += score_b as u64;

        history_a.push(move_a);
        history_b.push(move_b);
    }

    log::debug!(
        "match {} vs {}: {}-{} over {} rounds",
        strategy_a.name(),
        strategy_b.name(),
        total_a,
        total_b,
        rounds
    );

    MatchResult {
        strategy_a: strategy_a.name().to_string(),
        strategy_b: strategy_b.name().to_string(),
        score_a: total_a,
        score_b: total_b,
        history_a,
        history_b,
    }
}
