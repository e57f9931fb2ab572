//! Round-robin tournament scheduling and ranking

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::{play_match, MatchResult};
use crate::pairing::{match_count, pair_mut, round_robin_pairs};
use crate::strategy::Strategy;

/// A strategy's cumulative score across every match it played
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u64,
}

/// Outcome of a full round-robin
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    /// Matches in pair-enumeration order
    pub results: Vec<MatchResult>,
    /// Sorted by descending score; ties keep first-seen order
    pub ranking: Vec<RankingEntry>,
}

impl TournamentResult {
    /// The final match played, handy for quick inspection
    pub fn last_match(&self) -> Option<&MatchResult> {
        self.results.last()
    }
}

/// Play every unordered pair of `strategies` once.
///
/// Strategies sharing a name share a ranking entry. With fewer than two
/// strategies no match is played.
pub fn run_tournament(strategies: &mut [Strategy], rounds_per_match: u32) -> TournamentResult {
    let n = strategies.len();
    log::debug!(
        "round-robin: {} strategies, {} matches of {} rounds",
        n,
        match_count(n),
        rounds_per_match
    );

    let mut totals = ScoreBoard::new(strategies.iter().map(Strategy::name));
    let mut results = Vec::with_capacity(match_count(n));

    for (i, j) in round_robin_pairs(n) {
        let (strategy_a, strategy_b) = pair_mut(strategies, i, j);
        let result = play_match(strategy_a, strategy_b, rounds_per_match);

        totals.add(&result.strategy_a, result.score_a);
        totals.add(&result.strategy_b, result.score_b);
        results.push(result);
    }
    log::debug!("round-robin finished: {} matches played", results.len());

    TournamentResult {
        results,
        ranking: totals.into_ranking(),
    }
}

/// Running totals keyed by name, remembering first-seen order
struct ScoreBoard {
    entries: Vec<RankingEntry>,
    index: HashMap<String, usize>,
}

impl ScoreBoard {
    fn new<'a>(names: impl Iterator<Item = &'a str>) -> Self {
        let mut board = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for name in names {
            board.add(name, 0);
        }
        board
    }

    fn add(&mut self, name: &str, score: u64) {
        match self.index.get(name) {
            Some(&idx) => self.entries[idx].score += score,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push(RankingEntry {
                    name: name.to_string(),
                    score,
                });
            }
        }
    }

    fn into_ranking(mut self) -> Vec<RankingEntry> {
        // sort_by is stable: equal scores keep first-seen order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries
    }
}
