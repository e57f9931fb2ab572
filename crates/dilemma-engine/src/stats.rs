//! Tournament statistics aggregation
//!
//! A single pass over match results produces per-strategy tallies and
//! global cooperation figures. Every rate is guarded so that empty inputs
//! report 0 rather than NaN.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::{MatchResult, Verdict};
use crate::strategy::Strategy;

/// Per-strategy tallies
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyStats {
    /// Carried as the map key when serialized
    #[serde(skip)]
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub total_score: u64,
    /// Running mean of per-match cooperation fractions
    pub cooperation_rate: f64,
    pub matches: u32,
}

impl StrategyStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wins: 0,
            losses: 0,
            ties: 0,
            total_score: 0,
            cooperation_rate: 0.0,
            matches: 0,
        }
    }

    /// Fold one match into this record from the strategy's point of view
    fn record(&mut self, score: u64, match_rate: f64) {
        self.matches += 1;
        self.total_score += score;
        let n = self.matches as f64;
        self.cooperation_rate = (self.cooperation_rate * (n - 1.0) + match_rate) / n;
    }
}

/// Aggregate figures for a set of matches
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentStats {
    pub total_matches: u32,
    /// Rounds summed over every match
    pub total_rounds: u64,
    pub cooperation_rate: f64,
    pub defection_rate: f64,
    /// One entry per distinct strategy name, in input order. Serialized as
    /// an object keyed by name.
    #[serde(with = "by_name")]
    pub strategies_stats: Vec<StrategyStats>,
}

impl TournamentStats {
    /// Look up a strategy's record by name
    pub fn strategy(&self, name: &str) -> Option<&StrategyStats> {
        self.strategies_stats.iter().find(|s| s.name == name)
    }
}

/// Compute statistics over `results` for the given `strategies`.
///
/// Every strategy gets a zeroed record even if it played no match. Names
/// that appear in `results` without a matching strategy are appended.
pub fn compute_stats(results: &[MatchResult], strategies: &[Strategy]) -> TournamentStats {
    compute_stats_for_names(results, strategies.iter().map(Strategy::name))
}

/// Same as [`compute_stats`], keyed directly by strategy names
pub fn compute_stats_for_names<'a>(
    results: &[MatchResult],
    names: impl IntoIterator<Item = &'a str>,
) -> TournamentStats {
    let mut table = StatsTable::default();
    for name in names {
        table.entry(name);
    }

    let mut total_moves = 0u64;
    let mut total_cooperations = 0u64;
    let mut total_rounds = 0u64;

    for result in results {
        let coop_a = result.history_a.iter().filter(|m| m.is_cooperate()).count() as u64;
        let coop_b = result.history_b.iter().filter(|m| m.is_cooperate()).count() as u64;
        total_moves += (result.history_a.len() + result.history_b.len()) as u64;
        total_cooperations += coop_a + coop_b;
        total_rounds += result.rounds() as u64;

        table
            .entry(&result.strategy_a)
            .record(result.score_a, result.cooperation_rate_a());
        table
            .entry(&result.strategy_b)
            .record(result.score_b, result.cooperation_rate_b());

        match result.verdict() {
            Verdict::AWins => {
                table.entry(&result.strategy_a).wins += 1;
                table.entry(&result.strategy_b).losses += 1;
            }
            Verdict::BWins => {
                table.entry(&result.strategy_b).wins += 1;
                table.entry(&result.strategy_a).losses += 1;
            }
            Verdict::Tie => {
                table.entry(&result.strategy_a).ties += 1;
                table.entry(&result.strategy_b).ties += 1;
            }
        }
    }

    let (cooperation_rate, defection_rate) = if total_moves == 0 {
        (0.0, 0.0)
    } else {
        let rate = total_cooperations as f64 / total_moves as f64;
        (rate, 1.0 - rate)
    };

    TournamentStats {
        total_matches: results.len() as u32,
        total_rounds,
        cooperation_rate,
        defection_rate,
        strategies_stats: table.rows,
    }
}

/// Writes records as `{name: record}` keeping their order, and reads them
/// back in document order.
mod by_name {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::StrategyStats;

    pub fn serialize<S: Serializer>(
        rows: &[StrategyStats],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(rows.len()))?;
        for row in rows {
            map.serialize_entry(&row.name, row)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<StrategyStats>, D::Error> {
        deserializer.deserialize_map(RowsVisitor)
    }

    struct RowsVisitor;

    impl<'de> Visitor<'de> for RowsVisitor {
        type Value = Vec<StrategyStats>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of strategy name to statistics")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut rows = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, mut row)) = access.next_entry::<String, StrategyStats>()? {
                row.name = name;
                rows.push(row);
            }
            Ok(rows)
        }
    }
}

/// Insertion-ordered records with name lookup
#[derive(Default)]
struct StatsTable {
    rows: Vec<StrategyStats>,
    index: HashMap<String, usize>,
}

impl StatsTable {
    fn entry(&mut self, name: &str) -> &mut StrategyStats {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.rows.len();
                self.index.insert(name.to_string(), idx);
                self.rows.push(StrategyStats::new(name));
                idx
            }
        };
        &mut self.rows[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::Builtin;
    use crate::strategy::Move;
    use crate::tournament::run_tournament;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn result(a: &str, b: &str, history_a: &str, history_b: &str) -> MatchResult {
        let parse = |s: &str| -> Vec<Move> {
            s.chars().map(|c| Move::try_from(c).unwrap()).collect()
        };
        let history_a = parse(history_a);
        let history_b = parse(history_b);
        let (mut score_a, mut score_b) = (0u64, 0u64);
        for (ma, mb) in history_a.iter().zip(&history_b) {
            let (pa, pb) = crate::payoff(*ma, *mb);
            score_a += pa as u64;
            score_b += pb as u64;
        }
        MatchResult {
            strategy_a: a.to_string(),
            strategy_b: b.to_string(),
            score_a,
            score_b,
            history_a,
            history_b,
        }
    }

    #[test]
    fn test_empty_results() {
        let stats = compute_stats(&[], &[]);

        assert_eq!(stats.total_matches, 0);
        assert_eq!(stats.total_rounds, 0);
        assert_eq!(stats.cooperation_rate, 0.0);
        assert_eq!(stats.defection_rate, 0.0);
        assert!(stats.strategies_stats.is_empty());
    }

    #[test]
    fn test_unplayed_strategies_are_zeroed() {
        let strategies = vec![Builtin::TitForTat.strategy(), Builtin::Random.strategy()];

        let stats = compute_stats(&[], &strategies);

        assert_eq!(stats.strategies_stats.len(), 2);
        let tft = stats.strategy("Tit for Tat").unwrap();
        assert_eq!(tft.matches, 0);
        assert_eq!(tft.cooperation_rate, 0.0);
        assert_eq!(stats.cooperation_rate, 0.0);
    }

    #[test]
    fn test_incremental_cooperation_average() {
        let results = vec![
            result("x", "y", "CCCC", "DDDD"),
            result("x", "y", "CCDD", "DDDD"),
            result("y", "x", "DDDD", "DDDD"),
        ];

        let stats = compute_stats_for_names(&results, ["x", "y"]);

        let x = stats.strategy("x").unwrap();
        assert_eq!(x.matches, 3);
        assert!((x.cooperation_rate - 0.5).abs() < EPS);

        let y = stats.strategy("y").unwrap();
        assert_eq!(y.cooperation_rate, 0.0);
    }

    #[test]
    fn test_wins_losses_ties() {
        let results = vec![
            result("a", "b", "CC", "DD"),
            result("a", "c", "CC", "CC"),
            result("b", "c", "DD", "CC"),
        ];

        let stats = compute_stats_for_names(&results, ["a", "b", "c"]);

        let a = stats.strategy("a").unwrap();
        assert_eq!((a.wins, a.losses, a.ties), (0, 1, 1));
        assert_eq!(a.total_score, 6);
        let b = stats.strategy("b").unwrap();
        assert_eq!((b.wins, b.losses, b.ties), (2, 0, 0));
        assert_eq!(b.total_score, 20);
        let c = stats.strategy("c").unwrap();
        assert_eq!((c.wins, c.losses, c.ties), (0, 1, 1));
        assert_eq!(stats.total_matches, 3);
        assert_eq!(stats.total_rounds, 6);
    }

    #[test]
    fn test_global_rates() {
        let results = vec![result("a", "b", "CCCC", "DDDD"), result("a", "c", "CCDD", "CCCC")];

        let stats = compute_stats_for_names(&results, ["a", "b", "c"]);

        // 10 cooperations out of 16 moves
        assert!((stats.cooperation_rate - 10.0 / 16.0).abs() < EPS);
        assert!((stats.defection_rate - 6.0 / 16.0).abs() < EPS);
    }

    #[test]
    fn test_all_cooperate_tournament() {
        let mut strategies: Vec<Strategy> = (0..4)
            .map(|i| Strategy::new(format!("cooperator {}", i), Builtin::AlwaysCooperate).unwrap())
            .collect();

        let outcome = run_tournament(&mut strategies, 20);
        let stats = compute_stats(&outcome.results, &strategies);

        assert_eq!(stats.cooperation_rate, 1.0);
        assert_eq!(stats.defection_rate, 0.0);
        for s in &stats.strategies_stats {
            assert_eq!(s.ties, 3);
            assert_eq!(s.matches, 3);
            assert_eq!(s.cooperation_rate, 1.0);
        }
    }

    #[test]
    fn test_all_defect_tournament() {
        let mut strategies: Vec<Strategy> = (0..3)
            .map(|i| Strategy::new(format!("defector {}", i), Builtin::AlwaysDefect).unwrap())
            .collect();

        let outcome = run_tournament(&mut strategies, 20);
        let stats = compute_stats(&outcome.results, &strategies);

        assert_eq!(stats.cooperation_rate, 0.0);
        assert_eq!(stats.defection_rate, 1.0);
    }

    #[test]
    fn test_unknown_names_are_appended() {
        let results = vec![result("a", "stranger", "C", "D")];

        let stats = compute_stats_for_names(&results, ["a"]);

        assert_eq!(stats.strategies_stats.len(), 2);
        assert_eq!(stats.strategies_stats[1].name, "stranger");
        assert_eq!(stats.strategies_stats[1].wins, 1);
    }

    #[test]
    fn test_zero_round_match_is_guarded() {
        let results = vec![result("a", "b", "", "")];

        let stats = compute_stats_for_names(&results, ["a", "b"]);

        assert_eq!(stats.cooperation_rate, 0.0);
        assert_eq!(stats.strategy("a").unwrap().cooperation_rate, 0.0);
        assert_eq!(stats.strategy("a").unwrap().ties, 1);
    }

    #[test]
    fn test_serialized_shape() {
        let stats = compute_stats_for_names(&[result("a", "b", "C", "C")], ["a", "b"]);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalMatches"], 1);
        assert!(json["strategiesStats"].is_object());
        assert_eq!(json["strategiesStats"]["a"]["totalScore"], 3);
        assert_eq!(json["strategiesStats"]["b"]["cooperationRate"], 1.0);
        assert!(json["strategiesStats"]["a"].get("name").is_none());
    }

    #[test]
    fn test_strategies_stats_keyed_in_order() {
        let results = vec![result("zeta", "alpha", "CD", "DD"), result("zeta", "mid", "C", "C")];
        let stats = compute_stats_for_names(&results, ["zeta", "alpha", "mid"]);

        let text = serde_json::to_string(&stats).unwrap();
        let zeta = text.find("\"zeta\":").unwrap();
        let alpha = text.find("\"alpha\":").unwrap();
        let mid = text.find("\"mid\":").unwrap();
        assert!(zeta < alpha && alpha < mid);

        let back: TournamentStats = serde_json::from_str(&text).unwrap();
        assert_eq!(back, stats);
        assert_eq!(back.strategies_stats[1].name, "alpha");
    }

    #[test]
    fn test_scores_past_u32_range() {
        let mut big = result("a", "b", "D", "C");
        big.score_a = 3_000_000_000;
        let results = vec![big.clone(), big];

        let stats = compute_stats_for_names(&results, ["a", "b"]);

        assert_eq!(stats.strategy("a").unwrap().total_score, 6_000_000_000);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["strategiesStats"]["a"]["totalScore"], 6_000_000_000u64);
    }

    proptest! {
        #[test]
        fn prop_rates_bounded(
            picks in proptest::collection::vec(0usize..9, 2..6),
            rounds in 1u32..30,
        ) {
            let mut strategies: Vec<Strategy> = picks
                .iter()
                .enumerate()
                .map(|(i, &k)| Strategy::new(format!("p{}", i), Builtin::ALL[k]).unwrap())
                .collect();

            let outcome = run_tournament(&mut strategies, rounds);
            let stats = compute_stats(&outcome.results, &strategies);

            prop_assert!((0.0..=1.0).contains(&stats.cooperation_rate));
            prop_assert!((stats.cooperation_rate + stats.defection_rate - 1.0).abs() < EPS);
            let matches: u32 = stats.strategies_stats.iter().map(|s| s.matches).sum();
            prop_assert!(matches == 2 * stats.total_matches);
            for s in &stats.strategies_stats {
                prop_assert!((0.0..=1.0).contains(&s.cooperation_rate));
                prop_assert!(s.wins + s.losses + s.ties == s.matches);
            }
        }
    }
}
