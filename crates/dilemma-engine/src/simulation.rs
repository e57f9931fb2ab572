//! Step-by-step match traces for animated playback

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::game::play_round;
use crate::payoff;
use crate::strategy::{Move, Strategy};

/// Classification of a single round's move pair.
///
/// Serialized as its human-readable description, e.g. `"Mutual cooperation"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    MutualCooperation,
    ADefectsBCooperates,
    ACooperatesBDefects,
    MutualDefection,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::MutualCooperation,
        Outcome::ADefectsBCooperates,
        Outcome::ACooperatesBDefects,
        Outcome::MutualDefection,
    ];

    pub fn classify(move_a: Move, move_b: Move) -> Self {
        match (move_a, move_b) {
            (Move::Cooperate, Move::Cooperate) => Outcome::MutualCooperation,
            (Move::Defect, Move::Cooperate) => Outcome::ADefectsBCooperates,
            (Move::Cooperate, Move::Defect) => Outcome::ACooperatesBDefects,
            (Move::Defect, Move::Defect) => Outcome::MutualDefection,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Outcome::MutualCooperation => "Mutual cooperation",
            Outcome::ADefectsBCooperates => "A defects, B cooperates",
            Outcome::ACooperatesBDefects => "A cooperates, B defects",
            Outcome::MutualDefection => "Mutual defection",
        }
    }

    pub fn from_description(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.description() == text)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.description())
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Outcome::from_description(&text)
            .ok_or_else(|| de::Error::custom(format!("unknown round outcome \"{}\"", text)))
    }
}

/// State after one round of a simulated match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStep {
    /// 1-based round number
    pub round: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub pay_a: u8,
    pub pay_b: u8,
    pub score_a: u64,
    pub score_b: u64,
    /// Histories up to and including this round
    pub history_a: Vec<Move>,
    pub history_b: Vec<Move>,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct FinalScores {
    pub a: u64,
    pub b: u64,
}

/// A full match with its per-round trace
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub strategy_a: String,
    pub strategy_b: String,
    pub total_rounds: u32,
    pub final_scores: FinalScores,
    pub steps: Vec<RoundStep>,
}

/// Play `rounds` rounds between two strategies, recording every step.
///
/// Moves and payoffs follow the same rules as [`crate::play_match`].
pub fn generate_simulation(
    strategy_a: &mut Strategy,
    strategy_b: &mut Strategy,
    rounds: u32,
) -> Simulation {
    strategy_a.reset();
    strategy_b.reset();

    let mut history_a: Vec<Move> = Vec::with_capacity(rounds as usize);
    let mut history_b: Vec<Move> = Vec::with_capacity(rounds as usize);
    let mut steps: Vec<RoundStep> = Vec::with_capacity(rounds as usize);
    let mut total_a = 0u64;
    let mut total_b = 0u64;

    for round in 1..=rounds {
        let (move_a, move_b) = play_round(strategy_a, strategy_b, &history_a, &history_b);

        let (pay_a, pay_b) = payoff(move_a, move_b);
        total_a += pay_a as u64;
        total_b += pay_b as u64;

        history_a.push(move_a);
        history_b.push(move_b);

        steps.push(RoundStep {
            round,
            move_a,
            move_b,
            pay_a,
            pay_b,
            score_a: total_a,
            score_b: total_b,
            history_a: history_a.clone(),
            history_b: history_b.clone(),
            outcome: Outcome::classify(move_a, move_b),
        });
    }

    Simulation {
        strategy_a: strategy_a.name().to_string(),
        strategy_b: strategy_b.name().to_string(),
        total_rounds: rounds,
        final_scores: FinalScores {
            a: total_a,
            b: total_b,
        },
        steps,
    }
}
