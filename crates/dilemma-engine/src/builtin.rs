//! Classic strategies shipped with the engine

use serde::{Deserialize, Serialize};

use crate::payoff;
use crate::strategy::{Decide, DecisionFailure, Move, Strategy};

/// Built-in strategy kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Random choice each round.
    Random,
    /// Cooperate until opponent defects once, then always defect.
    GrimTrigger,
    /// Win-stay, lose-switch. Repeat move if good outcome.
    Pavlov,
    /// Tit-for-Tat but start with defect.
    SuspiciousTitForTat,
    /// Defect only if opponent defected twice in a row.
    TitForTwoTats,
    /// Retaliate with increasing defection streaks, then forgive.
    Gradual,
}

impl Builtin {
    pub const ALL: [Builtin; 9] = [
        Builtin::AlwaysCooperate,
        Builtin::AlwaysDefect,
        Builtin::TitForTat,
        Builtin::Random,
        Builtin::GrimTrigger,
        Builtin::Pavlov,
        Builtin::SuspiciousTitForTat,
        Builtin::TitForTwoTats,
        Builtin::Gradual,
    ];

    /// Display name, also used as the strategy's scoring identifier
    pub fn name(self) -> &'static str {
        match self {
            Builtin::AlwaysCooperate => "Always Cooperate",
            Builtin::AlwaysDefect => "Always Defect",
            Builtin::TitForTat => "Tit for Tat",
            Builtin::Random => "Random",
            Builtin::GrimTrigger => "Grim Trigger",
            Builtin::Pavlov => "Pavlov",
            Builtin::SuspiciousTitForTat => "Suspicious Tit for Tat",
            Builtin::TitForTwoTats => "Tit for Two Tats",
            Builtin::Gradual => "Gradual",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Builtin::AlwaysCooperate => "Never defects. Always cooperates; nice but exploitable.",
            Builtin::AlwaysDefect => "Never cooperates. Always defects.",
            Builtin::TitForTat => "Cooperates first, then copies the opponent's last move.",
            Builtin::Random => "Cooperates or defects at random (50% each).",
            Builtin::GrimTrigger => "Cooperates until betrayed, then always defects.",
            Builtin::Pavlov => "Repeats move if outcome was good, switches if bad.",
            Builtin::SuspiciousTitForTat => "Like Tit for Tat, but starts with defect.",
            Builtin::TitForTwoTats => "Only retaliates after two consecutive defections.",
            Builtin::Gradual => "Retaliates with increasing severity, then forgives.",
        }
    }

    /// Look up a builtin by its display name
    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Wrap this builtin as a named strategy
    pub fn strategy(self) -> Strategy {
        Strategy {
            name: self.name().to_string(),
            decider: Box::new(self),
        }
    }
}

impl Decide for Builtin {
    fn decide(&mut self, own: &[Move], opponent: &[Move]) -> Result<Move, DecisionFailure> {
        let m = match *self {
            Builtin::AlwaysCooperate => Move::Cooperate,
            Builtin::AlwaysDefect => Move::Defect,
            Builtin::TitForTat => tit_for_tat(opponent, Move::Cooperate),
            Builtin::Random => random_move(),
            Builtin::GrimTrigger => grim_trigger(opponent),
            Builtin::Pavlov => pavlov(own, opponent),
            Builtin::SuspiciousTitForTat => tit_for_tat(opponent, Move::Defect),
            Builtin::TitForTwoTats => tit_for_two_tats(opponent),
            Builtin::Gradual => gradual(own, opponent),
        };
        Ok(m)
    }
}

/// Copy the opponent's last move, opening with `opening`
fn tit_for_tat(opponent: &[Move], opening: Move) -> Move {
    opponent.last().copied().unwrap_or(opening)
}

/// Unseeded coin flip
fn random_move() -> Move {
    if rand::random::<bool>() {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

fn grim_trigger(opponent: &[Move]) -> Move {
    if opponent.contains(&Move::Defect) {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Pavlov: Win-stay, lose-switch
/// - If last round was good (3+ points), repeat move
/// - If last round was bad (<3 points), switch move
fn pavlov(own: &[Move], opponent: &[Move]) -> Move {
    let (Some(&my_last), Some(&opp_last)) = (own.last(), opponent.last()) else {
        return Move::Cooperate;
    };

    let (my_score, _) = payoff(my_last, opp_last);
    if my_score >= 3 {
        my_last
    } else {
        match my_last {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }
}

fn tit_for_two_tats(opponent: &[Move]) -> Move {
    match opponent {
        [.., Move::Defect, Move::Defect] => Move::Defect,
        _ => Move::Cooperate,
    }
}

/// Gradual: Escalating retaliation
/// After N opponent defections, player should have made N(N+1)/2 total defections
fn gradual(own: &[Move], opponent: &[Move]) -> Move {
    let their_defections = opponent.iter().filter(|m| **m == Move::Defect).count();
    let my_defections = own.iter().filter(|m| **m == Move::Defect).count();

    let expected = their_defections * (their_defections + 1) / 2;
    if my_defections < expected {
        Move::Defect
    } else {
        Move::Cooperate
    }
}
