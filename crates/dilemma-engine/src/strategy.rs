//! Strategy definitions and the validated move-producing wrapper

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "C")]
    Cooperate,
    #[serde(rename = "D")]
    Defect,
}

impl Move {
    /// Single-letter symbol used in rendered histories
    pub fn symbol(self) -> char {
        match self {
            Move::Cooperate => 'C',
            Move::Defect => 'D',
        }
    }

    pub fn is_cooperate(self) -> bool {
        self == Move::Cooperate
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Move {
    type Error = DecisionFailure;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'C' => Ok(Move::Cooperate),
            'D' => Ok(Move::Defect),
            other => Err(DecisionFailure::InvalidMove(other.to_string())),
        }
    }
}

impl FromStr for Move {
    type Err = DecisionFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Move::Cooperate),
            "D" => Ok(Move::Defect),
            other => Err(DecisionFailure::InvalidMove(other.to_string())),
        }
    }
}

/// Render a move history as a compact string, e.g. `CCDC`
pub fn render_history(history: &[Move]) -> String {
    history.iter().map(|m| m.symbol()).collect()
}

/// Fraction of `history` that is Cooperate; 0.0 for an empty history
pub fn cooperation_fraction(history: &[Move]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let cooperations = history.iter().filter(|m| m.is_cooperate()).count();
    cooperations as f64 / history.len() as f64
}

/// Why a decision function failed to produce a move
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionFailure {
    /// The decision function reported an error.
    Error(String),
    /// The decision function panicked.
    Panicked(String),
    /// The decision function produced something that is not a move.
    InvalidMove(String),
}

impl fmt::Display for DecisionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionFailure::Error(msg) => write!(f, "decision error: {}", msg),
            DecisionFailure::Panicked(msg) => write!(f, "decision panicked: {}", msg),
            DecisionFailure::InvalidMove(raw) => write!(f, "invalid move {:?}", raw),
        }
    }
}

impl std::error::Error for DecisionFailure {}

/// Errors raised when wrapping a decision function
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StrategyError {
    /// Strategy names identify strategies in scoring and must not be empty.
    EmptyName,
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyError::EmptyName => write!(f, "strategy name must not be empty"),
        }
    }
}

impl std::error::Error for StrategyError {}

/// Raw output of a decision function, checked by the wrapper
pub trait IntoDecision {
    fn into_decision(self) -> Result<Move, DecisionFailure>;
}

impl IntoDecision for Move {
    fn into_decision(self) -> Result<Move, DecisionFailure> {
        Ok(self)
    }
}

impl IntoDecision for Result<Move, DecisionFailure> {
    fn into_decision(self) -> Result<Move, DecisionFailure> {
        self
    }
}

impl IntoDecision for Option<Move> {
    fn into_decision(self) -> Result<Move, DecisionFailure> {
        self.ok_or_else(|| DecisionFailure::InvalidMove("nothing".to_string()))
    }
}

impl IntoDecision for char {
    fn into_decision(self) -> Result<Move, DecisionFailure> {
        Move::try_from(self)
    }
}

impl IntoDecision for &str {
    fn into_decision(self) -> Result<Move, DecisionFailure> {
        self.parse()
    }
}

impl IntoDecision for String {
    fn into_decision(self) -> Result<Move, DecisionFailure> {
        self.parse()
    }
}

/// Decision contract every strategy satisfies.
///
/// `own` and `opponent` always have equal length: the number of rounds
/// already played in the current match.
pub trait Decide {
    fn decide(&mut self, own: &[Move], opponent: &[Move]) -> Result<Move, DecisionFailure>;

    /// Called before every match. Strategies holding private state clear it here.
    fn reset(&mut self) {}
}

/// Adapts a plain function or closure into a `Decide` implementation
struct FnDecider<F>(F);

impl<F, R> Decide for FnDecider<F>
where
    F: FnMut(&[Move], &[Move]) -> R,
    R: IntoDecision,
{
    fn decide(&mut self, own: &[Move], opponent: &[Move]) -> Result<Move, DecisionFailure> {
        (self.0)(own, opponent).into_decision()
    }
}

/// A named strategy: the single point where malformed decisions are caught.
pub struct Strategy {
    pub(crate) name: String,
    pub(crate) decider: Box<dyn Decide>,
}

impl Strategy {
    /// Wrap a decider under `name`
    pub fn new<D>(name: impl Into<String>, decider: D) -> Result<Self, StrategyError>
    where
        D: Decide + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StrategyError::EmptyName);
        }
        Ok(Self {
            name,
            decider: Box::new(decider),
        })
    }

    /// Wrap a closure `(own, opponent) -> output`
    ///
    /// The output can be a `Move`, a `Result<Move, DecisionFailure>`, an
    /// `Option<Move>`, or a raw `char`/string symbol; anything that does not
    /// resolve to a move is replaced by Cooperate at play time.
    pub fn from_fn<F, R>(name: impl Into<String>, f: F) -> Result<Self, StrategyError>
    where
        F: FnMut(&[Move], &[Move]) -> R + 'static,
        R: IntoDecision,
    {
        Self::new(name, FnDecider(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce this strategy's next move.
    ///
    /// Failures and panics in the decision function are logged and replaced
    /// by Cooperate, so the result is always a valid move.
    pub fn next_move(&mut self, own: &[Move], opponent: &[Move]) -> Move {
        match self.try_next_move(own, opponent) {
            Ok(m) => m,
            Err(failure) => {
                log::warn!("strategy \"{}\" failed, cooperating instead: {}", self.name, failure);
                Move::Cooperate
            }
        }
    }

    fn try_next_move(&mut self, own: &[Move], opponent: &[Move]) -> Result<Move, DecisionFailure> {
        let decider = &mut self.decider;
        panic::catch_unwind(AssertUnwindSafe(|| decider.decide(own, opponent)))
            .unwrap_or_else(|payload| {
                Err(DecisionFailure::Panicked(panic_message(payload.as_ref())))
            })
    }

    pub(crate) fn reset(&mut self) {
        let decider = &mut self.decider;
        if panic::catch_unwind(AssertUnwindSafe(|| decider.reset())).is_err() {
            log::warn!("strategy \"{}\" panicked during reset", self.name);
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
