//! Ambient error taxonomy (§7).
//!
//! Every subsystem gets its own small `Display`/`Error` enum, following the
//! teacher's pattern of hand-rolled errors rather than a `thiserror` derive.
//! Only [`FatalError`] and [`SetupError`] are meant to cross the embedder
//! boundary; everything else is recoverable and handled internally (illegal
//! actions are rejected and re-polled, transaction failures roll back).

use std::fmt;

use crate::ids::{ObjectId, PlayerId};

/// A player action the core rejected as illegal. The agent is re-polled;
/// the game never aborts because of one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IllegalActionError {
    CannotAffordCost,
    IllegalTarget { target: ObjectId },
    OutOfTurn,
    LandAlreadyPlayed,
    WrongTiming,
    NotAuthorized { player: PlayerId },
    NoSuchAbility,
}

impl fmt::Display for IllegalActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalActionError::CannotAffordCost => write!(f, "cannot afford cost"),
            IllegalActionError::IllegalTarget { target } => {
                write!(f, "illegal target: {target:?}")
            }
            IllegalActionError::OutOfTurn => write!(f, "action not available out of turn"),
            IllegalActionError::LandAlreadyPlayed => {
                write!(f, "land already played this turn")
            }
            IllegalActionError::WrongTiming => write!(f, "wrong timing for this action"),
            IllegalActionError::NotAuthorized { player } => {
                write!(f, "player {player:?} is not authorized for this action")
            }
            IllegalActionError::NoSuchAbility => write!(f, "no such ability"),
        }
    }
}

impl std::error::Error for IllegalActionError {}

/// Failure of the spell-cast transaction (§4.3); always triggers rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    Illegal(IllegalActionError),
    PaymentFailed,
    NoLegalTargets,
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::Illegal(e) => write!(f, "{e}"),
            TransactionError::PaymentFailed => write!(f, "mana payment could not be completed"),
            TransactionError::NoLegalTargets => write!(f, "no legal targets available"),
        }
    }
}

impl std::error::Error for TransactionError {}

impl From<IllegalActionError> for TransactionError {
    fn from(e: IllegalActionError) -> Self {
        TransactionError::Illegal(e)
    }
}

/// An invariant breach detected inside the engine. Fatal: ends the game with
/// reason `"engine-error"` (§7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalError {
    pub invariant: &'static str,
    pub detail: String,
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine invariant {} violated: {}", self.invariant, self.detail)
    }
}

impl std::error::Error for FatalError {}

/// Configuration or input error, surfaced at setup time before any game
/// state exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    MalformedDeck(String),
    MissingCardData(String),
    TooFewPlayers,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::MalformedDeck(s) => write!(f, "malformed deck: {s}"),
            SetupError::MissingCardData(s) => write!(f, "missing card data: {s}"),
            SetupError::TooFewPlayers => write!(f, "a game requires at least two players"),
        }
    }
}

impl std::error::Error for SetupError {}

/// Errors surfaced by the combat manager (§4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    CannotAttack { creature: ObjectId },
    IllegalBlock { blocker: ObjectId, attacker: ObjectId },
    MenaceRequiresTwoBlockers { attacker: ObjectId },
    DamageAssignmentSkipsLethal { blocker: ObjectId },
    DamageAssignmentMismatch,
}

impl fmt::Display for CombatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatError::CannotAttack { creature } => {
                write!(f, "{creature:?} cannot attack")
            }
            CombatError::IllegalBlock { blocker, attacker } => {
                write!(f, "{blocker:?} cannot block {attacker:?}")
            }
            CombatError::MenaceRequiresTwoBlockers { attacker } => {
                write!(f, "{attacker:?} has menace and requires two or more blockers")
            }
            CombatError::DamageAssignmentSkipsLethal { blocker } => write!(
                f,
                "damage assignment skips lethal damage to {blocker:?} before moving on"
            ),
            CombatError::DamageAssignmentMismatch => {
                write!(f, "assigned damage does not sum to the source's power")
            }
        }
    }
}

impl std::error::Error for CombatError {}
