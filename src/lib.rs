//! A trading-card-game rules kernel: the turn/phase/step driver, priority
//! and the stack, the seven-layer continuous-effect system, state-based
//! actions, triggered abilities, combat, and the mana-payment transaction
//! that casting a spell goes through.
//!
//! Card text parsing and a production card corpus are out of scope (§1):
//! [`card_db::CardDatabase`] is the seam a real implementation plugs into,
//! and [`effect::Effect`] is the small closed vocabulary spells/abilities
//! compile down to. Everything a player decides (which action, which
//! targets, which attacks) is asked of an [`agent::Agent`]; the kernel never
//! makes a choice that belongs to a player.

pub mod agent;
pub mod card_db;
pub mod combat;
pub mod config;
pub mod controller;
pub mod effect;
pub mod error;
pub mod event;
pub mod game_state;
pub mod ids;
pub mod layers;
pub mod mana;
pub mod object;
pub mod player;
pub mod priority;
pub mod replacement;
pub mod sba;
pub mod spell_cast;
pub mod stack;
pub mod target;
pub mod triggers;
pub mod turn;
pub mod types;
pub mod zone;

pub use agent::{Agent, PriorityAction, RandomAgent};
pub use controller::{GameController, GameEndReason, GameResult};
pub use error::{CombatError, FatalError, IllegalActionError, SetupError, TransactionError};
pub use game_state::GameState;
