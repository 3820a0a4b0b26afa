//! Priority system (component H): APNAP rotation, all-pass detection.

use crate::ids::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Passed,
    AllPassed,
}

#[derive(Debug, Clone)]
pub struct PrioritySystem {
    turn_order: Vec<PlayerId>,
    holder: Option<PlayerId>,
    passed: Vec<PlayerId>,
}

impl PrioritySystem {
    pub fn new(turn_order: Vec<PlayerId>) -> Self {
        Self { turn_order, holder: None, passed: Vec::new() }
    }

    pub fn holder(&self) -> Option<PlayerId> {
        self.holder
    }

    /// Gives priority to `player` and clears the passed-set (§4.4).
    pub fn give_priority(&mut self, player: PlayerId) {
        self.holder = Some(player);
        self.passed.clear();
    }

    fn next_in_turn_order(&self, from: PlayerId) -> PlayerId {
        let idx = self.turn_order.iter().position(|p| *p == from).unwrap_or(0);
        self.turn_order[(idx + 1) % self.turn_order.len()]
    }

    /// The current holder passes. If every player has now passed in
    /// succession, clears the holder and returns `AllPassed`; otherwise
    /// advances to the next player and returns `Passed`.
    pub fn pass_priority(&mut self) -> PassOutcome {
        let Some(current) = self.holder else {
            return PassOutcome::AllPassed;
        };
        if !self.passed.contains(&current) {
            self.passed.push(current);
        }
        if self.passed.len() >= self.turn_order.len() {
            self.holder = None;
            PassOutcome::AllPassed
        } else {
            self.holder = Some(self.next_in_turn_order(current));
            PassOutcome::Passed
        }
    }

    /// A player took an action: clears the passed-set, keeping the current
    /// holder (the next round restarts from them, per the kernel's "active
    /// player receives priority again" convention).
    pub fn player_took_action(&mut self) {
        self.passed.clear();
    }

    pub fn reset(&mut self) {
        self.holder = None;
        self.passed.clear();
    }
}
