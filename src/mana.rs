//! Mana model (component C): symbols, costs, pools, and the payment
//! validator used by the spell-cast transaction (§4.3).

use crate::types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManaSymbol {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
    Generic(u32),
    X,
    Hybrid(Color, Color),
    Phyrexian(Color),
    Snow,
}

impl ManaSymbol {
    pub fn from_color(color: Color) -> Self {
        match color {
            Color::White => ManaSymbol::White,
            Color::Blue => ManaSymbol::Blue,
            Color::Black => ManaSymbol::Black,
            Color::Red => ManaSymbol::Red,
            Color::Green => ManaSymbol::Green,
        }
    }

    pub fn mana_value(self) -> u32 {
        match self {
            ManaSymbol::Generic(n) => n,
            ManaSymbol::X => 0,
            _ => 1,
        }
    }

    /// Whether a unit of the given pool color can pay this symbol directly
    /// (ignoring phyrexian's life-payment alternative and generic fallback).
    fn payable_by(self, pool_color: PoolMana) -> bool {
        match (self, pool_color) {
            (ManaSymbol::White, PoolMana::Colored(Color::White)) => true,
            (ManaSymbol::Blue, PoolMana::Colored(Color::Blue)) => true,
            (ManaSymbol::Black, PoolMana::Colored(Color::Black)) => true,
            (ManaSymbol::Red, PoolMana::Colored(Color::Red)) => true,
            (ManaSymbol::Green, PoolMana::Colored(Color::Green)) => true,
            (ManaSymbol::Colorless, PoolMana::Colorless) => true,
            (ManaSymbol::Hybrid(a, b), PoolMana::Colored(c)) => c == a || c == b,
            (ManaSymbol::Phyrexian(c), PoolMana::Colored(p)) => c == p,
            (ManaSymbol::Snow, PoolMana::Snow(_)) => true,
            _ => false,
        }
    }
}

/// Ordered list of symbols; cost is a conjunction of pips, each an exact
/// requirement (unlike the teacher's hybrid-as-disjunction representation,
/// hybrid/phyrexian alternatives are expressed directly on [`ManaSymbol`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManaCost {
    symbols: Vec<ManaSymbol>,
}

impl ManaCost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_symbols(symbols: Vec<ManaSymbol>) -> Self {
        Self { symbols }
    }

    pub fn push(&mut self, symbol: ManaSymbol) {
        self.symbols.push(symbol);
    }

    pub fn symbols(&self) -> &[ManaSymbol] {
        &self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn has_x(&self) -> bool {
        self.symbols.iter().any(|s| matches!(s, ManaSymbol::X))
    }

    /// Mana value (CMC) with X bound to `x_value` (0 if the cost has no X
    /// or the spell has left the stack; once a spell is cast, X is fixed
    /// for "all purposes" per CR rule).
    pub fn mana_value(&self, x_value: u32) -> u32 {
        self.symbols
            .iter()
            .map(|s| if matches!(s, ManaSymbol::X) { x_value } else { s.mana_value() })
            .sum()
    }

    /// Replaces every `X` symbol with `x_value` copies of generic mana,
    /// fixing the cost once a spell's X has been announced.
    pub fn with_x_bound(&self, x_value: u32) -> ManaCost {
        let mut symbols = Vec::new();
        for s in &self.symbols {
            if matches!(s, ManaSymbol::X) {
                if x_value > 0 {
                    symbols.push(ManaSymbol::Generic(x_value));
                }
            } else {
                symbols.push(*s);
            }
        }
        ManaCost { symbols }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolMana {
    Colored(Color),
    Colorless,
    Snow(Color),
}

/// Multiset of typed mana a player currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManaPool {
    units: Vec<PoolMana>,
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mana: PoolMana) {
        self.units.push(mana);
    }

    pub fn add_many(&mut self, mana: PoolMana, amount: u32) {
        for _ in 0..amount {
            self.add(mana);
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Empties the pool (normally done at the end of each step/phase by the
    /// turn manager, per the "mana burn was removed, pools empty" rule —
    /// here modeled simply as an explicit call at step boundaries).
    pub fn empty(&mut self) {
        self.units.clear();
    }

    fn remove_one(&mut self, index: usize) -> PoolMana {
        self.units.remove(index)
    }
}

/// Can `cost` be paid entirely from `pool`? Colored/hybrid/phyrexian-as-mana
/// requirements are satisfied first by backtracking search (greedy with
/// undo), then generic and X are filled last from whatever remains (§4.3).
pub fn can_pay_from_pool(cost: &ManaCost, x_value: u32, pool: &ManaPool) -> bool {
    try_pay_from_pool(cost, x_value, &mut pool.clone()).is_some()
}

/// Attempts payment, consuming `pool` in place on success and returning the
/// units spent. On failure `pool` is left unmodified by the caller's clone
/// (callers that need atomicity should clone before calling, matching the
/// spell-cast transaction's snapshot/rollback protocol, §4.3).
pub fn try_pay_from_pool(cost: &ManaCost, x_value: u32, pool: &mut ManaPool) -> Option<Vec<PoolMana>> {
    let bound = cost.with_x_bound(x_value);
    let mut spent = Vec::new();

    let mut colored: Vec<&ManaSymbol> = Vec::new();
    let mut generic_total: u32 = 0;
    for symbol in bound.symbols() {
        match symbol {
            ManaSymbol::Generic(n) => generic_total += n,
            other => colored.push(other),
        }
    }

    // Colored/hybrid/phyrexian pips first, via backtracking search so that a
    // pip with multiple satisfying units doesn't starve a later, pickier pip.
    if !pay_colored_pips(&colored, pool, &mut spent) {
        return None;
    }

    // Generic last, from whatever is left.
    for _ in 0..generic_total {
        if pool.units.is_empty() {
            return None;
        }
        spent.push(pool.remove_one(0));
    }

    Some(spent)
}

fn pay_colored_pips(pips: &[&ManaSymbol], pool: &mut ManaPool, spent: &mut Vec<PoolMana>) -> bool {
    let Some((first, rest)) = pips.split_first() else {
        return true;
    };
    let candidates: Vec<usize> = pool
        .units
        .iter()
        .enumerate()
        .filter(|(_, unit)| first.payable_by(**unit))
        .map(|(i, _)| i)
        .collect();

    for idx in candidates {
        let unit = pool.remove_one(idx);
        spent.push(unit);
        if pay_colored_pips(rest, pool, spent) {
            return true;
        }
        spent.pop();
        pool.units.insert(idx, unit);
    }
    false
}
