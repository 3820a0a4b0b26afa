//! Continuous-effect layer engine (component F).
//!
//! Continuous effects are data, not closures (§9): a [`ContinuousEffect`] is
//! a `(layer, predicate, modification, timestamp, duration, deps)` record,
//! and [`LayerEngine::compute_characteristics`] is a pure fold over the
//! effects whose predicate currently matches. Nothing here closes over game
//! state mutably — it only reads.

use std::collections::{HashMap, HashSet};

use crate::ids::{ObjectId, Timestamp};
use crate::object::{Characteristics, PtValue};
use crate::types::{Color, Subtype};

/// The seven layers plus the five power/toughness sublayers (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Copy,
    Control,
    Text,
    TypeChange,
    Color,
    AbilityChange,
    PtCharacteristicDefining,
    PtSetValue,
    PtCounters,
    PtModifier,
    PtSwitch,
}

impl Layer {
    pub const ORDER: [Layer; 11] = [
        Layer::Copy,
        Layer::Control,
        Layer::Text,
        Layer::TypeChange,
        Layer::Color,
        Layer::AbilityChange,
        Layer::PtCharacteristicDefining,
        Layer::PtSetValue,
        Layer::PtCounters,
        Layer::PtModifier,
        Layer::PtSwitch,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Permanent,
    EndOfTurn,
    UntilSourceLeaves,
    NTurns(u32),
}

/// Which objects an effect applies to. Kept as a small closed set of
/// predicate shapes (data, not a trait object) so effects stay `Clone` and
/// comparable by timestamp without needing dynamic dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPredicate {
    AllPermanents,
    ThisPermanent(ObjectId),
    NonbasicLands,
    LandsWithSubtype(Subtype),
    Controller(crate::ids::PlayerId),
    And(Vec<ObjectPredicate>),
}

impl ObjectPredicate {
    fn matches(&self, obj: &crate::object::GameObject) -> bool {
        match self {
            ObjectPredicate::AllPermanents => obj.is_permanent(),
            ObjectPredicate::ThisPermanent(id) => obj.object_id == *id,
            ObjectPredicate::NonbasicLands => {
                obj.current_characteristics.is_type(crate::types::CardType::Land)
                    && !obj
                        .current_characteristics
                        .supertypes
                        .contains(&crate::types::Supertype::Basic)
            }
            ObjectPredicate::LandsWithSubtype(s) => {
                obj.current_characteristics.is_type(crate::types::CardType::Land)
                    && obj.current_characteristics.has_subtype(s)
            }
            ObjectPredicate::Controller(pid) => obj.controller() == *pid,
            ObjectPredicate::And(list) => list.iter().all(|p| p.matches(obj)),
        }
    }
}

/// What a matched effect does to characteristics. Data, not a closure
/// (§9 "Continuous effects as data").
#[derive(Debug, Clone, PartialEq)]
pub enum Modification {
    SetController(crate::ids::PlayerId),
    SetRulesText(String),
    AddCardType(crate::types::CardType),
    RemoveAllAbilities,
    RemoveNonbasicLandTypesAddBasic(crate::types::BasicLandType),
    SetColor(Color),
    AddKeyword(crate::types::Keyword),
    SetPowerToughness(i32, i32),
    ModifyPowerToughness(i32, i32),
    SwitchPowerToughness,
}

impl Modification {
    fn layer(&self) -> Layer {
        match self {
            Modification::SetController(_) => Layer::Control,
            Modification::SetRulesText(_) => Layer::Text,
            Modification::AddCardType(_) => Layer::TypeChange,
            Modification::RemoveAllAbilities => Layer::AbilityChange,
            Modification::RemoveNonbasicLandTypesAddBasic(_) => Layer::TypeChange,
            Modification::SetColor(_) => Layer::Color,
            Modification::AddKeyword(_) => Layer::AbilityChange,
            Modification::SetPowerToughness(..) => Layer::PtSetValue,
            Modification::ModifyPowerToughness(..) => Layer::PtModifier,
            Modification::SwitchPowerToughness => Layer::PtSwitch,
        }
    }

    fn apply(&self, chars: &mut Characteristics) {
        match self {
            Modification::SetController(_) => {}
            Modification::SetRulesText(text) => chars.rules_text = text.clone(),
            Modification::AddCardType(t) => {
                if !chars.card_types.contains(t) {
                    chars.card_types.push(*t);
                }
            }
            Modification::RemoveAllAbilities => {
                chars.keywords.clear();
                chars.ability_ids.clear();
            }
            Modification::RemoveNonbasicLandTypesAddBasic(basic) => {
                chars.subtypes.clear();
                chars.subtypes.push(Subtype::from(basic.name()));
            }
            Modification::SetColor(c) => {
                chars.colors = crate::types::ColorSet::from_color(*c);
            }
            Modification::AddKeyword(k) => {
                if !chars.keywords.contains(k) {
                    chars.keywords.push(*k);
                }
            }
            Modification::SetPowerToughness(p, t) => {
                chars.power = Some(PtValue::Fixed(*p));
                chars.toughness = Some(PtValue::Fixed(*t));
            }
            Modification::ModifyPowerToughness(dp, dt) => {
                if let Some(PtValue::Fixed(p)) = chars.power {
                    chars.power = Some(PtValue::Fixed(p + dp));
                }
                if let Some(PtValue::Fixed(t)) = chars.toughness {
                    chars.toughness = Some(PtValue::Fixed(t + dt));
                }
            }
            Modification::SwitchPowerToughness => {
                if let (Some(PtValue::Fixed(p)), Some(PtValue::Fixed(t))) = (chars.power, chars.toughness) {
                    chars.power = Some(PtValue::Fixed(t));
                    chars.toughness = Some(PtValue::Fixed(p));
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContinuousEffectId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousEffect {
    pub id: ContinuousEffectId,
    pub source: ObjectId,
    pub predicate: ObjectPredicate,
    pub modification: Modification,
    pub timestamp: Timestamp,
    pub duration: Duration,
    /// Effects that must be applied before this one, when this effect's
    /// `predicate` would evaluate differently depending on whether the
    /// dependency has already run (§4.1 "Ordering within a layer").
    pub depends_on: Vec<ContinuousEffectId>,
}

#[derive(Debug, Default)]
pub struct LayerEngine {
    effects: Vec<ContinuousEffect>,
    next_id: u64,
}

impl LayerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_effect(
        &mut self,
        source: ObjectId,
        predicate: ObjectPredicate,
        modification: Modification,
        timestamp: Timestamp,
        duration: Duration,
        depends_on: Vec<ContinuousEffectId>,
    ) -> ContinuousEffectId {
        let id = ContinuousEffectId(self.next_id);
        self.next_id += 1;
        self.effects.push(ContinuousEffect {
            id,
            source,
            predicate,
            modification,
            timestamp,
            duration,
            depends_on,
        });
        id
    }

    pub fn remove_effect(&mut self, id: ContinuousEffectId) {
        self.effects.retain(|e| e.id != id);
    }

    /// Removes every effect attributed to `source` (called when the source
    /// leaves the battlefield, before the next priority gift).
    pub fn remove_effects_from_source(&mut self, source: ObjectId) {
        self.effects.retain(|e| e.source != source);
    }

    pub fn remove_expired(&mut self, is_expired: impl Fn(Duration) -> bool) {
        self.effects.retain(|e| !is_expired(e.duration));
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Orders effects within one layer: topological by declared dependency,
    /// ties (and undeclared deps) broken by ascending timestamp, cycles
    /// broken by timestamp (§4.1).
    fn order_within_layer(effects: &[&ContinuousEffect]) -> Vec<usize> {
        let ids: Vec<ContinuousEffectId> = effects.iter().map(|e| e.id.clone()).collect();
        let index_of: HashMap<ContinuousEffectId, usize> =
            ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();

        let mut in_degree = vec![0usize; effects.len()];
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); effects.len()];
        for (i, e) in effects.iter().enumerate() {
            for dep in &e.depends_on {
                if let Some(&j) = index_of.get(dep) {
                    edges[j].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        let mut order = Vec::with_capacity(effects.len());
        let mut placed: HashSet<usize> = HashSet::new();
        while placed.len() < effects.len() {
            let mut ready: Vec<usize> = (0..effects.len())
                .filter(|i| !placed.contains(i) && in_degree[*i] == 0)
                .collect();
            if ready.is_empty() {
                // Cycle: break by timestamp among remaining.
                ready = (0..effects.len()).filter(|i| !placed.contains(i)).collect();
            }
            ready.sort_by_key(|&i| effects[i].timestamp);
            let next = ready[0];
            placed.insert(next);
            order.push(next);
            for &succ in &edges[next] {
                if in_degree[succ] > 0 {
                    in_degree[succ] -= 1;
                }
            }
        }
        order
    }

    /// Folds all matching effects across all layers in order, starting from
    /// `base`. `counters` supplies layer 7c directly from the permanent's
    /// counter multiset rather than a registered effect record (§4.1).
    pub fn compute_characteristics(
        &self,
        obj: &crate::object::GameObject,
        plus_minus_counters: (u32, u32),
    ) -> Characteristics {
        let mut chars = obj.base_characteristics.clone();
        for layer in Layer::ORDER {
            if layer == Layer::PtCounters {
                let (plus, minus) = plus_minus_counters;
                let net = plus as i32 - minus as i32;
                if net != 0 {
                    if let Some(PtValue::Fixed(p)) = chars.power {
                        chars.power = Some(PtValue::Fixed(p + net));
                    }
                    if let Some(PtValue::Fixed(t)) = chars.toughness {
                        chars.toughness = Some(PtValue::Fixed(t + net));
                    }
                }
                continue;
            }
            let matching: Vec<&ContinuousEffect> = self
                .effects
                .iter()
                .filter(|e| e.modification.layer() == layer && e.predicate.matches(obj))
                .collect();
            if matching.is_empty() {
                continue;
            }
            let order = Self::order_within_layer(&matching);
            for idx in order {
                matching[idx].modification.apply(&mut chars);
            }
        }
        chars
    }

    pub fn effective_power_toughness(
        &self,
        obj: &crate::object::GameObject,
        plus_minus_counters: (u32, u32),
    ) -> (i32, i32) {
        let chars = self.compute_characteristics(obj, plus_minus_counters);
        let p = match chars.power {
            Some(PtValue::Fixed(v)) => v,
            _ => 0,
        };
        let t = match chars.toughness {
            Some(PtValue::Fixed(v)) => v,
            _ => 0,
        };
        (p, t)
    }
}
