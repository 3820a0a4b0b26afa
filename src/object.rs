//! Object model (component D): cards, permanents, stack objects, tokens, and
//! the immutable `Characteristics` snapshot the layer engine recomputes.

use std::collections::HashMap;

use crate::ids::{CardId, ObjectId, PlayerId, Timestamp};
use crate::mana::ManaCost;
use crate::target::Target;
use crate::types::{CardType, ColorSet, Keyword, Subtype, Supertype};

/// Power or toughness, either a fixed number or a characteristic-defining
/// value computed by layer 7a (e.g. "power equal to cards in hand").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtValue {
    Fixed(i32),
    CharacteristicDefining,
}

/// Immutable value record; replaced wholesale (never mutated in place) each
/// time the layer engine recomputes an object (§3 Characteristics).
#[derive(Debug, Clone, PartialEq)]
pub struct Characteristics {
    pub name: String,
    pub mana_cost: ManaCost,
    pub colors: ColorSet,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<Subtype>,
    pub supertypes: Vec<Supertype>,
    pub power: Option<PtValue>,
    pub toughness: Option<PtValue>,
    pub rules_text: String,
    pub keywords: Vec<Keyword>,
    pub ability_ids: Vec<u32>,
}

impl Characteristics {
    pub fn is_type(&self, t: CardType) -> bool {
        self.card_types.contains(&t)
    }

    pub fn has_subtype(&self, s: &Subtype) -> bool {
        self.subtypes.contains(s)
    }

    pub fn has_keyword(&self, k: Keyword) -> bool {
        self.keywords.contains(&k)
    }

    pub fn is_legendary(&self) -> bool {
        self.supertypes.contains(&Supertype::Legendary)
    }
}

/// Combat role recorded on a permanent during the combat phase (§4.8).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatRole {
    pub attacking: Option<crate::event::DamageTarget>,
    pub blocking: Vec<ObjectId>,
    pub blocked_by: Vec<ObjectId>,
}

/// A GameObject on the battlefield (§3 Permanent).
#[derive(Debug, Clone)]
pub struct Permanent {
    pub tapped: bool,
    pub damage_marked: u32,
    pub counters: HashMap<crate::types::CounterKind, u32>,
    pub attached_to: Option<ObjectId>,
    pub attachments: Vec<ObjectId>,
    pub combat: CombatRole,
    pub regeneration_shields: u32,
    pub summoning_sick: bool,
    pub dealt_damage_by_deathtouch: bool,
    pub loyalty: Option<i32>,
}

impl Default for Permanent {
    fn default() -> Self {
        Self {
            tapped: false,
            damage_marked: 0,
            counters: HashMap::new(),
            attached_to: None,
            attachments: Vec::new(),
            combat: CombatRole::default(),
            regeneration_shields: 0,
            summoning_sick: true,
            dealt_damage_by_deathtouch: false,
            loyalty: None,
        }
    }
}

/// A spell waiting to resolve on the stack.
#[derive(Debug, Clone)]
pub struct SpellOnStack {
    pub targets: Vec<Target>,
    pub x_value: u32,
    pub chosen_modes: Vec<usize>,
    pub is_copy: bool,
    pub effect: crate::effect::Effect,
}

/// An activated or triggered ability waiting to resolve on the stack.
#[derive(Debug, Clone)]
pub struct StackedAbility {
    pub source: ObjectId,
    pub targets: Vec<Target>,
    pub description: String,
    pub effect: crate::effect::Effect,
}

/// Discriminated union of everything that can occupy a zone (§9: tagged
/// variants instead of a class hierarchy).
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Card,
    Permanent(Permanent),
    SpellOnStack(SpellOnStack),
    StackedAbility(StackedAbility),
    Token(Permanent),
}

/// A GameObject: shared attributes plus a kind-specific payload (§3).
#[derive(Debug, Clone)]
pub struct GameObject {
    pub object_id: ObjectId,
    pub owner_id: PlayerId,
    pub controller_id: Option<PlayerId>,
    pub timestamp: Timestamp,
    pub card_id: Option<CardId>,
    pub base_characteristics: Characteristics,
    pub current_characteristics: Characteristics,
    pub kind: ObjectKind,
}

impl GameObject {
    /// Controller-or-owner (I3): the controller if assigned, else the owner.
    pub fn controller(&self) -> PlayerId {
        self.controller_id.unwrap_or(self.owner_id)
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self.kind, ObjectKind::Permanent(_) | ObjectKind::Token(_))
    }

    pub fn is_token(&self) -> bool {
        matches!(self.kind, ObjectKind::Token(_))
    }

    pub fn permanent(&self) -> Option<&Permanent> {
        match &self.kind {
            ObjectKind::Permanent(p) | ObjectKind::Token(p) => Some(p),
            _ => None,
        }
    }

    pub fn permanent_mut(&mut self) -> Option<&mut Permanent> {
        match &mut self.kind {
            ObjectKind::Permanent(p) | ObjectKind::Token(p) => Some(p),
            _ => None,
        }
    }

    /// Effective power/toughness reading straight off current
    /// characteristics plus +1/+1 / -1/-1 counters (layer 7c is folded into
    /// the layer engine; this is the convenience accessor call sites use).
    pub fn printed_pt(&self) -> Option<(i32, i32)> {
        let p = match self.current_characteristics.power? {
            PtValue::Fixed(v) => v,
            PtValue::CharacteristicDefining => 0,
        };
        let t = match self.current_characteristics.toughness? {
            PtValue::Fixed(v) => v,
            PtValue::CharacteristicDefining => 0,
        };
        Some((p, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CardId, ObjectId, Timestamp};
    use crate::mana::ManaCost;

    fn sample_characteristics(power: i32, toughness: i32) -> Characteristics {
        Characteristics {
            name: "Test Creature".into(),
            mana_cost: ManaCost::new(),
            colors: ColorSet::new(),
            card_types: vec![CardType::Creature],
            subtypes: vec![],
            supertypes: vec![],
            power: Some(PtValue::Fixed(power)),
            toughness: Some(PtValue::Fixed(toughness)),
            rules_text: String::new(),
            keywords: vec![],
            ability_ids: vec![],
        }
    }

    #[test]
    fn controller_falls_back_to_owner() {
        let owner = PlayerId(0);
        let obj = GameObject {
            object_id: ObjectId(1),
            owner_id: owner,
            controller_id: None,
            timestamp: Timestamp(1),
            card_id: Some(CardId(1)),
            base_characteristics: sample_characteristics(2, 2),
            current_characteristics: sample_characteristics(2, 2),
            kind: ObjectKind::Permanent(Permanent::default()),
        };
        assert_eq!(obj.controller(), owner);
    }

    #[test]
    fn printed_pt_reads_fixed_values() {
        let obj = GameObject {
            object_id: ObjectId(1),
            owner_id: PlayerId(0),
            controller_id: None,
            timestamp: Timestamp(1),
            card_id: None,
            base_characteristics: sample_characteristics(3, 4),
            current_characteristics: sample_characteristics(3, 4),
            kind: ObjectKind::Permanent(Permanent::default()),
        };
        assert_eq!(obj.printed_pt(), Some((3, 4)));
    }
}
