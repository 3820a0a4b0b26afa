//! Game controller (component N): the turn-loop driver that ties the
//! turn/priority/stack/SBA/combat/cast modules together into one running
//! game, plus setup and the mulligan procedure.
//!
//! Everything a player decides funnels through an [`Agent`]; this module
//! only ever asks for a choice among legal options and applies whatever
//! comes back.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, PriorityAction};
use crate::card_db::CardDatabase;
use crate::combat;
use crate::config::GameConfig;
use crate::effect::Effect;
use crate::error::{IllegalActionError, SetupError, TransactionError};
use crate::event::{DamageTarget, Event, LossReason};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::mana::ManaCost;
use crate::object::{Characteristics, GameObject, ObjectKind, Permanent};
use crate::player::Player;
use crate::priority::PassOutcome;
use crate::sba;
use crate::spell_cast::{self, CastRequest};
use crate::stack;
use crate::triggers::{self, PendingTrigger};
use crate::turn;
use crate::types::{CardType, ColorSet, Phase, Step, Zone};

/// Why a game ended (§6 "Game result (produced by core)"). Distinct from
/// [`LossReason`], which only ever explains why one player lost; a game can
/// also end in a turn-limit stalemate or a simultaneous-loss draw, neither of
/// which is any one player's loss reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameEndReason {
    Life,
    Poison,
    DrewFromEmpty,
    Concede,
    TurnLimit,
    Draw,
}

impl From<LossReason> for GameEndReason {
    fn from(reason: LossReason) -> Self {
        match reason {
            LossReason::Life => GameEndReason::Life,
            LossReason::Poison => GameEndReason::Poison,
            LossReason::DrewFromEmpty => GameEndReason::DrewFromEmpty,
            LossReason::Concede => GameEndReason::Concede,
        }
    }
}

/// The core's own account of how a game ended, handed back to whatever glue
/// ran it (§6). `final_life` is a plain association list rather than a map
/// keyed by `PlayerId`, so it round-trips through `serde_json` as an array
/// instead of needing string-keyed object support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub winner_id: Option<PlayerId>,
    pub reason: GameEndReason,
    pub turns_played: u32,
    pub final_life: Vec<(PlayerId, i32)>,
}

pub struct GameController {
    pub game: GameState,
    agents: HashMap<PlayerId, Box<dyn Agent>>,
    rng: StdRng,
}

impl GameController {
    /// Builds a fresh game: populates each player's library, shuffles it,
    /// and runs the opening-hand/mulligan procedure (CR 103.2-103.5).
    pub fn setup_game(
        players: Vec<Player>,
        libraries: HashMap<PlayerId, Vec<GameObject>>,
        config: GameConfig,
        card_db: Box<dyn CardDatabase>,
        agents: HashMap<PlayerId, Box<dyn Agent>>,
        seed: u64,
    ) -> Result<Self, SetupError> {
        if players.len() < 2 {
            return Err(SetupError::TooFewPlayers);
        }
        let player_ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        let mut game = GameState::new(players, config, card_db);
        for (_, objects) in libraries {
            for object in objects {
                game.zones.insert_new(object, Zone::Library);
            }
        }
        let mut rng = StdRng::seed_from_u64(seed);
        for &pid in &player_ids {
            game.zones.shuffle_library(pid, &mut rng);
        }
        let mut controller = Self { game, agents, rng };
        controller.run_mulligans(config.starting_hand_size as usize);
        Ok(controller)
    }

    /// CR 103.5, London mulligan: draw a full hand, let each player mulligan
    /// as many times as they want, then bottom one card per mulligan taken.
    /// The kernel bottoms the most-recently-drawn cards rather than asking
    /// the agent which to keep; a full implementation would ask.
    fn run_mulligans(&mut self, hand_size: usize) {
        let player_ids: Vec<PlayerId> = self.game.players.iter().map(|p| p.id).collect();
        for &pid in &player_ids {
            for _ in 0..hand_size {
                self.game.draw_card(pid);
            }
        }
        for &pid in &player_ids {
            let mut mulligans = 0usize;
            while self.agents.get_mut(&pid).map(|a| a.wants_mulligan(&self.game, pid, hand_size)).unwrap_or(false) {
                mulligans += 1;
                let hand: Vec<ObjectId> = self.game.zones.objects_in(Zone::Hand, pid).to_vec();
                for card in hand {
                    self.game.zones.move_to_library_bottom(card, &mut self.game.events);
                }
                self.game.zones.shuffle_library(pid, &mut self.rng);
                for _ in 0..hand_size {
                    self.game.draw_card(pid);
                }
            }
            for _ in 0..mulligans {
                if let Some(&card) = self.game.zones.objects_in(Zone::Hand, pid).last() {
                    self.game.zones.move_to_library_bottom(card, &mut self.game.events);
                }
            }
        }
    }

    /// Runs the game to completion: turn by turn until one player remains,
    /// everyone has lost, or the configured turn limit is reached (draw).
    pub fn play_game(&mut self) -> GameResult {
        let active_player = self.game.active_player;
        turn::start_new_turn(&mut self.game, active_player, 1);
        let mut skip_next_draw = true;

        loop {
            if let Some(result) = self.check_game_over() {
                return result;
            }
            let step = self.game.step.expect("a step is always set while the game runs");
            self.run_step_actions(step);
            if step.grants_priority() {
                self.run_priority_round();
                if let Some(result) = self.check_game_over() {
                    return result;
                }
            }

            if step == Step::Cleanup {
                if self.game.turn_number >= self.game.config.max_turns {
                    return self.build_result(None, GameEndReason::TurnLimit);
                }
                let next_active = self.next_active_player();
                let next_turn_number = self.game.turn_number + 1;
                turn::start_new_turn(&mut self.game, next_active, next_turn_number);
            } else {
                let next_step = step.next();
                let skip = skip_next_draw && next_step == Step::Draw;
                turn::enter_step(&mut self.game, next_step, Some(step.phase()), skip);
                if next_step == Step::Draw {
                    skip_next_draw = false;
                }
            }
        }
    }

    fn check_game_over(&self) -> Option<GameResult> {
        let alive: Vec<PlayerId> = self.game.players.iter().filter(|p| !p.lost).map(|p| p.id).collect();
        match alive.len() {
            0 => Some(self.build_result(None, GameEndReason::Draw)),
            1 => {
                let reason = self.last_loss_reason().map(GameEndReason::from).unwrap_or(GameEndReason::Draw);
                Some(self.build_result(Some(alive[0]), reason))
            }
            _ => None,
        }
    }

    /// The reason the most recently defeated player lost, if any (drives
    /// [`GameResult::reason`] for a decisive game).
    fn last_loss_reason(&self) -> Option<LossReason> {
        self.game.events.all().iter().rev().find_map(|event| match event {
            Event::PlayerLost { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    fn build_result(&self, winner_id: Option<PlayerId>, reason: GameEndReason) -> GameResult {
        GameResult {
            winner_id,
            reason,
            turns_played: self.game.turn_number,
            final_life: self.game.players.iter().map(|p| (p.id, p.life)).collect(),
        }
    }

    fn next_active_player(&self) -> PlayerId {
        let ids: Vec<PlayerId> = self.game.players.iter().map(|p| p.id).collect();
        let idx = ids.iter().position(|&id| id == self.game.active_player).unwrap_or(0);
        ids[(idx + 1) % ids.len()]
    }

    fn run_step_actions(&mut self, step: Step) {
        match step {
            Step::DeclareAttackers => self.run_declare_attackers(),
            Step::DeclareBlockers => self.run_declare_blockers(),
            Step::FirstStrikeDamage => {
                let agents = &mut self.agents;
                combat::deal_combat_damage_with(&mut self.game, true, |game, attacker, declared, power| {
                    Self::agent_damage_assignment(agents, game, attacker, declared, power)
                });
            }
            Step::CombatDamage => {
                let agents = &mut self.agents;
                combat::deal_combat_damage_with(&mut self.game, false, |game, attacker, declared, power| {
                    Self::agent_damage_assignment(agents, game, attacker, declared, power)
                });
            }
            Step::EndCombat => combat::clear_combat_state(&mut self.game),
            _ => {}
        }
    }

    /// Asks `attacker`'s controller to order its blockers (CR 509.2) and
    /// assign damage among them (CR 510.1c). Falls back to the declared
    /// order with no agent attached, matching every other decision point.
    fn agent_damage_assignment(
        agents: &mut HashMap<PlayerId, Box<dyn Agent>>,
        game: &GameState,
        attacker: ObjectId,
        declared: &[ObjectId],
        power: u32,
    ) -> (Vec<ObjectId>, Vec<u32>) {
        let controller = game.zones.get(attacker).map(|o| o.controller());
        let Some(agent) = controller.and_then(|c| agents.get_mut(&c)) else {
            return (declared.to_vec(), combat::lethal_first_assignment(game, attacker, power, declared));
        };
        let order = agent.order_blockers(game, controller.unwrap(), attacker, declared);
        let amounts = agent.assign_combat_damage(game, controller.unwrap(), attacker, &order, power);
        (order, amounts)
    }

    fn run_declare_attackers(&mut self) {
        let active = self.game.active_player;
        let defender = self.opponent_of(active);
        let eligible: Vec<ObjectId> = self
            .game
            .zones
            .battlefield()
            .iter()
            .copied()
            .filter(|&id| {
                self.game
                    .zones
                    .get(id)
                    .map(|o| o.controller() == active && o.current_characteristics.is_type(CardType::Creature))
                    .unwrap_or(false)
            })
            .collect();
        let chosen = match self.agents.get_mut(&active) {
            Some(agent) => agent.choose_attackers(&self.game, active, &eligible),
            None => Vec::new(),
        };
        for attacker in chosen {
            let _ = combat::declare_attacker(&mut self.game, attacker, DamageTarget::Player(defender));
        }
    }

    fn run_declare_blockers(&mut self) {
        let attackers: Vec<ObjectId> = self
            .game
            .zones
            .battlefield()
            .iter()
            .copied()
            .filter(|&id| {
                self.game.zones.get(id).and_then(|o| o.permanent()).and_then(|p| p.combat.attacking).is_some()
            })
            .collect();
        if attackers.is_empty() {
            return;
        }
        let active = self.game.active_player;
        let defenders: Vec<PlayerId> = self.game.players.iter().map(|p| p.id).filter(|&id| id != active).collect();
        for defender in defenders {
            let eligible: Vec<ObjectId> = self
                .game
                .zones
                .battlefield()
                .iter()
                .copied()
                .filter(|&id| {
                    self.game
                        .zones
                        .get(id)
                        .map(|o| o.controller() == defender && !o.permanent().map(|p| p.tapped).unwrap_or(true))
                        .unwrap_or(false)
                })
                .collect();
            let chosen = match self.agents.get_mut(&defender) {
                Some(agent) => agent.choose_blocks(&self.game, defender, &attackers, &eligible),
                None => Vec::new(),
            };
            for (blocker, attacker) in chosen {
                let _ = combat::declare_blocker(&mut self.game, blocker, attacker);
            }
        }
    }

    fn opponent_of(&self, player: PlayerId) -> PlayerId {
        self.game.players.iter().map(|p| p.id).find(|&id| id != player).unwrap_or(player)
    }

    /// One priority window (CR 117): resolve SBAs and triggers to a fixed
    /// point, then let players act in turn order until everyone passes with
    /// an empty stack.
    fn run_priority_round(&mut self) {
        loop {
            self.resolve_sba_and_triggers();
            self.game.priority.give_priority(self.game.active_player);
            loop {
                let Some(holder) = self.game.priority.holder() else { break };
                let actions = self.legal_actions(holder);
                let chosen = match self.agents.get_mut(&holder) {
                    Some(agent) => agent.choose_priority_action(&self.game, holder, &actions),
                    None => PriorityAction::PassPriority,
                };
                match chosen {
                    PriorityAction::PassPriority => {
                        if self.game.priority.pass_priority() == PassOutcome::AllPassed {
                            break;
                        }
                    }
                    other => {
                        if self.execute_action(holder, other).is_ok() {
                            self.game.priority.player_took_action();
                        }
                    }
                }
            }
            if self.game.zones.stack_is_empty() {
                return;
            }
            stack::resolve_top(&mut self.game);
        }
    }

    fn resolve_sba_and_triggers(&mut self) {
        loop {
            while sba::check_state_based_actions(&mut self.game) {}
            let mut triggers = std::mem::take(&mut self.game.triggers);
            triggers.poll_state_triggers(&self.game);
            self.game.triggers = triggers;
            if !self.game.triggers.has_pending() {
                return;
            }
            self.drain_triggers_to_stack();
        }
    }

    fn apnap_order(&self) -> Vec<PlayerId> {
        let n = self.game.players.len();
        let start = self.game.players.iter().position(|p| p.id == self.game.active_player).unwrap_or(0);
        (0..n).map(|i| self.game.players[(start + i) % n].id).collect()
    }

    fn drain_triggers_to_stack(&mut self) {
        let apnap = self.apnap_order();
        let mut triggers = std::mem::take(&mut self.game.triggers);
        let agents = &mut self.agents;
        let game = &self.game;
        let pending = triggers.drain_to_stack(game, &apnap, |batch| {
            if batch.is_empty() {
                return Vec::new();
            }
            let controller = batch[0].controller;
            let ids: Vec<u64> = batch.iter().map(|t| t.ability_id).collect();
            match agents.get_mut(&controller) {
                Some(agent) => agent.order_simultaneous_triggers(game, controller, &ids),
                None => (0..batch.len()).collect(),
            }
        });
        self.game.triggers = triggers;

        for trigger in pending {
            self.push_triggered_ability(trigger);
        }
    }

    fn push_triggered_ability(&mut self, trigger: PendingTrigger) {
        let ability = triggers::as_stacked_ability(&trigger, Vec::new());
        let id = self.game.ids.next_object_id();
        let chars = Characteristics {
            name: trigger.description,
            mana_cost: ManaCost::new(),
            colors: ColorSet::new(),
            card_types: vec![],
            subtypes: vec![],
            supertypes: vec![],
            power: None,
            toughness: None,
            rules_text: String::new(),
            keywords: vec![],
            ability_ids: vec![],
        };
        let obj = GameObject {
            object_id: id,
            owner_id: trigger.controller,
            controller_id: Some(trigger.controller),
            timestamp: self.game.ids.next_timestamp(),
            card_id: None,
            base_characteristics: chars.clone(),
            current_characteristics: chars,
            kind: ObjectKind::StackedAbility(ability),
        };
        self.game.zones.insert_new(obj, Zone::Stack);
    }

    /// The legal actions available to `player` right now. Activated
    /// abilities aren't modeled (no ability registry exists beyond
    /// triggered and spell effects), so [`PriorityAction::ActivateAbility`]
    /// is always rejected by [`Self::execute_action`] rather than offered
    /// here.
    fn legal_actions(&self, player: PlayerId) -> Vec<PriorityAction> {
        let mut actions = vec![PriorityAction::PassPriority];
        let stack_empty = self.game.zones.stack_is_empty();
        let is_main_phase = matches!(self.game.phase, Phase::PrecombatMain | Phase::PostcombatMain);
        let is_active = self.game.active_player == player;
        let has_priority = self.game.priority.holder() == Some(player);
        let sorcery_speed_ok = stack_empty && is_main_phase && is_active && has_priority;
        let land_already_played = self.game.player(player).map(|p| p.land_played_this_turn).unwrap_or(true);

        for &card in self.game.zones.objects_in(Zone::Hand, player) {
            let Some(obj) = self.game.zones.get(card) else { continue };
            let is_land = obj.current_characteristics.is_type(CardType::Land);
            let is_instant = obj.current_characteristics.is_type(CardType::Instant);
            if is_land {
                if sorcery_speed_ok && !land_already_played {
                    actions.push(PriorityAction::PlayLand { card });
                }
            } else if is_instant || sorcery_speed_ok {
                actions.push(PriorityAction::CastSpell { card });
            }
        }
        actions
    }

    fn execute_action(&mut self, player: PlayerId, action: PriorityAction) -> Result<(), TransactionError> {
        match action {
            PriorityAction::PassPriority => Ok(()),
            PriorityAction::PlayLand { card } => self.play_land(player, card),
            PriorityAction::CastSpell { card } => self.cast_spell_from_hand(player, card),
            PriorityAction::ActivateAbility { .. } => Err(IllegalActionError::NoSuchAbility.into()),
        }
    }

    fn play_land(&mut self, player: PlayerId, card: ObjectId) -> Result<(), TransactionError> {
        if self.game.active_player != player || self.game.zones.zone_of(card) != Some(Zone::Hand) {
            return Err(IllegalActionError::OutOfTurn.into());
        }
        if self.game.player(player).map(|p| p.land_played_this_turn).unwrap_or(true) {
            return Err(IllegalActionError::LandAlreadyPlayed.into());
        }
        self.game.zones.move_object(card, Zone::Battlefield, &mut self.game.events);
        if let Some(obj) = self.game.zones.get_mut(card) {
            obj.kind = ObjectKind::Permanent(Permanent::default());
            obj.controller_id = Some(player);
        }
        self.game.recompute_characteristics(card);
        self.game.lands_played_this_turn += 1;
        if let Some(p) = self.game.player_mut(player) {
            p.land_played_this_turn = true;
        }
        self.game.events.publish(Event::LandPlayed { player, object: card });
        Ok(())
    }

    fn cast_spell_from_hand(&mut self, player: PlayerId, card: ObjectId) -> Result<(), TransactionError> {
        let Some(obj) = self.game.zones.get(card) else {
            return Err(IllegalActionError::NoSuchAbility.into());
        };
        let cost = obj.current_characteristics.mana_cost.clone();
        let effect = self.spell_effect_for(&obj.current_characteristics.name);
        let request = CastRequest { card, caster: player, cost, x_value: 0, targets: Vec::new(), chosen_modes: Vec::new(), effect };
        spell_cast::cast_spell(&mut self.game, request).map(|_| ())
    }

    fn spell_effect_for(&self, name: &str) -> Effect {
        self.game.card_db.lookup(name).spell_effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RandomAgent;
    use crate::card_db::HeuristicCardDatabase;
    use crate::ids::{CardId, Timestamp};
    use crate::object::PtValue;
    use crate::types::{CardType, ColorSet};

    fn filler_card(alloc_id: u64, owner: PlayerId) -> GameObject {
        let chars = Characteristics {
            name: "Filler Creature".into(),
            mana_cost: ManaCost::new(),
            colors: ColorSet::new(),
            card_types: vec![CardType::Creature],
            subtypes: vec![],
            supertypes: vec![],
            power: Some(PtValue::Fixed(1)),
            toughness: Some(PtValue::Fixed(1)),
            rules_text: String::new(),
            keywords: vec![],
            ability_ids: vec![],
        };
        GameObject {
            object_id: ObjectId(alloc_id),
            owner_id: owner,
            controller_id: None,
            timestamp: Timestamp(alloc_id),
            card_id: Some(CardId(1)),
            base_characteristics: chars.clone(),
            current_characteristics: chars,
            kind: ObjectKind::Card,
        }
    }

    fn two_player_setup(library_size: usize) -> GameController {
        let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
        let mut libraries = HashMap::new();
        let mut next_id = 100u64;
        for pid in [PlayerId(0), PlayerId(1)] {
            let mut cards = Vec::new();
            for _ in 0..library_size {
                cards.push(filler_card(next_id, pid));
                next_id += 1;
            }
            libraries.insert(pid, cards);
        }
        let mut agents: HashMap<PlayerId, Box<dyn Agent>> = HashMap::new();
        agents.insert(PlayerId(0), Box::new(RandomAgent::new(1)));
        agents.insert(PlayerId(1), Box::new(RandomAgent::new(2)));
        GameController::setup_game(players, libraries, GameConfig::default(), Box::new(HeuristicCardDatabase), agents, 7)
            .unwrap()
    }

    #[test]
    fn setup_deals_a_seven_card_opening_hand() {
        let controller = two_player_setup(20);
        let hand_a = controller.game.zones.objects_in(Zone::Hand, PlayerId(0)).len();
        assert_eq!(hand_a, 7);
    }

    #[test]
    fn a_player_at_zero_life_hands_the_other_a_life_reason_win() {
        let mut controller = two_player_setup(20);
        controller.game.player_mut(PlayerId(1)).unwrap().life = 0;
        // check_game_over only reads the `lost` flag; the zero-life player
        // hasn't lost yet until an SBA pass records it, same as play_game's
        // own loop (run_step_actions, then resolve_sba_and_triggers, then
        // check_game_over).
        assert!(controller.check_game_over().is_none());
        sba::check_state_based_actions(&mut controller.game);
        let result = controller.check_game_over().expect("bob has now lost");
        assert_eq!(result.winner_id, Some(PlayerId(0)));
        assert_eq!(result.reason, GameEndReason::Life);
    }

    #[test]
    fn setup_rejects_fewer_than_two_players() {
        let players = vec![Player::new(PlayerId(0), "Solo", 20)];
        let agents: HashMap<PlayerId, Box<dyn Agent>> = HashMap::new();
        let result = GameController::setup_game(players, HashMap::new(), GameConfig::default(), Box::new(HeuristicCardDatabase), agents, 1);
        assert_eq!(result.err(), Some(SetupError::TooFewPlayers));
    }

    #[test]
    fn a_short_game_terminates_within_the_turn_limit() {
        let mut config = GameConfig::default();
        config.max_turns = 20;
        let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
        let mut libraries = HashMap::new();
        let mut next_id = 200u64;
        for pid in [PlayerId(0), PlayerId(1)] {
            let mut cards = Vec::new();
            for _ in 0..30 {
                cards.push(filler_card(next_id, pid));
                next_id += 1;
            }
            libraries.insert(pid, cards);
        }
        let mut agents: HashMap<PlayerId, Box<dyn Agent>> = HashMap::new();
        agents.insert(PlayerId(0), Box::new(RandomAgent::new(3)));
        agents.insert(PlayerId(1), Box::new(RandomAgent::new(4)));
        let mut controller =
            GameController::setup_game(players, libraries, config, Box::new(HeuristicCardDatabase), agents, 9).unwrap();
        // With 30-card libraries and 20 life each, the loop must still
        // terminate by the turn cap even if nobody reduces the other to 0.
        let result = controller.play_game();
        assert!(result.turns_played <= config.max_turns + 1);
        assert_eq!(result.final_life.len(), 2);
    }
}
