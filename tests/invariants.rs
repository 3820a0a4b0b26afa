//! Cross-cutting invariants that don't belong to any one module: every
//! object lives in exactly one zone, games driven end-to-end always reach a
//! definite outcome, and a triggered ability can make the full round trip
//! from event to stack to resolution.

use std::collections::HashMap;

use forgecore::agent::{Agent, RandomAgent};
use forgecore::card_db::HeuristicCardDatabase;
use forgecore::config::GameConfig;
use forgecore::controller::GameController;
use forgecore::effect::Effect;
use forgecore::event::Event;
use forgecore::game_state::GameState;
use forgecore::ids::{CardId, ObjectId, PlayerId, Timestamp};
use forgecore::mana::ManaCost;
use forgecore::object::{Characteristics, GameObject, ObjectKind, Permanent, PtValue, StackedAbility};
use forgecore::player::Player;
use forgecore::stack::{resolve_top, ResolutionOutcome};
use forgecore::triggers::{as_stacked_ability, EventKind, PendingTrigger, RegisteredTrigger, SourceBinding};
use forgecore::types::{CardType, ColorSet, Zone};
use forgecore::GameResult;

fn two_player_game() -> GameState {
    let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
    GameState::new(players, GameConfig::default(), Box::new(HeuristicCardDatabase))
}

fn filler_library(owner: PlayerId, size: usize, next_id: &mut u64) -> Vec<GameObject> {
    (0..size)
        .map(|_| {
            let id = *next_id;
            *next_id += 1;
            let chars = Characteristics {
                name: "Wandering Construct".into(),
                mana_cost: ManaCost::new(),
                colors: ColorSet::new(),
                card_types: vec![CardType::Creature],
                subtypes: vec![],
                supertypes: vec![],
                power: Some(PtValue::Fixed(2)),
                toughness: Some(PtValue::Fixed(2)),
                rules_text: String::new(),
                keywords: vec![],
                ability_ids: vec![],
            };
            GameObject {
                object_id: ObjectId::from_raw(id),
                owner_id: owner,
                controller_id: None,
                timestamp: Timestamp(id),
                card_id: Some(CardId::from_raw(id as u32)),
                base_characteristics: chars.clone(),
                current_characteristics: chars,
                kind: ObjectKind::Card,
            }
        })
        .collect()
}

#[test]
fn every_object_occupies_exactly_one_zone_after_a_sequence_of_moves() {
    let mut game = two_player_game();
    let ids: Vec<ObjectId> = (0..5)
        .map(|_| {
            let id = game.ids.next_object_id();
            let chars = Characteristics {
                name: "Token".into(),
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
            let obj = GameObject {
                object_id: id,
                owner_id: PlayerId(0),
                controller_id: None,
                timestamp: game.ids.next_timestamp(),
                card_id: None,
                base_characteristics: chars.clone(),
                current_characteristics: chars,
                kind: ObjectKind::Permanent(Permanent::default()),
            };
            game.zones.insert_new(obj, Zone::Hand);
            id
        })
        .collect();

    game.zones.move_object(ids[0], Zone::Battlefield, &mut game.events);
    game.zones.move_object(ids[1], Zone::Graveyard, &mut game.events);
    game.zones.move_object(ids[2], Zone::Exile, &mut game.events);
    game.zones.move_object(ids[0], Zone::Graveyard, &mut game.events);

    for &zone in &[Zone::Library, Zone::Hand, Zone::Battlefield, Zone::Graveyard, Zone::Stack, Zone::Exile, Zone::Command]
    {
        for &id in &ids {
            let present = game.zones.objects_in(zone, PlayerId(0)).contains(&id);
            if present {
                assert_eq!(game.zones.zone_of(id), Some(zone));
            }
        }
    }
    // Every object still exists, in exactly the zone `zone_of` reports.
    for &id in &ids {
        let reported = game.zones.zone_of(id).unwrap();
        let in_buckets = [Zone::Library, Zone::Hand, Zone::Battlefield, Zone::Graveyard, Zone::Stack, Zone::Exile, Zone::Command]
            .iter()
            .filter(|&&z| game.zones.objects_in(z, PlayerId(0)).contains(&id))
            .count();
        assert_eq!(in_buckets, 1, "object {:?} should be in exactly one zone bucket, reported zone {:?}", id, reported);
    }
}

#[test]
fn full_games_always_terminate_with_a_winner_or_a_draw() {
    for seed in 0..5u64 {
        let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
        let mut next_id = 1u64;
        let mut libraries = HashMap::new();
        libraries.insert(PlayerId(0), filler_library(PlayerId(0), 30, &mut next_id));
        libraries.insert(PlayerId(1), filler_library(PlayerId(1), 30, &mut next_id));

        let mut agents: HashMap<PlayerId, Box<dyn Agent>> = HashMap::new();
        agents.insert(PlayerId(0), Box::new(RandomAgent::new(seed)));
        agents.insert(PlayerId(1), Box::new(RandomAgent::new(seed.wrapping_add(100))));

        let config = GameConfig { max_turns: 15, ..GameConfig::default() };
        let mut controller = GameController::setup_game(
            players,
            libraries,
            config,
            Box::new(HeuristicCardDatabase),
            agents,
            seed,
        )
        .unwrap();

        let result: GameResult = controller.play_game();
        if let Some(p) = result.winner_id {
            assert!(p == PlayerId(0) || p == PlayerId(1));
        }
        assert_eq!(result.turns_played, controller.game.turn_number);
        assert_eq!(result.final_life.len(), 2);
        assert!(controller.game.turn_number <= config.max_turns + 1);
    }
}

#[test]
fn a_dies_trigger_makes_the_round_trip_from_event_to_stack_to_resolution() {
    let mut game = two_player_game();

    let id = game.ids.next_object_id();
    let chars = Characteristics {
        name: "Fallen Soldier".into(),
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
    let obj = GameObject {
        object_id: id,
        owner_id: PlayerId(0),
        controller_id: None,
        timestamp: game.ids.next_timestamp(),
        card_id: None,
        base_characteristics: chars.clone(),
        current_characteristics: chars,
        kind: ObjectKind::Permanent(Permanent::default()),
    };
    game.zones.insert_new(obj, Zone::Battlefield);

    game.triggers.register(RegisteredTrigger {
        id: 0,
        source: id,
        controller: PlayerId(0),
        event_kind: EventKind::Dies,
        binding: SourceBinding::Itself,
        effect: Effect::DrawCards { player: forgecore::effect::EffectPlayer::Controller, count: 1 },
        description: "when this dies, draw a card".into(),
        one_shot: false,
        intervening_if: None,
        is_state_trigger: false,
        delayed_expiry: None,
    });

    game.destroy(id);
    assert_eq!(game.zones.zone_of(id), Some(Zone::Graveyard));
    assert!(game.events.all().iter().any(|e| matches!(e, Event::Dies { .. })));
    assert!(game.triggers.has_pending());

    // `drain_to_stack` needs `&mut self.triggers` and `&self` (the rest of
    // `game`) at once; lift the manager out first so the borrows stay
    // disjoint, the same trick the controller uses each priority round.
    let mut triggers = std::mem::take(&mut game.triggers);
    let drained: Vec<PendingTrigger> =
        triggers.drain_to_stack(&game, &[PlayerId(0), PlayerId(1)], |batch| (0..batch.len()).collect());
    game.triggers = triggers;
    assert_eq!(drained.len(), 1);

    let ability_obj_id = game.ids.next_object_id();
    let ability_chars = Characteristics {
        name: drained[0].description.clone(),
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
    let stacked: StackedAbility = as_stacked_ability(&drained[0], vec![]);
    let ability_on_stack = GameObject {
        object_id: ability_obj_id,
        owner_id: PlayerId(0),
        controller_id: Some(PlayerId(0)),
        timestamp: game.ids.next_timestamp(),
        card_id: None,
        base_characteristics: ability_chars.clone(),
        current_characteristics: ability_chars,
        kind: ObjectKind::StackedAbility(stacked),
    };
    game.zones.insert_new(ability_on_stack, Zone::Stack);

    let before = game.zones.library_size(PlayerId(0));
    let hand_before = game.zones.objects_in(Zone::Hand, PlayerId(0)).len();
    let outcome = resolve_top(&mut game);
    assert_eq!(outcome, Some(ResolutionOutcome::Resolved));
    // The controller drew a card (or, with an empty library, recorded the
    // empty-library flag instead of panicking).
    let hand_after = game.zones.objects_in(Zone::Hand, PlayerId(0)).len();
    if before > 0 {
        assert_eq!(hand_after, hand_before + 1);
    } else {
        assert!(game.player(PlayerId(0)).unwrap().drew_from_empty_library);
    }
}
