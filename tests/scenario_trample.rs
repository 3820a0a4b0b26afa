//! Trample damage assignment across a full attack: declare, validate, deal
//! damage, and let the blocker's death fall out of the state-based-action
//! fixed point rather than being asserted directly.

use forgecore::card_db::HeuristicCardDatabase;
use forgecore::combat::{clear_combat_state, deal_combat_damage, declare_attacker, declare_blocker};
use forgecore::config::GameConfig;
use forgecore::event::DamageTarget;
use forgecore::game_state::GameState;
use forgecore::ids::{ObjectId, PlayerId};
use forgecore::mana::ManaCost;
use forgecore::object::{Characteristics, GameObject, ObjectKind, Permanent, PtValue};
use forgecore::player::Player;
use forgecore::sba::check_state_based_actions;
use forgecore::types::{CardType, ColorSet, Keyword, Zone};

fn game() -> GameState {
    let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
    GameState::new(players, GameConfig::default(), Box::new(HeuristicCardDatabase))
}

fn creature(game: &mut GameState, owner: PlayerId, power: i32, toughness: i32, keywords: Vec<Keyword>) -> ObjectId {
    let id = game.ids.next_object_id();
    let chars = Characteristics {
        name: "Creature".into(),
        mana_cost: ManaCost::new(),
        colors: ColorSet::new(),
        card_types: vec![CardType::Creature],
        subtypes: vec![],
        supertypes: vec![],
        power: Some(PtValue::Fixed(power)),
        toughness: Some(PtValue::Fixed(toughness)),
        rules_text: String::new(),
        keywords,
        ability_ids: vec![],
    };
    let mut perm = Permanent::default();
    perm.summoning_sick = false;
    let obj = GameObject {
        object_id: id,
        owner_id: owner,
        controller_id: None,
        timestamp: game.ids.next_timestamp(),
        card_id: None,
        base_characteristics: chars.clone(),
        current_characteristics: chars,
        kind: ObjectKind::Permanent(perm),
    };
    game.zones.insert_new(obj, Zone::Battlefield);
    id
}

fn run_sba_to_fixed_point(game: &mut GameState) {
    while check_state_based_actions(game) {}
}

#[test]
fn a_big_trampler_kills_its_blocker_and_still_tramples_damage_through() {
    let mut game = game();
    let attacker = creature(&mut game, PlayerId(0), 6, 6, vec![Keyword::Trample]);
    let blocker = creature(&mut game, PlayerId(1), 2, 2, vec![]);

    declare_attacker(&mut game, attacker, DamageTarget::Player(PlayerId(1))).unwrap();
    declare_blocker(&mut game, blocker, attacker).unwrap();
    deal_combat_damage(&mut game, false);

    // 2 lethal to the blocker, 4 trample through to the player.
    assert_eq!(game.player(PlayerId(1)).unwrap().life, 16);

    run_sba_to_fixed_point(&mut game);
    assert_eq!(game.zones.zone_of(blocker), Some(Zone::Graveyard));

    clear_combat_state(&mut game);
    assert!(game.zones.get(attacker).unwrap().permanent().unwrap().combat.attacking.is_none());
}

#[test]
fn trample_with_no_blocker_assigns_full_power_to_the_defending_player() {
    let mut game = game();
    let attacker = creature(&mut game, PlayerId(0), 4, 4, vec![Keyword::Trample]);
    declare_attacker(&mut game, attacker, DamageTarget::Player(PlayerId(1))).unwrap();
    deal_combat_damage(&mut game, false);
    assert_eq!(game.player(PlayerId(1)).unwrap().life, 16);
}
