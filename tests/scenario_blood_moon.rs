//! A Blood-Moon-style interaction: a type-changing effect (layer 4) strips a
//! nonbasic land down to a basic Mountain, and a second effect that grants an
//! ability to lands of the land's original (nonbasic) subtype stops matching
//! once that type change has taken hold. Continuous effects are recomputed
//! from base characteristics every tick, so this is a two-tick convergence,
//! not something layer ordering gives for free within one tick.

use forgecore::card_db::HeuristicCardDatabase;
use forgecore::config::GameConfig;
use forgecore::game_state::GameState;
use forgecore::ids::{ObjectId, PlayerId};
use forgecore::layers::{Duration, Modification, ObjectPredicate};
use forgecore::mana::ManaCost;
use forgecore::object::{Characteristics, GameObject, ObjectKind, Permanent};
use forgecore::player::Player;
use forgecore::types::{BasicLandType, CardType, ColorSet, Keyword, Subtype, Zone};

fn game() -> GameState {
    let players = vec![Player::new(PlayerId(0), "Alice", 20)];
    GameState::new(players, GameConfig::default(), Box::new(HeuristicCardDatabase))
}

fn nonbasic_land(game: &mut GameState, subtype: &str) -> ObjectId {
    let id = game.ids.next_object_id();
    let chars = Characteristics {
        name: "Mystic Isle".into(),
        mana_cost: ManaCost::new(),
        colors: ColorSet::new(),
        card_types: vec![CardType::Land],
        subtypes: vec![Subtype::from(subtype)],
        supertypes: vec![],
        power: None,
        toughness: None,
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
    id
}

#[test]
fn blood_moon_converges_and_starves_a_subtype_keyed_ability_grant() {
    let mut game = game();
    let land = nonbasic_land(&mut game, "Mystic Isle");

    game.layers.add_effect(
        ObjectId::from_raw(900),
        ObjectPredicate::LandsWithSubtype(Subtype::from("Mystic Isle")),
        Modification::AddKeyword(Keyword::Vigilance),
        forgecore::ids::Timestamp(1),
        Duration::Permanent,
        vec![],
    );
    game.layers.add_effect(
        ObjectId::from_raw(901),
        ObjectPredicate::NonbasicLands,
        Modification::RemoveNonbasicLandTypesAddBasic(BasicLandType::Mountain),
        forgecore::ids::Timestamp(2),
        Duration::Permanent,
        vec![],
    );

    // First tick: the land is still "Mystic Isle" going in, so both effects
    // match and apply in the same fold.
    game.recompute_characteristics(land);
    let after_first = &game.zones.get(land).unwrap().current_characteristics;
    assert!(after_first.has_keyword(Keyword::Vigilance));
    assert!(after_first.has_subtype(&Subtype::from("Mountain")));

    // Second tick: the subtype-keyed grant no longer matches what Blood Moon
    // already turned the land into.
    game.recompute_characteristics(land);
    let after_second = &game.zones.get(land).unwrap().current_characteristics;
    assert!(!after_second.has_keyword(Keyword::Vigilance));
    assert!(after_second.has_subtype(&Subtype::from("Mountain")));
}
