//! Runs a single game between two [`RandomAgent`]s and prints the outcome.
//! Thin glue over [`GameController`]; the interesting logic all lives in the
//! library crate.

use std::collections::HashMap;
use std::env;

use forgecore::card_db::HeuristicCardDatabase;
use forgecore::config::GameConfig;
use forgecore::object::{Characteristics, GameObject, ObjectKind};
use forgecore::ids::{CardId, ObjectId, PlayerId, Timestamp};
use forgecore::mana::ManaCost;
use forgecore::player::Player;
use forgecore::types::{CardType, ColorSet};
use forgecore::{Agent, GameController, RandomAgent};

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
                power: Some(forgecore::object::PtValue::Fixed(2)),
                toughness: Some(forgecore::object::PtValue::Fixed(2)),
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

fn main() {
    let seed: u64 = env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(0);

    let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
    let mut next_id = 1u64;
    let mut libraries = HashMap::new();
    libraries.insert(PlayerId(0), filler_library(PlayerId(0), 40, &mut next_id));
    libraries.insert(PlayerId(1), filler_library(PlayerId(1), 40, &mut next_id));

    let mut agents: HashMap<PlayerId, Box<dyn Agent>> = HashMap::new();
    agents.insert(PlayerId(0), Box::new(RandomAgent::new(seed)));
    agents.insert(PlayerId(1), Box::new(RandomAgent::new(seed.wrapping_add(1))));

    let mut controller = GameController::setup_game(
        players,
        libraries,
        GameConfig::default(),
        Box::new(HeuristicCardDatabase),
        agents,
        seed,
    )
    .expect("setup should succeed with two players");

    let result = controller.play_game();
    match result.winner_id {
        Some(player) => println!("player {} wins (seed {seed}, reason {:?})", player.0, result.reason),
        None => println!("draw (seed {seed}, reason {:?})", result.reason),
    }
}
