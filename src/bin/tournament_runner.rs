//! Runs a batch of independent games and reports aggregate win counts.
//! Each game gets its own seed, so results are reproducible given the same
//! starting seed and game count.

use std::collections::HashMap;
use std::env;

use forgecore::card_db::HeuristicCardDatabase;
use forgecore::config::GameConfig;
use forgecore::ids::{CardId, ObjectId, PlayerId, Timestamp};
use forgecore::mana::ManaCost;
use forgecore::object::{Characteristics, GameObject, ObjectKind, PtValue};
use forgecore::player::Player;
use forgecore::types::{CardType, ColorSet};
use forgecore::{Agent, GameController, GameResult, RandomAgent};

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

fn run_one(seed: u64) -> GameResult {
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
    controller.play_game()
}

fn main() {
    let game_count: u64 = env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(100);
    let base_seed: u64 = env::args().nth(2).and_then(|s| s.parse().ok()).unwrap_or(0);

    let mut wins: HashMap<PlayerId, u64> = HashMap::new();
    let mut draws = 0u64;

    for i in 0..game_count {
        match run_one(base_seed.wrapping_add(i)).winner_id {
            Some(player) => *wins.entry(player).or_insert(0) += 1,
            None => draws += 1,
        }
    }

    println!("games: {game_count}");
    for player in [PlayerId(0), PlayerId(1)] {
        println!("player {} wins: {}", player.0, wins.get(&player).copied().unwrap_or(0));
    }
    println!("draws: {draws}");
}
