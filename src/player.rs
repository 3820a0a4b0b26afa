//! Player record (§3).

use crate::ids::PlayerId;
use crate::mana::ManaPool;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub life: i32,
    pub poison: u32,
    pub mana_pool: ManaPool,
    pub lost: bool,
    pub cannot_lose: bool,
    pub drew_from_empty_library: bool,
    pub land_played_this_turn: bool,
    pub max_lands_per_turn: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, starting_life: i32) -> Self {
        Self {
            id,
            name: name.into(),
            life: starting_life,
            poison: 0,
            mana_pool: ManaPool::new(),
            lost: false,
            cannot_lose: false,
            drew_from_empty_library: false,
            land_played_this_turn: false,
            max_lands_per_turn: 1,
        }
    }

    pub fn can_play_land(&self, lands_played_this_turn: u32) -> bool {
        lands_played_this_turn < self.max_lands_per_turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_alive_with_configured_life() {
        let p = Player::new(PlayerId(0), "Alice", 20);
        assert_eq!(p.life, 20);
        assert!(!p.lost);
        assert_eq!(p.poison, 0);
    }
}
