//! Game configuration surface (§6). Plain value struct; no config-file
//! crate, constructed by glue (CLI parsing or test defaults).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub starting_life: i32,
    pub starting_hand_size: u8,
    pub max_turns: u32,
    pub poison_threshold: u8,
    pub verbose: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_life: 20,
            starting_hand_size: 7,
            max_turns: 250,
            poison_threshold: 10,
            verbose: false,
        }
    }
}
