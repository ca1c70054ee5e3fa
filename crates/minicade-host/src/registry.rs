use std::collections::HashMap;

use minicade_core::catalog::GameId;
use minicade_core::game_trait::GameInstance;

/// Constructor for a game sized to the host viewport.
pub type GameFactory = fn(f32, f32) -> Box<dyn GameInstance>;

/// Maps catalog ids to game constructors.
pub struct GameRegistry {
    factories: HashMap<GameId, GameFactory>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    /// A registry with every built-in game enabled by crate features.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_defaults();
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    fn register_defaults(&mut self) {
        #[cfg(feature = "puzzle")]
        {
            use minicade_puzzle::{Maze, Memory, Pipes, Sudoku};
            self.register("puzzle_002", |w, h| Box::new(Sudoku::new(w, h)));
            self.register("puzzle_004", |w, h| Box::new(Memory::new(w, h)));
            self.register("puzzle_009", |w, h| Box::new(Pipes::new(w, h)));
            self.register("chess_004", |w, h| Box::new(Maze::new(w, h)));
        }
        #[cfg(feature = "casual")]
        {
            use minicade_casual::{BlockMatch, FruitLink, Minesweeper};
            self.register("casual_001", |w, h| Box::new(Minesweeper::new(w, h)));
            self.register("casual_005", |w, h| Box::new(BlockMatch::new(w, h)));
            self.register("casual_007", |w, h| Box::new(FruitLink::new(w, h)));
        }
        #[cfg(feature = "match3")]
        self.register("match3_001", |w, h| Box::new(minicade_match3::GemMatch::new(w, h)));
        #[cfg(feature = "board")]
        {
            use minicade_board::{Checkers, Go, Reversi};
            self.register("chess_002", |w, h| Box::new(Reversi::new(w, h)));
            self.register("chess_005", |w, h| Box::new(Checkers::new(w, h)));
            self.register("chess_007", |w, h| Box::new(Go::new(w, h)));
        }
        #[cfg(feature = "arcade")]
        {
            use minicade_arcade::{Breakout, Pinball, Snake};
            self.register("arcade_001", |w, h| Box::new(Snake::new(w, h)));
            self.register("arcade_003", |w, h| Box::new(Breakout::new(w, h)));
            self.register("arcade_005", |w, h| Box::new(Pinball::new(w, h)));
        }
    }

    /// Add or replace the constructor for `id`.
    pub fn register(&mut self, id: &str, factory: GameFactory) {
        self.factories.insert(GameId::new(id), factory);
    }

    pub fn create(&self, id: &str, width: f32, height: f32) -> Option<Box<dyn GameInstance>> {
        self.factories.get(&GameId::new(id)).map(|f| f(width, height))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(&GameId::new(id))
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn available_games(&self) -> usize {
        self.factories.len()
    }
}

#[cfg(test)]
mod tests {
    use minicade_core::catalog;
    use minicade_core::test_helpers::{HEIGHT, WIDTH};

    use super::*;

    #[test]
    fn defaults_register_every_implemented_game() {
        let registry = GameRegistry::new();
        assert_eq!(registry.available_games(), 14);
        for id in registry.ids() {
            assert!(catalog::find(id.as_str()).is_some(), "{id} is not in the catalog");
        }
    }

    #[test]
    fn created_games_start_fresh() {
        let registry = GameRegistry::new();
        for id in registry.ids() {
            let game = registry.create(id.as_str(), WIDTH, HEIGHT).unwrap();
            assert_eq!(game.score(), 0, "{id}");
            assert!(!game.is_terminal(), "{id}");
        }
    }

    #[test]
    fn unknown_id_is_none() {
        let registry = GameRegistry::new();
        assert!(registry.create("arcade_002", WIDTH, HEIGHT).is_none());
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn register_replaces_factory() {
        let mut registry = GameRegistry::empty();
        assert_eq!(registry.available_games(), 0);
        registry.register("casual_005", |w, h| Box::new(minicade_casual::BlockMatch::with_seed(w, h, 1)));
        registry.register("casual_005", |w, h| Box::new(minicade_casual::BlockMatch::with_seed(w, h, 2)));
        assert_eq!(registry.available_games(), 1);
        assert!(registry.contains("casual_005"));
    }
}
