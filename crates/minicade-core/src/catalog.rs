//! Static game catalog: categories, display data and cheat menus.

use std::fmt;

use serde::{Deserialize, Serialize};

use self::Difficulty::{High, Low, Medium};

/// Unique identifier for a catalog entry, e.g. `"arcade_001"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub difficulty: Difficulty,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub games: &'static [GameInfo],
}

/// One entry of a game's cheat menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheatEntry {
    pub label: &'static str,
    pub action: &'static str,
}

const fn game(id: &'static str, name: &'static str, difficulty: Difficulty, icon: &'static str) -> GameInfo {
    GameInfo {
        id,
        name,
        difficulty,
        icon,
    }
}

pub static CATEGORIES: &[Category] = &[
    Category {
        id: "puzzle",
        name: "Brain Teasers",
        icon: "🧩",
        games: &[
            game("puzzle_001", "2048", Medium, "🔢"),
            game("puzzle_002", "Sudoku", High, "🎯"),
            game("puzzle_003", "Jigsaw", Medium, "🧩"),
            game("puzzle_004", "Memory", Low, "🃏"),
            game("puzzle_005", "Sokoban", High, "📦"),
            game("puzzle_006", "Klotski", High, "🚪"),
            game("puzzle_007", "Number Link", Low, "🔗"),
            game("puzzle_008", "Color Match", Low, "🎨"),
            game("puzzle_009", "Pipes", Medium, "🔧"),
            game("puzzle_010", "Code Breaker", High, "🔐"),
        ],
    },
    Category {
        id: "arcade",
        name: "Classic Arcade",
        icon: "🎮",
        games: &[
            game("arcade_001", "Snake", Low, "🐍"),
            game("arcade_002", "Tetris", Medium, "🧱"),
            game("arcade_003", "Breakout", Medium, "🏐"),
            game("arcade_004", "Street Racer", Medium, "🏎️"),
            game("arcade_005", "Pinball", Medium, "🎳"),
            game("arcade_006", "Copter", Low, "🚁"),
            game("arcade_007", "Sky Shooter", Medium, "✈️"),
            game("arcade_008", "Gold Miner", Low, "⛏️"),
            game("arcade_009", "Brick Jump", Low, "🪜"),
            game("arcade_010", "Ice Slide", Low, "🧊"),
        ],
    },
    Category {
        id: "casual",
        name: "Casual Clear",
        icon: "🎯",
        games: &[
            game("casual_001", "Minesweeper", Medium, "💣"),
            game("casual_002", "Solitaire", Medium, "🃏"),
            game("casual_003", "Pair Up", Low, "🎴"),
            game("casual_004", "Mahjong Clear", Medium, "🀄"),
            game("casual_005", "Block Match", Low, "👆"),
            game("casual_006", "Slice Master", Medium, "🔪"),
            game("casual_007", "Fruit Link", Low, "🍎"),
            game("casual_008", "Spot the Difference", Low, "🔍"),
            game("casual_009", "Block Clear", Medium, "🔶"),
            game("casual_010", "Tic-Tac-Toe", Low, "⭕"),
        ],
    },
    Category {
        id: "chess",
        name: "Board & Strategy",
        icon: "♟️",
        games: &[
            game("chess_001", "Gomoku", High, "⬛"),
            game("chess_002", "Reversi", High, "⚫"),
            game("chess_003", "Chess", High, "♔"),
            game("chess_004", "Maze", Low, "🌀"),
            game("chess_005", "Checkers", Medium, "⭕"),
            game("chess_006", "Xiangqi", High, "車"),
            game("chess_007", "Go Basics", High, "⚪"),
            game("chess_008", "Hunt", Medium, "🔲"),
            game("chess_009", "Tower Defense", Medium, "🏰"),
            game("chess_010", "2048 Tactics", Medium, "🎲"),
        ],
    },
    Category {
        id: "match3",
        name: "Match Three",
        icon: "💎",
        games: &[
            game("match3_001", "Gem Match", Medium, "💍"),
            game("match3_002", "Bubble Shooter", Medium, "🫧"),
            game("match3_003", "Candy Crush", Medium, "🍬"),
            game("match3_004", "Zuma", Medium, "🐍"),
            game("match3_005", "Fruit Ninja", Low, "🔪"),
            game("match3_006", "Frost Match", Medium, "❄️"),
            game("match3_007", "Animal Match", Low, "🐾"),
            game("match3_008", "Cookie Match", Low, "🍪"),
            game("match3_009", "Gem Swap", Medium, "💠"),
            game("match3_010", "Farm Match", Low, "🌾"),
        ],
    },
];

/// Look up a game by id.
pub fn find(id: &str) -> Option<&'static GameInfo> {
    all_games().find(|g| g.id == id)
}

/// The category a game belongs to.
pub fn category_of(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.games.iter().any(|g| g.id == id))
}

pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

pub fn all_games() -> impl Iterator<Item = &'static GameInfo> {
    CATEGORIES.iter().flat_map(|c| c.games.iter())
}

const fn cheat(label: &'static str, action: &'static str) -> CheatEntry {
    CheatEntry { label, action }
}

static CHEATS: &[(&str, &[CheatEntry])] = &[
    ("puzzle_002", &[cheat("Show solution", "show")]),
    ("puzzle_004", &[cheat("Reveal all cards", "reveal")]),
    ("puzzle_009", &[cheat("Solve", "solve")]),
    ("chess_004", &[cheat("Jump to exit", "show")]),
    ("casual_001", &[cheat("Flag every mine", "show")]),
    ("casual_005", &[cheat("Clear board", "clear"), cheat("Hint", "hint")]),
    ("casual_007", &[cheat("Hint", "hint")]),
    ("match3_001", &[cheat("Shuffle", "shuffle")]),
    ("chess_007", &[cheat("Auto place", "fill")]),
    ("chess_005", &[cheat("Instant win", "win")]),
    ("chess_002", &[cheat("Instant win", "win")]),
    ("arcade_003", &[cheat("Clear bricks", "win")]),
    ("arcade_001", &[cheat("God mode", "god"), cheat("Speed mode", "fast")]),
    ("arcade_005", &[cheat("Low gravity", "slow")]),
];

/// Cheat menu the host offers for `id`. Empty for games without cheats.
pub fn cheats_for(id: &str) -> &'static [CheatEntry] {
    CHEATS
        .iter()
        .find(|(game, _)| *game == id)
        .map(|&(_, entries)| entries)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn five_categories_of_ten() {
        assert_eq!(CATEGORIES.len(), 5);
        assert!(CATEGORIES.iter().all(|c| c.games.len() == 10));
    }

    #[test]
    fn ids_are_unique_and_prefixed() {
        let mut seen = HashSet::new();
        for cat in CATEGORIES {
            for g in cat.games {
                assert!(g.id.starts_with(cat.id), "{} not in {}", g.id, cat.id);
                assert!(seen.insert(g.id), "duplicate id {}", g.id);
            }
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(find("arcade_001").map(|g| g.name), Some("Snake"));
        assert_eq!(category_of("chess_007").map(|c| c.id), Some("chess"));
        assert_eq!(category("match3").map(|c| c.games.len()), Some(10));
        assert!(find("arcade_999").is_none());
    }

    #[test]
    fn cheat_menus() {
        let snake: Vec<&str> = cheats_for("arcade_001").iter().map(|c| c.action).collect();
        assert_eq!(snake, vec!["god", "fast"]);
        assert!(cheats_for("puzzle_001").is_empty());
    }
}
