use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use minicade_core::audio::Sound;
use minicade_core::connectivity::{collapse_columns, first_group, same_value_group};
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::grid::{Cell, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

pub const ROWS: usize = 10;
pub const COLS: usize = 10;
pub const COLORS: u8 = 5;
/// Smallest group that can be cleared.
pub const MIN_GROUP: usize = 2;
pub const POINTS_PER_BLOCK: u32 = 10;
pub const CLEAR_BONUS: u32 = 100;

/// Tap groups of same-coloured blocks to clear them.
pub struct BlockMatch {
    rng: StdRng,
    layout: GridLayout,
    blocks: Grid<Option<u8>>,
    hint: Vec<Cell>,
    over: bool,
    score: ScoreKeeper,
}

impl BlockMatch {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, _height: f32, rng: StdRng) -> Self {
        let mut game = Self {
            rng,
            layout: GridLayout::centered(width, 50.0, 32.0, 20.0, ROWS, COLS),
            blocks: Grid::filled(ROWS, COLS, None),
            hint: Vec::new(),
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    /// Replace the board, e.g. to replay a saved layout.
    pub fn load_blocks(&mut self, blocks: Grid<Option<u8>>) {
        self.blocks = blocks;
        self.hint.clear();
        self.over = false;
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn blocks(&self) -> &Grid<Option<u8>> {
        &self.blocks
    }

    pub fn hint(&self) -> &[Cell] {
        &self.hint
    }

    /// Clear the group containing `cell`, if it is big enough.
    pub fn clear_group(&mut self, cell: Cell) -> Vec<GameEvent> {
        if self.over || self.blocks.get(cell).is_none_or(Option::is_none) {
            return Vec::new();
        }
        let group = same_value_group(&self.blocks, cell);
        if group.len() < MIN_GROUP {
            return Vec::new();
        }
        for &member in &group {
            self.blocks[member] = None;
        }
        collapse_columns(&mut self.blocks, Option::is_none, None);
        self.hint.clear();
        self.score.add(group.len() as u32 * POINTS_PER_BLOCK);

        let mut events = vec![GameEvent::Sound(Sound::Pop)];
        events.extend(self.check_finished());
        events
    }

    fn check_finished(&mut self) -> Vec<GameEvent> {
        if self.blocks.values().iter().all(Option::is_none) {
            self.over = true;
            return vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Won)];
        }
        if first_group(&self.blocks, MIN_GROUP, Option::is_some).is_none() {
            self.over = true;
            return vec![GameEvent::Sound(Sound::Fail), GameEvent::GameOver(Outcome::Lost)];
        }
        Vec::new()
    }
}

impl GameInstance for BlockMatch {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Block Match", "Tap groups of two or more matching blocks to clear them.")
    }

    fn init(&mut self) {
        let rng = &mut self.rng;
        self.blocks = Grid::from_fn(ROWS, COLS, |_| Some(rng.random_range(0..COLORS)));
        self.hint.clear();
        self.over = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, block) in self.blocks.iter() {
            let Some(color) = block else {
                continue;
            };
            let (x, y) = self.layout.cell_origin(cell);
            if self.hint.contains(&cell) {
                surface.fill_rect(x, y, size, size, Color::WHITE);
            }
            surface.fill_rect(x + 2.0, y + 2.0, size - 4.0, size - 4.0, Color::palette(usize::from(*color)));
        }
        surface.fill_text(&format!("Score: {}", self.score.get()), surface.width() / 2.0, 25.0, 16.0, Color::WHITE);
        if self.over {
            overlay_banner(surface, "Game over", Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        match self.layout.cell_at(event.x, event.y) {
            Some(cell) => self.clear_group(cell),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if self.over {
            return Vec::new();
        }
        match action {
            "clear" => {
                for block in self.blocks.values_mut() {
                    *block = None;
                }
                self.score.add(CLEAR_BONUS);
                self.check_finished()
            },
            "hint" => {
                self.hint = first_group(&self.blocks, MIN_GROUP, Option::is_some).unwrap_or_default();
                Vec::new()
            },
            _ => Vec::new(),
        }
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("blocks", self.blocks.to_rows())
            .with("hint", &self.hint)
    }

    impl_score_keeping!(terminal: over);
}

#[cfg(test)]
mod tests {
    use minicade_core::test_helpers::{
        HEIGHT, WIDTH, contract_terminal_state_is_frozen, has_game_over, run_contract_suite, tap,
    };

    use super::*;

    fn game() -> BlockMatch {
        BlockMatch::with_seed(WIDTH, HEIGHT, 21)
    }

    /// Column 0 holds a pair of 1s over a 2; everything else is a checkerboard of 3/4.
    fn scripted() -> BlockMatch {
        let mut g = game();
        let blocks = Grid::from_fn(ROWS, COLS, |cell| match (cell.row, cell.col) {
            (7, 0) | (8, 0) => Some(1),
            (9, 0) => Some(2),
            (r, c) if (r + c) % 2 == 0 => Some(3),
            _ => Some(4),
        });
        g.load_blocks(blocks);
        g
    }

    fn tap_cell(game: &mut BlockMatch, cell: Cell) -> Vec<GameEvent> {
        let (x, y) = game.layout().cell_center(cell);
        tap(game, x, y)
    }

    #[test]
    fn satisfies_game_contract() {
        run_contract_suite(|| Box::new(game()));
    }

    #[test]
    fn cleared_board_is_frozen() {
        contract_terminal_state_is_frozen(&mut game(), |g| {
            g.cheat("clear");
        });
    }

    #[test]
    fn clearing_a_pair_scores_and_collapses() {
        let mut g = scripted();
        let above = g.blocks()[Cell::new(6, 0)];
        tap_cell(&mut g, Cell::new(8, 0));
        assert_eq!(g.score(), 2 * POINTS_PER_BLOCK);
        assert_eq!(g.blocks()[Cell::new(8, 0)], above, "blocks fall into the gap");
        assert_eq!(g.blocks()[Cell::new(0, 0)], None);
        assert_eq!(g.blocks()[Cell::new(1, 0)], None);
        assert_eq!(g.blocks()[Cell::new(9, 0)], Some(2));
    }

    #[test]
    fn single_block_is_not_cleared() {
        let mut g = scripted();
        let before = g.get_state();
        tap_cell(&mut g, Cell::new(9, 0));
        assert_eq!(before, g.get_state());
    }

    #[test]
    fn hint_picks_first_group_in_row_major_order() {
        let mut g = scripted();
        g.cheat("hint");
        assert_eq!(g.hint(), &[Cell::new(7, 0), Cell::new(8, 0)]);
    }

    #[test]
    fn no_groups_left_ends_game() {
        let mut g = scripted();
        let events = tap_cell(&mut g, Cell::new(7, 0));
        assert!(has_game_over(&events), "checkerboard leaves no group of two");
        assert!(events.contains(&GameEvent::GameOver(Outcome::Lost)));
    }

    #[test]
    fn clear_cheat_empties_board_with_bonus() {
        let mut g = game();
        let events = g.cheat("clear");
        assert!(events.contains(&GameEvent::GameOver(Outcome::Won)));
        assert_eq!(g.score(), CLEAR_BONUS);
        assert!(g.blocks().values().iter().all(Option::is_none));
    }
}
