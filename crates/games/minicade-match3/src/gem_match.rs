use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use minicade_core::audio::Sound;
use minicade_core::connectivity::{collapse_columns, find_line_matches};
use minicade_core::game_trait::{EffectId, GameEvent, GameInstance, GameMetadata, GameSnapshot, ScoreKeeper};
use minicade_core::grid::{Cell, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background};

pub const ROWS: usize = 8;
pub const COLS: usize = 8;
pub const GEM_KINDS: u8 = 6;
pub const MIN_RUN: usize = 3;
pub const POINTS_PER_GEM: u32 = 10;
/// Pause between a cascade landing and the next match check.
pub const CHAIN_DELAY: Duration = Duration::from_millis(200);

const GEM_COLORS: [Color; GEM_KINDS as usize] = [
    Color::BLUE,
    Color::PURPLE,
    Color::TEAL,
    Color::RED,
    Color::YELLOW,
    Color::GREEN,
];

/// Swap neighbouring gems to line up three or more of a kind.
pub struct GemMatch {
    rng: StdRng,
    layout: GridLayout,
    gems: Grid<Option<u8>>,
    selected: Option<Cell>,
    resolving: bool,
    chains: u32,
    /// Bumped on every new board; chain checks carry the board they were scheduled for.
    board: EffectId,
    score: ScoreKeeper,
}

impl GemMatch {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, _height: f32, rng: StdRng) -> Self {
        let mut game = Self {
            rng,
            layout: GridLayout::centered(width, 40.0, 40.0, 20.0, ROWS, COLS),
            gems: Grid::filled(ROWS, COLS, None),
            selected: None,
            resolving: false,
            chains: 0,
            board: 0,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    /// Replace the board, e.g. to replay a saved layout.
    pub fn load_gems(&mut self, gems: Grid<Option<u8>>) {
        self.gems = gems;
        self.selected = None;
        self.resolving = false;
        self.board = self.board.wrapping_add(1);
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn gems(&self) -> &Grid<Option<u8>> {
        &self.gems
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    /// Input waits while a cascade is pending.
    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// A full board with no run of three anywhere.
    fn deal(&mut self) {
        let mut gems = Grid::filled(ROWS, COLS, None);
        for cell in gems.cells() {
            let gem = loop {
                let gem = self.rng.random_range(0..GEM_KINDS);
                let left = cell.col >= 2
                    && gems[Cell::new(cell.row, cell.col - 1)] == Some(gem)
                    && gems[Cell::new(cell.row, cell.col - 2)] == Some(gem);
                let above = cell.row >= 2
                    && gems[Cell::new(cell.row - 1, cell.col)] == Some(gem)
                    && gems[Cell::new(cell.row - 2, cell.col)] == Some(gem);
                if !left && !above {
                    break gem;
                }
            };
            gems[cell] = Some(gem);
        }
        self.gems = gems;
        self.board = self.board.wrapping_add(1);
    }

    fn matches(&self) -> Vec<Cell> {
        find_line_matches(&self.gems, MIN_RUN, Option::is_none)
    }

    /// Clear `matched`, drop the survivors and refill from the top.
    fn resolve(&mut self, matched: &[Cell]) {
        for &cell in matched {
            self.gems[cell] = None;
        }
        self.score.add(matched.len() as u32 * POINTS_PER_GEM);
        for cell in collapse_columns(&mut self.gems, Option::is_none, None) {
            self.gems[cell] = Some(self.rng.random_range(0..GEM_KINDS));
        }
    }

    /// Swap two orthogonal neighbours, keeping the swap only if it lines up a run.
    pub fn swap(&mut self, a: Cell, b: Cell) -> Vec<GameEvent> {
        if self.resolving || !a.is_adjacent(b) || !self.gems.in_bounds(a) || !self.gems.in_bounds(b) {
            return Vec::new();
        }
        self.gems.swap(a, b);
        let matched = self.matches();
        if matched.is_empty() {
            self.gems.swap(a, b);
            return vec![GameEvent::Sound(Sound::Fail)];
        }
        self.resolve(&matched);
        self.resolving = true;
        self.chains = 0;
        vec![
            GameEvent::Sound(Sound::Pop),
            GameEvent::Schedule {
                delay: CHAIN_DELAY,
                effect: self.board,
            },
        ]
    }

    fn continue_chain(&mut self) -> Vec<GameEvent> {
        if !self.resolving {
            debug!("chain check with nothing resolving, skipped");
            return Vec::new();
        }
        let matched = self.matches();
        if matched.is_empty() {
            self.resolving = false;
            return Vec::new();
        }
        self.chains += 1;
        self.resolve(&matched);
        vec![
            GameEvent::Sound(Sound::Pop),
            GameEvent::Schedule {
                delay: CHAIN_DELAY,
                effect: self.board,
            },
        ]
    }
}

impl GameInstance for GemMatch {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Gem Match", "Swap neighbouring gems to line up three or more.")
    }

    fn init(&mut self) {
        self.deal();
        self.selected = None;
        self.resolving = false;
        self.chains = 0;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, gem) in self.gems.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            if self.selected == Some(cell) {
                surface.fill_rect(x, y, size, size, Color::WHITE);
            }
            if let Some(kind) = gem {
                let color = GEM_COLORS[usize::from(*kind) % GEM_COLORS.len()];
                surface.fill_rect(x + 2.0, y + 2.0, size - 4.0, size - 4.0, color);
            }
        }
        let status = if self.chains > 0 {
            format!("Score: {}   Chain x{}", self.score.get(), self.chains + 1)
        } else {
            format!("Score: {}", self.score.get())
        };
        surface.fill_text(&status, surface.width() / 2.0, 20.0, 16.0, Color::WHITE);
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        if self.resolving {
            return Vec::new();
        }
        let Some(cell) = self.layout.cell_at(event.x, event.y) else {
            return Vec::new();
        };
        match self.selected.take() {
            None => {
                self.selected = Some(cell);
                vec![GameEvent::Sound(Sound::Click)]
            },
            Some(first) => self.swap(first, cell),
        }
    }

    fn fire_effect(&mut self, effect: EffectId) -> Vec<GameEvent> {
        if effect != self.board {
            debug!(effect, board = self.board, "chain check for a replaced board, skipped");
            return Vec::new();
        }
        self.continue_chain()
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action == "shuffle" {
            self.deal();
            self.selected = None;
            self.resolving = false;
        }
        Vec::new()
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("gems", self.gems.to_rows())
            .with("selected", self.selected)
    }

    fn is_terminal(&self) -> bool {
        false
    }

    impl_score_keeping!();
}
