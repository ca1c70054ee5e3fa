use rand::SeedableRng;
use rand::rngs::StdRng;

use minicade_core::audio::Sound;
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::generation::{SudokuGrid, generate_sudoku};
use minicade_core::grid::Cell;
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

/// Cells blanked out of the solved board.
pub const BLANKS: usize = 40;
/// Points for each cell filled with its solution digit.
pub const POINTS_PER_CELL: u32 = 10;

const BOARD_TOP: f32 = 40.0;
const MAX_CELL: f32 = 36.0;
const PAD_GAP: f32 = 20.0;
const PAD_HEIGHT: f32 = 40.0;

/// Classic 9x9 sudoku with an on-screen number pad.
pub struct Sudoku {
    rng: StdRng,
    layout: GridLayout,
    givens: SudokuGrid,
    board: SudokuGrid,
    solution: SudokuGrid,
    selected: Option<Cell>,
    solved: bool,
    score: ScoreKeeper,
}

impl Sudoku {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, _height: f32, rng: StdRng) -> Self {
        let mut game = Self {
            rng,
            layout: GridLayout::centered(width, BOARD_TOP, MAX_CELL, 40.0, 9, 9),
            givens: [[0; 9]; 9],
            board: [[0; 9]; 9],
            solution: [[0; 9]; 9],
            selected: None,
            solved: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn board(&self) -> &SudokuGrid {
        &self.board
    }

    pub fn solution(&self) -> &SudokuGrid {
        &self.solution
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    pub fn is_given(&self, cell: Cell) -> bool {
        self.givens[cell.row][cell.col] != 0
    }

    fn pad_top(&self) -> f32 {
        self.layout.bottom() + PAD_GAP
    }

    /// Centre of the number pad button for `digit` (1-9).
    pub fn pad_button_center(&self, digit: u8) -> (f32, f32) {
        let w = self.layout.cell_size;
        (
            self.layout.offset_x + (f32::from(digit) - 0.5) * w,
            self.pad_top() + PAD_HEIGHT / 2.0,
        )
    }

    fn pad_digit_at(&self, x: f32, y: f32) -> Option<u8> {
        let top = self.pad_top();
        if !(top..top + PAD_HEIGHT).contains(&y) {
            return None;
        }
        let slot = ((x - self.layout.offset_x) / self.layout.cell_size).floor();
        (slot.is_finite() && (0.0..9.0).contains(&slot)).then(|| slot as u8 + 1)
    }

    fn place_digit(&mut self, digit: u8) -> Vec<GameEvent> {
        let Some(cell) = self.selected else {
            return Vec::new();
        };
        if self.is_given(cell) {
            return Vec::new();
        }
        let expected = self.solution[cell.row][cell.col];
        let was_correct = self.board[cell.row][cell.col] == expected;
        self.board[cell.row][cell.col] = digit;

        if digit != expected {
            return vec![GameEvent::Sound(Sound::Fail)];
        }
        let mut events = vec![GameEvent::Sound(Sound::Click)];
        if !was_correct {
            self.score.add(POINTS_PER_CELL);
        }
        events.extend(self.check_solved());
        events
    }

    fn check_solved(&mut self) -> Vec<GameEvent> {
        if self.board != self.solution {
            return Vec::new();
        }
        self.solved = true;
        self.selected = None;
        vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Won)]
    }
}

impl Default for Sudoku {
    fn default() -> Self {
        Self::new(
            minicade_core::surface::DEFAULT_VIEWPORT.0,
            minicade_core::surface::DEFAULT_VIEWPORT.1,
        )
    }
}

impl GameInstance for Sudoku {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Sudoku", "Fill every row, column and box with the digits 1 to 9.")
    }

    fn init(&mut self) {
        let puzzle = generate_sudoku(BLANKS, &mut self.rng);
        self.givens = puzzle.puzzle;
        self.board = puzzle.puzzle;
        self.solution = puzzle.solution;
        self.selected = None;
        self.solved = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;

        for row in 0..9 {
            for col in 0..9 {
                let cell = Cell::new(row, col);
                let (x, y) = self.layout.cell_origin(cell);
                let fill = if self.selected == Some(cell) {
                    Color::BLUE
                } else {
                    Color::PANEL
                };
                surface.fill_rect(x + 1.0, y + 1.0, size - 2.0, size - 2.0, fill);

                let digit = self.board[row][col];
                if digit == 0 {
                    continue;
                }
                let color = if self.is_given(cell) {
                    Color::WHITE
                } else if digit == self.solution[row][col] {
                    Color::TEAL
                } else {
                    Color::RED
                };
                let (cx, cy) = self.layout.cell_center(cell);
                surface.fill_text(&digit.to_string(), cx, cy, size * 0.6, color);
            }
        }

        for i in (0..=9).step_by(3) {
            let offset = i as f32 * size;
            let (left, top) = (self.layout.offset_x, self.layout.offset_y);
            surface.stroke_line((left + offset, top), (left + offset, self.layout.bottom()), 2.0, Color::GREY);
            surface.stroke_line((left, top + offset), (left + self.layout.width(), top + offset), 2.0, Color::GREY);
        }

        for digit in 1..=9u8 {
            let (cx, cy) = self.pad_button_center(digit);
            surface.fill_rect(cx - size / 2.0 + 2.0, self.pad_top(), size - 4.0, PAD_HEIGHT, Color::PANEL);
            surface.fill_text(&digit.to_string(), cx, cy, 20.0, Color::WHITE);
        }

        let score_text = format!("Score: {}", self.score.get());
        surface.fill_text(&score_text, surface.width() / 2.0, BOARD_TOP / 2.0, 18.0, Color::WHITE);
        if self.solved {
            overlay_banner(surface, "Solved!", Some(&score_text));
        }
    }

    fn on_input_start(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        if self.solved || !event.is_finite() {
            return Vec::new();
        }
        if let Some(cell) = self.layout.cell_at(event.x, event.y) {
            self.selected = Some(cell);
            return Vec::new();
        }
        match self.pad_digit_at(event.x, event.y) {
            Some(digit) => self.place_digit(digit),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        match action {
            "show" if !self.solved => {
                self.board = self.solution;
                self.check_solved()
            },
            _ => Vec::new(),
        }
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("board", self.board)
            .with("selected", self.selected)
            .with("solved", self.solved)
    }

    impl_score_keeping!(terminal: solved);
}
