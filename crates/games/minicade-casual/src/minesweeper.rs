use rand::SeedableRng;
use rand::rngs::StdRng;

use minicade_core::audio::Sound;
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::generation::{MineCell, minefield_from, place_mines};
use minicade_core::grid::{Cell, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::physics::{Rect, Vec2};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

pub const ROWS: usize = 10;
pub const COLS: usize = 10;
pub const MINES: usize = 12;

const BUTTON_W: f32 = 120.0;
const BUTTON_H: f32 = 36.0;

/// Reveal every safe cell without touching a mine.
pub struct Minesweeper {
    rng: StdRng,
    width: f32,
    layout: GridLayout,
    fixed_mines: Option<Vec<Cell>>,
    field: Grid<MineCell>,
    revealed: Grid<bool>,
    flagged: Grid<bool>,
    flag_mode: bool,
    over: bool,
    won: bool,
    score: ScoreKeeper,
}

impl Minesweeper {
    pub fn new(width: f32, height: f32) -> Self {
        Self::build(width, height, StdRng::from_os_rng(), None)
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::build(width, height, StdRng::seed_from_u64(seed), None)
    }

    /// A board whose mines always sit at `mines`, across restarts too.
    pub fn with_mines(width: f32, height: f32, mines: &[Cell]) -> Self {
        Self::build(width, height, StdRng::seed_from_u64(0), Some(mines.to_vec()))
    }

    fn build(width: f32, _height: f32, rng: StdRng, fixed_mines: Option<Vec<Cell>>) -> Self {
        let mut game = Self {
            rng,
            width,
            layout: GridLayout::centered(width, 40.0, 32.0, 20.0, ROWS, COLS),
            fixed_mines,
            field: Grid::filled(ROWS, COLS, MineCell::Clear(0)),
            revealed: Grid::filled(ROWS, COLS, false),
            flagged: Grid::filled(ROWS, COLS, false),
            flag_mode: false,
            over: false,
            won: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn field(&self) -> &Grid<MineCell> {
        &self.field
    }

    pub fn is_revealed(&self, cell: Cell) -> bool {
        self.revealed.get(cell).copied().unwrap_or(false)
    }

    pub fn is_flagged(&self, cell: Cell) -> bool {
        self.flagged.get(cell).copied().unwrap_or(false)
    }

    pub fn flag_mode(&self) -> bool {
        self.flag_mode
    }

    /// The status-bar button that switches taps between reveal and flag.
    pub fn flag_button(&self) -> Rect {
        Rect::new(
            (self.width - BUTTON_W) / 2.0,
            self.layout.bottom() + 20.0,
            BUTTON_W,
            BUTTON_H,
        )
    }

    fn mine_count(&self) -> usize {
        self.field.values().iter().filter(|c| c.is_mine()).count()
    }

    fn revealed_count(&self) -> usize {
        self.revealed.values().iter().filter(|&&r| r).count()
    }

    /// Reveal `cell`, opening the surrounding region when it has no adjacent mines.
    pub fn reveal(&mut self, cell: Cell) -> Vec<GameEvent> {
        if self.over || !self.field.in_bounds(cell) || self.revealed[cell] || self.flagged[cell] {
            return Vec::new();
        }
        if self.field[cell].is_mine() {
            self.over = true;
            for seen in self.revealed.values_mut() {
                *seen = true;
            }
            return vec![GameEvent::Sound(Sound::Explode), GameEvent::GameOver(Outcome::Lost)];
        }

        let mut points = 0;
        let mut stack = vec![cell];
        self.revealed[cell] = true;
        while let Some(current) = stack.pop() {
            let MineCell::Clear(around) = self.field[current] else {
                continue;
            };
            points += u32::from(around.max(1));
            if around > 0 {
                continue;
            }
            for next in self.field.neighbors8(current) {
                if !self.revealed[next] && !self.flagged[next] {
                    self.revealed[next] = true;
                    stack.push(next);
                }
            }
        }
        self.score.add(points);

        if self.revealed_count() == self.field.len() - self.mine_count() {
            self.over = true;
            self.won = true;
            return vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Won)];
        }
        vec![GameEvent::Sound(Sound::Pop)]
    }

    pub fn toggle_flag(&mut self, cell: Cell) {
        if self.over || self.is_revealed(cell) {
            return;
        }
        if let Some(flag) = self.flagged.get_mut(cell) {
            *flag = !*flag;
        }
    }
}

impl GameInstance for Minesweeper {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Minesweeper", "Reveal every safe square. Numbers count the mines around them.")
    }

    fn init(&mut self) {
        self.field = match &self.fixed_mines {
            Some(mines) => minefield_from(ROWS, COLS, mines),
            None => place_mines(ROWS, COLS, MINES, &mut self.rng),
        };
        self.revealed = Grid::filled(ROWS, COLS, false);
        self.flagged = Grid::filled(ROWS, COLS, false);
        self.flag_mode = false;
        self.over = false;
        self.won = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, kind) in self.field.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            let (cx, cy) = self.layout.cell_center(cell);
            if !self.revealed[cell] {
                surface.fill_rect(x, y, size - 1.0, size - 1.0, Color::GREY);
                if self.flagged[cell] {
                    surface.fill_text("🚩", cx, cy, size * 0.5, Color::RED);
                }
                continue;
            }
            surface.fill_rect(x, y, size - 1.0, size - 1.0, Color::WHITE);
            match kind {
                MineCell::Mine => surface.fill_text("💣", cx, cy, size * 0.5, Color::BLACK),
                MineCell::Clear(0) => {},
                MineCell::Clear(n) => {
                    let color = Color::palette(usize::from(*n) - 1);
                    surface.fill_text(&n.to_string(), cx, cy, size * 0.5, color);
                },
            }
        }

        let button = self.flag_button();
        let fill = if self.flag_mode { Color::ORANGE } else { Color::PANEL };
        surface.fill_rect(button.x, button.y, button.w, button.h, fill);
        let label = if self.flag_mode { "Mode: Flag" } else { "Mode: Reveal" };
        let center = button.center();
        surface.fill_text(label, center.x, center.y, 16.0, Color::WHITE);
        surface.fill_text(&format!("Score: {}", self.score.get()), surface.width() / 2.0, 20.0, 16.0, Color::WHITE);

        if self.over {
            let title = if self.won { "You win!" } else { "Game over" };
            overlay_banner(surface, title, Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        if self.over || !event.is_finite() {
            return Vec::new();
        }
        if self.flag_button().contains(Vec2::new(event.x, event.y)) {
            self.flag_mode = !self.flag_mode;
            return vec![GameEvent::Sound(Sound::Click)];
        }
        let Some(cell) = self.layout.cell_at(event.x, event.y) else {
            return Vec::new();
        };
        if self.flag_mode {
            self.toggle_flag(cell);
            Vec::new()
        } else {
            self.reveal(cell)
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action == "show" && !self.over {
            for (flag, kind) in self.flagged.values_mut().iter_mut().zip(self.field.values()) {
                if kind.is_mine() {
                    *flag = true;
                }
            }
        }
        Vec::new()
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("revealed", self.revealed.to_rows())
            .with("flagged", self.flagged.to_rows())
            .with("flag_mode", self.flag_mode)
            .with("won", self.won)
    }

    impl_score_keeping!(terminal: over);
}
