use serde::{Deserialize, Serialize};

use minicade_core::audio::Sound;
use minicade_core::board::{Board, MoveOutcome, Piece, Side, TurnState};
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::grid::{BoundaryPolicy, Cell, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

pub const SIZE: usize = 8;
pub const POINTS_PER_MOVE: u32 = 10;
pub const WIN_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    Man,
    King,
}

/// A legal destination for the selected piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub to: Cell,
    /// The opponent piece jumped over, if any.
    pub captures: Option<Cell>,
}

/// Hot-seat checkers. `Side::First` starts on the top three rows and moves down.
pub struct Checkers {
    layout: GridLayout,
    pieces: Board<Rank>,
    turn: TurnState,
    selected: Option<Cell>,
    over: bool,
    score: ScoreKeeper,
}

/// Row direction a side's men advance in.
fn forward(side: Side) -> isize {
    match side {
        Side::First => 1,
        Side::Second => -1,
    }
}

fn promotion_row(side: Side) -> usize {
    match side {
        Side::First => SIZE - 1,
        Side::Second => 0,
    }
}

fn starting_board() -> Board<Rank> {
    Grid::from_fn(SIZE, SIZE, |cell| {
        let dark = (cell.row + cell.col) % 2 == 1;
        match cell.row {
            0..3 if dark => Some(Piece::new(Rank::Man, Side::First)),
            5.. if dark => Some(Piece::new(Rank::Man, Side::Second)),
            _ => None,
        }
    })
}

/// Simple steps and single jumps available to the piece on `from`.
pub fn steps_from(pieces: &Board<Rank>, from: Cell) -> Vec<Step> {
    let Some(Some(piece)) = pieces.get(from).copied() else {
        return Vec::new();
    };
    let rows = match piece.kind {
        Rank::Man => vec![forward(piece.owner)],
        Rank::King => vec![-1, 1],
    };
    let mut steps = Vec::new();
    for dr in rows {
        for dc in [-1, 1] {
            let Some(next) = pieces.offset(from, dr, dc, BoundaryPolicy::Bounded) else {
                continue;
            };
            match pieces[next] {
                None => steps.push(Step { to: next, captures: None }),
                Some(other) if other.owner != piece.owner => {
                    if let Some(landing) = pieces.offset(next, dr, dc, BoundaryPolicy::Bounded)
                        && pieces[landing].is_none()
                    {
                        steps.push(Step {
                            to: landing,
                            captures: Some(next),
                        });
                    }
                },
                Some(_) => {},
            }
        }
    }
    steps
}

fn side_can_move(pieces: &Board<Rank>, side: Side) -> bool {
    pieces
        .iter()
        .any(|(cell, p)| p.is_some_and(|p| p.owner == side) && !steps_from(pieces, cell).is_empty())
}

fn apply_step(pieces: &mut Board<Rank>, side: Side, from: Cell, to: Cell) -> MoveOutcome {
    let Some(Some(mover)) = pieces.get(from) else {
        return MoveOutcome::Rejected;
    };
    if mover.owner != side || !pieces.in_bounds(to) {
        return MoveOutcome::Rejected;
    }
    let Some(step) = steps_from(pieces, from).into_iter().find(|s| s.to == to) else {
        return MoveOutcome::Rejected;
    };
    let Some(mut piece) = pieces[from].take() else {
        return MoveOutcome::Rejected;
    };
    if let Some(jumped) = step.captures {
        pieces[jumped] = None;
    }
    if to.row == promotion_row(side) {
        piece.kind = Rank::King;
    }
    pieces[to] = Some(piece);
    MoveOutcome::Accepted
}

impl Checkers {
    pub fn new(width: f32, _height: f32) -> Self {
        let mut game = Self {
            layout: GridLayout::centered(width, 40.0, 40.0, 40.0, SIZE, SIZE),
            pieces: starting_board(),
            turn: TurnState::default(),
            selected: None,
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    /// Checkers has no randomness; the seed is accepted for a uniform constructor set.
    pub fn with_seed(width: f32, height: f32, _seed: u64) -> Self {
        Self::new(width, height)
    }

    /// Set up a position directly.
    pub fn load_position(&mut self, pieces: &[(Cell, Piece<Rank>)], to_move: Side) {
        self.pieces = Grid::filled(SIZE, SIZE, None);
        for &(cell, piece) in pieces {
            self.pieces.set(cell, Some(piece));
        }
        self.turn = TurnState::new(to_move);
        self.selected = None;
        self.over = false;
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn piece(&self, cell: Cell) -> Option<Piece<Rank>> {
        self.pieces.get(cell).copied().flatten()
    }

    pub fn to_move(&self) -> Side {
        self.turn.current()
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    /// Move the side to play from `from` to `to`.
    pub fn try_step(&mut self, from: Cell, to: Cell) -> MoveOutcome {
        if self.over {
            return MoveOutcome::Rejected;
        }
        let pieces = &mut self.pieces;
        self.turn.try_move(|side| apply_step(pieces, side, from, to))
    }

    fn after_move(&mut self) -> Vec<GameEvent> {
        self.score.add(POINTS_PER_MOVE);
        let mover = self.turn.current().opponent();
        if side_can_move(&self.pieces, self.turn.current()) {
            return vec![GameEvent::Sound(Sound::Click)];
        }
        self.over = true;
        vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Winner(mover))]
    }

    fn tap(&mut self, cell: Cell) -> Vec<GameEvent> {
        if self.over {
            return Vec::new();
        }
        let side = self.turn.current();
        if self.piece(cell).is_some_and(|p| p.owner == side) {
            self.selected = Some(cell);
            return Vec::new();
        }
        let Some(from) = self.selected.take() else {
            return Vec::new();
        };
        if self.try_step(from, cell).is_accepted() {
            self.after_move()
        } else {
            vec![GameEvent::Sound(Sound::Fail)]
        }
    }
}

impl GameInstance for Checkers {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Checkers", "Move diagonally and jump over your opponent's pieces.")
    }

    fn init(&mut self) {
        self.pieces = starting_board();
        self.turn = TurnState::default();
        self.selected = None;
        self.over = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, slot) in self.pieces.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            let square = if (cell.row + cell.col) % 2 == 0 {
                Color::GREY
            } else {
                Color::WHITE
            };
            surface.fill_rect(x, y, size, size, square);
            let Some(piece) = slot else {
                continue;
            };
            let (cx, cy) = self.layout.cell_center(cell);
            if self.selected == Some(cell) {
                surface.fill_circle(cx, cy, size * 0.42, Color::YELLOW);
            }
            let color = match piece.owner {
                Side::First => Color::RED,
                Side::Second => Color::BACKGROUND,
            };
            surface.fill_circle(cx, cy, size * 0.35, color);
            if piece.kind == Rank::King {
                surface.fill_text("K", cx, cy, size * 0.4, Color::YELLOW);
            }
        }

        let to_move = match self.turn.current() {
            Side::First => "Red",
            Side::Second => "Black",
        };
        surface.fill_text(&format!("{to_move} to move   Score: {}", self.score.get()), surface.width() / 2.0, 20.0, 14.0, Color::WHITE);
        if self.over {
            overlay_banner(surface, "Game over", Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        match self.layout.cell_at(event.x, event.y) {
            Some(cell) => self.tap(cell),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action != "win" || self.over {
            return Vec::new();
        }
        let side = self.turn.current();
        for slot in self.pieces.values_mut() {
            if slot.is_some_and(|p| p.owner != side) {
                *slot = None;
            }
        }
        self.selected = None;
        self.over = true;
        self.score.update(WIN_SCORE);
        vec![GameEvent::GameOver(Outcome::Winner(side))]
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("board", self.pieces.to_rows())
            .with("to_move", self.turn.current())
            .with("selected", self.selected)
    }

    impl_score_keeping!(terminal: over);
}
