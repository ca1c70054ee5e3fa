use std::cmp::Ordering;

use minicade_core::audio::Sound;
use minicade_core::board::{Board, MoveOutcome, Piece, Side, TurnState};
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::grid::{BoundaryPolicy, Cell, Grid, MOORE};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, overlay_banner};

pub const SIZE: usize = 8;
pub const POINTS_PER_FLIP: u32 = 10;

/// Reversi discs have a single kind; the owner is the visible colour.
pub type Disc = ();

/// Hot-seat reversi. Black (`Side::First`) moves first.
pub struct Reversi {
    layout: GridLayout,
    discs: Board<Disc>,
    turn: TurnState,
    passes: u32,
    over: bool,
    score: ScoreKeeper,
}

fn starting_board() -> Board<Disc> {
    let mut discs = Grid::filled(SIZE, SIZE, None);
    let mid = SIZE / 2;
    discs[Cell::new(mid - 1, mid - 1)] = Some(Piece::new((), Side::Second));
    discs[Cell::new(mid - 1, mid)] = Some(Piece::new((), Side::First));
    discs[Cell::new(mid, mid - 1)] = Some(Piece::new((), Side::First));
    discs[Cell::new(mid, mid)] = Some(Piece::new((), Side::Second));
    discs
}

/// Opponent discs that placing a `side` disc on `cell` would turn over.
pub fn outflanked(discs: &Board<Disc>, side: Side, cell: Cell) -> Vec<Cell> {
    if discs.get(cell).is_none_or(Option::is_some) {
        return Vec::new();
    }
    let mut flips = Vec::new();
    for (dr, dc) in MOORE {
        let mut line = Vec::new();
        let mut at = discs.offset(cell, dr, dc, BoundaryPolicy::Bounded);
        while let Some(next) = at {
            match discs[next] {
                Some(p) if p.owner != side => line.push(next),
                Some(_) => {
                    flips.extend_from_slice(&line);
                    break;
                },
                None => break,
            }
            at = discs.offset(next, dr, dc, BoundaryPolicy::Bounded);
        }
    }
    flips
}

pub fn legal_moves(discs: &Board<Disc>, side: Side) -> Vec<Cell> {
    discs
        .cells()
        .filter(|&cell| !outflanked(discs, side, cell).is_empty())
        .collect()
}

impl Reversi {
    pub fn new(width: f32, _height: f32) -> Self {
        let mut game = Self {
            layout: GridLayout::centered(width, 40.0, 40.0, 40.0, SIZE, SIZE),
            discs: starting_board(),
            turn: TurnState::default(),
            passes: 0,
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    /// Reversi has no randomness; the seed is accepted for a uniform constructor set.
    pub fn with_seed(width: f32, height: f32, _seed: u64) -> Self {
        Self::new(width, height)
    }

    /// Set up a position directly.
    pub fn load_position(&mut self, discs: &[(Cell, Side)], to_move: Side) {
        self.discs = Grid::filled(SIZE, SIZE, None);
        for &(cell, side) in discs {
            self.discs.set(cell, Some(Piece::new((), side)));
        }
        self.turn = TurnState::new(to_move);
        self.over = false;
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn disc(&self, cell: Cell) -> Option<Side> {
        self.discs.get(cell).copied().flatten().map(|p| p.owner)
    }

    pub fn to_move(&self) -> Side {
        self.turn.current()
    }

    /// Times a side had to pass because it had no legal move.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn count(&self, side: Side) -> usize {
        self.discs
            .values()
            .iter()
            .filter(|d| d.is_some_and(|p| p.owner == side))
            .count()
    }

    /// Place a disc for the side to move.
    pub fn play(&mut self, cell: Cell) -> Vec<GameEvent> {
        if self.over {
            return Vec::new();
        }
        let discs = &mut self.discs;
        let mut flipped = 0;
        let outcome = self.turn.try_move(|side| {
            let flips = outflanked(discs, side, cell);
            if flips.is_empty() {
                return MoveOutcome::Rejected;
            }
            for &f in &flips {
                discs[f] = Some(Piece::new((), side));
            }
            discs[cell] = Some(Piece::new((), side));
            flipped = flips.len() as u32;
            MoveOutcome::Accepted
        });
        if !outcome.is_accepted() {
            return vec![GameEvent::Sound(Sound::Fail)];
        }
        self.score.add(flipped * POINTS_PER_FLIP);

        let mut events = vec![GameEvent::Sound(Sound::Click)];
        events.extend(self.settle_turn());
        events
    }

    /// Skip a side without moves; end the game when neither side can move.
    fn settle_turn(&mut self) -> Vec<GameEvent> {
        if !legal_moves(&self.discs, self.turn.current()).is_empty() {
            return Vec::new();
        }
        if !legal_moves(&self.discs, self.turn.current().opponent()).is_empty() {
            self.turn.pass();
            self.passes += 1;
            return Vec::new();
        }
        self.over = true;
        vec![GameEvent::GameOver(self.result())]
    }

    fn result(&self) -> Outcome {
        match self.count(Side::First).cmp(&self.count(Side::Second)) {
            Ordering::Greater => Outcome::Winner(Side::First),
            Ordering::Less => Outcome::Winner(Side::Second),
            Ordering::Equal => Outcome::Draw,
        }
    }
}

impl GameInstance for Reversi {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Reversi", "Outflank your opponent's discs to turn them over.")
    }

    fn init(&mut self) {
        self.discs = starting_board();
        self.turn = TurnState::default();
        self.passes = 0;
        self.over = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        surface.fill_rect(0.0, 0.0, surface.width(), surface.height(), Color::hex(0x27ae60));
        let size = self.layout.cell_size;
        for (cell, disc) in self.discs.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            surface.fill_rect(x + 1.0, y + 1.0, size - 2.0, size - 2.0, Color::hex(0x1e8449));
            if let Some(piece) = disc {
                let (cx, cy) = self.layout.cell_center(cell);
                let color = match piece.owner {
                    Side::First => Color::BLACK,
                    Side::Second => Color::WHITE,
                };
                surface.fill_circle(cx, cy, size * 0.4, color);
            }
        }
        let to_move = match self.turn.current() {
            Side::First => "Black",
            Side::Second => "White",
        };
        let status = format!(
            "Black {}   White {}   {to_move} to move",
            self.count(Side::First),
            self.count(Side::Second)
        );
        surface.fill_text(&status, surface.width() / 2.0, 20.0, 14.0, Color::WHITE);
        if self.over {
            let title = match self.result() {
                Outcome::Winner(Side::First) => "Black wins",
                Outcome::Winner(Side::Second) => "White wins",
                _ => "Draw",
            };
            overlay_banner(surface, title, Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        match self.layout.cell_at(event.x, event.y) {
            Some(cell) => self.play(cell),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action != "win" || self.over {
            return Vec::new();
        }
        let side = self.turn.current();
        for slot in self.discs.values_mut() {
            *slot = Some(Piece::new((), side));
        }
        self.over = true;
        vec![GameEvent::GameOver(Outcome::Winner(side))]
    }

    fn get_state(&self) -> GameSnapshot {
        let board = self.discs.map(|d| d.map(|p| p.owner));
        GameSnapshot::new(self.score.get())
            .with("board", board.to_rows())
            .with("to_move", self.turn.current())
            .with("passes", self.passes)
    }

    impl_score_keeping!(terminal: over);
}
