use serde::{Deserialize, Serialize};
use tracing::debug;

use minicade_core::audio::Sound;
use minicade_core::board::{Board, MoveOutcome, Piece, Side, TurnState};
use minicade_core::connectivity::{flood_fill, liberties};
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::grid::{BoundaryPolicy, Cell, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, overlay_banner};

pub const SIZE: usize = 9;

/// Go has a single kind of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stone;

/// Black (`Side::First`) and white alternate placing stones; surrounded groups are captured.
pub struct Go {
    layout: GridLayout,
    stones: Board<Stone>,
    turn: TurnState,
    /// Opponent stones removed by each side, indexed by [`Side::index`].
    captures: [u32; 2],
    over: bool,
    score: ScoreKeeper,
}

impl Go {
    pub fn new(width: f32, _height: f32) -> Self {
        let mut game = Self {
            layout: GridLayout::centered(width, 40.0, 35.0, 40.0, SIZE, SIZE),
            stones: Grid::filled(SIZE, SIZE, None),
            turn: TurnState::default(),
            captures: [0; 2],
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    /// Go has no randomness; the seed is accepted for a uniform constructor set.
    pub fn with_seed(width: f32, height: f32, _seed: u64) -> Self {
        Self::new(width, height)
    }

    /// Set up a position directly, e.g. to study a problem.
    pub fn load_position(&mut self, stones: &[(Cell, Side)], to_move: Side) {
        self.stones = Grid::filled(SIZE, SIZE, None);
        for &(cell, side) in stones {
            self.stones.set(cell, Some(Piece::new(Stone, side)));
        }
        self.turn = TurnState::new(to_move);
        self.over = false;
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn stone(&self, cell: Cell) -> Option<Side> {
        self.stones.get(cell).copied().flatten().map(|p| p.owner)
    }

    pub fn to_move(&self) -> Side {
        self.turn.current()
    }

    /// Stones `side` has captured.
    pub fn captures(&self, side: Side) -> u32 {
        self.captures[side.index()]
    }

    /// Place a stone for the side to move. Rejected moves leave the turn unchanged.
    pub fn play(&mut self, cell: Cell) -> Vec<GameEvent> {
        if self.over {
            return Vec::new();
        }
        let Self {
            stones,
            turn,
            captures,
            ..
        } = self;
        let before = captures.iter().sum::<u32>();
        let outcome = turn.try_move(|side| place(stones, captures, side, cell));
        if !outcome.is_accepted() {
            return Vec::new();
        }

        let total = self.captures.iter().sum::<u32>();
        self.score.update(total);
        let mut events = vec![GameEvent::Sound(if total > before { Sound::Pop } else { Sound::Click })];
        if self.stones.values().iter().all(Option::is_some) || !self.has_legal_move(self.turn.current()) {
            self.over = true;
            events.push(GameEvent::GameOver(self.result()));
        }
        events
    }

    fn has_legal_move(&self, side: Side) -> bool {
        self.stones.cells().any(|cell| {
            let mut stones = self.stones.clone();
            let mut captures = self.captures;
            place(&mut stones, &mut captures, side, cell).is_accepted()
        })
    }

    fn result(&self) -> Outcome {
        let [first, second] = self.captures;
        match first.cmp(&second) {
            std::cmp::Ordering::Greater => Outcome::Winner(Side::First),
            std::cmp::Ordering::Less => Outcome::Winner(Side::Second),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Stones of `side`'s group at `cell` and the group's liberties.
fn group_of(stones: &Board<Stone>, cell: Cell, side: Side) -> (Vec<Cell>, usize) {
    let group = flood_fill(stones, cell, |s| s.is_some_and(|p| p.owner == side));
    let free = liberties(stones, &group, Option::is_none);
    (group, free)
}

/// Put a `side` stone on `cell`, capture opponent groups left without liberties,
/// then refuse the move if the new stone's own group has none.
fn place(stones: &mut Board<Stone>, captures: &mut [u32; 2], side: Side, cell: Cell) -> MoveOutcome {
    if stones.get(cell).is_none_or(Option::is_some) {
        return MoveOutcome::Rejected;
    }
    stones[cell] = Some(Piece::new(Stone, side));

    let opponent = side.opponent();
    let mut removed = 0;
    for next in stones.neighbors4(cell, BoundaryPolicy::Bounded).collect::<Vec<_>>() {
        if stones[next].is_none_or(|p| p.owner != opponent) {
            continue;
        }
        let (group, free) = group_of(stones, next, opponent);
        if free == 0 {
            removed += group.len() as u32;
            for dead in group {
                stones[dead] = None;
            }
        }
    }

    let (_, own_liberties) = group_of(stones, cell, side);
    if own_liberties == 0 {
        debug!(row = cell.row, col = cell.col, "suicide rejected");
        stones[cell] = None;
        return MoveOutcome::Rejected;
    }
    captures[side.index()] += removed;
    MoveOutcome::Accepted
}

impl GameInstance for Go {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Go Basics", "Surround your opponent's stones to capture them.")
    }

    fn init(&mut self) {
        self.stones = Grid::filled(SIZE, SIZE, None);
        self.turn = TurnState::default();
        self.captures = [0; 2];
        self.over = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        surface.fill_rect(0.0, 0.0, surface.width(), surface.height(), Color::hex(0xdeb887));
        let last = SIZE - 1;
        let line = Color::hex(0x5d4037);
        for i in 0..SIZE {
            let row_start = self.layout.cell_origin(Cell::new(i, 0));
            let row_end = self.layout.cell_origin(Cell::new(i, last));
            surface.stroke_line(row_start, row_end, 1.0, line);
            let col_start = self.layout.cell_origin(Cell::new(0, i));
            let col_end = self.layout.cell_origin(Cell::new(last, i));
            surface.stroke_line(col_start, col_end, 1.0, line);
        }
        for (cell, stone) in self.stones.iter() {
            if let Some(piece) = stone {
                let (x, y) = self.layout.cell_origin(cell);
                let color = match piece.owner {
                    Side::First => Color::BLACK,
                    Side::Second => Color::WHITE,
                };
                surface.fill_circle(x, y, self.layout.cell_size * 0.45, color);
            }
        }

        let to_move = match self.turn.current() {
            Side::First => "Black",
            Side::Second => "White",
        };
        let status = format!(
            "Black captured {}   White captured {}   {to_move} to move",
            self.captures(Side::First),
            self.captures(Side::Second)
        );
        surface.fill_text(&status, surface.width() / 2.0, 20.0, 14.0, line);
        if self.over {
            overlay_banner(surface, "Game over", Some(&format!("Captures: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        match self.layout.point_at(event.x, event.y) {
            Some(cell) => self.play(cell),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action != "fill" || self.over {
            return Vec::new();
        }
        let side = self.turn.current();
        let target = self.stones.cells().find(|&cell| {
            let mut stones = self.stones.clone();
            let mut captures = self.captures;
            place(&mut stones, &mut captures, side, cell).is_accepted()
        });
        match target {
            Some(cell) => self.play(cell),
            None => Vec::new(),
        }
    }

    fn get_state(&self) -> GameSnapshot {
        let board = self.stones.map(|s| s.map(|p| p.owner));
        GameSnapshot::new(self.score.get())
            .with("board", board.to_rows())
            .with("to_move", self.turn.current())
            .with("captures", self.captures)
    }

    impl_score_keeping!(terminal: over);
}
