use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use minicade_core::audio::Sound;
use minicade_core::connectivity::reachable;
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::generation::spanning_tree;
use minicade_core::grid::{BoundaryPolicy, Cell, Dir, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

pub const SIZE: usize = 5;
/// Flow enters the network here.
pub const SOURCE: Cell = Cell::new(0, 0);

const SCRAMBLE_ATTEMPTS: usize = 8;

/// Bit set of open sides, indexed by [`Dir::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Openings(u8);

impl Openings {
    pub fn with(self, dir: Dir) -> Self {
        Self(self.0 | (1 << dir.index()))
    }

    pub fn has(self, dir: Dir) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// The same openings turned a quarter clockwise `turns` times.
    pub fn rotated(self, turns: u8) -> Self {
        (0..turns % 4).fold(self, |o, _| Self(((o.0 << 1) | (o.0 >> 3)) & 0xF))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipeShape {
    End,
    Straight,
    Elbow,
    Tee,
    Cross,
}

impl PipeShape {
    pub fn of(openings: Openings) -> Self {
        match openings.count() {
            0 | 1 => PipeShape::End,
            2 if openings.has(Dir::Up) == openings.has(Dir::Down) => PipeShape::Straight,
            2 => PipeShape::Elbow,
            3 => PipeShape::Tee,
            _ => PipeShape::Cross,
        }
    }
}

/// One tile: its solved openings and the current quarter turns away from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipe {
    pub solved: Openings,
    pub rotation: u8,
}

impl Pipe {
    pub fn openings(self) -> Openings {
        self.solved.rotated(self.rotation)
    }
}

/// Rotate tiles until every pipe joins the network fed from the top-left corner.
pub struct Pipes {
    rng: StdRng,
    layout: GridLayout,
    boundary: BoundaryPolicy,
    pipes: Grid<Pipe>,
    flowing: Grid<bool>,
    won: bool,
    score: ScoreKeeper,
}

impl Pipes {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, _height: f32, rng: StdRng) -> Self {
        let blank = Pipe {
            solved: Openings::default(),
            rotation: 0,
        };
        let mut game = Self {
            rng,
            layout: GridLayout::centered(width, 80.0, 60.0, 40.0, SIZE, SIZE),
            boundary: BoundaryPolicy::Bounded,
            pipes: Grid::filled(SIZE, SIZE, blank),
            flowing: Grid::filled(SIZE, SIZE, false),
            won: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    /// Let pipes on opposite edges connect to each other.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self.refresh_flow();
        self
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn pipe(&self, cell: Cell) -> Option<Pipe> {
        self.pipes.get(cell).copied()
    }

    pub fn is_flowing(&self, cell: Cell) -> bool {
        self.flowing.get(cell).copied().unwrap_or(false)
    }

    pub fn connected_count(&self) -> usize {
        self.flowing.values().iter().filter(|&&f| f).count()
    }

    /// Turn the pipe at `cell` a quarter clockwise.
    pub fn rotate(&mut self, cell: Cell) -> Vec<GameEvent> {
        if self.won {
            return Vec::new();
        }
        let Some(pipe) = self.pipes.get_mut(cell) else {
            return Vec::new();
        };
        pipe.rotation = (pipe.rotation + 1) % 4;
        self.score.add(1);
        self.refresh_flow();

        if self.connected_count() == self.pipes.len() {
            self.won = true;
            return vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Won)];
        }
        vec![GameEvent::Sound(Sound::Click)]
    }

    fn refresh_flow(&mut self) {
        let pipes = &self.pipes;
        self.flowing = reachable(pipes, SOURCE, self.boundary, |from, dir, to| {
            pipes[from].openings().has(dir) && pipes[to].openings().has(dir.opposite())
        });
    }

    fn generate(&mut self) {
        let mut solved = Grid::filled(SIZE, SIZE, Openings::default());
        for (cell, dir) in spanning_tree(SIZE, SIZE, &mut self.rng) {
            solved[cell] = solved[cell].with(dir);
            if let Some(next) = solved.step(cell, dir, BoundaryPolicy::Bounded) {
                solved[next] = solved[next].with(dir.opposite());
            }
        }

        for _ in 0..SCRAMBLE_ATTEMPTS {
            let rng = &mut self.rng;
            self.pipes = solved.map(|&openings| Pipe {
                solved: openings,
                rotation: rng.random_range(0..4),
            });
            self.refresh_flow();
            if self.connected_count() < self.pipes.len() {
                break;
            }
        }
    }
}

impl GameInstance for Pipes {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Pipes", "Tap tiles to rotate them until water reaches every pipe.")
    }

    fn init(&mut self) {
        self.generate();
        self.won = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, pipe) in self.pipes.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            surface.fill_rect(x + 1.0, y + 1.0, size - 2.0, size - 2.0, Color::PANEL);

            let color = if self.flowing[cell] { Color::BLUE } else { Color::GREY };
            let (cx, cy) = self.layout.cell_center(cell);
            let openings = pipe.openings();
            for dir in Dir::ALL.into_iter().filter(|d| openings.has(*d)) {
                let (dr, dc) = dir.delta();
                let end = (cx + dc as f32 * size / 2.0, cy + dr as f32 * size / 2.0);
                surface.stroke_line((cx, cy), end, size / 5.0, color);
            }
            surface.fill_circle(cx, cy, size / 10.0, color);
        }
        let (sx, sy) = self.layout.cell_center(SOURCE);
        surface.fill_circle(sx, sy, size / 6.0, Color::TEAL);

        let status = format!(
            "Connected: {}/{}   Moves: {}",
            self.connected_count(),
            self.pipes.len(),
            self.score.get()
        );
        surface.fill_text(&status, surface.width() / 2.0, 40.0, 18.0, Color::WHITE);
        if self.won {
            overlay_banner(surface, "All connected!", Some(&format!("Moves: {}", self.score.get())));
        }
    }

    fn on_input_start(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        match self.layout.cell_at(event.x, event.y) {
            Some(cell) => self.rotate(cell),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        match action {
            "solve" if !self.won => {
                for pipe in self.pipes.values_mut() {
                    pipe.rotation = 0;
                }
                self.refresh_flow();
                self.won = true;
                vec![GameEvent::GameOver(Outcome::Won)]
            },
            _ => Vec::new(),
        }
    }

    fn get_state(&self) -> GameSnapshot {
        let rotations = self.pipes.map(|p| p.rotation);
        GameSnapshot::new(self.score.get())
            .with("shapes", self.pipes.map(|p| PipeShape::of(p.solved)).to_rows())
            .with("rotations", rotations.to_rows())
            .with("connected", self.connected_count())
            .with("won", self.won)
    }

    impl_score_keeping!(terminal: won);
}
