use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use minicade_core::audio::Sound;
use minicade_core::game_trait::{
    EffectId, GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper,
};
use minicade_core::grid::{Cell, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

pub const ROWS: usize = 4;
pub const COLS: usize = 4;
pub const PAIRS: usize = ROWS * COLS / 2;
pub const POINTS_PER_PAIR: u32 = 10;
/// How long a mismatched pair stays face up.
pub const CHECK_DELAY: Duration = Duration::from_millis(500);

const CHECK_MATCH: EffectId = 1;
const FACES: [&str; PAIRS] = ["🍎", "🍌", "🍒", "🍇", "🍉", "🍓", "🍍", "🥝"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub face: u8,
    pub face_up: bool,
    pub matched: bool,
}

/// Flip two cards at a time and find all matching pairs.
pub struct Memory {
    rng: StdRng,
    layout: GridLayout,
    cards: Grid<Card>,
    flipped: Vec<Cell>,
    locked: bool,
    pairs_found: usize,
    peek: bool,
    won: bool,
    score: ScoreKeeper,
}

impl Memory {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, _height: f32, rng: StdRng) -> Self {
        let mut game = Self {
            rng,
            layout: GridLayout::centered(width, 60.0, 80.0, 40.0, ROWS, COLS),
            cards: Grid::filled(
                ROWS,
                COLS,
                Card {
                    face: 0,
                    face_up: false,
                    matched: false,
                },
            ),
            flipped: Vec::new(),
            locked: false,
            pairs_found: 0,
            peek: false,
            won: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn card(&self, cell: Cell) -> Option<&Card> {
        self.cards.get(cell)
    }

    pub fn pairs_found(&self) -> usize {
        self.pairs_found
    }

    /// Input is refused while a flipped pair waits to be checked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn check_match(&mut self) -> Vec<GameEvent> {
        let [a, b] = self.flipped[..] else {
            return Vec::new();
        };
        self.flipped.clear();
        self.locked = false;

        if self.cards[a].face != self.cards[b].face {
            self.cards[a].face_up = false;
            self.cards[b].face_up = false;
            return vec![GameEvent::Sound(Sound::Fail)];
        }

        self.cards[a].matched = true;
        self.cards[b].matched = true;
        self.pairs_found += 1;
        self.score.add(POINTS_PER_PAIR);
        let mut events = vec![GameEvent::Sound(Sound::Success)];
        if self.pairs_found == PAIRS {
            self.won = true;
            events.push(GameEvent::GameOver(Outcome::Won));
        }
        events
    }
}

impl GameInstance for Memory {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Memory", "Turn over two cards at a time and find every pair.")
    }

    fn init(&mut self) {
        let mut faces: Vec<u8> = (0..PAIRS as u8).flat_map(|f| [f, f]).collect();
        faces.shuffle(&mut self.rng);
        let mut faces = faces.into_iter();
        self.cards = Grid::from_fn(ROWS, COLS, |_| Card {
            face: faces.next().unwrap_or_default(),
            face_up: false,
            matched: false,
        });
        self.flipped.clear();
        self.locked = false;
        self.pairs_found = 0;
        self.peek = false;
        self.won = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, card) in self.cards.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            let shown = card.face_up || card.matched || self.peek;
            let fill = if card.matched {
                Color::GREEN
            } else if shown {
                Color::WHITE
            } else {
                Color::BLUE
            };
            surface.fill_rect(x + 4.0, y + 4.0, size - 8.0, size - 8.0, fill);
            if shown {
                let (cx, cy) = self.layout.cell_center(cell);
                surface.fill_text(FACES[usize::from(card.face) % PAIRS], cx, cy, size * 0.5, Color::BLACK);
            }
        }

        let status = format!("Pairs: {}/{}   Score: {}", self.pairs_found, PAIRS, self.score.get());
        surface.fill_text(&status, surface.width() / 2.0, 30.0, 18.0, Color::WHITE);
        if self.won {
            overlay_banner(surface, "All pairs found!", Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_start(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        if self.won {
            return Vec::new();
        }
        if self.locked {
            debug!("tap ignored while a pair is being checked");
            return Vec::new();
        }
        let Some(cell) = self.layout.cell_at(event.x, event.y) else {
            return Vec::new();
        };
        let card = &mut self.cards[cell];
        if card.face_up || card.matched {
            return Vec::new();
        }
        card.face_up = true;
        self.flipped.push(cell);

        let mut events = vec![GameEvent::Sound(Sound::Click)];
        if self.flipped.len() == 2 {
            self.locked = true;
            events.push(GameEvent::Schedule {
                delay: CHECK_DELAY,
                effect: CHECK_MATCH,
            });
        }
        events
    }

    fn fire_effect(&mut self, effect: EffectId) -> Vec<GameEvent> {
        match effect {
            CHECK_MATCH if !self.won => self.check_match(),
            _ => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action == "reveal" {
            self.peek = !self.peek;
        }
        Vec::new()
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("cards", self.cards.to_rows())
            .with("pairs_found", self.pairs_found)
            .with("peek", self.peek)
    }

    impl_score_keeping!(terminal: won);
}
