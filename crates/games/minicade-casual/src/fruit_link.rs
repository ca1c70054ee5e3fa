use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use minicade_core::audio::Sound;
use minicade_core::connectivity::{LinkRule, find_link_path};
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::grid::{BoundaryPolicy, Cell, Grid};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};
use tracing::debug;

pub const ROWS: usize = 6;
pub const COLS: usize = 6;
pub const POINTS_PER_PAIR: u32 = 10;

const FRUITS: [&str; 8] = ["🍎", "🍊", "🍇", "🍌", "🍉", "🍓", "🍒", "🥝"];
const RESHUFFLE_ATTEMPTS: usize = 16;

/// Link matching fruit with a path of at most two turns to clear them.
pub struct FruitLink {
    rng: StdRng,
    layout: GridLayout,
    rule: LinkRule,
    tiles: Grid<Option<u8>>,
    selected: Option<Cell>,
    last_link: Vec<(isize, isize)>,
    won: bool,
    score: ScoreKeeper,
}

impl FruitLink {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, _height: f32, rng: StdRng) -> Self {
        let mut game = Self {
            rng,
            layout: GridLayout::centered(width, 50.0, 50.0, 40.0, ROWS, COLS),
            rule: LinkRule::default(),
            tiles: Grid::filled(ROWS, COLS, None),
            selected: None,
            last_link: Vec::new(),
            won: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    /// Replace the board, e.g. to replay a saved layout.
    pub fn load_tiles(&mut self, tiles: Grid<Option<u8>>) {
        self.tiles = tiles;
        self.selected = None;
        self.last_link.clear();
        self.won = false;
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn tiles(&self) -> &Grid<Option<u8>> {
        &self.tiles
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    fn link(&self, a: Cell, b: Cell) -> Option<Vec<(isize, isize)>> {
        let fruit = self.tiles.get(a).copied().flatten()?;
        if self.tiles.get(b).copied().flatten() != Some(fruit) {
            return None;
        }
        find_link_path(&self.tiles, a, b, self.rule, Option::is_none).map(|p| p.points)
    }

    fn occupied(&self) -> Vec<Cell> {
        self.tiles
            .iter()
            .filter_map(|(cell, tile)| tile.is_some().then_some(cell))
            .collect()
    }

    /// First linkable pair in row-major order.
    pub fn find_pair(&self) -> Option<(Cell, Cell)> {
        let occupied = self.occupied();
        occupied.iter().enumerate().find_map(|(i, &a)| {
            occupied[i + 1..]
                .iter()
                .find(|&&b| self.link(a, b).is_some())
                .map(|&b| (a, b))
        })
    }

    /// Select `cell`, or try to link it with the current selection.
    pub fn pick(&mut self, cell: Cell) -> Vec<GameEvent> {
        if self.won || self.tiles.get(cell).is_none_or(Option::is_none) {
            return Vec::new();
        }
        self.last_link.clear();
        let Some(first) = self.selected.take() else {
            self.selected = Some(cell);
            return vec![GameEvent::Sound(Sound::Click)];
        };
        if first == cell {
            return Vec::new();
        }
        let Some(path) = self.link(first, cell) else {
            return vec![GameEvent::Sound(Sound::Fail)];
        };

        self.tiles[first] = None;
        self.tiles[cell] = None;
        self.last_link = path;
        self.score.add(POINTS_PER_PAIR);

        if self.tiles.values().iter().all(Option::is_none) {
            self.won = true;
            return vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Won)];
        }
        if self.find_pair().is_none() {
            self.reshuffle();
        }
        vec![GameEvent::Sound(Sound::Pop)]
    }

    /// Redeal the remaining fruit among the occupied cells until a pair links again.
    fn reshuffle(&mut self) {
        let occupied = self.occupied();
        let mut fruits: Vec<Option<u8>> = occupied.iter().map(|&c| self.tiles[c]).collect();
        for attempt in 1..=RESHUFFLE_ATTEMPTS {
            fruits.shuffle(&mut self.rng);
            for (&cell, &fruit) in occupied.iter().zip(&fruits) {
                self.tiles[cell] = fruit;
            }
            if self.find_pair().is_some() {
                debug!(attempt, "fruit link board reshuffled");
                return;
            }
        }
        debug!(attempts = RESHUFFLE_ATTEMPTS, "no linkable pair after reshuffling, moving one into place");
        self.force_pair();
    }

    /// Swap a tile next to its twin so at least one direct link exists.
    fn force_pair(&mut self) {
        let occupied = self.occupied();
        let twins = occupied.iter().enumerate().find_map(|(i, &a)| {
            occupied[i + 1..]
                .iter()
                .find(|&&b| self.tiles[b] == self.tiles[a])
                .map(|&b| (a, b))
        });
        let Some((a, b)) = twins else {
            return;
        };
        let beside = self.tiles.neighbors4(a, BoundaryPolicy::Bounded).next();
        if let Some(beside) = beside {
            self.tiles.swap(b, beside);
        }
    }
}

impl GameInstance for FruitLink {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Fruit Link", "Connect matching fruit with at most two turns to clear them.")
    }

    fn init(&mut self) {
        let total = ROWS * COLS;
        let mut deck: Vec<u8> = (0..total / 2).map(|i| (i % FRUITS.len()) as u8).flat_map(|f| [f, f]).collect();
        deck.shuffle(&mut self.rng);
        let mut deck = deck.into_iter();
        self.tiles = Grid::from_fn(ROWS, COLS, |_| deck.next());
        self.selected = None;
        self.last_link.clear();
        self.won = false;
        if self.find_pair().is_none() {
            self.reshuffle();
        }
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, tile) in self.tiles.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            let fill = if self.selected == Some(cell) {
                Color::ORANGE
            } else {
                Color::PANEL
            };
            surface.fill_rect(x + 2.0, y + 2.0, size - 4.0, size - 4.0, fill);
            if let Some(fruit) = tile {
                let (cx, cy) = self.layout.cell_center(cell);
                surface.fill_text(FRUITS[usize::from(*fruit) % FRUITS.len()], cx, cy, size * 0.5, Color::WHITE);
            }
        }

        let to_pixels = |&(r, c): &(isize, isize)| {
            (
                self.layout.offset_x + (c as f32 + 0.5) * size,
                self.layout.offset_y + (r as f32 + 0.5) * size,
            )
        };
        for pair in self.last_link.windows(2) {
            surface.stroke_line(to_pixels(&pair[0]), to_pixels(&pair[1]), 3.0, Color::YELLOW);
        }

        surface.fill_text(&format!("Score: {}", self.score.get()), surface.width() / 2.0, 25.0, 16.0, Color::WHITE);
        if self.won {
            overlay_banner(surface, "Board cleared!", Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        match self.layout.cell_at(event.x, event.y) {
            Some(cell) => self.pick(cell),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action == "hint"
            && !self.won
            && let Some((first, _)) = self.find_pair()
        {
            self.selected = Some(first);
        }
        Vec::new()
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("tiles", self.tiles.to_rows())
            .with("selected", self.selected)
    }

    impl_score_keeping!(terminal: won);
}
