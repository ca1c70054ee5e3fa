use std::collections::VecDeque;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use minicade_core::audio::Sound;
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::grid::Dir;
use minicade_core::impl_score_keeping;
use minicade_core::input::PointerEvent;
use minicade_core::physics::{Rect, Vec2, wrap_cell};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

use crate::config::{ArcadeConfig, SnakeConfig};

pub const MIN_SWIPE: f32 = 10.0;
/// Where the head starts on a board with room for it.
const HOME: Square = Square::new(5, 5);
const START_LEN: i32 = 3;

/// A board square, `x` across and `y` down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub x: i32,
    pub y: i32,
}

impl Square {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn step(self, dir: Dir) -> Self {
        let (dr, dc) = dir.delta();
        Self::new(self.x + dc as i32, self.y + dr as i32)
    }
}

/// Steer the snake to the food without hitting a wall or yourself.
pub struct Snake {
    rng: StdRng,
    config: SnakeConfig,
    bounds: Rect,
    cell: f32,
    cols: i32,
    rows: i32,
    /// Head first.
    body: VecDeque<Square>,
    heading: Dir,
    next_heading: Dir,
    food: Option<Square>,
    /// Wraparound at the edges and immunity to self-collision.
    god_mode: bool,
    fast: bool,
    over: bool,
    score: ScoreKeeper,
}

impl Snake {
    /// Tunables come from [`ArcadeConfig::load`].
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, ArcadeConfig::load().snake, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, SnakeConfig::default(), StdRng::seed_from_u64(seed))
    }

    pub fn with_config(width: f32, height: f32, config: SnakeConfig, seed: u64) -> Self {
        Self::with_rng(width, height, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, height: f32, config: SnakeConfig, rng: StdRng) -> Self {
        let cell = config.min_cell.max((width / 20.0).floor()).max(1.0);
        let mut game = Self {
            rng,
            bounds: Rect::new(0.0, 0.0, width, height),
            cell,
            cols: ((width / cell).floor() as i32).max(1),
            rows: ((height / cell).floor() as i32).max(1),
            config,
            body: VecDeque::new(),
            heading: Dir::Right,
            next_heading: Dir::Right,
            food: None,
            god_mode: false,
            fast: false,
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    pub fn body(&self) -> &VecDeque<Square> {
        &self.body
    }

    pub fn head(&self) -> Option<Square> {
        self.body.front().copied()
    }

    pub fn food(&self) -> Option<Square> {
        self.food
    }

    pub fn heading(&self) -> Dir {
        self.next_heading
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    pub fn is_god_mode(&self) -> bool {
        self.god_mode
    }

    fn in_bounds(&self, square: Square) -> bool {
        (0..self.cols).contains(&square.x) && (0..self.rows).contains(&square.y)
    }

    /// Food on a random free square; `None` once the snake fills the board.
    fn spawn_food(&mut self) {
        let free: Vec<Square> = (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| Square::new(x, y)))
            .filter(|s| !self.body.contains(s))
            .collect();
        self.food = free.choose(&mut self.rng).copied();
    }

    /// Queue a turn for the next tick. Reversing onto the neck is ignored.
    pub fn steer(&mut self, dir: Dir) {
        if dir != self.heading.opposite() {
            self.next_heading = dir;
        }
    }

    /// Starting body heading right, pulled toward the centre on small boards.
    fn start_body(&self) -> VecDeque<Square> {
        let head = Square::new(HOME.x.min(self.cols / 2), HOME.y.min(self.rows / 2));
        (0..START_LEN)
            .map(|i| Square::new(head.x - i, head.y))
            .filter(|s| self.in_bounds(*s))
            .collect()
    }

    fn crash(&mut self) -> Vec<GameEvent> {
        self.over = true;
        vec![GameEvent::Sound(Sound::Explode), GameEvent::GameOver(Outcome::Lost)]
    }
}

impl GameInstance for Snake {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Snake", "Swipe to steer; eat to grow; don't bite yourself.")
    }

    fn init(&mut self) {
        self.body = self.start_body();
        self.heading = Dir::Right;
        self.next_heading = Dir::Right;
        self.god_mode = false;
        self.fast = false;
        self.over = false;
        self.spawn_food();
        self.score.reset();
    }

    fn update(&mut self) -> Vec<GameEvent> {
        if self.over {
            return Vec::new();
        }
        let Some(head) = self.head() else {
            return Vec::new();
        };
        self.heading = self.next_heading;
        let mut next = head.step(self.heading);

        if !self.in_bounds(next) {
            if !self.god_mode {
                return self.crash();
            }
            let (x, y) = wrap_cell(next.x, next.y, self.cols, self.rows);
            next = Square::new(x, y);
        }
        if self.body.contains(&next) && !self.god_mode {
            return self.crash();
        }

        self.body.push_front(next);
        if self.food == Some(next) {
            self.score.add(self.config.points_per_food);
            self.spawn_food();
            if self.food.is_none() {
                self.over = true;
                return vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Won)];
            }
            return vec![GameEvent::Sound(Sound::Pop)];
        }
        self.body.pop_back();
        Vec::new()
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let cell = self.cell;
        for (i, segment) in self.body.iter().enumerate() {
            let color = if i == 0 { Color::GREEN } else { Color::hex(0x27ae60) };
            surface.fill_rect(
                segment.x as f32 * cell + 1.0,
                segment.y as f32 * cell + 1.0,
                cell - 2.0,
                cell - 2.0,
                color,
            );
        }
        if let Some(food) = self.food {
            let center = Vec2::new((food.x as f32 + 0.5) * cell, (food.y as f32 + 0.5) * cell);
            surface.fill_circle(center.x, center.y, cell / 2.0 - 2.0, Color::RED);
        }
        surface.fill_text(&format!("Score: {}", self.score.get()), 50.0, 20.0, 14.0, Color::WHITE);
        if self.god_mode {
            surface.fill_text("GOD", surface.width() - 30.0, 20.0, 14.0, Color::YELLOW);
        }
        if self.over {
            overlay_banner(surface, "Game Over", Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        let Some((sx, sy)) = event.start else {
            return Vec::new();
        };
        if self.over || !self.bounds.contains(Vec2::new(sx, sy)) {
            return Vec::new();
        }
        if let Some(dir) = event.swipe(MIN_SWIPE) {
            self.steer(dir);
        }
        Vec::new()
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        match action {
            "god" => {
                self.god_mode = !self.god_mode;
                Vec::new()
            },
            "fast" if !self.fast => {
                self.fast = true;
                vec![GameEvent::RescheduleClock]
            },
            _ => Vec::new(),
        }
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("snake", &self.body)
            .with("food", self.food)
            .with("heading", self.heading)
            .with("god_mode", self.god_mode)
    }

    fn tick_interval(&self) -> Option<Duration> {
        let ms = if self.fast {
            self.config.fast_tick_ms
        } else {
            self.config.tick_ms
        };
        Some(Duration::from_millis(ms.max(1)))
    }

    impl_score_keeping!(terminal: over);
}

#[cfg(test)]
mod tests {
    use minicade_core::test_helpers::{
        HEIGHT, WIDTH, contract_terminal_state_is_frozen, has_game_over, run_contract_suite, run_ticks, swipe,
    };
    use proptest::prelude::*;

    use super::*;

    fn game() -> Snake {
        Snake::with_seed(WIDTH, HEIGHT, 5)
    }

    #[test]
    fn satisfies_game_contract() {
        run_contract_suite(|| Box::new(game()));
    }

    #[test]
    fn crashed_snake_stays_put() {
        contract_terminal_state_is_frozen(&mut game(), |g| {
            g.food = None;
            let (cols, _) = g.dimensions();
            run_ticks(g, cols as usize);
        });
    }

    #[test]
    fn grid_scales_with_width() {
        let g = game();
        assert_eq!(g.cell, 18.0);
        assert_eq!(g.dimensions(), (20, 27));
        let small = Snake::with_seed(200.0, 300.0, 5);
        assert_eq!(small.cell, 15.0);
    }

    #[test]
    fn moves_one_square_per_tick() {
        let mut g = game();
        g.food = None;
        g.update();
        assert_eq!(g.head(), Some(Square::new(6, 5)));
        assert_eq!(g.body().len(), 3);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut g = game();
        g.food = Some(Square::new(6, 5));
        let events = g.update();
        assert_eq!(events, vec![GameEvent::Sound(Sound::Pop)]);
        assert_eq!(g.score(), 10);
        assert_eq!(g.body().len(), 4);
        assert!(g.food().is_some_and(|f| !g.body().contains(&f)));
    }

    #[test]
    fn swipe_turns_but_never_reverses() {
        let mut g = game();
        swipe(&mut g, (100.0, 100.0), (100.0, 200.0));
        assert_eq!(g.heading(), Dir::Down);
        g.food = None;
        g.update();
        swipe(&mut g, (100.0, 200.0), (100.0, 100.0));
        assert_eq!(g.heading(), Dir::Down, "up would reverse into the neck");
    }

    #[test]
    fn wall_ends_the_game() {
        let mut g = game();
        g.food = None;
        let (cols, _) = g.dimensions();
        let events = run_ticks(&mut g, cols as usize);
        assert!(events.contains(&GameEvent::GameOver(Outcome::Lost)));
        assert!(g.is_terminal());
    }

    #[test]
    fn god_mode_wraps_around() {
        let mut g = game();
        g.food = None;
        g.cheat("god");
        let (cols, _) = g.dimensions();
        let events = run_ticks(&mut g, cols as usize);
        assert!(!has_game_over(&events));
        assert_eq!(g.head(), Some(Square::new(5, 5)));
    }

    #[test]
    fn self_collision_ends_the_game() {
        let mut g = game();
        g.food = None;
        g.body = [
            Square::new(5, 5),
            Square::new(4, 5),
            Square::new(4, 6),
            Square::new(5, 6),
            Square::new(6, 6),
            Square::new(6, 5),
        ]
        .into();
        let events = g.update();
        assert!(has_game_over(&events));
    }

    #[test]
    fn narrow_board_starts_inside_the_walls() {
        let mut g = Snake::with_seed(60.0, 60.0, 3);
        assert_eq!(g.dimensions(), (4, 4));
        assert!(g.body().iter().all(|s| g.in_bounds(*s)));
        assert_eq!(g.head(), Some(Square::new(2, 2)));

        g.food = None;
        let events = g.update();
        assert!(!has_game_over(&events), "first tick must not hit a wall");
        assert_eq!(g.head(), Some(Square::new(3, 2)));
    }

    #[test]
    fn fast_cheat_reschedules_clock() {
        let mut g = game();
        assert_eq!(g.tick_interval(), Some(Duration::from_millis(150)));
        assert_eq!(g.cheat("fast"), vec![GameEvent::RescheduleClock]);
        assert_eq!(g.tick_interval(), Some(Duration::from_millis(50)));
        assert!(g.cheat("fast").is_empty());
        g.restart();
        assert_eq!(g.tick_interval(), Some(Duration::from_millis(150)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn god_mode_never_leaves_the_board(seed in any::<u64>(), turns in prop::collection::vec(0usize..4, 1..60)) {
            let mut g = Snake::with_seed(WIDTH, HEIGHT, seed);
            g.cheat("god");
            let (cols, rows) = g.dimensions();
            for t in turns {
                g.steer(Dir::ALL[t]);
                g.update();
                let head = g.head().unwrap();
                prop_assert!((0..cols).contains(&head.x) && (0..rows).contains(&head.y));
            }
            prop_assert!(!g.is_terminal());
        }
    }
}
