use rand::SeedableRng;
use rand::rngs::StdRng;

use minicade_core::audio::Sound;
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::generation::{Maze as MazeGrid, MazeCell, generate_maze};
use minicade_core::grid::{BoundaryPolicy, Cell, Dir};
use minicade_core::impl_score_keeping;
use minicade_core::input::{GridLayout, PointerEvent};
use minicade_core::surface::{Color, Surface, clear_background, overlay_banner};

pub const SIZE: usize = 15;
/// Finishing score before the step penalty.
pub const PAR_SCORE: u32 = 1000;
/// Shortest drag that counts as a swipe, in pixels.
pub const MIN_SWIPE: f32 = 20.0;

/// Swipe through a generated maze from the top-left corner to the bottom-right.
pub struct Maze {
    rng: StdRng,
    width: f32,
    height: f32,
    layout: GridLayout,
    maze: MazeGrid,
    player: Cell,
    steps: u32,
    won: bool,
    score: ScoreKeeper,
}

impl Maze {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, height: f32, mut rng: StdRng) -> Self {
        let maze = generate_maze(SIZE, SIZE, &mut rng);
        let mut game = Self {
            rng,
            width,
            height,
            layout: GridLayout::centered(width, 30.0, 22.0, 20.0, SIZE, SIZE),
            player: maze.entrance,
            maze,
            steps: 0,
            won: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    pub fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Move one cell towards `dir` if the way is open.
    pub fn step(&mut self, dir: Dir) -> Vec<GameEvent> {
        if self.won {
            return Vec::new();
        }
        let Some(next) = self.maze.grid.step(self.player, dir, BoundaryPolicy::Bounded) else {
            return Vec::new();
        };
        if !self.maze.is_open(next) {
            return Vec::new();
        }
        self.player = next;
        self.steps += 1;
        if self.player == self.maze.exit {
            return self.finish();
        }
        Vec::new()
    }

    fn finish(&mut self) -> Vec<GameEvent> {
        self.won = true;
        self.score.update(PAR_SCORE.saturating_sub(self.steps));
        vec![GameEvent::Sound(Sound::Success), GameEvent::GameOver(Outcome::Won)]
    }

    fn on_surface(&self, (x, y): (f32, f32)) -> bool {
        (0.0..self.width).contains(&x) && (0.0..self.height).contains(&y)
    }
}

impl GameInstance for Maze {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Maze", "Swipe to find the way out. Fewer steps score higher.")
    }

    fn init(&mut self) {
        self.maze = generate_maze(SIZE, SIZE, &mut self.rng);
        self.player = self.maze.entrance;
        self.steps = 0;
        self.won = false;
        self.score.reset();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        clear_background(surface);
        let size = self.layout.cell_size;
        for (cell, kind) in self.maze.grid.iter() {
            let (x, y) = self.layout.cell_origin(cell);
            let color = match kind {
                MazeCell::Wall => Color::PANEL,
                MazeCell::Open => Color::WHITE,
            };
            surface.fill_rect(x, y, size, size, color);
        }
        let (ex, ey) = self.layout.cell_origin(self.maze.exit);
        surface.fill_rect(ex, ey, size, size, Color::GREEN);
        let (px, py) = self.layout.cell_center(self.player);
        surface.fill_circle(px, py, size * 0.35, Color::RED);

        let status = format!("Steps: {}", self.steps);
        surface.fill_text(&status, surface.width() / 2.0, self.layout.bottom() + 30.0, 18.0, Color::WHITE);
        if self.won {
            overlay_banner(surface, "You escaped!", Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_end(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        let Some(start) = event.start else {
            return Vec::new();
        };
        if !self.on_surface(start) {
            return Vec::new();
        }
        match event.swipe(MIN_SWIPE) {
            Some(dir) => self.step(dir),
            None => Vec::new(),
        }
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        match action {
            "show" if !self.won => {
                self.player = self.maze.exit;
                self.finish()
            },
            _ => Vec::new(),
        }
    }

    fn get_state(&self) -> GameSnapshot {
        let open = self.maze.grid.map(|c| *c == MazeCell::Open);
        GameSnapshot::new(self.score.get())
            .with("maze", open.to_rows())
            .with("player", self.player)
            .with("steps", self.steps)
            .with("won", self.won)
    }

    impl_score_keeping!(terminal: won);
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use minicade_core::test_helpers::{
        HEIGHT, WIDTH, contract_terminal_state_is_frozen, has_game_over, run_contract_suite, swipe,
    };

    use super::*;

    const CENTER: (f32, f32) = (WIDTH / 2.0, HEIGHT / 2.0);

    fn game() -> Maze {
        Maze::with_seed(WIDTH, HEIGHT, 3)
    }

    fn swipe_dir(game: &mut Maze, dir: Dir) -> Vec<GameEvent> {
        let (dr, dc) = dir.delta();
        let to = (CENTER.0 + dc as f32 * 60.0, CENTER.1 + dr as f32 * 60.0);
        swipe(game, CENTER, to)
    }

    /// Directions of the shortest route from the entrance to the exit.
    fn route(maze: &MazeGrid) -> Vec<Dir> {
        let mut came_from: HashMap<Cell, (Cell, Dir)> = HashMap::new();
        let mut queue = VecDeque::from([maze.entrance]);
        while let Some(cell) = queue.pop_front() {
            for dir in Dir::ALL {
                if let Some(next) = maze.grid.step(cell, dir, BoundaryPolicy::Bounded)
                    && maze.is_open(next)
                    && next != maze.entrance
                    && !came_from.contains_key(&next)
                {
                    came_from.insert(next, (cell, dir));
                    queue.push_back(next);
                }
            }
        }
        let mut dirs = Vec::new();
        let mut at = maze.exit;
        while at != maze.entrance {
            let (prev, dir) = came_from[&at];
            dirs.push(dir);
            at = prev;
        }
        dirs.reverse();
        dirs
    }

    #[test]
    fn satisfies_game_contract() {
        run_contract_suite(|| Box::new(game()));
    }

    #[test]
    fn escaped_maze_is_frozen() {
        contract_terminal_state_is_frozen(&mut game(), |g| {
            g.cheat("show");
        });
    }

    #[test]
    fn swipe_moves_through_open_cells_only() {
        let mut g = game();
        swipe_dir(&mut g, Dir::Up);
        assert_eq!(g.player(), Cell::new(0, 0), "edge of the maze blocks movement");

        let open = Dir::ALL
            .into_iter()
            .find(|d| {
                g.maze()
                    .grid
                    .step(Cell::new(0, 0), *d, BoundaryPolicy::Bounded)
                    .is_some_and(|c| g.maze().is_open(c))
            })
            .unwrap();
        swipe_dir(&mut g, open);
        assert_ne!(g.player(), Cell::new(0, 0));
        assert_eq!(g.steps(), 1);
        assert_eq!(g.score(), 0, "score is only awarded at the exit");
    }

    #[test]
    fn short_drag_is_not_a_swipe() {
        let mut g = game();
        swipe(&mut g, CENTER, (CENTER.0 + 5.0, CENTER.1));
        assert_eq!(g.steps(), 0);
    }

    #[test]
    fn reaching_exit_scores_par_minus_steps() {
        let mut g = game();
        let dirs = route(g.maze());
        let mut last = Vec::new();
        for dir in &dirs {
            last = swipe_dir(&mut g, *dir);
        }
        assert!(has_game_over(&last));
        assert_eq!(g.player(), g.maze().exit);
        assert_eq!(g.score(), PAR_SCORE - dirs.len() as u32);
        assert!(swipe_dir(&mut g, Dir::Up).is_empty());
    }

    #[test]
    fn show_cheat_jumps_to_exit() {
        let mut g = game();
        let events = g.cheat("show");
        assert!(has_game_over(&events));
        assert_eq!(g.player(), g.maze().exit);
        assert_eq!(g.score(), PAR_SCORE);
    }
}
