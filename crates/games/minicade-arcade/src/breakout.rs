use std::time::Duration;

use minicade_core::audio::Sound;
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::impl_score_keeping;
use minicade_core::input::PointerEvent;
use minicade_core::physics::{Body, Circle, Rect, Vec2, Walls, circle_rect_overlap, reflect_in_bounds};
use minicade_core::surface::{Color, Surface, overlay_banner};

use crate::config::{ArcadeConfig, BreakoutConfig};

pub const PADDLE_WIDTH: f32 = 80.0;
pub const PADDLE_HEIGHT: f32 = 12.0;
pub const BALL_RADIUS: f32 = 8.0;

const BRICK_PADDING: f32 = 5.0;
const BRICK_HEIGHT: f32 = 20.0;
const BRICK_TOP: f32 = 60.0;
const ROW_COLORS: [Color; 5] = [
    Color::RED,
    Color::hex(0xe67e22),
    Color::YELLOW,
    Color::GREEN,
    Color::BLUE,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brick {
    pub rect: Rect,
    pub row: usize,
    pub alive: bool,
}

/// Bounce the ball off the paddle to knock out every brick.
pub struct Breakout {
    config: BreakoutConfig,
    bounds: Rect,
    paddle: Rect,
    ball: Body,
    bricks: Vec<Brick>,
    /// Current ball speed per axis; grows each time the wall is cleared.
    speed: f32,
    lives: u32,
    over: bool,
    score: ScoreKeeper,
}

impl Breakout {
    /// Tunables come from [`ArcadeConfig::load`].
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, ArcadeConfig::load().breakout)
    }

    /// Breakout has no randomness; the seed is accepted for a uniform constructor set.
    pub fn with_seed(width: f32, height: f32, _seed: u64) -> Self {
        Self::with_config(width, height, BreakoutConfig::default())
    }

    pub fn with_config(width: f32, height: f32, config: BreakoutConfig) -> Self {
        let mut game = Self {
            speed: config.ball_speed,
            lives: config.lives,
            config,
            bounds: Rect::new(0.0, 0.0, width, height),
            paddle: Rect::new(0.0, 0.0, PADDLE_WIDTH, PADDLE_HEIGHT),
            ball: Body::default(),
            bricks: Vec::new(),
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    pub fn paddle(&self) -> &Rect {
        &self.paddle
    }

    pub fn ball(&self) -> &Body {
        &self.ball
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    fn build_bricks(&mut self) {
        let cols = self.config.brick_cols.max(1);
        let w = (self.bounds.w - BRICK_PADDING * (cols as f32 + 1.0)) / cols as f32;
        self.bricks = (0..self.config.brick_rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| Brick {
                rect: Rect::new(
                    BRICK_PADDING + col as f32 * (w + BRICK_PADDING),
                    BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_PADDING),
                    w,
                    BRICK_HEIGHT,
                ),
                row,
                alive: true,
            })
            .collect();
    }

    /// Put the ball back above the paddle, heading up and to the right.
    fn serve(&mut self) {
        self.ball = Body::new(
            Vec2::new(self.bounds.w / 2.0, self.bounds.h - 60.0),
            Vec2::new(self.speed, -self.speed),
        );
    }

    fn move_paddle(&mut self, event: &PointerEvent) {
        if !event.is_finite() {
            return;
        }
        let max_x = (self.bounds.w - self.paddle.w).max(0.0);
        self.paddle.x = (event.x - self.paddle.w / 2.0).clamp(0.0, max_x);
    }

    fn lose_life(&mut self) -> Vec<GameEvent> {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.over = true;
            return vec![GameEvent::Sound(Sound::Fail), GameEvent::GameOver(Outcome::Lost)];
        }
        self.speed = self.config.ball_speed;
        self.serve();
        vec![GameEvent::Sound(Sound::Fail)]
    }
}

impl GameInstance for Breakout {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Breakout", "Keep the ball in play and clear the wall of bricks.")
    }

    fn init(&mut self) {
        self.paddle.x = (self.bounds.w - self.paddle.w) / 2.0;
        self.paddle.y = self.bounds.h - 40.0;
        self.speed = self.config.ball_speed;
        self.lives = self.config.lives;
        self.over = false;
        self.build_bricks();
        self.serve();
        self.score.reset();
    }

    fn update(&mut self) -> Vec<GameEvent> {
        if self.over {
            return Vec::new();
        }
        let mut events = Vec::new();

        self.ball.integrate();
        let hit = reflect_in_bounds(&mut self.ball, BALL_RADIUS, &self.bounds, Walls::NO_FLOOR, 1.0);
        if hit.bottom {
            return self.lose_life();
        }

        let circle = Circle::new(self.ball.pos, BALL_RADIUS);
        if self.ball.vel.y > 0.0 && circle_rect_overlap(&circle, &self.paddle) {
            self.ball.vel.y = -self.ball.vel.y;
            self.ball.pos.y = self.paddle.y - BALL_RADIUS;
            events.push(GameEvent::Sound(Sound::Click));
        }

        let mut broke = 0;
        for brick in self.bricks.iter_mut().filter(|b| b.alive) {
            if circle_rect_overlap(&circle, &brick.rect) {
                brick.alive = false;
                broke += 1;
            }
        }
        if broke > 0 {
            self.ball.vel.y = -self.ball.vel.y;
            self.score.add(broke * self.config.points_per_brick);
            events.push(GameEvent::Sound(Sound::Pop));
        }

        if self.bricks_left() == 0 {
            self.build_bricks();
            self.speed *= self.config.refill_speedup;
            self.ball.vel = self.ball.vel * self.config.refill_speedup;
            events.push(GameEvent::Sound(Sound::Success));
        }
        events
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        surface.fill_rect(0.0, 0.0, surface.width(), surface.height(), Color::hex(0x1a1a2e));
        for brick in self.bricks.iter().filter(|b| b.alive) {
            let Rect { x, y, w, h } = brick.rect;
            surface.fill_rect(x, y, w, h, ROW_COLORS[brick.row % ROW_COLORS.len()]);
        }
        surface.fill_circle(self.ball.pos.x, self.ball.pos.y, BALL_RADIUS, Color::WHITE);
        let Rect { x, y, w, h } = self.paddle;
        surface.fill_rect(x, y, w, h, Color::BLUE);

        surface.fill_text(&format!("Score: {}", self.score.get()), 60.0, 25.0, 14.0, Color::WHITE);
        surface.fill_text(&format!("Lives: {}", self.lives), surface.width() - 60.0, 25.0, 14.0, Color::WHITE);
        if self.over {
            overlay_banner(surface, "Game Over", Some(&format!("Score: {}", self.score.get())));
        }
    }

    fn on_input_start(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        self.move_paddle(event);
        Vec::new()
    }

    fn on_input_move(&mut self, event: &PointerEvent) -> Vec<GameEvent> {
        self.move_paddle(event);
        Vec::new()
    }

    fn cheat(&mut self, action: &str) -> Vec<GameEvent> {
        if action != "win" || self.over {
            return Vec::new();
        }
        for brick in &mut self.bricks {
            brick.alive = false;
        }
        vec![GameEvent::Sound(Sound::Success)]
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("lives", self.lives)
            .with("bricks_left", self.bricks_left())
            .with("ball", self.ball.pos)
            .with("paddle_x", self.paddle.x)
    }

    fn tick_interval(&self) -> Option<Duration> {
        Some(self.config.tick_interval())
    }

    impl_score_keeping!(terminal: over);
}

#[cfg(test)]
mod tests {
    use minicade_core::test_helpers::{
        HEIGHT, WIDTH, contract_terminal_state_is_frozen, has_game_over, run_contract_suite, run_ticks, swipe,
    };

    use super::*;

    fn game() -> Breakout {
        Breakout::with_seed(WIDTH, HEIGHT, 0)
    }

    #[test]
    fn satisfies_game_contract() {
        run_contract_suite(|| Box::new(game()));
    }

    #[test]
    fn game_over_freezes_the_ball() {
        contract_terminal_state_is_frozen(&mut game(), |g| {
            while !g.is_terminal() {
                g.lose_life();
            }
        });
    }

    #[test]
    fn runs_at_twenty_millis() {
        assert_eq!(game().tick_interval(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn starts_with_full_wall() {
        let g = game();
        assert_eq!(g.bricks().len(), 40);
        assert_eq!(g.bricks_left(), 40);
        assert_eq!(g.lives(), 3);
        assert_eq!(g.paddle().y, HEIGHT - 40.0);
    }

    #[test]
    fn paddle_follows_pointer_and_stays_on_screen() {
        let mut g = game();
        swipe(&mut g, (100.0, 400.0), (200.0, 400.0));
        assert_eq!(g.paddle().x, 200.0 - PADDLE_WIDTH / 2.0);
        swipe(&mut g, (200.0, 400.0), (WIDTH + 100.0, 400.0));
        assert_eq!(g.paddle().x, WIDTH - PADDLE_WIDTH);
        swipe(&mut g, (200.0, 400.0), (-50.0, 400.0));
        assert_eq!(g.paddle().x, 0.0);
    }

    #[test]
    fn brick_hit_scores_and_bounces() {
        let mut g = game();
        let target = g.bricks()[36].rect;
        g.ball = Body::new(
            Vec2::new(target.center().x, target.bottom() + BALL_RADIUS + 2.0),
            Vec2::new(0.0, -3.0),
        );
        g.update();
        assert_eq!(g.score(), 10);
        assert_eq!(g.bricks_left(), 39);
        assert!(g.ball().vel.y > 0.0);
    }

    #[test]
    fn paddle_returns_the_ball() {
        let mut g = game();
        let paddle = *g.paddle();
        g.ball = Body::new(
            Vec2::new(paddle.center().x, paddle.y - BALL_RADIUS - 1.0),
            Vec2::new(0.0, 3.0),
        );
        let events = g.update();
        assert!(events.contains(&GameEvent::Sound(Sound::Click)));
        assert!(g.ball().vel.y < 0.0);
        assert_eq!(g.lives(), 3);
    }

    #[test]
    fn missed_ball_costs_a_life_then_the_game() {
        let mut g = game();
        for remaining in [2, 1] {
            g.ball = Body::new(Vec2::new(10.0, HEIGHT - 2.0), Vec2::new(0.0, 3.0));
            let events = g.update();
            assert!(!has_game_over(&events));
            assert_eq!(g.lives(), remaining);
            assert_eq!(g.ball().pos, Vec2::new(WIDTH / 2.0, HEIGHT - 60.0));
        }
        g.ball = Body::new(Vec2::new(10.0, HEIGHT - 2.0), Vec2::new(0.0, 3.0));
        let events = g.update();
        assert!(events.contains(&GameEvent::GameOver(Outcome::Lost)));
        assert!(g.is_terminal());
        assert!(run_ticks(&mut g, 10).is_empty(), "a finished game stays still");
    }

    #[test]
    fn cleared_wall_refills_faster() {
        let mut g = game();
        g.cheat("win");
        assert_eq!(g.bricks_left(), 0);
        let before = g.ball().vel;
        g.update();
        assert_eq!(g.bricks_left(), 40);
        assert!((g.ball().vel.x - before.x * 1.1).abs() < 1e-4);
        assert_eq!(g.score(), 0, "cheating does not award points");
    }
}
