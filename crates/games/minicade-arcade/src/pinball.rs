use std::time::Duration;

use minicade_core::audio::Sound;
use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, Outcome, ScoreKeeper};
use minicade_core::impl_score_keeping;
use minicade_core::input::PointerEvent;
use minicade_core::physics::{Body, Circle, Rect, Vec2, Walls, circle_overlap, reflect_in_bounds};
use minicade_core::surface::{Color, Surface, overlay_banner};

use crate::config::{ArcadeConfig, PinballConfig};

pub const BALL_RADIUS: f32 = 8.0;
pub const PADDLE_WIDTH: f32 = 80.0;
pub const PADDLE_HEIGHT: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bumper {
    pub shape: Circle,
    pub points: u32,
}

/// Keep the ball alive under gravity and bounce it off the bumpers.
pub struct Pinball {
    config: PinballConfig,
    bounds: Rect,
    ball: Body,
    paddle: Rect,
    bumpers: Vec<Bumper>,
    over: bool,
    score: ScoreKeeper,
}

impl Pinball {
    /// Tunables come from [`ArcadeConfig::load`].
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, ArcadeConfig::load().pinball)
    }

    /// Pinball has no randomness; the seed is accepted for a uniform constructor set.
    pub fn with_seed(width: f32, height: f32, _seed: u64) -> Self {
        Self::with_config(width, height, PinballConfig::default())
    }

    pub fn with_config(width: f32, height: f32, config: PinballConfig) -> Self {
        let mut game = Self {
            config,
            bounds: Rect::new(0.0, 0.0, width, height),
            ball: Body::default(),
            paddle: Rect::new(0.0, 0.0, PADDLE_WIDTH, PADDLE_HEIGHT),
            bumpers: Vec::new(),
            over: false,
            score: ScoreKeeper::default(),
        };
        game.init();
        game
    }

    pub fn ball(&self) -> &Body {
        &self.ball
    }

    pub fn paddle(&self) -> &Rect {
        &self.paddle
    }

    pub fn bumpers(&self) -> &[Bumper] {
        &self.bumpers
    }

    pub fn gravity(&self) -> f32 {
        self.ball.acc.y
    }

    fn move_paddle(&mut self, event: &PointerEvent) {
        if !event.is_finite() {
            return;
        }
        let max_x = (self.bounds.w - self.paddle.w).max(0.0);
        self.paddle.x = (event.x - self.paddle.w / 2.0).clamp(0.0, max_x);
    }

    /// Flip the ball upwards, steering it by where it struck the paddle.
    fn hit_paddle(&mut self) -> bool {
        let ball = &mut self.ball;
        let paddle = &self.paddle;
        let over_paddle = ball.pos.x > paddle.x && ball.pos.x < paddle.right();
        let touching = ball.pos.y + BALL_RADIUS > paddle.y && ball.pos.y - BALL_RADIUS < paddle.bottom();
        if !over_paddle || !touching || ball.vel.y <= 0.0 {
            return false;
        }
        let offset = (ball.pos.x - paddle.x) / paddle.w - 0.5;
        ball.vel.y = -(ball.vel.y * 0.9).abs() - 2.0;
        ball.vel.x += offset * 4.0;
        ball.pos.y = paddle.y - BALL_RADIUS;
        true
    }

    /// Points scored from bumpers the ball touches this tick.
    fn hit_bumpers(&mut self) -> u32 {
        let mut points = 0;
        for bumper in &self.bumpers {
            let ball = Circle::new(self.ball.pos, BALL_RADIUS);
            if !circle_overlap(&ball, &bumper.shape) {
                continue;
            }
            let mut away = (self.ball.pos - bumper.shape.center).normalized();
            if away == Vec2::ZERO {
                away = Vec2::new(0.0, -1.0);
            }
            self.ball.vel = away * self.config.bumper_kick;
            self.ball.pos = bumper.shape.center + away * (bumper.shape.radius + BALL_RADIUS);
            points += bumper.points;
        }
        points
    }
}

impl GameInstance for Pinball {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("Pinball", "Keep the ball up with the paddle and score off the bumpers.")
    }

    fn init(&mut self) {
        let Rect { w, h, .. } = self.bounds;
        self.ball = Body::new(Vec2::new(w / 2.0, 50.0), Vec2::new(2.0, -2.0))
            .with_acceleration(Vec2::new(0.0, self.config.gravity));
        self.paddle.x = w / 2.0 - PADDLE_WIDTH / 2.0;
        self.paddle.y = h - 30.0;
        self.bumpers = vec![
            Bumper {
                shape: Circle::new(Vec2::new(w * 0.3, h * 0.4), 20.0),
                points: 10,
            },
            Bumper {
                shape: Circle::new(Vec2::new(w * 0.7, h * 0.4), 20.0),
                points: 10,
            },
            Bumper {
                shape: Circle::new(Vec2::new(w / 2.0, h * 0.6), 15.0),
                points: 20,
            },
        ];
        self.over = false;
        self.score.reset();
    }

    fn update(&mut self) -> Vec<GameEvent> {
        if self.over {
            return Vec::new();
        }
        let mut events = Vec::new();

        self.ball.integrate();
        let walls = reflect_in_bounds(
            &mut self.ball,
            BALL_RADIUS,
            &self.bounds,
            Walls::NO_FLOOR,
            self.config.wall_damping,
        );
        if self.ball.pos.y > self.bounds.bottom() + self.config.drain_margin {
            self.over = true;
            return vec![GameEvent::Sound(Sound::Fail), GameEvent::GameOver(Outcome::Lost)];
        }
        if walls.left || walls.right || walls.top {
            events.push(GameEvent::Sound(Sound::Click));
        }
        if self.hit_paddle() {
            events.push(GameEvent::Sound(Sound::Click));
        }
        let points = self.hit_bumpers();
        if points > 0 {
            self.score.add(points);
            events.push(GameEvent::Sound(Sound::Pop));
        }
        events
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        surface.fill_rect(0.0, 0.0, surface.width(), surface.height(), Color::hex(0x0f0f23));
        for bumper in &self.bumpers {
            let Circle { center, radius } = bumper.shape;
            let color = if bumper.points > 10 { Color::ORANGE } else { Color::PURPLE };
            surface.fill_circle(center.x, center.y, radius, color);
        }
        let Rect { x, y, w, h } = self.paddle;
        surface.fill_rect(x, y, w, h, Color::BLUE);
        surface.fill_circle(self.ball.pos.x, self.ball.pos.y, BALL_RADIUS, Color::WHITE);
        surface.fill_text(&format!("Score: {}", self.score.get()), surface.width() / 2.0, 25.0, 16.0, Color::WHITE);
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
        if action == "slow" {
            self.ball.acc.y /= 2.0;
        }
        Vec::new()
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(self.score.get())
            .with("ball", self.ball.pos)
            .with("velocity", self.ball.vel)
            .with("paddle_x", self.paddle.x)
    }

    fn tick_interval(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.config.tick_ms.max(1)))
    }

    impl_score_keeping!(terminal: over);
}
