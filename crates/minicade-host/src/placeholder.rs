use minicade_core::game_trait::{GameEvent, GameInstance, GameMetadata, GameSnapshot, ScoreListener};
use minicade_core::surface::{Color, Surface};

pub const MESSAGE: &str = "Under construction";

/// Stand-in for catalog entries that have no implementation yet.
/// Draws a notice and ignores everything else.
pub struct UnderConstruction {
    title: String,
}

impl UnderConstruction {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

impl GameInstance for UnderConstruction {
    fn metadata(&self) -> GameMetadata {
        GameMetadata::new(&self.title, MESSAGE)
    }

    fn init(&mut self) {}

    fn draw(&self, surface: &mut dyn Surface) {
        let (w, h) = (surface.width(), surface.height());
        surface.clear();
        surface.fill_rect(0.0, 0.0, w, h, Color::hex(0x1a1a2e));
        surface.fill_text(MESSAGE, w / 2.0, h / 2.0, 20.0, Color::WHITE);
        surface.fill_text(&self.title, w / 2.0, h / 2.0 + 30.0, 14.0, Color::GREY);
    }

    fn cheat(&mut self, _action: &str) -> Vec<GameEvent> {
        Vec::new()
    }

    fn get_state(&self) -> GameSnapshot {
        GameSnapshot::new(0)
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn score(&self) -> u32 {
        0
    }

    fn set_score_listener(&mut self, _listener: ScoreListener) {}
}
