use serde::{Deserialize, Serialize};

/// Viewport size used when the host does not supply one.
pub const DEFAULT_VIEWPORT: (f32, f32) = (375.0, 500.0);

/// RGBA drawing colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// From `0xRRGGBB`.
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BACKGROUND: Color = Color::hex(0x2c3e50);
    pub const PANEL: Color = Color::hex(0x34495e);
    pub const RED: Color = Color::hex(0xe74c3c);
    pub const BLUE: Color = Color::hex(0x3498db);
    pub const GREEN: Color = Color::hex(0x2ecc71);
    pub const ORANGE: Color = Color::hex(0xf39c12);
    pub const PURPLE: Color = Color::hex(0x9b59b6);
    pub const TEAL: Color = Color::hex(0x1abc9c);
    pub const YELLOW: Color = Color::hex(0xf1c40f);
    pub const GREY: Color = Color::hex(0x95a5a6);
    pub const SHADE: Color = Color::rgba(0, 0, 0, 179);

    /// Tile colours shared by the colour-matching games.
    pub const PALETTE: &[Color] = &[
        Color::RED,
        Color::BLUE,
        Color::GREEN,
        Color::ORANGE,
        Color::PURPLE,
        Color::TEAL,
        Color::YELLOW,
        Color::hex(0xe67e22),
    ];

    /// `PALETTE` entry for `index`, wrapping around.
    pub fn palette(index: usize) -> Color {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

/// Drawing target supplied by the host. Fixed size for its whole lifetime.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);
    /// Text centred on `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear,
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Color,
    },
}

/// A [`Surface`] that records calls instead of rasterizing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// All text drawn since the last clear, in call order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

impl Surface for DrawList {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            cx,
            cy,
            radius,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
        });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}

/// Clear to the shared background colour.
pub fn clear_background(surface: &mut dyn Surface) {
    surface.clear();
    let (w, h) = (surface.width(), surface.height());
    surface.fill_rect(0.0, 0.0, w, h, Color::BACKGROUND);
}

/// Dim the whole surface and print a centred title with an optional subtitle.
pub fn overlay_banner(surface: &mut dyn Surface, title: &str, subtitle: Option<&str>) {
    let (w, h) = (surface.width(), surface.height());
    surface.fill_rect(0.0, 0.0, w, h, Color::SHADE);
    surface.fill_text(title, w / 2.0, h / 2.0 - 10.0, 28.0, Color::WHITE);
    if let Some(sub) = subtitle {
        surface.fill_text(sub, w / 2.0, h / 2.0 + 25.0, 16.0, Color::WHITE);
    }
}
