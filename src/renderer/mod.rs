//! Rendering
//!
//! The game draws through the `Surface` trait: a canvas context in the
//! browser, a vertex batch for GPU backends and tests. `render` reads the
//! round and the particle field and never mutates either.

pub mod batch;
pub mod shapes;
pub mod vertex;

use glam::Vec2;

use crate::effects::ParticleField;
use crate::settings::Settings;
use crate::sim::GameState;

pub use batch::VertexBatch;
pub use vertex::{Color, Vertex, brick_color, colors, css, with_alpha};

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self::new(min.x, min.y, size.x, size.y)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }
}

/// Something the game can draw on
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> (f32, f32);
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color);
    /// Draw the backdrop image into `dest`; surfaces without one skip it
    fn draw_image(&mut self, _dest: Rect) {}
}

/// Load status of the backdrop image
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Backdrop {
    /// No image configured
    #[default]
    Disabled,
    Pending,
    /// Loaded, natural size in pixels
    Ready { width: f32, height: f32 },
    Failed,
}

impl Backdrop {
    /// Top-aligned, full playfield width, aspect preserved. `None` until
    /// the image has usable dimensions.
    pub fn dest_rect(&self, field_width: f32) -> Option<Rect> {
        match *self {
            Backdrop::Ready { width, height } if width > 0.0 && height > 0.0 => {
                Some(Rect::new(0.0, 0.0, field_width, field_width * height / width))
            }
            _ => None,
        }
    }
}

/// Paddle corner radius at reference scale
const PADDLE_CORNER: f32 = 8.0;

/// Draw one frame. `time` is seconds since start and only drives the
/// min-width flash.
pub fn render(
    state: &GameState,
    particles: &ParticleField,
    backdrop: &Backdrop,
    settings: &Settings,
    surface: &mut impl Surface,
    time: f64,
) {
    let background = if settings.high_contrast {
        colors::BACKGROUND_HIGH_CONTRAST
    } else {
        colors::BACKGROUND
    };
    surface.clear(background);

    if settings.background_image {
        if let Some(dest) = backdrop.dest_rect(state.width) {
            surface.draw_image(dest);
        }
    }

    let cell = state.layout.cell_size();
    for brick in state.bricks.iter().filter(|b| b.visible) {
        let rect = Rect::from_min_size(brick.pos, cell);
        surface.fill_rect(rect, brick_color(brick.color));
        surface.stroke_rect(rect, colors::BRICK_OUTLINE, 1.0);
    }

    let ball_color = if settings.high_contrast {
        colors::BALL_HIGH_CONTRAST
    } else {
        colors::BALL
    };
    surface.fill_circle(state.ball.pos, state.ball.radius, ball_color);

    let paddle = &state.paddle;
    let paddle_rect = Rect::new(paddle.pos.x, paddle.pos.y, paddle.width, paddle.height);
    surface.fill_rounded_rect(
        paddle_rect,
        PADDLE_CORNER * state.scale,
        paddle_color(paddle.at_min_width, settings, time),
    );
    if settings.high_contrast {
        surface.stroke_rect(paddle_rect, colors::BALL_HIGH_CONTRAST, 1.0);
    }

    for p in particles.iter() {
        let color = with_alpha(brick_color(p.color), p.life);
        surface.fill_circle(p.pos, p.size, color);
    }
}

/// Steady pink, or a pulse toward light pink while squeezed to the minimum
pub fn paddle_color(at_min_width: bool, settings: &Settings, time: f64) -> Color {
    if !at_min_width {
        return colors::PADDLE;
    }
    if !settings.effective_paddle_flash() {
        return colors::PADDLE_FLASH;
    }
    let t = (time * 10.0).sin().abs() as f32;
    let (a, b) = (colors::PADDLE, colors::PADDLE_FLASH);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        1.0,
    ]
}
