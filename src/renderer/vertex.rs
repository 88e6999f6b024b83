//! Vertex and color types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::BrickColor;

/// Straight RGBA, each channel 0-1
pub type Color = [f32; 4];

/// Flat-shaded 2D vertex, laid out for direct upload to a vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Opaque color from a 0xRRGGBB literal
pub const fn rgb(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Same color at a different opacity
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// CSS `rgba(...)` string for canvas fill styles
pub fn css(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

/// Colors for game elements
pub mod colors {
    use super::{Color, rgb};

    /// Brick palette, indexed by `BrickColor`
    pub const PALETTE: [Color; 7] = [
        rgb(0xFF6B6B),
        rgb(0x4ECDC4),
        rgb(0x45B7D1),
        rgb(0xFFA07A),
        rgb(0x98D8C8),
        rgb(0xF7DC6F),
        rgb(0xBB8FCE),
    ];
    pub const PADDLE: Color = rgb(0xFF69B4);
    /// Alternate frame of the min-width flash
    pub const PADDLE_FLASH: Color = rgb(0xFFB6D9);
    pub const BALL: Color = rgb(0x000000);
    pub const BALL_HIGH_CONTRAST: Color = rgb(0xFFFFFF);
    pub const BRICK_OUTLINE: Color = rgb(0xFFFFFF);
    pub const BACKGROUND: Color = [0.0, 0.0, 0.0, 0.0];
    pub const BACKGROUND_HIGH_CONTRAST: Color = rgb(0x101018);
}

pub fn brick_color(color: BrickColor) -> Color {
    colors::PALETTE[color.0 as usize % colors::PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_unpacks_channels() {
        assert_eq!(rgb(0xFF0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgb(0x00FF00)[1], 1.0);
    }

    #[test]
    fn test_css_round_trips_palette() {
        assert_eq!(css(colors::PADDLE), "rgba(255, 105, 180, 1)");
        assert_eq!(css(with_alpha(colors::BALL, 0.5)), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn test_brick_color_wraps() {
        assert_eq!(brick_color(BrickColor(0)), colors::PALETTE[0]);
        assert_eq!(brick_color(BrickColor(8)), colors::PALETTE[1]);
    }

    #[test]
    fn test_vertex_is_pod() {
        let verts = [Vertex::new(1.0, 2.0, colors::BALL)];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 24);
    }
}
