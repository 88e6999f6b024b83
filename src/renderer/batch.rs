//! Vertex batch surface
//!
//! Collects every draw call as triangles in playfield pixels, ready to be
//! cast with `bytemuck` into a vertex buffer.

use glam::Vec2;

use super::shapes;
use super::vertex::{Color, Vertex};
use super::{Rect, Surface};

/// Triangles per full circle
const CIRCLE_SEGMENTS: u32 = 24;
/// Triangles per rounded corner
const CORNER_SEGMENTS: u32 = 4;

#[derive(Debug, Clone)]
pub struct VertexBatch {
    width: f32,
    height: f32,
    clear_color: Color,
    vertices: Vec<Vertex>,
    /// Backdrop placement from the last frame, if one was drawn
    image: Option<Rect>,
}

impl VertexBatch {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            clear_color: [0.0; 4],
            vertices: Vec::new(),
            image: None,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Raw bytes for a vertex buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn image(&self) -> Option<Rect> {
        self.image
    }
}

impl Surface for VertexBatch {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
        self.image = None;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.vertices.extend(shapes::quad(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.vertices.extend(shapes::outline(rect, line_width, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.vertices
            .extend(shapes::circle(center, radius, color, CIRCLE_SEGMENTS));
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.vertices
            .extend(shapes::rounded_rect(rect, radius, color, CORNER_SEGMENTS));
    }

    fn draw_image(&mut self, dest: Rect) {
        self.image = Some(dest);
    }
}
