//! Triangle tessellation for 2D primitives

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use super::Rect;
use super::vertex::{Color, Vertex};

fn push_quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: Color) {
    // a-b-c-d clockwise, two triangles
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));

    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(c.x, c.y, color));
    out.push(Vertex::new(d.x, d.y, color));
}

/// Filled axis-aligned rectangle
pub fn quad(rect: Rect, color: Color) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        rect.min(),
        Vec2::new(rect.x + rect.w, rect.y),
        rect.max(),
        Vec2::new(rect.x, rect.y + rect.h),
        color,
    );
    vertices
}

/// Rectangle border of `thickness`, drawn inside the rect
pub fn outline(rect: Rect, thickness: f32, color: Color) -> Vec<Vertex> {
    let t = thickness.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    let edges = [
        Rect::new(rect.x, rect.y, rect.w, t),
        Rect::new(rect.x, rect.y + rect.h - t, rect.w, t),
        Rect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t),
        Rect::new(rect.x + rect.w - t, rect.y + t, t, rect.h - 2.0 * t),
    ];
    edges.into_iter().flat_map(|edge| quad(edge, color)).collect()
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Rectangle with quarter-circle corners. The radius is clamped to half
/// the shorter side.
pub fn rounded_rect(rect: Rect, radius: f32, color: Color, corner_segments: u32) -> Vec<Vertex> {
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    if r <= 0.0 {
        return quad(rect, color);
    }

    // Center cross, then the four corner fans
    let mut vertices = quad(Rect::new(rect.x + r, rect.y, rect.w - 2.0 * r, rect.h), color);
    vertices.extend(quad(Rect::new(rect.x, rect.y + r, r, rect.h - 2.0 * r), color));
    vertices.extend(quad(
        Rect::new(rect.x + rect.w - r, rect.y + r, r, rect.h - 2.0 * r),
        color,
    ));

    let corners = [
        (Vec2::new(rect.x + rect.w - r, rect.y + rect.h - r), 0.0),
        (Vec2::new(rect.x + r, rect.y + rect.h - r), FRAC_PI_2),
        (Vec2::new(rect.x + r, rect.y + r), PI),
        (Vec2::new(rect.x + rect.w - r, rect.y + r), PI + FRAC_PI_2),
    ];
    let segments = corner_segments.max(1);
    for (center, start) in corners {
        for i in 0..segments {
            let a1 = start + (i as f32 / segments as f32) * FRAC_PI_2;
            let a2 = start + ((i + 1) as f32 / segments as f32) * FRAC_PI_2;
            vertices.push(Vertex::new(center.x, center.y, color));
            vertices.push(Vertex::new(center.x + r * a1.cos(), center.y + r * a1.sin(), color));
            vertices.push(Vertex::new(center.x + r * a2.cos(), center.y + r * a2.sin(), color));
        }
    }

    vertices
}
