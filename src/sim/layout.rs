//! Brick grid layout
//!
//! The layout is derived once per round from the playfield size; only a
//! resize between frames rescales it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Brick, BrickColor, PALETTE_LEN};
use crate::config::{ColorPolicy, GridSpec};
use crate::consts::MAX_BRICKS;

/// Derived grid geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrickLayout {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub padding: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl BrickLayout {
    /// Compute the layout for a playfield. `scale` is playfield width over
    /// the reference width and only applies to fixed grids.
    pub fn from_spec(spec: &GridSpec, width: f32, height: f32, scale: f32) -> Self {
        match *spec {
            GridSpec::Fixed {
                rows,
                cols,
                width: cell_width,
                height: cell_height,
                padding,
                offset_x,
                offset_y,
            } => Self {
                rows,
                cols,
                cell_width: cell_width * scale,
                cell_height: cell_height * scale,
                padding: padding * scale,
                offset_x: offset_x * scale,
                offset_y: offset_y * scale,
            },
            GridSpec::Fill { cols, fill_ratio } => {
                let cell = width / cols as f32;
                // A tall, narrow playfield must not blow the brick budget
                let max_rows = (MAX_BRICKS / (cols as usize).max(1)).max(1) as f32;
                let rows = ((height * fill_ratio) / cell).floor().clamp(1.0, max_rows) as u32;
                Self {
                    rows,
                    cols,
                    cell_width: cell,
                    cell_height: cell,
                    padding: 0.0,
                    offset_x: 0.0,
                    offset_y: 0.0,
                }
            }
        }
    }

    /// Same grid (row and column counts) fitted to a new playfield size
    pub fn rescaled(&self, spec: &GridSpec, width: f32, height: f32, scale: f32) -> Self {
        let fresh = Self::from_spec(spec, width, height, scale);
        Self {
            rows: self.rows,
            cols: self.cols,
            ..fresh
        }
    }

    /// Number of cells in the grid
    pub fn len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-left corner of the brick at (row, col)
    pub fn origin(&self, row: u32, col: u32) -> Vec2 {
        Vec2::new(
            col as f32 * (self.cell_width + self.padding) + self.offset_x,
            row as f32 * (self.cell_height + self.padding) + self.offset_y,
        )
    }

    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(self.cell_width, self.cell_height)
    }
}

/// Lay out a full grid of visible bricks, row-major
pub fn build_bricks(layout: &BrickLayout, policy: ColorPolicy, rng: &mut Pcg32) -> Vec<Brick> {
    let mut bricks = Vec::with_capacity(layout.len());
    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let color = match policy {
                ColorPolicy::Random => BrickColor(rng.random_range(0..PALETTE_LEN)),
                ColorPolicy::ByRow => BrickColor((row % PALETTE_LEN as u32) as u8),
            };
            bricks.push(Brick {
                pos: layout.origin(row, col),
                row,
                col,
                visible: true,
                color,
            });
        }
    }
    bricks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_layout_reference_positions() {
        let layout = BrickLayout::from_spec(&GridSpec::default(), 800.0, 600.0, 1.0);
        assert_eq!(layout.len(), 45);
        assert_eq!(layout.origin(0, 0), Vec2::new(0.0, 60.0));
        // (80 + 10) * 8, (25 + 10) * 4 + 60
        assert_eq!(layout.origin(4, 8), Vec2::new(720.0, 200.0));
        // Nine columns tile the reference width exactly
        assert_eq!(layout.origin(0, 8).x + layout.cell_width, 800.0);
    }

    #[test]
    fn test_fixed_layout_scales_with_playfield() {
        let layout = BrickLayout::from_spec(&GridSpec::default(), 400.0, 300.0, 0.5);
        assert_eq!(layout.cell_width, 40.0);
        assert_eq!(layout.origin(1, 1), Vec2::new(45.0, 17.5 + 30.0));
    }

    #[test]
    fn test_fill_layout_tiles_width_exactly() {
        let spec = GridSpec::Fill {
            cols: 30,
            fill_ratio: 0.7,
        };
        let layout = BrickLayout::from_spec(&spec, 600.0, 500.0, 0.75);
        assert_eq!(layout.cell_width, 20.0);
        assert_eq!(layout.cell_height, 20.0);
        // floor(350 / 20)
        assert_eq!(layout.rows, 17);
        let last = layout.origin(0, 29);
        assert!((last.x + layout.cell_width - 600.0).abs() < 0.001);
    }

    #[test]
    fn test_fill_layout_keeps_at_least_one_row() {
        let spec = GridSpec::Fill {
            cols: 2,
            fill_ratio: 0.1,
        };
        let layout = BrickLayout::from_spec(&spec, 800.0, 400.0, 1.0);
        assert_eq!(layout.rows, 1);
    }

    #[test]
    fn test_fill_layout_caps_rows_on_tall_fields() {
        let spec = GridSpec::Fill {
            cols: 100,
            fill_ratio: 1.0,
        };
        let layout = BrickLayout::from_spec(&spec, 100.0, 1_000_000.0, 0.125);
        assert_eq!(layout.rows as usize, MAX_BRICKS / 100);
        assert_eq!(layout.len(), MAX_BRICKS);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_len_does_not_overflow_u32() {
        let layout = BrickLayout {
            rows: 70_000,
            cols: 70_000,
            ..BrickLayout::from_spec(&GridSpec::default(), 800.0, 600.0, 1.0)
        };
        assert_eq!(layout.len(), 4_900_000_000);
    }

    #[test]
    fn test_rescaled_keeps_grid_counts() {
        let spec = GridSpec::Fill {
            cols: 10,
            fill_ratio: 0.7,
        };
        let layout = BrickLayout::from_spec(&spec, 800.0, 600.0, 1.0);
        let resized = layout.rescaled(&spec, 400.0, 900.0, 0.5);
        assert_eq!(resized.rows, layout.rows);
        assert_eq!(resized.cell_width, 40.0);
    }

    #[test]
    fn test_build_bricks_by_row_colors() {
        let layout = BrickLayout::from_spec(&GridSpec::default(), 800.0, 600.0, 1.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let bricks = build_bricks(&layout, ColorPolicy::ByRow, &mut rng);
        assert_eq!(bricks.len(), 45);
        assert!(bricks.iter().all(|b| b.visible));
        assert!(bricks.iter().all(|b| b.color.0 as u32 == b.row));
        // Row-major order
        assert_eq!((bricks[9].row, bricks[9].col), (1, 0));
    }

    #[test]
    fn test_build_bricks_random_colors_are_seeded() {
        let layout = BrickLayout::from_spec(&GridSpec::default(), 800.0, 600.0, 1.0);
        let a = build_bricks(&layout, ColorPolicy::Random, &mut Pcg32::seed_from_u64(7));
        let b = build_bricks(&layout, ColorPolicy::Random, &mut Pcg32::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.iter().all(|brick| brick.color.0 < PALETTE_LEN));
    }
}
