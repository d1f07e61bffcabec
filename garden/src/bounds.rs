//! Visible and pannable area derived from the addressable tiles.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use crate::camera::Point;
use crate::consts::TILE_WORLD_SIZE;
use crate::index::{TileIndex, TileType};

/// Inclusive rectangle in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl GridRect {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// The render area (garden box plus margin, clamped to the grid) and the
/// tight garden box. World space has its origin at the render area's
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderBounds {
    pub render: GridRect,
    pub garden: GridRect,
}

impl RenderBounds {
    /// Compute bounds over every addressable tile of both types.
    ///
    /// Returns `None` when the index is empty.
    #[must_use]
    pub fn compute(index: &TileIndex, margin: u32) -> Option<Self> {
        let width = index.width();
        let mut garden: Option<GridRect> = None;
        for tile_type in TileType::ALL {
            for global in index.globals(tile_type) {
                let (x, y) = global.decode(width);
                garden = Some(match garden {
                    None => GridRect { min_x: x, min_y: y, max_x: x, max_y: y },
                    Some(r) => GridRect {
                        min_x: r.min_x.min(x),
                        min_y: r.min_y.min(y),
                        max_x: r.max_x.max(x),
                        max_y: r.max_y.max(y),
                    },
                });
            }
        }
        let garden = garden?;
        let render = GridRect {
            min_x: garden.min_x.saturating_sub(margin),
            min_y: garden.min_y.saturating_sub(margin),
            max_x: garden.max_x.saturating_add(margin).min(width - 1),
            max_y: garden.max_y.saturating_add(margin).min(index.height() - 1),
        };
        Some(Self { render, garden })
    }

    /// Width of the render area in world pixels.
    #[must_use]
    pub fn map_width(&self) -> f64 {
        f64::from(self.render.width()) * TILE_WORLD_SIZE
    }

    /// Height of the render area in world pixels.
    #[must_use]
    pub fn map_height(&self) -> f64 {
        f64::from(self.render.height()) * TILE_WORLD_SIZE
    }

    /// World-space center of a grid cell.
    #[must_use]
    pub fn grid_to_world(&self, grid_x: u32, grid_y: u32) -> Point {
        Point::new(
            (f64::from(grid_x) - f64::from(self.render.min_x)) * TILE_WORLD_SIZE + TILE_WORLD_SIZE / 2.0,
            (f64::from(grid_y) - f64::from(self.render.min_y)) * TILE_WORLD_SIZE + TILE_WORLD_SIZE / 2.0,
        )
    }

    /// Grid cell containing a world-space point. May lie outside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn world_to_grid(&self, world: Point) -> (i64, i64) {
        (
            (world.x / TILE_WORLD_SIZE).floor() as i64 + i64::from(self.render.min_x),
            (world.y / TILE_WORLD_SIZE).floor() as i64 + i64::from(self.render.min_y),
        )
    }

    /// World-space center of the tight garden box, used by the focus action.
    #[must_use]
    pub fn garden_center(&self) -> Point {
        let g = self.garden;
        let r = self.render;
        Point::new(
            ((f64::from(g.min_x) + f64::from(g.max_x) + 1.0) / 2.0 - f64::from(r.min_x)) * TILE_WORLD_SIZE,
            ((f64::from(g.min_y) + f64::from(g.max_y) + 1.0) / 2.0 - f64::from(r.min_y)) * TILE_WORLD_SIZE,
        )
    }
}
