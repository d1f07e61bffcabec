//! Screen-space hit testing against the addressable tiles.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::bounds::RenderBounds;
use crate::camera::{Camera, Point};
use crate::index::{TileIndex, TileRef};

/// Grid cell under a screen point. May lie outside the grid.
#[must_use]
pub fn cell_at(screen: Point, camera: &Camera, bounds: &RenderBounds) -> (i64, i64) {
    bounds.world_to_grid(camera.screen_to_world(screen))
}

/// The addressable tile under a screen point, if any.
#[must_use]
pub fn tile_at(screen: Point, camera: &Camera, bounds: &RenderBounds, index: &TileIndex) -> Option<TileRef> {
    let (grid_x, grid_y) = cell_at(screen, camera, bounds);
    index.hit(grid_x, grid_y)
}
