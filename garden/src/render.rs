//! Render model: turns the placement store into an ordered draw list.
//!
//! No drawing happens here. A host walks the list bottom-first and blits each
//! sprite at its world position under the camera transform. Entries whose
//! object is missing from the catalog have no sprite and are left out.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::bounds::RenderBounds;
use crate::camera::Point;
use crate::catalog::Catalog;
use crate::consts::Z_TIE_BREAK_MAX;
use crate::index::TileRef;
use crate::placement::{PlacementStore, Rotation};

/// One sprite to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem<'a> {
    pub tile: TileRef,
    pub object_id: &'a str,
    pub sprite: &'a str,
    /// World-space tile center.
    pub world: Point,
    pub angle: Rotation,
    pub flip_h: bool,
    pub flip_v: bool,
    pub z: f64,
}

/// Draw-order key: lower rows first, sprite bottom offset breaking ties.
#[must_use]
pub fn draw_order(world_y: f64, bottom_offset: f64) -> f64 {
    let tie_breaker = (bottom_offset / 1000.0).min(Z_TIE_BREAK_MAX);
    (world_y * 10_000.0).floor() + 1.0 + tie_breaker
}

/// Every drawable entry, sorted back to front.
#[must_use]
pub fn draw_list<'a>(store: &'a PlacementStore, catalog: &'a Catalog, bounds: &RenderBounds) -> Vec<DrawItem<'a>> {
    let mut items: Vec<DrawItem<'a>> = store
        .iter()
        .filter_map(|entry| {
            let descriptor = catalog.get(&entry.object_id)?;
            let look = descriptor.appearance(entry.rotation);
            let world = bounds.grid_to_world(entry.grid_x, entry.grid_y);
            Some(DrawItem {
                tile: entry.tile,
                object_id: &entry.object_id,
                sprite: look.sprite,
                world,
                angle: look.angle,
                flip_h: look.flip_h,
                flip_v: look.flip_v,
                z: draw_order(world.y, descriptor.bottom_offset),
            })
        })
        .collect();
    items.sort_by(|a, b| a.z.total_cmp(&b.z).then(a.tile.cmp(&b.tile)));
    items
}
