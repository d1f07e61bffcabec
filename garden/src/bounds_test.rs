#![allow(clippy::float_cmp)]

use super::*;
use crate::grid::GridMap;
use crate::index::LayerSelection;

fn index_with_ground(width: u32, height: u32, cells: &[usize]) -> TileIndex {
    let mut data = vec![0u32; (width * height) as usize];
    for &c in cells {
        data[c] = 1;
    }
    let raw = serde_json::json!({
        "width": width,
        "height": height,
        "layers": [{ "name": "DirtTiles-05", "data": data }]
    });
    let map = GridMap::from_json(&raw.to_string()).unwrap();
    TileIndex::build(&map, &LayerSelection::default()).unwrap()
}

#[test]
fn compute_expands_by_margin() {
    // 30x30 grid, garden at (10,10)..(12,11).
    let index = index_with_ground(30, 30, &[310, 312, 341]);
    let b = RenderBounds::compute(&index, 6).unwrap();
    assert_eq!(b.garden, GridRect { min_x: 10, min_y: 10, max_x: 12, max_y: 11 });
    assert_eq!(b.render, GridRect { min_x: 4, min_y: 4, max_x: 18, max_y: 17 });
}

#[test]
fn compute_clamps_to_grid_extents() {
    // 8x8 grid, garden at (1,1) and (7,6).
    let index = index_with_ground(8, 8, &[9, 55]);
    let b = RenderBounds::compute(&index, 6).unwrap();
    assert_eq!(b.render, GridRect { min_x: 0, min_y: 0, max_x: 7, max_y: 7 });
    assert_eq!(b.garden, GridRect { min_x: 1, min_y: 1, max_x: 7, max_y: 6 });
}

#[test]
fn map_dimensions_in_world_pixels() {
    let index = index_with_ground(8, 8, &[9, 55]);
    let b = RenderBounds::compute(&index, 6).unwrap();
    assert_eq!(b.map_width(), 8.0 * 256.0);
    assert_eq!(b.map_height(), 8.0 * 256.0);
}

#[test]
fn grid_world_round_trip_lands_in_same_cell() {
    let index = index_with_ground(30, 30, &[310, 312, 341]);
    let b = RenderBounds::compute(&index, 6).unwrap();
    let world = b.grid_to_world(11, 10);
    assert_eq!(world, Point::new(7.0 * 256.0 + 128.0, 6.0 * 256.0 + 128.0));
    assert_eq!(b.world_to_grid(world), (11, 10));
}

#[test]
fn world_to_grid_floors_negative_coordinates() {
    let index = index_with_ground(30, 30, &[310]);
    let b = RenderBounds::compute(&index, 6).unwrap();
    assert_eq!(b.world_to_grid(Point::new(-1.0, -300.0)), (3, 2));
}

#[test]
fn garden_center_is_middle_of_tight_box() {
    let index = index_with_ground(30, 30, &[310, 312, 341]);
    let b = RenderBounds::compute(&index, 6).unwrap();
    // Garden spans x 10..=12 (center 11.5), y 10..=11 (center 11.0); render origin (4,4).
    assert_eq!(b.garden_center(), Point::new(7.5 * 256.0, 7.0 * 256.0));
}
