use super::*;
use crate::grid::GridMap;
use crate::index::{LayerSelection, TileType};

/// 10x5 grid: ground at (2,4), elevated at (7,0). Render area is columns 2..=7.
fn fixture() -> (TileIndex, RenderBounds) {
    let mut ground = vec![0u32; 50];
    let mut elevated = vec![0u32; 50];
    ground[42] = 1;
    elevated[7] = 1;
    let raw = serde_json::json!({
        "width": 10,
        "height": 5,
        "layers": [
            { "name": "DirtTiles-05", "data": ground },
            { "name": "BoardwalkTiles-05", "data": elevated },
        ]
    });
    let index = TileIndex::build(&GridMap::from_json(&raw.to_string()).unwrap(), &LayerSelection::default()).unwrap();
    let bounds = RenderBounds::compute(&index, 0).unwrap();
    (index, bounds)
}

/// One tile fills a 256px viewport at scale 1, looking at `world`.
fn camera_at(bounds: &RenderBounds, world: Point) -> Camera {
    let mut cam = Camera::new(bounds.map_width(), bounds.map_height());
    cam.set_viewport(256.0, 256.0);
    cam.focus(world, 256.0);
    cam
}

#[test]
fn hits_tile_under_viewport_center() {
    let (index, bounds) = fixture();
    let cam = camera_at(&bounds, bounds.grid_to_world(2, 4));
    assert_eq!(tile_at(Point::new(128.0, 128.0), &cam, &bounds, &index), Some(TileRef::new(TileType::Ground, 0)));
    assert_eq!(tile_at(Point::new(3.0, 250.0), &cam, &bounds, &index), Some(TileRef::new(TileType::Ground, 0)));
}

#[test]
fn empty_cell_is_not_a_hit() {
    let (index, bounds) = fixture();
    let cam = camera_at(&bounds, bounds.grid_to_world(2, 4));
    assert_eq!(cell_at(Point::new(300.0, 128.0), &cam, &bounds), (3, 4));
    assert_eq!(tile_at(Point::new(300.0, 128.0), &cam, &bounds, &index), None);
}

#[test]
fn hits_elevated_tile() {
    let (index, bounds) = fixture();
    let cam = camera_at(&bounds, bounds.grid_to_world(7, 0));
    assert_eq!(tile_at(Point::new(128.0, 128.0), &cam, &bounds, &index), Some(TileRef::new(TileType::Elevated, 0)));
}

#[test]
fn off_grid_point_is_not_a_hit() {
    let (index, bounds) = fixture();
    let cam = camera_at(&bounds, bounds.grid_to_world(2, 4));
    assert_eq!(tile_at(Point::new(128.0, 5000.0), &cam, &bounds, &index), None);
}
