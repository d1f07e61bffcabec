use super::*;
use crate::catalog::Category;
use crate::grid::GridMap;
use crate::index::{LayerSelection, TileIndex, TileType};
use crate::placement::Mutations;

/// 4x3 grid with ground tiles at (1,0), (1,2) and (2,2).
fn index() -> TileIndex {
    let mut ground = vec![0u32; 12];
    ground[1] = 1;
    ground[9] = 1;
    ground[10] = 1;
    let raw = serde_json::json!({
        "width": 4,
        "height": 3,
        "layers": [{ "name": "DirtTiles-05", "data": ground }]
    });
    TileIndex::build(&GridMap::from_json(&raw.to_string()).unwrap(), &LayerSelection::default()).unwrap()
}

fn catalog() -> Catalog {
    Catalog::from_json(
        r#"[
            { "objectId": "Bench", "sprite": "bench.png" },
            { "objectId": "Tree", "sprite": "tree.png", "bottomOffset": 400 },
            { "objectId": "Arch", "sprite": "arch.png", "rotationVariants": { "90": { "sprite": "arch_90.png" } } }
        ]"#,
    )
    .unwrap()
}

fn ground(local: u32) -> TileRef {
    TileRef::new(TileType::Ground, local)
}

#[test]
fn draw_order_sorts_by_row_then_offset() {
    assert!(draw_order(128.0, 0.0) < draw_order(384.0, 0.0));
    assert!(draw_order(128.0, 0.0) < draw_order(128.0, 400.0));
    assert!((draw_order(0.0, 5_000.0) - (1.0 + Z_TIE_BREAK_MAX)).abs() < 1e-9);
}

#[test]
fn draw_list_is_back_to_front() {
    let index = index();
    let catalog = catalog();
    let bounds = RenderBounds::compute(&index, 0).unwrap();
    let mut store = PlacementStore::new();
    store.place(&index, ground(2), "Bench", Category::Decor, Rotation::ZERO, Mutations::new());
    store.place(&index, ground(1), "Tree", Category::Decor, Rotation::ZERO, Mutations::new());
    store.place(&index, ground(0), "Bench", Category::Decor, Rotation::ZERO, Mutations::new());

    let items = draw_list(&store, &catalog, &bounds);
    let tiles: Vec<TileRef> = items.iter().map(|i| i.tile).collect();
    assert_eq!(tiles, vec![ground(0), ground(2), ground(1)]);
    assert_eq!(items[0].world, Point::new(128.0, 128.0));
}

#[test]
fn draw_list_applies_rotation_variant() {
    let index = index();
    let catalog = catalog();
    let bounds = RenderBounds::compute(&index, 0).unwrap();
    let mut store = PlacementStore::new();
    store.place(&index, ground(0), "Arch", Category::Decor, Rotation::from_degrees(90.0), Mutations::new());
    let items = draw_list(&store, &catalog, &bounds);
    assert_eq!(items[0].sprite, "arch_90.png");
    assert_eq!(items[0].angle, Rotation::ZERO);
}

#[test]
fn unknown_object_draws_nothing() {
    let index = index();
    let bounds = RenderBounds::compute(&index, 0).unwrap();
    let mut store = PlacementStore::new();
    store.place(&index, ground(0), "Ghost", Category::Decor, Rotation::ZERO, Mutations::new());
    assert!(draw_list(&store, &catalog(), &bounds).is_empty());
}
