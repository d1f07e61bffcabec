use serde_json::json;

use super::*;
use crate::grid::GridMap;
use crate::index::{LayerSelection, TileRef};

// =============================================================
// Helpers
// =============================================================

/// 10x5 grid: ground tiles at globals 42 and 43, elevated at 7.
fn index() -> TileIndex {
    let mut ground = vec![0u32; 50];
    let mut elevated = vec![0u32; 50];
    ground[42] = 1;
    ground[43] = 1;
    elevated[7] = 1;
    let raw = json!({
        "width": 10,
        "height": 5,
        "layers": [
            { "name": "DirtTiles-05", "data": ground },
            { "name": "BoardwalkTiles-05", "data": elevated },
        ]
    });
    TileIndex::build(&GridMap::from_json(&raw.to_string()).unwrap(), &LayerSelection::default()).unwrap()
}

fn catalog() -> Catalog {
    Catalog::from_json(
        r#"[
            { "objectId": "Bench", "category": "decor" },
            { "objectId": "sprite/plant/Carrot" },
            { "objectId": "sprite/tallplant/Sunflower" },
            { "objectId": "MysteryEgg", "category": "egg" }
        ]"#,
    )
    .unwrap()
}

fn ground(local: u32) -> TileRef {
    TileRef::new(TileType::Ground, local)
}

fn elevated(local: u32) -> TileRef {
    TileRef::new(TileType::Elevated, local)
}

fn bench_store(index: &TileIndex) -> PlacementStore {
    let mut store = PlacementStore::new();
    store.place(index, ground(0), "Bench", Category::Decor, Rotation::ZERO, Mutations::new());
    store
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_single_decor_matches_schema() {
    let index = index();
    let payload = export(&bench_store(&index), &index, 0);
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "tileObjects": { "42": { "objectType": "decor", "objectId": "Bench", "rotation": 0 } },
            "boardwalkTileObjects": {}
        })
    );
}

#[test]
fn export_elevated_goes_to_boardwalk_group() {
    let index = index();
    let mut store = PlacementStore::new();
    store.place(&index, elevated(0), "Bench", Category::Decor, Rotation::from_degrees(270.0), Mutations::new());
    let payload = export(&store, &index, 0);
    assert!(payload.tile_objects.is_empty());
    assert_eq!(
        payload.boardwalk_tile_objects.get("7"),
        Some(&ObjectRecord::Decor(DecorRecord { object_id: "Bench".into(), rotation: Rotation::from_degrees(270.0) }))
    );
}

#[test]
fn export_plant_uses_growth_slot_shape() {
    let index = index();
    let mut store = PlacementStore::new();
    let tags: Mutations = ["Gold", "Wet"].into_iter().collect();
    store.place(&index, ground(1), "sprite/plant/Carrot", Category::Plant, Rotation::ZERO, tags);
    let value = serde_json::to_value(export(&store, &index, 1_000)).unwrap();
    assert_eq!(
        value["tileObjects"]["43"],
        json!({
            "objectType": "plant",
            "species": "sprite/plant/Carrot",
            "slots": [{
                "species": "sprite/plant/Carrot",
                "startTime": 1_000,
                "endTime": 61_000,
                "targetScale": 1.0,
                "mutations": ["Gold", "Wet"]
            }],
            "plantedAt": 1_000,
            "maturedAt": 1_000
        })
    );
}

#[test]
fn export_empty_store_has_both_groups() {
    let index = index();
    let payload = export(&PlacementStore::new(), &index, 0);
    assert!(payload.is_empty());
    let text = serde_json::to_string(&payload).unwrap();
    assert_eq!(text, r#"{"tileObjects":{},"boardwalkTileObjects":{}}"#);
}

// =============================================================
// Round trip
// =============================================================

#[test]
fn export_then_import_reproduces_store() {
    let index = index();
    let catalog = catalog();
    let mut store = PlacementStore::new();
    store.place(&index, ground(0), "Bench", Category::Decor, Rotation::from_degrees(90.0), Mutations::new());
    store.place(
        &index,
        ground(1),
        "sprite/tallplant/Sunflower",
        Category::TallPlant,
        Rotation::ZERO,
        ["Rainbow"].into_iter().collect(),
    );
    store.place(&index, elevated(0), "sprite/pet/Bunny", Category::Other, Rotation::from_degrees(180.0), Mutations::new());

    let raw = export_json(&store, &index, 5).unwrap();
    let (imported, report) = import(&raw, &index, &catalog).unwrap();
    assert_eq!(imported, store);
    assert_eq!(report, ImportReport { format: ImportFormat::LayoutExport, applied: 3, skipped: 0 });
}

// =============================================================
// Import: game save
// =============================================================

#[test]
fn import_game_save_reads_nested_groups() {
    let index = index();
    let raw = json!({
        "version": 3,
        "garden": {
            "tileObjects": {
                "42": {
                    "objectType": "plant",
                    "species": "sprite/plant/Carrot",
                    "slots": [{ "mutations": ["Wet"] }, { "mutations": ["Gold"] }],
                    "plantedAt": 17
                }
            },
            "boardwalkTileObjects": {
                "7": { "objectType": "decor", "decorId": "Bench", "rotation": 90 }
            }
        }
    });
    let (store, report) = import(&raw.to_string(), &index, &catalog()).unwrap();
    assert_eq!(report.format, ImportFormat::GameSave);
    assert_eq!(report.applied, 2);

    let carrot = store.get(ground(0)).unwrap();
    assert_eq!(carrot.category, Category::Plant);
    assert_eq!(carrot.mutations.as_slice(), &["Gold".to_owned()]);
    let bench = store.get(elevated(0)).unwrap();
    assert_eq!(bench.object_id, "Bench");
    assert_eq!(bench.rotation.degrees(), 90);
}

#[test]
fn import_egg_reads_egg_id() {
    let index = index();
    let raw = r#"{"tileObjects":{"43":{"objectType":"egg","eggId":"MysteryEgg"}}}"#;
    let (store, report) = import(raw, &index, &catalog()).unwrap();
    assert_eq!(report.applied, 1);
    let egg = store.get(ground(1)).unwrap();
    assert_eq!(egg.object_id, "MysteryEgg");
    assert_eq!(egg.category, Category::Egg);
}

#[test]
fn import_egg_keeps_last_slot_mutations() {
    let index = index();
    let raw = r#"{"tileObjects":{"43":{"objectType":"egg","eggId":"MysteryEgg","slots":[{"mutations":["Gold"]}]}}}"#;
    let (store, _) = import(raw, &index, &catalog()).unwrap();
    let egg = store.get(ground(1)).unwrap();
    assert_eq!(egg.mutations.as_slice(), &["Gold".to_owned()]);
    assert_eq!(egg.rotation, Rotation::ZERO);
}

#[test]
fn egg_exports_as_egg_record_and_round_trips() {
    let index = index();
    let mut store = PlacementStore::new();
    store.place(&index, ground(1), "MysteryEgg", Category::Egg, Rotation::ZERO, ["Gold", "Wet"].into_iter().collect());

    let value = serde_json::to_value(export(&store, &index, 7)).unwrap();
    let record = &value["tileObjects"]["43"];
    assert_eq!(record["objectType"], "egg");
    assert_eq!(record["eggId"], "MysteryEgg");
    assert_eq!(record["slots"][0]["mutations"], json!(["Gold", "Wet"]));

    let (imported, _) = import(&value.to_string(), &index, &catalog()).unwrap();
    assert_eq!(imported, store);
}

#[test]
fn import_plant_without_slots_has_no_mutations() {
    let index = index();
    let raw = r#"{"tileObjects":{"42":{"objectType":"tallplant","species":"sprite/tallplant/Sunflower","slots":null}}}"#;
    let (store, _) = import(raw, &index, &catalog()).unwrap();
    let plant = store.get(ground(0)).unwrap();
    assert_eq!(plant.category, Category::TallPlant);
    assert!(plant.mutations.is_empty());
}

#[test]
fn import_detects_version_only_as_game_save() {
    assert_eq!(detect_format(&json!({ "version": 1, "tileObjects": {} })), ImportFormat::GameSave);
    assert_eq!(detect_format(&json!({ "tileObjects": {} })), ImportFormat::LayoutExport);
}

// =============================================================
// Import: skipped entries
// =============================================================

#[test]
fn import_skips_unresolvable_entries() {
    let index = index();
    let raw = json!({
        "tileObjects": {
            "42": { "objectType": "decor", "objectId": "Bench", "rotation": 0 },
            "abc": { "objectType": "decor", "objectId": "Bench" },
            "3": { "objectType": "decor", "objectId": "Bench" },
            "7": { "objectType": "decor", "objectId": "Bench" },
            "43": { "objectType": "statue", "objectId": "Bench" }
        },
        "boardwalkTileObjects": { "7": null }
    });
    let (store, report) = import(&raw.to_string(), &index, &catalog()).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped, 5);
}

#[test]
fn import_skips_plant_without_species() {
    let index = index();
    let raw = r#"{"tileObjects":{"42":{"objectType":"plant","slots":[]}}}"#;
    let (store, report) = import(raw, &index, &catalog()).unwrap();
    assert!(store.is_empty());
    assert_eq!(report.skipped, 1);
}

#[test]
fn import_accepts_single_group() {
    let index = index();
    let raw = r#"{"boardwalkTileObjects":{"7":{"objectType":"decor","objectId":"Bench"}}}"#;
    let (store, _) = import(raw, &index, &catalog()).unwrap();
    assert_eq!(store.get(elevated(0)).unwrap().rotation, Rotation::ZERO);
}

// =============================================================
// Import: rejected payloads
// =============================================================

#[test]
fn import_rejects_invalid_json() {
    let index = index();
    assert!(matches!(import("{not json", &index, &catalog()), Err(ImportError::InvalidJson(_))));
}

#[test]
fn import_rejects_missing_groups() {
    let index = index();
    for raw in [r#"{"foo":1}"#, "[]", "42", r#"{"garden":{}}"#, r#"{"tileObjects":null}"#] {
        assert!(matches!(import(raw, &index, &catalog()), Err(ImportError::MissingGroups)), "{raw}");
    }
}
