//! Translation between the placement store and the persisted save schema.
//!
//! The persisted shape groups object records by tile type and keys them by
//! [`GlobalIndex`] rendered as a string:
//!
//! ```json
//! { "tileObjects": { "42": { "objectType": "decor", "objectId": "Bench", "rotation": 0 } },
//!   "boardwalkTileObjects": {} }
//! ```
//!
//! Export always produces this flat shape. Import also accepts the game's own
//! save, which nests the same two groups under `garden` next to a `version`
//! marker. There is no explicit format tag: a payload with neither `version`
//! nor `garden` is taken to be a flat export.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::{Catalog, Category};
use crate::consts::PLANT_GROWTH_MS;
use crate::grid::GlobalIndex;
use crate::index::{TileIndex, TileType};
use crate::placement::{Mutations, PlacementStore, Rotation};

/// Group holding ground-tile records.
pub const GROUND_GROUP: &str = "tileObjects";
/// Group holding elevated-tile records.
pub const ELEVATED_GROUP: &str = "boardwalkTileObjects";
const GARDEN_KEY: &str = "garden";
const VERSION_KEY: &str = "version";

/// Error returned by [`import`]. Either way the caller's store is untouched.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The payload is not JSON.
    #[error("invalid import JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// Neither object group is present.
    #[error("payload has neither `tileObjects` nor `boardwalkTileObjects`")]
    MissingGroups,
}

fn group_name(tile_type: TileType) -> &'static str {
    match tile_type {
        TileType::Ground => GROUND_GROUP,
        TileType::Elevated => ELEVATED_GROUP,
    }
}

// =============================================================================
// EXPORT SHAPE
// =============================================================================

/// A persisted object record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "objectType", rename_all = "lowercase")]
pub enum ObjectRecord {
    Decor(DecorRecord),
    Plant(PlantRecord),
    Egg(EggRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorRecord {
    pub object_id: String,
    pub rotation: Rotation,
}

/// Plant record with a single growth slot, matching the game's slot structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    pub species: String,
    pub slots: Vec<GrowthSlot>,
    pub planted_at: i64,
    pub matured_at: i64,
}

/// Egg record; same slot structure as a plant, keyed by `eggId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggRecord {
    pub egg_id: String,
    pub slots: Vec<GrowthSlot>,
    pub planted_at: i64,
    pub matured_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSlot {
    pub species: String,
    pub start_time: i64,
    pub end_time: i64,
    pub target_scale: f64,
    pub mutations: Mutations,
}

/// The flat export payload; also what autosave stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPayload {
    pub tile_objects: BTreeMap<String, ObjectRecord>,
    pub boardwalk_tile_objects: BTreeMap<String, ObjectRecord>,
}

impl LayoutPayload {
    fn group_mut(&mut self, tile_type: TileType) -> &mut BTreeMap<String, ObjectRecord> {
        match tile_type {
            TileType::Ground => &mut self.tile_objects,
            TileType::Elevated => &mut self.boardwalk_tile_objects,
        }
    }

    /// Total number of records across both groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tile_objects.len() + self.boardwalk_tile_objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the export payload. `now_ms` stamps the plant growth slots.
#[must_use]
pub fn export(store: &PlacementStore, index: &TileIndex, now_ms: i64) -> LayoutPayload {
    let mut payload = LayoutPayload::default();
    for entry in store.iter() {
        let Some(global) = index.global_of(entry.tile) else {
            debug!(tile = %entry.tile, "entry has no global index, not exported");
            continue;
        };
        let slots = || {
            vec![GrowthSlot {
                species: entry.object_id.clone(),
                start_time: now_ms,
                end_time: now_ms + PLANT_GROWTH_MS,
                target_scale: 1.0,
                mutations: entry.mutations.clone(),
            }]
        };
        let record = match entry.category {
            Category::Plant | Category::TallPlant => ObjectRecord::Plant(PlantRecord {
                species: entry.object_id.clone(),
                slots: slots(),
                planted_at: now_ms,
                matured_at: now_ms,
            }),
            Category::Egg => ObjectRecord::Egg(EggRecord {
                egg_id: entry.object_id.clone(),
                slots: slots(),
                planted_at: now_ms,
                matured_at: now_ms,
            }),
            Category::Decor | Category::Other => {
                ObjectRecord::Decor(DecorRecord { object_id: entry.object_id.clone(), rotation: entry.rotation })
            }
        };
        payload.group_mut(entry.tile.tile_type).insert(global.to_string(), record);
    }
    payload
}

/// Export as pretty-printed JSON, the format written to files.
///
/// # Errors
///
/// Returns the serializer error; the payload types cannot produce one in practice.
pub fn export_json(store: &PlacementStore, index: &TileIndex, now_ms: i64) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export(store, index, now_ms))
}

// =============================================================================
// IMPORT
// =============================================================================

/// Which schema an import payload was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// The game's save: groups under `garden`, with a `version` marker.
    GameSave,
    /// This tool's flat export.
    LayoutExport,
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub format: ImportFormat,
    pub applied: usize,
    pub skipped: usize,
}

/// Lenient incoming record: only the fields the layout needs, unknown fields ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "objectType", rename_all = "lowercase")]
enum IncomingRecord {
    Decor {
        #[serde(rename = "objectId", alias = "decorId")]
        object_id: String,
        #[serde(default)]
        rotation: Option<Rotation>,
    },
    Plant(IncomingPlant),
    TallPlant(IncomingPlant),
    Egg(IncomingPlant),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingPlant {
    #[serde(default)]
    species: Option<String>,
    #[serde(default)]
    egg_id: Option<String>,
    #[serde(default)]
    slots: Option<Vec<IncomingSlot>>,
}

#[derive(Debug, Deserialize)]
struct IncomingSlot {
    #[serde(default)]
    mutations: Option<Mutations>,
}

impl IncomingPlant {
    fn object_id(self, hint: Category) -> Option<(String, Category, Mutations)> {
        let id = self.species.or(self.egg_id)?;
        let mutations = self
            .slots
            .and_then(|slots| slots.into_iter().last())
            .and_then(|slot| slot.mutations)
            .unwrap_or_default();
        Some((id, hint, mutations))
    }
}

/// Parse `raw` into a fresh store. The caller swaps it in only on success,
/// so a rejected payload never disturbs the current layout.
///
/// Entries whose key is not an addressable global index of the group's tile
/// type, or whose record cannot be read, are skipped.
///
/// # Errors
///
/// Returns [`ImportError`] when the payload is not JSON or has no object groups.
pub fn import(raw: &str, index: &TileIndex, catalog: &Catalog) -> Result<(PlacementStore, ImportReport), ImportError> {
    let payload: Value = serde_json::from_str(raw)?;
    let format = detect_format(&payload);
    let garden = payload.get(GARDEN_KEY).unwrap_or(&payload);
    let groups: Vec<(TileType, &Map<String, Value>)> = TileType::ALL
        .into_iter()
        .filter_map(|t| garden.get(group_name(t)).and_then(Value::as_object).map(|g| (t, g)))
        .collect();
    if groups.is_empty() {
        return Err(ImportError::MissingGroups);
    }

    let mut store = PlacementStore::new();
    let mut report = ImportReport { format, applied: 0, skipped: 0 };
    for (tile_type, group) in groups {
        for (key, value) in group {
            if apply_entry(&mut store, index, catalog, tile_type, key, value) {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }
    }
    Ok((store, report))
}

/// Structural guess: the flat export carries neither marker.
#[must_use]
pub fn detect_format(payload: &Value) -> ImportFormat {
    if payload.get(VERSION_KEY).is_none() && payload.get(GARDEN_KEY).is_none() {
        ImportFormat::LayoutExport
    } else {
        ImportFormat::GameSave
    }
}

fn apply_entry(
    store: &mut PlacementStore,
    index: &TileIndex,
    catalog: &Catalog,
    tile_type: TileType,
    key: &str,
    value: &Value,
) -> bool {
    let Ok(raw_global) = key.parse::<u32>() else {
        debug!(key, "import key is not a global index");
        return false;
    };
    let global = GlobalIndex(raw_global);
    let Some(tile) = index.lookup(global) else {
        debug!(%global, "import entry not addressable in this grid");
        return false;
    };
    if tile.tile_type != tile_type {
        debug!(%global, group = group_name(tile_type), "import entry in the wrong group");
        return false;
    }
    if value.is_null() {
        return false;
    }
    let record = match IncomingRecord::deserialize(value) {
        Ok(record) => record,
        Err(e) => {
            debug!(%global, error = %e, "unreadable import record");
            return false;
        }
    };

    let resolved = match record {
        IncomingRecord::Decor { object_id, rotation } => {
            let hint = Category::infer(&object_id);
            Some((object_id, hint, Mutations::new(), rotation.unwrap_or_default()))
        }
        IncomingRecord::Plant(p) => p.object_id(Category::Plant).map(|(id, c, m)| (id, c, m, Rotation::ZERO)),
        IncomingRecord::TallPlant(p) => p.object_id(Category::TallPlant).map(|(id, c, m)| (id, c, m, Rotation::ZERO)),
        IncomingRecord::Egg(p) => p.object_id(Category::Egg).map(|(id, c, m)| (id, c, m, Rotation::ZERO)),
    };
    let Some((object_id, hint, mutations, rotation)) = resolved else {
        debug!(%global, "import record has no object id");
        return false;
    };
    if object_id.is_empty() {
        return false;
    }
    let category = catalog.get(&object_id).map_or(hint, |d| d.category);
    store.place(index, tile, &object_id, category, rotation, mutations).is_some()
}
