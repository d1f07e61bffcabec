//! Tile addressing: maps the sparse set of placeable cells to compact slots.
//!
//! Two layers of the grid (ground and elevated) decide which cells can hold
//! an object. Each present cell receives the next local index for its tile
//! type in row-major scan order, so rebuilding from an unchanged grid yields
//! identical indices. Local indices never leave the process; anything
//! persisted is addressed by [`GlobalIndex`].

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::DEFAULT_GARDEN_SLOT;
use crate::grid::{GlobalIndex, GridMap, TileCode};

/// Error returned by [`TileIndex::build`].
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Neither selected layer holds a single present cell.
    #[error("garden slot {slot:02} has no addressable tiles")]
    EmptyGarden { slot: u32 },
}

/// Which addressable layer a tile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    /// Soil tiles; persisted under `tileObjects`.
    Ground,
    /// Raised boardwalk tiles; persisted under `boardwalkTileObjects`.
    Elevated,
}

impl TileType {
    pub const ALL: [Self; 2] = [Self::Ground, Self::Elevated];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Elevated => "elevated",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Ground => 0,
            Self::Elevated => 1,
        }
    }
}

/// Identity of an addressable tile within one load.
///
/// Also serves as the placement key; its display form is `type:local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileRef {
    pub tile_type: TileType,
    pub local_index: u32,
}

impl TileRef {
    #[must_use]
    pub fn new(tile_type: TileType, local_index: u32) -> Self {
        Self { tile_type, local_index }
    }
}

impl std::fmt::Display for TileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tile_type.as_str(), self.local_index)
    }
}

/// Which grid layers are addressable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSelection {
    /// Class or name prefix of the ground layer.
    pub ground: String,
    /// Class or name prefix of the elevated layer.
    pub elevated: String,
    /// Garden slot; selects layers whose name ends in `-NN`.
    pub slot: u32,
}

impl Default for LayerSelection {
    fn default() -> Self {
        Self { ground: "DirtTiles".to_owned(), elevated: "BoardwalkTiles".to_owned(), slot: DEFAULT_GARDEN_SLOT }
    }
}

impl LayerSelection {
    fn selector(&self, tile_type: TileType) -> &str {
        match tile_type {
            TileType::Ground => &self.ground,
            TileType::Elevated => &self.elevated,
        }
    }
}

/// Bidirectional global ↔ local lookup tables. Immutable after [`TileIndex::build`].
#[derive(Debug, Clone)]
pub struct TileIndex {
    width: u32,
    height: u32,
    global_to_local: HashMap<GlobalIndex, TileRef>,
    local_to_global: [Vec<GlobalIndex>; 2],
}

impl TileIndex {
    /// Scan the selected layers and assign local indices in row-major order.
    ///
    /// A missing layer contributes no tiles. When both layers mark the same
    /// cell the ground layer wins, keeping the mapping a bijection.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyGarden`] when no cell is addressable.
    pub fn build(map: &GridMap, selection: &LayerSelection) -> Result<Self, IndexError> {
        let mut index = Self {
            width: map.width,
            height: map.height,
            global_to_local: HashMap::new(),
            local_to_global: [Vec::new(), Vec::new()],
        };

        for tile_type in TileType::ALL {
            let selector = selection.selector(tile_type);
            let Some(layer) = map.find_layer(selector, selection.slot) else {
                warn!(selector, slot = selection.slot, "addressable layer not found");
                continue;
            };
            let Some(data) = &layer.data else {
                continue;
            };
            for (cell, &raw) in data.iter().enumerate() {
                if !TileCode(raw).is_present() {
                    continue;
                }
                let Ok(cell) = u32::try_from(cell) else {
                    break;
                };
                let global = GlobalIndex(cell);
                if index.global_to_local.contains_key(&global) {
                    debug!(%global, layer = %layer.name, "cell already addressed by another layer");
                    continue;
                }
                let locals = &mut index.local_to_global[tile_type.slot()];
                let Ok(local_index) = u32::try_from(locals.len()) else {
                    break;
                };
                locals.push(global);
                index.global_to_local.insert(global, TileRef::new(tile_type, local_index));
            }
        }

        if index.global_to_local.is_empty() {
            return Err(IndexError::EmptyGarden { slot: selection.slot });
        }
        debug!(
            ground = index.count(TileType::Ground),
            elevated = index.count(TileType::Elevated),
            "tile index built"
        );
        Ok(index)
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The addressable tile at a global position, if any.
    #[must_use]
    pub fn lookup(&self, global: GlobalIndex) -> Option<TileRef> {
        self.global_to_local.get(&global).copied()
    }

    /// The global position of an addressable tile, if the reference is valid.
    #[must_use]
    pub fn global_of(&self, tile: TileRef) -> Option<GlobalIndex> {
        self.local_to_global[tile.tile_type.slot()]
            .get(tile.local_index as usize)
            .copied()
    }

    /// Grid coordinates of an addressable tile.
    #[must_use]
    pub fn coords_of(&self, tile: TileRef) -> Option<(u32, u32)> {
        self.global_of(tile).map(|g| g.decode(self.width))
    }

    /// The addressable tile at signed grid coordinates; `None` off-grid.
    #[must_use]
    pub fn hit(&self, grid_x: i64, grid_y: i64) -> Option<TileRef> {
        if grid_x < 0 || grid_y < 0 || grid_x >= i64::from(self.width) || grid_y >= i64::from(self.height) {
            return None;
        }
        let raw = u32::try_from(grid_y * i64::from(self.width) + grid_x);
        match raw {
            Ok(raw) => self.lookup(GlobalIndex(raw)),
            Err(_) => None,
        }
    }

    /// Number of addressable tiles of one type.
    #[must_use]
    pub fn count(&self, tile_type: TileType) -> usize {
        self.local_to_global[tile_type.slot()].len()
    }

    /// Global positions of every addressable tile of one type, in local order.
    #[must_use]
    pub fn globals(&self, tile_type: TileType) -> &[GlobalIndex] {
        &self.local_to_global[tile_type.slot()]
    }
}
