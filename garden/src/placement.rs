//! Placement model: what sits on which addressable tile.
//!
//! `PlacementStore` is the authoritative record of the layout. It holds at
//! most one [`PlacementEntry`] per [`TileRef`] and is only mutated through
//! [`PlacementStore::place`] and [`PlacementStore::remove`]; the engine wraps
//! both to trigger autosave. Entries are kept in a `BTreeMap` so iteration
//! (and therefore export) is deterministic.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::consts::ROTATION_STEP_DEG;
use crate::index::{TileIndex, TileRef};

/// Quarter-turn rotation in degrees, always one of 0, 90, 180, 270.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "u16")]
pub struct Rotation(u16);

impl Rotation {
    pub const ZERO: Self = Self(0);

    /// Snap arbitrary degrees to the nearest quarter turn in `[0, 360)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return Self::ZERO;
        }
        let steps = ((degrees / 90.0).round() % 4.0 + 4.0) % 4.0;
        Self((steps as u16) * 90)
    }

    #[must_use]
    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Rotate by `delta` degrees, wrapping into `[0, 360)` for any sign or magnitude.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rotated_by(self, delta: i32) -> Self {
        let wrapped = (i64::from(self.0) + i64::from(delta)).rem_euclid(360);
        Self::from_degrees(wrapped as f64)
    }

    /// One clockwise quarter turn.
    #[must_use]
    pub fn step(self) -> Self {
        self.rotated_by(ROTATION_STEP_DEG)
    }
}

impl From<f64> for Rotation {
    fn from(degrees: f64) -> Self {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

/// Ordered set of mutation tags. Insertion order is kept; duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Mutations(Vec<String>);

impl Mutations {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a tag unless already present. Returns whether it was added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Mutations {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl From<Vec<String>> for Mutations {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Mutations> for Vec<String> {
    fn from(set: Mutations) -> Self {
        set.0
    }
}

/// An object placed on an addressable tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementEntry {
    pub tile: TileRef,
    pub object_id: String,
    pub rotation: Rotation,
    /// Decoded from the tile's global index; cached for renderers.
    pub grid_x: u32,
    pub grid_y: u32,
    pub category: Category,
    pub mutations: Mutations,
}

/// The layout: at most one entry per addressable tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementStore {
    entries: BTreeMap<TileRef, PlacementEntry>,
}

impl PlacementStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry on `tile`.
    ///
    /// Returns `None` without touching the store when `tile` is not
    /// addressable in `index`. Objects saved with growth slots have no
    /// orientation in the save schema and other objects carry no mutations
    /// there, so both are normalized here to keep export and import symmetric.
    pub fn place(
        &mut self,
        index: &TileIndex,
        tile: TileRef,
        object_id: &str,
        category: Category,
        rotation: Rotation,
        mutations: Mutations,
    ) -> Option<&PlacementEntry> {
        let (grid_x, grid_y) = index.coords_of(tile)?;
        let (rotation, mutations) = if category.has_growth_slots() {
            (Rotation::ZERO, mutations)
        } else {
            (rotation, Mutations::new())
        };
        let entry = PlacementEntry {
            tile,
            object_id: object_id.to_owned(),
            rotation,
            grid_x,
            grid_y,
            category,
            mutations,
        };
        self.entries.insert(tile, entry);
        self.entries.get(&tile)
    }

    /// Remove the entry on `tile`, returning it if there was one.
    pub fn remove(&mut self, tile: TileRef) -> Option<PlacementEntry> {
        self.entries.remove(&tile)
    }

    #[must_use]
    pub fn get(&self, tile: TileRef) -> Option<&PlacementEntry> {
        self.entries.get(&tile)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacementEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
