//! Object metadata: what can be placed and how it is classified.
//!
//! The catalog is loaded once at startup from the object-metadata list.
//! Every entry's [`Category`] is resolved at load time, from the explicit
//! `category` field when present and otherwise from the id's sprite-path
//! prefix, and then stored on the descriptor.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::placement::Rotation;

/// Error returned by [`Catalog::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Closed classification of placeable objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Decor,
    Plant,
    TallPlant,
    Egg,
    Other,
}

impl Category {
    /// Parse the metadata's category string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "decor" => Some(Self::Decor),
            "plant" => Some(Self::Plant),
            "tallplant" => Some(Self::TallPlant),
            "egg" => Some(Self::Egg),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Classify by the sprite-path prefix convention of object ids.
    #[must_use]
    pub fn infer(object_id: &str) -> Self {
        if object_id.starts_with("sprite/plant/") {
            Self::Plant
        } else if object_id.starts_with("sprite/tallplant/") {
            Self::TallPlant
        } else if object_id.starts_with("sprite/") {
            Self::Other
        } else {
            Self::Decor
        }
    }

    /// Whether records of this category use the growth-slot plant shape.
    #[must_use]
    pub fn is_plant_like(self) -> bool {
        matches!(self, Self::Plant | Self::TallPlant)
    }

    /// Whether saved records carry growth slots: mutations but no orientation.
    #[must_use]
    pub fn has_growth_slots(self) -> bool {
        self.is_plant_like() || self == Self::Egg
    }
}

/// Sprite override for one rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationVariant {
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub flip_h: Option<bool>,
    #[serde(default)]
    pub flip_v: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(alias = "decorId")]
    object_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "spriteRef")]
    sprite: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    rotation_variants: HashMap<String, RotationVariant>,
    #[serde(default)]
    bottom_offset: f64,
}

/// A placeable object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    pub object_id: String,
    pub name: String,
    pub sprite: String,
    pub category: Category,
    pub rotation_variants: BTreeMap<Rotation, RotationVariant>,
    /// Sprite pixels below the tile anchor; breaks draw-order ties.
    pub bottom_offset: f64,
}

/// How to draw an object at a given rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance<'a> {
    pub sprite: &'a str,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Rotation still to apply to the sprite; zero when a variant sprite is pre-rotated.
    pub angle: Rotation,
}

impl ObjectDescriptor {
    /// Resolve sprite, flips and residual rotation for `rotation`.
    #[must_use]
    pub fn appearance(&self, rotation: Rotation) -> Appearance<'_> {
        let variant = self.rotation_variants.get(&rotation);
        let variant_sprite = variant.and_then(|v| v.sprite.as_deref());
        Appearance {
            sprite: variant_sprite.unwrap_or(&self.sprite),
            flip_h: variant.and_then(|v| v.flip_h).unwrap_or(false),
            flip_v: variant.and_then(|v| v.flip_v).unwrap_or(false),
            angle: if variant_sprite.is_some() { Rotation::ZERO } else { rotation },
        }
    }
}

/// All placeable objects, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<ObjectDescriptor>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Parse the metadata list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidJson`] when the document is not a list
    /// of entries with ids.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawEntry> = serde_json::from_str(raw)?;
        Ok(Self::from_entries(raw.into_iter().map(describe)))
    }

    /// Build from already-resolved descriptors. Later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = ObjectDescriptor>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            if let Some(&slot) = catalog.by_id.get(&entry.object_id) {
                catalog.entries[slot] = entry;
            } else {
                catalog.by_id.insert(entry.object_id.clone(), catalog.entries.len());
                catalog.entries.push(entry);
            }
        }
        catalog
    }

    #[must_use]
    pub fn get(&self, object_id: &str) -> Option<&ObjectDescriptor> {
        self.by_id.get(object_id).map(|&i| &self.entries[i])
    }

    /// Category of an object. Ids missing from the catalog fall back to the
    /// same prefix rule applied at load.
    #[must_use]
    pub fn category_of(&self, object_id: &str) -> Category {
        self.get(object_id).map_or_else(|| Category::infer(object_id), |d| d.category)
    }

    /// Human-readable name; unknown ids show their last path segment.
    #[must_use]
    pub fn display_name<'a>(&'a self, object_id: &'a str) -> &'a str {
        match self.get(object_id) {
            Some(d) => &d.name,
            None => object_id.rsplit('/').next().unwrap_or(object_id),
        }
    }

    /// Entries whose name contains `query`, case-insensitively. An empty
    /// query returns everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&ObjectDescriptor> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|d| query.is_empty() || d.name.to_lowercase().contains(&query))
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[ObjectDescriptor] {
        &self.entries
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

fn describe(raw: RawEntry) -> ObjectDescriptor {
    let category = match raw.category.as_deref() {
        Some(value) => Category::parse(value).unwrap_or_else(|| {
            warn!(object_id = %raw.object_id, value, "unknown category, inferring from id");
            Category::infer(&raw.object_id)
        }),
        None => Category::infer(&raw.object_id),
    };
    let rotation_variants = raw
        .rotation_variants
        .into_iter()
        .filter_map(|(key, variant)| match key.parse::<f64>() {
            Ok(deg) => Some((Rotation::from_degrees(deg), variant)),
            Err(_) => None,
        })
        .collect();
    ObjectDescriptor {
        name: raw.name.unwrap_or_else(|| raw.object_id.clone()),
        sprite: raw.sprite.unwrap_or_else(|| raw.object_id.clone()),
        object_id: raw.object_id,
        category,
        rotation_variants,
        bottom_offset: raw.bottom_offset,
    }
}
