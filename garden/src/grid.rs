//! Raw grid model: the tile map the garden is authored on.
//!
//! The map is a Tiled-style JSON document. Only tile layers with a `data`
//! array matter to the addressing core. Object layers parse without data and
//! are never selected; tilesets and other map properties are not read.
//! Cell values are tile codes whose top three bits hold flip flags.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use serde::{Deserialize, Serialize};

/// Error returned by [`GridMap::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The document is not valid JSON or does not match the map shape.
    #[error("invalid grid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// Width or height is zero.
    #[error("grid has empty extents ({width}x{height})")]
    EmptyExtents { width: u32, height: u32 },
    /// A tile layer's data array does not cover the grid exactly.
    #[error("layer `{layer}` has {actual} cells, expected {expected}")]
    LayerSize { layer: String, expected: usize, actual: usize },
}

/// Row-major address of a cell in the full grid: `y * width + x`.
///
/// Shared with the external save schema, which keys objects by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlobalIndex(pub u32);

impl GlobalIndex {
    /// Split into `(x, y)` grid coordinates for a grid `width` cells wide.
    #[must_use]
    pub fn decode(self, width: u32) -> (u32, u32) {
        (self.0 % width, self.0 / width)
    }
}

impl std::fmt::Display for GlobalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw cell value. Flip flags live in the top bits, so any nonzero code
/// means a tile is drawn there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCode(pub u32);

impl TileCode {
    /// Whether the cell holds any tile at all.
    #[must_use]
    pub fn is_present(self) -> bool {
        self.0 != 0
    }
}

/// One layer of the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// Optional class tag; the game uses it to mark dirt and boardwalk layers.
    #[serde(default)]
    pub class: Option<String>,
    /// Layer type, e.g. `"tilelayer"` or `"objectgroup"`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Row-major tile codes. Absent for non-tile layers.
    #[serde(default)]
    pub data: Option<Vec<u32>>,
}

fn default_visible() -> bool {
    true
}

/// The full tile map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridMap {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<Layer>,
}

impl GridMap {
    /// Parse and validate a map document.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the JSON is malformed, the extents are empty,
    /// or a tile layer's data does not match `width * height`.
    pub fn from_json(raw: &str) -> Result<Self, GridError> {
        let map: Self = serde_json::from_str(raw)?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<(), GridError> {
        if self.width == 0 || self.height == 0 {
            return Err(GridError::EmptyExtents { width: self.width, height: self.height });
        }
        let expected = self.cell_count();
        for layer in &self.layers {
            if let Some(data) = &layer.data {
                if data.len() != expected {
                    return Err(GridError::LayerSize {
                        layer: layer.name.clone(),
                        expected,
                        actual: data.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Find the first layer matching `selector` for the given garden slot.
    ///
    /// A layer matches when its class equals the selector or its name starts
    /// with it, and its name ends with the zero-padded slot suffix (`-05`).
    #[must_use]
    pub fn find_layer(&self, selector: &str, slot: u32) -> Option<&Layer> {
        let suffix = format!("-{slot:02}");
        self.layers.iter().find(|layer| {
            let selected = layer.class.as_deref() == Some(selector) || layer.name.starts_with(selector);
            selected && layer.name.ends_with(&suffix)
        })
    }
}
