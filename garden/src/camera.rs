//! Clamped pan/zoom camera over the garden's render area.
//!
//! Zoom is expressed as an on-screen tile size in pixels. The camera keeps a
//! target center in world pixels and derives a [`Transform`] (scale plus
//! translation) from it on every [`Camera::update`]. Both the tile size and
//! the center are clamped so the viewport never shows anything outside the
//! render area: zooming out stops where letterboxing would begin, and the
//! center stays far enough from the edges to keep the view filled.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ABS_MAX_TILE_SIZE, ABS_MIN_TILE_SIZE, DEFAULT_TILE_SIZE, TILE_WORLD_SIZE};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Screen placement of the world: `screen = world * scale + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { scale: 1.0, x: 0.0, y: 0.0 }
    }
}

impl Transform {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.x) / self.scale, y: (screen.y - self.y) / self.scale }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point { x: world.x * self.scale + self.x, y: world.y * self.scale + self.y }
    }
}

/// Camera state for pan/zoom over a finite map.
///
/// `tile_size` is the requested on-screen size of one tile in pixels and acts
/// as the zoom level. `target_center` is the world point the camera looks at.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub tile_size: f64,
    pub target_center: Point,
    transform: Transform,
    viewport_width: f64,
    viewport_height: f64,
    map_width: f64,
    map_height: f64,
}

impl Camera {
    /// Create a camera over a map of the given world-pixel size.
    ///
    /// The viewport starts empty; call [`Camera::set_viewport`] before use.
    #[must_use]
    pub fn new(map_width: f64, map_height: f64) -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            target_center: Point::new(map_width / 2.0, map_height / 2.0),
            transform: Transform::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            map_width,
            map_height,
        }
    }

    /// Update viewport dimensions (CSS pixels) and re-clamp.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Transform {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
        self.update()
    }

    #[must_use]
    pub fn viewport(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }

    #[must_use]
    pub fn map_size(&self) -> (f64, f64) {
        (self.map_width, self.map_height)
    }

    /// The transform produced by the last [`Camera::update`].
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Current world-to-screen scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    /// Smallest tile size that still fills the viewport with map.
    #[must_use]
    pub fn min_tile_size(&self) -> f64 {
        if self.map_width <= 0.0 || self.map_height <= 0.0 {
            return ABS_MIN_TILE_SIZE;
        }
        ABS_MIN_TILE_SIZE.max(self.min_zoom() * TILE_WORLD_SIZE)
    }

    fn min_zoom(&self) -> f64 {
        (self.viewport_width / self.map_width).max(self.viewport_height / self.map_height)
    }

    /// Clamp zoom and center, then recompute the transform.
    ///
    /// The clamped center is written back to `target_center` so later pan
    /// deltas compose against what is actually on screen.
    pub fn update(&mut self) -> Transform {
        let min_tile = self.min_tile_size();
        self.tile_size = self.tile_size.max(min_tile).min(ABS_MAX_TILE_SIZE);

        let mut scale = self.tile_size / TILE_WORLD_SIZE;
        if self.map_width > 0.0 && self.map_height > 0.0 {
            scale = scale.max(self.min_zoom());
        }

        let half_w = self.viewport_width / scale / 2.0;
        let half_h = self.viewport_height / scale / 2.0;
        let center_x = clamp_axis(self.target_center.x, half_w, self.map_width);
        let center_y = clamp_axis(self.target_center.y, half_h, self.map_height);

        self.transform = Transform {
            scale,
            x: -center_x * scale + self.viewport_width / 2.0,
            y: -center_y * scale + self.viewport_height / 2.0,
        };
        self.target_center = Point::new(center_x, center_y);
        self.transform
    }

    /// Convert a screen-space point to world coordinates under the current transform.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.transform.screen_to_world(screen)
    }

    /// Convert a world-space point to screen coordinates under the current transform.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform.world_to_screen(world)
    }

    /// Zoom to `new_tile_size` while keeping the world point under `screen` fixed.
    ///
    /// The first update may already move the center through clamping, so the
    /// compensating shift is measured after it and a second update re-clamps.
    pub fn zoom_at(&mut self, screen: Point, new_tile_size: f64) -> Transform {
        let before = self.screen_to_world(screen);
        self.tile_size = new_tile_size.clamp(ABS_MIN_TILE_SIZE, ABS_MAX_TILE_SIZE);
        self.update();
        let after = self.screen_to_world(screen);
        self.target_center.x += before.x - after.x;
        self.target_center.y += before.y - after.y;
        self.update()
    }

    /// Pan by a screen-space delta; dragging right moves the view left.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Transform {
        let scale = if self.transform.scale > 0.0 { self.transform.scale } else { 1.0 };
        self.target_center.x -= dx / scale;
        self.target_center.y -= dy / scale;
        self.update()
    }

    /// Look at `center` with the given tile size.
    pub fn focus(&mut self, center: Point, tile_size: f64) -> Transform {
        self.target_center = center;
        self.tile_size = tile_size;
        self.update()
    }
}

/// Keep a half-window of `half` inside `[0, extent]`, centering when it cannot fit.
fn clamp_axis(target: f64, half: f64, extent: f64) -> f64 {
    let min = half;
    let max = extent - half;
    if min > max { extent / 2.0 } else { target.clamp(min, max) }
}
