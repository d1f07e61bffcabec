//! Shared numeric constants for the garden crate.

// ── World geometry ──────────────────────────────────────────────

/// Size of one grid tile in world pixels. Sprites are exported at this scale.
pub const TILE_WORLD_SIZE: f64 = 256.0;

/// Number of tiles added around the garden's tight bounding box when deriving
/// the pannable render area.
pub const GARDEN_MARGIN: u32 = 6;

/// Garden slot whose layers are indexed when none is configured.
pub const DEFAULT_GARDEN_SLOT: u32 = 5;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest on-screen tile size in pixels, regardless of viewport.
pub const ABS_MIN_TILE_SIZE: f64 = 16.0;

/// Largest on-screen tile size in pixels.
pub const ABS_MAX_TILE_SIZE: f64 = 512.0;

/// On-screen tile size used at startup and by the focus action.
pub const DEFAULT_TILE_SIZE: f64 = 180.0;

/// Tile size multiplier for one wheel notch scrolling down (zoom out).
pub const WHEEL_ZOOM_OUT: f64 = 0.92;

/// Tile size multiplier for one wheel notch scrolling up (zoom in).
pub const WHEEL_ZOOM_IN: f64 = 1.08;

// ── Gestures ────────────────────────────────────────────────────

/// Screen-space displacement in pixels after which a press becomes a pan.
pub const PAN_THRESHOLD_PX: f64 = 10.0;

/// Hold duration before a touch press removes the entry beneath it.
pub const LONG_PRESS_MS: f64 = 600.0;

/// Maximum gap between two releases on the same tile to count as a double tap.
pub const DOUBLE_TAP_MS: f64 = 300.0;

/// Rotation step applied by double tap and the rotate key, in degrees.
pub const ROTATION_STEP_DEG: i32 = 90;

// ── Codec ───────────────────────────────────────────────────────

/// Growth duration written into exported plant slots.
pub const PLANT_GROWTH_MS: i64 = 60_000;

// ── Rendering ───────────────────────────────────────────────────

/// Upper bound of the draw-order tie breaker derived from sprite bottom offset.
pub const Z_TIE_BREAK_MAX: f64 = 0.9;
