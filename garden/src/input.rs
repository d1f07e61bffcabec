//! Input model: host events, the gesture state machine, and UI state.
//!
//! This module only defines types. [`crate::engine::EngineCore::handle`] is the
//! single dispatch function that consumes an [`InputEvent`] and moves
//! [`Gesture`] between states. Events are serde-friendly so a recorded session
//! can be replayed headlessly from JSON lines.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::catalog::Category;
use crate::index::TileRef;
use crate::placement::{Mutations, Rotation};

/// Host-assigned identity of one pointer (mouse, finger, or pen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub u32);

/// What kind of device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    /// Only touch pointers arm the long-press timer.
    Touch,
    Pen,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or a single finger).
    #[default]
    Primary,
    Middle,
    /// Right mouse button; removes the entry under the cursor.
    Secondary,
}

/// Keys the editor reacts to. Everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// Held with a selection to paint.
    Space,
    Escape,
    /// Rotates the hovered entry, or the selection when nothing is hovered.
    Rotate,
    #[serde(other)]
    Other,
}

/// One input event from the host. `time_ms` is a monotonic clock reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InputEvent {
    PointerDown {
        pointer: PointerId,
        #[serde(default)]
        kind: PointerKind,
        #[serde(default)]
        button: Button,
        at: Point,
        time_ms: f64,
    },
    PointerMove {
        pointer: PointerId,
        at: Point,
        time_ms: f64,
    },
    PointerUp {
        pointer: PointerId,
        at: Point,
        time_ms: f64,
    },
    /// The host lost the pointer (e.g. the touch was cancelled); no tap resolves.
    PointerCancel {
        pointer: PointerId,
        time_ms: f64,
    },
    /// Positive `delta_y` scrolls down, zooming out.
    Wheel {
        at: Point,
        delta_y: f64,
        time_ms: f64,
    },
    KeyDown {
        key: Key,
        time_ms: f64,
    },
    KeyUp {
        key: Key,
        time_ms: f64,
    },
    /// Clock advance with no input; lets pending timers fire.
    Tick {
        time_ms: f64,
    },
    Resize {
        width: f64,
        height: f64,
        time_ms: f64,
    },
}

impl InputEvent {
    #[must_use]
    pub fn time_ms(&self) -> f64 {
        match self {
            Self::PointerDown { time_ms, .. }
            | Self::PointerMove { time_ms, .. }
            | Self::PointerUp { time_ms, .. }
            | Self::PointerCancel { time_ms, .. }
            | Self::Wheel { time_ms, .. }
            | Self::KeyDown { time_ms, .. }
            | Self::KeyUp { time_ms, .. }
            | Self::Tick { time_ms }
            | Self::Resize { time_ms, .. } => *time_ms,
        }
    }
}

/// The gesture being tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No pointer is down.
    #[default]
    Idle,
    /// One pointer is down and has not yet moved past the pan threshold.
    /// Releasing it is a tap.
    Pressed {
        pointer: PointerId,
        start: Point,
        /// Deadline of the long-press timer; touch presses only.
        long_press_at: Option<f64>,
    },
    /// Single-pointer drag moving the camera.
    Panning { pointer: PointerId, last: Point },
    /// Two pointers zooming around their midpoint.
    Pinching { start_distance: f64, start_tile_size: f64 },
    /// Paint modifier held: every newly entered tile receives the selection.
    Painting { pointer: PointerId, last_tile: Option<TileRef> },
    /// The gesture already acted (long press, secondary remove); the rest of
    /// it is ignored until every pointer is up.
    Consumed,
}

impl Gesture {
    /// Whether a multi-pointer or camera gesture hides the ghost preview.
    #[must_use]
    pub fn hides_ghost(&self) -> bool {
        matches!(self, Self::Panning { .. } | Self::Pinching { .. })
    }
}

/// A tap on an occupied tile waiting to learn whether it is half of a double tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTap {
    pub tile: TileRef,
    pub resolve_at: f64,
}

/// The most recent tap, for double-tap detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastTap {
    pub tile: TileRef,
    pub at: f64,
}

/// The object that taps and paint strokes will place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub object_id: String,
    pub category: Category,
    pub rotation: Rotation,
    pub mutations: Mutations,
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub selection: Option<Selection>,
    /// Addressable tile under the last hover position.
    pub hover: Option<TileRef>,
    /// Paint modifier is held.
    pub paint_held: bool,
}
