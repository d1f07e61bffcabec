//! The editing session: owns every piece of state and dispatches input.
//!
//! [`EngineCore`] is the only mutable state in the crate. The host creates it
//! once the grid and catalog have loaded, forwards each [`InputEvent`] to
//! [`EngineCore::handle`], and applies the returned [`Action`]s (redraw,
//! preview generation, status updates). Timers are not threads: long-press
//! and double-tap deadlines are compared against the event clock at the start
//! of every event, and the host sends [`InputEvent::Tick`] while idle so they
//! can fire without other input.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::bounds::RenderBounds;
use crate::camera::{Camera, Point, Transform};
use crate::catalog::{Catalog, Category};
use crate::codec::{self, ImportError, ImportReport, LayoutPayload};
use crate::consts::{
    DEFAULT_TILE_SIZE, DOUBLE_TAP_MS, GARDEN_MARGIN, LONG_PRESS_MS, PAN_THRESHOLD_PX, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use crate::grid::GridMap;
use crate::hit;
use crate::index::{IndexError, LayerSelection, TileIndex, TileRef};
use crate::input::{
    Button, Gesture, InputEvent, Key, LastTap, PendingTap, PointerId, PointerKind, Selection, UiState,
};
use crate::placement::{Mutations, PlacementEntry, PlacementStore, Rotation};
use crate::preview::{PreviewSlot, PreviewTicket};
use crate::render::{self, DrawItem};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Placed(PlacementEntry),
    Removed(PlacementEntry),
    SelectionChanged(Option<Selection>),
    HoverChanged(Option<TileRef>),
    CameraChanged(Transform),
    /// Render a preview of the selection and hand it back with
    /// [`EngineCore::complete_preview`].
    PreviewRequested { ticket: PreviewTicket, object_id: String, rotation: Rotation },
    RenderNeeded,
}

/// Error from an [`AutosaveSink`]. The engine logs and drops it.
#[derive(Debug, thiserror::Error)]
pub enum AutosaveError {
    #[error("autosave write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("autosave payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("autosave storage unavailable: {0}")]
    Unavailable(String),
}

/// Best-effort persistence of the latest export payload.
pub trait AutosaveSink {
    /// Replace the stored payload.
    ///
    /// # Errors
    ///
    /// Any storage failure. Callers never surface it to the user.
    fn save(&mut self, payload: &str) -> Result<(), AutosaveError>;
}

/// What the ghost preview should show, when it is visible at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost<'a> {
    pub object_id: &'a str,
    pub rotation: Rotation,
    pub tile: TileRef,
    pub grid_x: u32,
    pub grid_y: u32,
    pub world: Point,
    /// Latest completed preview for the selection, if any.
    pub preview: Option<&'a str>,
}

/// The editing session.
pub struct EngineCore {
    pub camera: Camera,
    pub ui: UiState,
    pub gesture: Gesture,
    index: TileIndex,
    bounds: RenderBounds,
    catalog: Catalog,
    store: PlacementStore,
    pointers: BTreeMap<PointerId, Point>,
    pending_tap: Option<PendingTap>,
    last_tap: Option<LastTap>,
    preview: PreviewSlot<String>,
    autosave: Option<Box<dyn AutosaveSink>>,
    now_ms: f64,
}

impl EngineCore {
    /// Index the grid and set up a camera centered on the garden.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyGarden`] when the selected layers hold no
    /// addressable tiles.
    pub fn new(map: &GridMap, selection: &LayerSelection, catalog: Catalog) -> Result<Self, IndexError> {
        let index = TileIndex::build(map, selection)?;
        let bounds =
            RenderBounds::compute(&index, GARDEN_MARGIN).ok_or(IndexError::EmptyGarden { slot: selection.slot })?;
        let mut camera = Camera::new(bounds.map_width(), bounds.map_height());
        camera.target_center = bounds.garden_center();
        camera.update();
        info!(
            render_w = bounds.render.width(),
            render_h = bounds.render.height(),
            objects = catalog.len(),
            "garden session ready"
        );
        Ok(Self {
            camera,
            ui: UiState::default(),
            gesture: Gesture::Idle,
            index,
            bounds,
            catalog,
            store: PlacementStore::new(),
            pointers: BTreeMap::new(),
            pending_tap: None,
            last_tap: None,
            preview: PreviewSlot::new(),
            autosave: None,
            now_ms: 0.0,
        })
    }

    /// Attach the autosave target. Every later mutation writes through it.
    pub fn set_autosave(&mut self, sink: Box<dyn AutosaveSink>) {
        self.autosave = Some(sink);
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and re-clamp the camera.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Transform {
        self.camera.set_viewport(width, height)
    }

    /// Center the garden at the default zoom.
    pub fn focus_garden(&mut self) -> Transform {
        self.camera.focus(self.bounds.garden_center(), DEFAULT_TILE_SIZE)
    }

    // --- Placement ---

    /// Place an object, resolving its category from the catalog. Autosaves.
    ///
    /// Returns `None` when `tile` is not addressable.
    pub fn place(
        &mut self,
        tile: TileRef,
        object_id: &str,
        rotation: Rotation,
        mutations: Mutations,
    ) -> Option<PlacementEntry> {
        let category = self.catalog.category_of(object_id);
        self.commit(tile, object_id, category, rotation, mutations)
    }

    /// Remove whatever sits on `tile`. Autosaves when something was removed.
    pub fn remove(&mut self, tile: TileRef) -> Option<PlacementEntry> {
        let entry = self.store.remove(tile)?;
        debug!(%tile, object_id = %entry.object_id, "removed");
        self.autosave();
        Some(entry)
    }

    /// Rotate the entry on `tile` one quarter turn clockwise.
    ///
    /// Returns `None`, without saving, when the tile is empty or holds an
    /// object that has no orientation.
    pub fn rotate_at(&mut self, tile: TileRef) -> Option<PlacementEntry> {
        let entry = self.store.get(tile)?.clone();
        if entry.category.has_growth_slots() {
            debug!(%tile, object_id = %entry.object_id, "object has no orientation");
            return None;
        }
        self.commit(tile, &entry.object_id, entry.category, entry.rotation.step(), entry.mutations)
    }

    fn commit(
        &mut self,
        tile: TileRef,
        object_id: &str,
        category: Category,
        rotation: Rotation,
        mutations: Mutations,
    ) -> Option<PlacementEntry> {
        let entry = self.store.place(&self.index, tile, object_id, category, rotation, mutations)?.clone();
        debug!(%tile, object_id, rotation = entry.rotation.degrees(), "placed");
        self.autosave();
        Some(entry)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn clock_ms(&self) -> i64 {
        self.now_ms as i64
    }

    fn autosave(&mut self) {
        let now = self.clock_ms();
        let Some(sink) = self.autosave.as_mut() else {
            return;
        };
        let result = codec::export_json(&self.store, &self.index, now)
            .map_err(AutosaveError::from)
            .and_then(|payload| sink.save(&payload));
        if let Err(e) = result {
            debug!(error = %e, "autosave failed");
        }
    }

    // --- Import / export ---

    /// Export the layout, stamping plant slots with `now_ms`.
    #[must_use]
    pub fn export(&self, now_ms: i64) -> LayoutPayload {
        codec::export(&self.store, &self.index, now_ms)
    }

    /// Export as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates the serializer error.
    pub fn export_json(&self, now_ms: i64) -> Result<String, serde_json::Error> {
        codec::export_json(&self.store, &self.index, now_ms)
    }

    /// Replace the whole layout from either save schema, then autosave once.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] for a malformed payload; the layout is untouched.
    pub fn import(&mut self, raw: &str) -> Result<ImportReport, ImportError> {
        let report = self.replace_from(raw)?;
        self.autosave();
        Ok(report)
    }

    /// Import a previously autosaved payload. Failures are logged and ignored.
    pub fn restore(&mut self, raw: &str) -> Option<ImportReport> {
        match self.replace_from(raw) {
            Ok(report) => Some(report),
            Err(e) => {
                debug!(error = %e, "autosave not restored");
                None
            }
        }
    }

    fn replace_from(&mut self, raw: &str) -> Result<ImportReport, ImportError> {
        let (store, report) = codec::import(raw, &self.index, &self.catalog)?;
        self.store = store;
        self.pending_tap = None;
        self.last_tap = None;
        info!(applied = report.applied, skipped = report.skipped, format = ?report.format, "layout imported");
        Ok(report)
    }

    // --- Selection / preview ---

    /// Select a catalog object at rotation zero with no mutations.
    pub fn select(&mut self, object_id: &str) -> Vec<Action> {
        let selection = Selection {
            object_id: object_id.to_owned(),
            category: self.catalog.category_of(object_id),
            rotation: Rotation::ZERO,
            mutations: Mutations::new(),
        };
        self.set_selection(Some(selection))
    }

    /// Replace the selection (or clear it with `None`).
    pub fn set_selection(&mut self, selection: Option<Selection>) -> Vec<Action> {
        let mut actions = Vec::new();
        self.change_selection(selection, &mut actions);
        finish(actions)
    }

    /// Deliver a rendered preview. Stale tickets are discarded.
    pub fn complete_preview(&mut self, ticket: PreviewTicket, preview: String) -> bool {
        self.preview.complete(ticket, preview)
    }

    fn change_selection(&mut self, selection: Option<Selection>, actions: &mut Vec<Action>) {
        if self.ui.selection == selection {
            return;
        }
        if selection.is_none() {
            self.ui.paint_held = false;
            if let Gesture::Painting { .. } = self.gesture {
                self.gesture = Gesture::Consumed;
            }
        }
        self.ui.selection = selection;
        actions.push(Action::SelectionChanged(self.ui.selection.clone()));
        self.request_preview(actions);
    }

    fn request_preview(&mut self, actions: &mut Vec<Action>) {
        let Some(selection) = &self.ui.selection else {
            self.preview.cancel();
            return;
        };
        let ticket = self.preview.issue();
        actions.push(Action::PreviewRequested {
            ticket,
            object_id: selection.object_id.clone(),
            rotation: selection.rotation,
        });
    }

    // --- Queries ---

    #[must_use]
    pub fn index(&self) -> &TileIndex {
        &self.index
    }

    #[must_use]
    pub fn bounds(&self) -> &RenderBounds {
        &self.bounds
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn store(&self) -> &PlacementStore {
        &self.store
    }

    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn entry_at(&self, tile: TileRef) -> Option<&PlacementEntry> {
        self.store.get(tile)
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.ui.selection.as_ref()
    }

    /// Latest event clock reading.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// The addressable tile under a screen point.
    #[must_use]
    pub fn tile_at(&self, screen: Point) -> Option<TileRef> {
        hit::tile_at(screen, &self.camera, &self.bounds, &self.index)
    }

    /// Sprites to draw, back to front.
    #[must_use]
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        render::draw_list(&self.store, &self.catalog, &self.bounds)
    }

    /// The ghost to draw under the cursor: needs a selection, a hovered
    /// tile, and no camera or multi-pointer gesture in progress.
    #[must_use]
    pub fn ghost(&self) -> Option<Ghost<'_>> {
        if self.gesture.hides_ghost() || self.pointers.len() > 1 {
            return None;
        }
        let selection = self.ui.selection.as_ref()?;
        let tile = self.ui.hover?;
        let (grid_x, grid_y) = self.index.coords_of(tile)?;
        Some(Ghost {
            object_id: &selection.object_id,
            rotation: selection.rotation,
            tile,
            grid_x,
            grid_y,
            world: self.bounds.grid_to_world(grid_x, grid_y),
            preview: self.preview.current().map(String::as_str),
        })
    }

    // =========================================================================
    // EVENT DISPATCH
    // =========================================================================

    /// Feed one input event through the gesture machine.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        self.advance_clock(event.time_ms(), &mut actions);
        match *event {
            InputEvent::PointerDown { pointer, kind, button, at, .. } => {
                self.on_pointer_down(pointer, kind, button, at, &mut actions);
            }
            InputEvent::PointerMove { pointer, at, .. } => self.on_pointer_move(pointer, at, &mut actions),
            InputEvent::PointerUp { pointer, at, .. } => self.on_pointer_up(pointer, Some(at), &mut actions),
            InputEvent::PointerCancel { pointer, .. } => self.on_pointer_up(pointer, None, &mut actions),
            InputEvent::Wheel { at, delta_y, .. } => self.on_wheel(at, delta_y, &mut actions),
            InputEvent::KeyDown { key, .. } => self.on_key_down(key, &mut actions),
            InputEvent::KeyUp { key, .. } => self.on_key_up(key),
            InputEvent::Tick { .. } => {}
            InputEvent::Resize { width, height, .. } => {
                let transform = self.set_viewport(width, height);
                actions.push(Action::CameraChanged(transform));
            }
        }
        finish(actions)
    }

    /// Move the clock forward and fire whichever deadlines have passed.
    fn advance_clock(&mut self, time_ms: f64, actions: &mut Vec<Action>) {
        if time_ms > self.now_ms {
            self.now_ms = time_ms;
        }
        if let Some(pending) = self.pending_tap
            && self.now_ms >= pending.resolve_at
        {
            self.pending_tap = None;
            self.resolve_tap(pending.tile, actions);
        }
        if let Gesture::Pressed { pointer, start, long_press_at: Some(deadline) } = self.gesture
            && self.now_ms >= deadline
        {
            self.fire_long_press(pointer, start, actions);
        }
    }

    fn fire_long_press(&mut self, pointer: PointerId, start: Point, actions: &mut Vec<Action>) {
        let removed = self.tile_at(start).and_then(|tile| self.remove(tile));
        if let Some(entry) = removed {
            self.last_tap = None;
            self.gesture = Gesture::Consumed;
            actions.push(Action::Removed(entry));
        } else {
            self.gesture = Gesture::Pressed { pointer, start, long_press_at: None };
        }
    }

    fn on_pointer_down(
        &mut self,
        pointer: PointerId,
        kind: PointerKind,
        button: Button,
        at: Point,
        actions: &mut Vec<Action>,
    ) {
        self.pointers.insert(pointer, at);

        if button == Button::Secondary {
            if self.pointers.len() == 1 {
                self.flush_pending(actions);
                if let Some(entry) = self.tile_at(at).and_then(|tile| self.remove(tile)) {
                    actions.push(Action::Removed(entry));
                }
                self.gesture = Gesture::Consumed;
            }
            return;
        }

        match self.gesture {
            Gesture::Idle if self.pointers.len() == 1 => {
                if self.ui.paint_held && self.ui.selection.is_some() {
                    self.flush_pending(actions);
                    self.gesture = Gesture::Painting { pointer, last_tile: None };
                    self.paint_at(at, actions);
                } else {
                    let long_press_at = (kind == PointerKind::Touch).then_some(self.now_ms + LONG_PRESS_MS);
                    self.gesture = Gesture::Pressed { pointer, start: at, long_press_at };
                    self.update_hover(at, actions);
                }
            }
            Gesture::Idle | Gesture::Pressed { .. } | Gesture::Panning { .. } => self.start_pinch(actions),
            Gesture::Pinching { .. } | Gesture::Painting { .. } | Gesture::Consumed => {}
        }
    }

    fn on_pointer_move(&mut self, pointer: PointerId, at: Point, actions: &mut Vec<Action>) {
        if !self.pointers.contains_key(&pointer) {
            if self.gesture == Gesture::Idle {
                self.update_hover(at, actions);
            }
            return;
        }
        self.pointers.insert(pointer, at);

        match self.gesture {
            Gesture::Pressed { pointer: p, start, .. } if p == pointer => {
                if start.distance(at) > PAN_THRESHOLD_PX {
                    self.flush_pending(actions);
                    self.last_tap = None;
                    self.pan(pointer, start, at, actions);
                    self.set_hover(None, actions);
                } else {
                    self.update_hover(at, actions);
                }
            }
            Gesture::Panning { pointer: p, last } if p == pointer => self.pan(pointer, last, at, actions),
            Gesture::Pinching { start_distance, start_tile_size } => {
                let Some((a, b)) = self.pinch_points() else {
                    return;
                };
                if start_distance > 0.0 {
                    let tile_size = start_tile_size * a.distance(b) / start_distance;
                    let transform = self.camera.zoom_at(a.midpoint(b), tile_size);
                    actions.push(Action::CameraChanged(transform));
                }
            }
            Gesture::Painting { pointer: p, .. } if p == pointer => self.paint_at(at, actions),
            _ => {}
        }
    }

    fn on_pointer_up(&mut self, pointer: PointerId, at: Option<Point>, actions: &mut Vec<Action>) {
        self.pointers.remove(&pointer);

        match self.gesture {
            Gesture::Pressed { pointer: p, .. } if p == pointer => {
                self.gesture = Gesture::Idle;
                if let Some(at) = at {
                    self.release_tap(at, actions);
                }
            }
            Gesture::Pinching { .. } => match self.pointers.len() {
                0 => self.gesture = Gesture::Idle,
                1 => {
                    if let Some((&rest, &last)) = self.pointers.iter().next() {
                        self.gesture = Gesture::Panning { pointer: rest, last };
                    }
                }
                _ => self.start_pinch(actions),
            },
            Gesture::Panning { pointer: p, .. } | Gesture::Painting { pointer: p, .. } if p == pointer => {
                self.gesture = Gesture::Idle;
            }
            _ => {}
        }

        if self.pointers.is_empty() {
            self.gesture = Gesture::Idle;
        }
    }

    fn on_wheel(&mut self, at: Point, delta_y: f64, actions: &mut Vec<Action>) {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else if delta_y < 0.0 {
            WHEEL_ZOOM_IN
        } else {
            return;
        };
        let transform = self.camera.zoom_at(at, self.camera.tile_size * factor);
        actions.push(Action::CameraChanged(transform));
        if self.gesture == Gesture::Idle {
            self.update_hover(at, actions);
        }
    }

    fn on_key_down(&mut self, key: Key, actions: &mut Vec<Action>) {
        match key {
            Key::Escape => self.change_selection(None, actions),
            Key::Space => {
                if self.ui.selection.is_some() {
                    self.ui.paint_held = true;
                } else {
                    self.change_selection(None, actions);
                }
            }
            Key::Rotate => {
                let hovered = self.ui.hover.filter(|&tile| self.store.get(tile).is_some());
                if let Some(tile) = hovered {
                    self.rotate_entry(tile, actions);
                } else if let Some(selection) = self.ui.selection.as_mut() {
                    selection.rotation = selection.rotation.step();
                    actions.push(Action::SelectionChanged(self.ui.selection.clone()));
                    self.request_preview(actions);
                }
            }
            Key::Other => {}
        }
    }

    fn on_key_up(&mut self, key: Key) {
        if key != Key::Space {
            return;
        }
        self.ui.paint_held = false;
        if let Gesture::Painting { .. } = self.gesture {
            self.gesture = Gesture::Consumed;
        }
    }

    // --- Gesture helpers ---

    fn pinch_points(&self) -> Option<(Point, Point)> {
        let mut points = self.pointers.values();
        Some((*points.next()?, *points.next()?))
    }

    fn start_pinch(&mut self, actions: &mut Vec<Action>) {
        let Some((a, b)) = self.pinch_points() else {
            return;
        };
        self.flush_pending(actions);
        self.last_tap = None;
        self.gesture = Gesture::Pinching { start_distance: a.distance(b), start_tile_size: self.camera.tile_size };
        self.set_hover(None, actions);
    }

    fn pan(&mut self, pointer: PointerId, last: Point, at: Point, actions: &mut Vec<Action>) {
        let transform = self.camera.pan_by(at.x - last.x, at.y - last.y);
        self.gesture = Gesture::Panning { pointer, last: at };
        actions.push(Action::CameraChanged(transform));
    }

    /// Place the selection on a newly entered tile. Moves that miss every
    /// tile leave the last painted tile alone.
    fn paint_at(&mut self, at: Point, actions: &mut Vec<Action>) {
        let Gesture::Painting { pointer, last_tile } = self.gesture else {
            return;
        };
        let Some(tile) = self.tile_at(at) else {
            return;
        };
        if last_tile == Some(tile) {
            return;
        }
        self.gesture = Gesture::Painting { pointer, last_tile: Some(tile) };
        self.place_selection(tile, actions);
    }

    /// A press released without panning. Occupied tiles wait out the
    /// double-tap window before resolving; empty tiles resolve at once.
    fn release_tap(&mut self, at: Point, actions: &mut Vec<Action>) {
        let Some(tile) = self.tile_at(at) else {
            self.flush_pending(actions);
            return;
        };
        let now = self.now_ms;
        let repeat = self.last_tap.is_some_and(|last| last.tile == tile && now - last.at < DOUBLE_TAP_MS);
        if repeat && self.store.get(tile).is_some() {
            if self.pending_tap.is_some_and(|pending| pending.tile == tile) {
                self.pending_tap = None;
            }
            self.last_tap = None;
            self.rotate_entry(tile, actions);
            return;
        }

        self.flush_pending(actions);
        self.last_tap = Some(LastTap { tile, at: now });
        if self.store.get(tile).is_some() {
            self.pending_tap = Some(PendingTap { tile, resolve_at: now + DOUBLE_TAP_MS });
        } else {
            self.resolve_tap(tile, actions);
        }
    }

    fn flush_pending(&mut self, actions: &mut Vec<Action>) {
        if let Some(pending) = self.pending_tap.take() {
            self.resolve_tap(pending.tile, actions);
        }
    }

    /// Single-tap outcome: place the selection, or pick up what is there.
    fn resolve_tap(&mut self, tile: TileRef, actions: &mut Vec<Action>) {
        if self.ui.selection.is_some() {
            self.place_selection(tile, actions);
            return;
        }
        let Some(entry) = self.remove(tile) else {
            return;
        };
        let picked = Selection {
            object_id: entry.object_id.clone(),
            category: entry.category,
            rotation: entry.rotation,
            mutations: entry.mutations.clone(),
        };
        actions.push(Action::Removed(entry));
        self.change_selection(Some(picked), actions);
    }

    fn place_selection(&mut self, tile: TileRef, actions: &mut Vec<Action>) {
        let Some(selection) = self.ui.selection.clone() else {
            return;
        };
        let placed = self.commit(
            tile,
            &selection.object_id,
            selection.category,
            selection.rotation,
            selection.mutations,
        );
        if let Some(entry) = placed {
            actions.push(Action::Placed(entry));
        }
    }

    fn rotate_entry(&mut self, tile: TileRef, actions: &mut Vec<Action>) {
        if let Some(entry) = self.rotate_at(tile) {
            actions.push(Action::Placed(entry));
        }
    }

    fn update_hover(&mut self, at: Point, actions: &mut Vec<Action>) {
        let tile = self.tile_at(at);
        self.set_hover(tile, actions);
    }

    fn set_hover(&mut self, tile: Option<TileRef>, actions: &mut Vec<Action>) {
        if self.ui.hover != tile {
            self.ui.hover = tile;
            actions.push(Action::HoverChanged(tile));
        }
    }
}

/// Append a single redraw request when anything changed.
fn finish(mut actions: Vec<Action>) -> Vec<Action> {
    if !actions.is_empty() {
        actions.push(Action::RenderNeeded);
    }
    actions
}
