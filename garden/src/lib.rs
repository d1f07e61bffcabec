//! Interaction and addressing core for the garden layout editor.
//!
//! The crate turns a tile map and an object catalog into an editable garden:
//! it decides which cells can hold objects, tracks what sits where, drives a
//! clamped pan/zoom camera from pointer, wheel and key input, and reads and
//! writes the game's save schema. It does no I/O and no drawing; the host
//! loads the inputs, forwards events to [`engine::EngineCore`], and acts on
//! the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The editing session and the event dispatch |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`grid`] | Tile map model and layer lookup |
//! | [`index`] | Global ↔ local tile addressing |
//! | [`bounds`] | Render area and garden box |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`hit`] | Screen point to tile |
//! | [`catalog`] | Object metadata and categories |
//! | [`placement`] | The placement store |
//! | [`codec`] | Save schema import and export |
//! | [`preview`] | Generation-counted preview slot |
//! | [`render`] | Draw list and draw order |
//! | [`consts`] | Shared numeric constants |

pub mod bounds;
pub mod camera;
pub mod catalog;
pub mod codec;
pub mod consts;
pub mod engine;
pub mod grid;
pub mod hit;
pub mod index;
pub mod input;
pub mod placement;
pub mod preview;
pub mod render;
