//! Interactive editing tools and the host contract that drives them.
//!
//! A host dispatches per-frame input (pointer move/down/up plus a tick
//! update) into whichever tool is active. Handlers run to completion on
//! a single logical thread; switching tools deactivates the old tool
//! synchronously, discarding any in-flight session state with no
//! partial commit. A handler returns `true` only when it consumed the
//! event; invalid input (no stamp selected, no terrain under the
//! pointer) returns `false` and leaves state unchanged.

pub mod line;
pub mod paste;

pub use line::RoadLineTool;
pub use paste::{PasteTool, PlacementStage};

use crate::grid::{HeightSampler, HeightTable, Vec2, Vec3};
use crate::history::{CommandHistory, TerrainWorld};
use crate::stamp::TerrainStamp;

/// Result of ray-casting the pointer against the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainHit {
    /// World-space intersection point.
    pub position: Vec3,
    /// Grid vertex closest to the intersection.
    pub nearest_vertex: Vec2,
}

/// Pointer snapshot delivered with every input event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseState {
    /// Raw screen-space pointer position.
    pub position: Vec2,
    /// Terrain intersection, if the pointer is over terrain.
    pub terrain_hit: Option<TerrainHit>,
    pub left_pressed: bool,
    pub right_pressed: bool,
}

/// Scene-side preview surface the tools push their transient state to.
/// Rendering itself happens outside this crate.
pub trait ScenePreview {
    /// Shows (or clears, with `None`) the translucent stamp preview at
    /// `position`, elevation-shifted by `z_offset`.
    fn set_stamp_preview(&mut self, stamp: Option<&TerrainStamp>, position: Vec2, z_offset: f32);

    /// Highlights a set of grid vertices (the road path preview).
    fn set_active_vertices(&mut self, vertices: &[Vec2]);
}

/// Collaborators a tool needs while handling one event. Borrowed per
/// call so tools hold no references between events.
pub struct ToolContext<'a> {
    pub oracle: &'a dyn HeightSampler,
    pub height_table: &'a HeightTable,
    pub scene: &'a mut dyn ScenePreview,
    pub history: &'a mut CommandHistory,
    pub world: &'a mut dyn TerrainWorld,
}

/// Per-frame/per-event contract between the host and a tool.
pub trait Tool {
    fn on_activated(&mut self, ctx: &mut ToolContext<'_>);
    fn on_deactivated(&mut self, ctx: &mut ToolContext<'_>);

    /// Per-tick update, called once per frame regardless of input.
    fn update(&mut self, ctx: &mut ToolContext<'_>, _delta_seconds: f64) {
        let _ = ctx;
    }

    fn handle_mouse_move(&mut self, ctx: &mut ToolContext<'_>, mouse: &MouseState) -> bool;
    fn handle_mouse_down(&mut self, ctx: &mut ToolContext<'_>, mouse: &MouseState) -> bool;
    fn handle_mouse_up(&mut self, ctx: &mut ToolContext<'_>, mouse: &MouseState) -> bool;
}
