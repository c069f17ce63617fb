//! Paste tool: stamps a rotated terrain patch onto the world.
//!
//! Placement is a two-click flow. The first click locks the stamp's
//! X/Y position and enters the blending stage, where vertical pointer
//! movement adjusts a manual elevation offset on top of the computed
//! auto-alignment. The second click commits. Splitting the X/Y lock
//! from the Z adjustment lets an operator line a patch up against
//! uneven terrain before committing its height, with no numeric input
//! widget involved.

use crate::grid::{snap_floor, Vec2};
use crate::history::PasteStampCommand;
use crate::stamp::TerrainStamp;
use crate::tools::{MouseState, Tool, ToolContext};
use crate::transforms;
use tracing::debug;

/// Vertical drag sensitivity while blending: world units of elevation
/// per screen pixel. Y is inverted so dragging up raises the stamp.
const Z_DRAG_SENSITIVITY: f32 = 0.1;

/// The two placement stages. Drag-start fields are only meaningful
/// while `Blending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementStage {
    #[default]
    Positioning,
    Blending,
}

#[derive(Default)]
pub struct PasteTool {
    selected_stamp: Option<TerrainStamp>,
    rotation_degrees: u32,
    rotated_stamp: Option<TerrainStamp>,

    include_objects: bool,
    blend_edges: bool,

    stage: PlacementStage,
    preview_position: Vec2,
    auto_z_offset: f32,
    manual_z_offset: f32,
    drag_start_mouse: Vec2,
    drag_start_z_offset: f32,
}

impl PasteTool {
    pub fn new() -> Self {
        PasteTool {
            include_objects: true,
            ..PasteTool::default()
        }
    }

    pub fn stage(&self) -> PlacementStage {
        self.stage
    }

    pub fn rotation_degrees(&self) -> u32 {
        self.rotation_degrees
    }

    pub fn selected_stamp(&self) -> Option<&TerrainStamp> {
        self.selected_stamp.as_ref()
    }

    pub fn include_objects(&self) -> bool {
        self.include_objects
    }

    pub fn set_include_objects(&mut self, value: bool) {
        self.include_objects = value;
    }

    pub fn blend_edges(&self) -> bool {
        self.blend_edges
    }

    pub fn set_blend_edges(&mut self, value: bool) {
        self.blend_edges = value;
    }

    /// Combined elevation offset currently shown in the preview.
    pub fn z_offset(&self) -> f32 {
        self.auto_z_offset + self.manual_z_offset
    }

    /// Selects a stamp (or clears the selection). Resets rotation to
    /// 0, returns to positioning, and pushes a fresh preview so the
    /// change is visible even before the pointer moves again.
    pub fn select_stamp(&mut self, ctx: &mut ToolContext<'_>, stamp: Option<TerrainStamp>) {
        self.selected_stamp = stamp;
        self.rotation_degrees = 0;
        self.update_rotated_stamp(ctx);
    }

    pub fn rotate_clockwise(&mut self, ctx: &mut ToolContext<'_>) {
        self.set_rotation(ctx, (self.rotation_degrees + 90) % 360);
    }

    pub fn rotate_counterclockwise(&mut self, ctx: &mut ToolContext<'_>) {
        self.set_rotation(ctx, (self.rotation_degrees + 270) % 360);
    }

    pub fn set_rotation(&mut self, ctx: &mut ToolContext<'_>, degrees: u32) {
        self.rotation_degrees = degrees % 360;
        self.update_rotated_stamp(ctx);
    }

    /// Re-derives the rotated stamp from the canonical 0-degree source
    /// and resets the placement cycle. Always rotates from the base
    /// selection; rotations are never composed incrementally.
    fn update_rotated_stamp(&mut self, ctx: &mut ToolContext<'_>) {
        self.stage = PlacementStage::Positioning;
        self.manual_z_offset = 0.0;

        match &self.selected_stamp {
            Some(stamp) => {
                self.rotated_stamp = Some(transforms::rotated(stamp, self.rotation_degrees));
                ctx.scene.set_stamp_preview(
                    self.rotated_stamp.as_ref(),
                    self.preview_position,
                    self.z_offset(),
                );
            }
            None => {
                self.rotated_stamp = None;
                ctx.scene.set_stamp_preview(None, Vec2::ZERO, 0.0);
            }
        }
    }

    fn push_preview(&self, ctx: &mut ToolContext<'_>) {
        ctx.scene.set_stamp_preview(
            self.rotated_stamp.as_ref(),
            self.preview_position,
            self.z_offset(),
        );
    }
}

impl Tool for PasteTool {
    fn on_activated(&mut self, ctx: &mut ToolContext<'_>) {
        self.stage = PlacementStage::Positioning;
        self.manual_z_offset = 0.0;
        if self.rotated_stamp.is_some() {
            self.push_preview(ctx);
        }
    }

    fn on_deactivated(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.scene.set_stamp_preview(None, Vec2::ZERO, 0.0);
        self.stage = PlacementStage::Positioning;
    }

    fn handle_mouse_move(&mut self, ctx: &mut ToolContext<'_>, mouse: &MouseState) -> bool {
        let Some(rotated) = &self.rotated_stamp else {
            ctx.scene.set_stamp_preview(None, Vec2::ZERO, 0.0);
            return false;
        };

        match self.stage {
            PlacementStage::Positioning => {
                let Some(hit) = mouse.terrain_hit else {
                    return false;
                };

                self.preview_position = Vec2::new(
                    snap_floor(hit.position.x),
                    snap_floor(hit.position.y),
                );

                // Align the stamp's base vertex with the terrain under
                // the preview anchor.
                if let Some(&base_index) = rotated.heights().first() {
                    let target_z = ctx
                        .oracle
                        .height_at(self.preview_position.x, self.preview_position.y);
                    let stamp_base_z = ctx.height_table.elevation(base_index);
                    self.auto_z_offset = target_z - stamp_base_z;
                }
            }
            PlacementStage::Blending => {
                // Position is frozen; only the manual offset tracks the
                // pointer. Inverted Y: up raises the stamp.
                let delta_y = self.drag_start_mouse.y - mouse.position.y;
                self.manual_z_offset = self.drag_start_z_offset + delta_y * Z_DRAG_SENSITIVITY;
            }
        }

        self.push_preview(ctx);
        true
    }

    fn handle_mouse_down(&mut self, ctx: &mut ToolContext<'_>, mouse: &MouseState) -> bool {
        if !mouse.left_pressed {
            return false;
        }
        let Some(rotated) = &self.rotated_stamp else {
            return false;
        };

        match self.stage {
            PlacementStage::Positioning => {
                // First click: commit point for X/Y. The position can
                // no longer change this cycle.
                self.stage = PlacementStage::Blending;
                self.drag_start_mouse = mouse.position;
                self.drag_start_z_offset = self.manual_z_offset;
                true
            }
            PlacementStage::Blending => {
                let command = PasteStampCommand::new(
                    rotated.clone(),
                    self.preview_position,
                    self.include_objects,
                    self.blend_edges,
                    self.z_offset(),
                );
                ctx.history.execute(Box::new(command), ctx.world);

                debug!(
                    width = rotated.width_in_vertices(),
                    height = rotated.height_in_vertices(),
                    x = self.preview_position.x,
                    y = self.preview_position.y,
                    z_offset = self.z_offset(),
                    "stamped patch"
                );

                // Keep the selection so a second stamp can go down
                // immediately.
                self.stage = PlacementStage::Positioning;
                self.manual_z_offset = 0.0;
                true
            }
        }
    }

    fn handle_mouse_up(&mut self, _ctx: &mut ToolContext<'_>, _mouse: &MouseState) -> bool {
        false
    }
}
