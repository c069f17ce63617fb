//! Undoable edit commands and the history that executes them.
//!
//! Tools never mutate the world directly: on commit they build a
//! command and hand it to [`CommandHistory::execute`]. The history
//! treats commands as opaque units; the actual mutation (and the
//! snapshot needed to revert it) is delegated to the [`TerrainWorld`]
//! collaborator, which lives outside this crate's core.

use crate::grid::{Vec2, Vec3};
use crate::stamp::TerrainStamp;
use tracing::debug;

/// Opaque token the world hands back from a mutation, sufficient to
/// restore the pre-mutation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSnapshot(pub u64);

/// The narrow contract commands hold against the surrounding terrain
/// system.
pub trait TerrainWorld {
    /// Applies a stamp at `position` (cell-minimum corner), shifting
    /// its heights by `z_offset`. Returns a snapshot of the state the
    /// edit replaced.
    fn apply_stamp(
        &mut self,
        stamp: &TerrainStamp,
        position: Vec2,
        include_objects: bool,
        blend_edges: bool,
        z_offset: f32,
    ) -> WorldSnapshot;

    /// Traces a road between two snapped grid vertices. How the world
    /// fills in the cells between them is its own business.
    fn trace_road(&mut self, start: Vec3, end: Vec3) -> WorldSnapshot;

    /// Restores a previously returned snapshot.
    fn restore(&mut self, snapshot: WorldSnapshot);
}

/// One undoable unit of work.
pub trait EditCommand {
    fn label(&self) -> &str;
    fn apply(&mut self, world: &mut dyn TerrainWorld);
    fn revert(&mut self, world: &mut dyn TerrainWorld);
}

/// Stamps a rotated terrain patch onto the world.
pub struct PasteStampCommand {
    pub stamp: TerrainStamp,
    pub position: Vec2,
    pub include_objects: bool,
    pub blend_edges: bool,
    pub z_offset: f32,
    snapshot: Option<WorldSnapshot>,
}

impl PasteStampCommand {
    pub fn new(
        stamp: TerrainStamp,
        position: Vec2,
        include_objects: bool,
        blend_edges: bool,
        z_offset: f32,
    ) -> Self {
        PasteStampCommand {
            stamp,
            position,
            include_objects,
            blend_edges,
            z_offset,
            snapshot: None,
        }
    }
}

impl EditCommand for PasteStampCommand {
    fn label(&self) -> &str {
        "Paste stamp"
    }

    fn apply(&mut self, world: &mut dyn TerrainWorld) {
        self.snapshot = Some(world.apply_stamp(
            &self.stamp,
            self.position,
            self.include_objects,
            self.blend_edges,
            self.z_offset,
        ));
    }

    fn revert(&mut self, world: &mut dyn TerrainWorld) {
        if let Some(snapshot) = self.snapshot.take() {
            world.restore(snapshot);
        }
    }
}

/// Traces a connected road between two grid vertices.
pub struct RoadLineCommand {
    pub start: Vec3,
    pub end: Vec3,
    snapshot: Option<WorldSnapshot>,
}

impl RoadLineCommand {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        RoadLineCommand {
            start,
            end,
            snapshot: None,
        }
    }
}

impl EditCommand for RoadLineCommand {
    fn label(&self) -> &str {
        "Road line"
    }

    fn apply(&mut self, world: &mut dyn TerrainWorld) {
        self.snapshot = Some(world.trace_road(self.start, self.end));
    }

    fn revert(&mut self, world: &mut dyn TerrainWorld) {
        if let Some(snapshot) = self.snapshot.take() {
            world.restore(snapshot);
        }
    }
}

/// Linear undo/redo history. Executing a new command invalidates the
/// redo stack.
#[derive(Default)]
pub struct CommandHistory {
    undo_stack: Vec<Box<dyn EditCommand>>,
    redo_stack: Vec<Box<dyn EditCommand>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        CommandHistory::default()
    }

    pub fn execute(&mut self, mut command: Box<dyn EditCommand>, world: &mut dyn TerrainWorld) {
        debug!(label = command.label(), "executing command");
        command.apply(world);
        self.redo_stack.clear();
        self.undo_stack.push(command);
    }

    /// Reverts the most recent command. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self, world: &mut dyn TerrainWorld) -> bool {
        match self.undo_stack.pop() {
            Some(mut command) => {
                debug!(label = command.label(), "undoing command");
                command.revert(world);
                self.redo_stack.push(command);
                true
            }
            None => false,
        }
    }

    /// Re-applies the most recently undone command.
    pub fn redo(&mut self, world: &mut dyn TerrainWorld) -> bool {
        match self.redo_stack.pop() {
            Some(mut command) => {
                command.apply(world);
                self.undo_stack.push(command);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
