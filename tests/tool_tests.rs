//! End-to-end tool flows against mock collaborators: the paste tool's
//! two-click placement cycle and the line tool's draw/commit/cancel
//! cycle.

use landsculpt::grid::{HeightSampler, HeightTable, Vec2, Vec3};
use landsculpt::history::{CommandHistory, TerrainWorld, WorldSnapshot};
use landsculpt::stamp::TerrainStamp;
use landsculpt::tools::{
    MouseState, PasteTool, PlacementStage, RoadLineTool, ScenePreview, TerrainHit, Tool,
    ToolContext,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Flat world at a fixed elevation.
struct PlaneOracle(f32);

impl HeightSampler for PlaneOracle {
    fn height_at(&self, _x: f32, _y: f32) -> f32 {
        self.0
    }
}

/// Records every preview push so tests can assert on the last one.
#[derive(Default)]
struct RecordingScene {
    stamp_preview: Option<(String, Vec2, f32)>,
    preview_pushes: usize,
    active_vertices: Vec<Vec2>,
}

impl ScenePreview for RecordingScene {
    fn set_stamp_preview(&mut self, stamp: Option<&TerrainStamp>, position: Vec2, z_offset: f32) {
        self.preview_pushes += 1;
        self.stamp_preview = stamp.map(|s| (s.name.clone(), position, z_offset));
    }

    fn set_active_vertices(&mut self, vertices: &[Vec2]) {
        self.active_vertices = vertices.to_vec();
    }
}

/// Records committed edits; snapshots are sequential tokens.
#[derive(Default)]
struct RecordingWorld {
    next_snapshot: u64,
    pastes: Vec<(String, Vec2, bool, bool, f32)>,
    roads: Vec<(Vec3, Vec3)>,
}

impl TerrainWorld for RecordingWorld {
    fn apply_stamp(
        &mut self,
        stamp: &TerrainStamp,
        position: Vec2,
        include_objects: bool,
        blend_edges: bool,
        z_offset: f32,
    ) -> WorldSnapshot {
        self.pastes.push((
            stamp.name.clone(),
            position,
            include_objects,
            blend_edges,
            z_offset,
        ));
        self.next_snapshot += 1;
        WorldSnapshot(self.next_snapshot)
    }

    fn trace_road(&mut self, start: Vec3, end: Vec3) -> WorldSnapshot {
        self.roads.push((start, end));
        self.next_snapshot += 1;
        WorldSnapshot(self.next_snapshot)
    }

    fn restore(&mut self, _snapshot: WorldSnapshot) {}
}

struct Harness {
    oracle: PlaneOracle,
    table: HeightTable,
    scene: RecordingScene,
    history: CommandHistory,
    world: RecordingWorld,
}

impl Harness {
    fn new(elevation: f32) -> Self {
        init_tracing();
        Harness {
            oracle: PlaneOracle(elevation),
            table: HeightTable::linear(1.0),
            scene: RecordingScene::default(),
            history: CommandHistory::new(),
            world: RecordingWorld::default(),
        }
    }

    fn ctx(&mut self) -> ToolContext<'_> {
        ToolContext {
            oracle: &self.oracle,
            height_table: &self.table,
            scene: &mut self.scene,
            history: &mut self.history,
            world: &mut self.world,
        }
    }
}

fn hit_at(x: f32, y: f32, z: f32) -> MouseState {
    MouseState {
        position: Vec2::new(400.0, 300.0),
        terrain_hit: Some(TerrainHit {
            position: Vec3::new(x, y, z),
            nearest_vertex: Vec2::new(
                (x / 24.0).round() * 24.0,
                (y / 24.0).round() * 24.0,
            ),
        }),
        left_pressed: false,
        right_pressed: false,
    }
}

fn test_stamp(base_height: u8) -> TerrainStamp {
    let mut heights = vec![base_height; 9];
    heights[4] = base_height.saturating_add(5);
    TerrainStamp::new(3, 3, heights, vec![0; 9], "plateau").unwrap()
}

// ─── Paste tool ─────────────────────────────────────────────────────

#[test]
fn paste_two_click_cycle_commits_exactly_one_command() {
    let mut h = Harness::new(40.0);
    let mut tool = PasteTool::new();

    // Stamp base vertex has height index 10 -> elevation 10 in the
    // linear table, so auto alignment on a 40-high plane is +30.
    tool.select_stamp(&mut h.ctx(), Some(test_stamp(10)));
    tool.on_activated(&mut h.ctx());
    assert_eq!(tool.stage(), PlacementStage::Positioning);

    // Positioning: hit at (50, 30.5) floor-snaps to cell corner (48, 24).
    let mouse = hit_at(50.0, 30.5, 40.0);
    assert!(tool.handle_mouse_move(&mut h.ctx(), &mouse));
    let (_, pos, z) = h.scene.stamp_preview.clone().unwrap();
    assert_eq!(pos, Vec2::new(48.0, 24.0));
    assert_eq!(z, 30.0);

    // First click: lock X/Y, enter blending.
    let mut down = mouse;
    down.left_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &down));
    assert_eq!(tool.stage(), PlacementStage::Blending);
    assert!(h.world.pastes.is_empty());

    // Blending: position is frozen, vertical drag only moves Z.
    // 40 pixels up at 0.1 sensitivity is +4 elevation.
    let mut drag = hit_at(500.0, 500.0, 40.0);
    drag.position = Vec2::new(400.0, 260.0);
    assert!(tool.handle_mouse_move(&mut h.ctx(), &drag));
    let (_, pos, z) = h.scene.stamp_preview.clone().unwrap();
    assert_eq!(pos, Vec2::new(48.0, 24.0), "position must stay locked");
    assert_eq!(z, 34.0);

    // Second click: commit.
    let mut commit = drag;
    commit.left_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &commit));
    assert_eq!(h.world.pastes.len(), 1);
    let (name, pos, include_objects, blend_edges, z) = h.world.pastes[0].clone();
    assert_eq!(name, "plateau");
    assert_eq!(pos, Vec2::new(48.0, 24.0));
    assert!(include_objects);
    assert!(!blend_edges);
    assert_eq!(z, 34.0);

    // Back to positioning with the manual offset reset: the next move
    // reports pure auto alignment again.
    assert_eq!(tool.stage(), PlacementStage::Positioning);
    assert!(tool.handle_mouse_move(&mut h.ctx(), &hit_at(10.0, 10.0, 40.0)));
    let (_, pos, z) = h.scene.stamp_preview.clone().unwrap();
    assert_eq!(pos, Vec2::new(0.0, 0.0));
    assert_eq!(z, 30.0);

    // The selection survives, ready for a second placement.
    assert!(tool.selected_stamp().is_some());
    assert!(h.history.can_undo());
}

#[test]
fn paste_without_selection_is_a_noop_that_clears_preview() {
    let mut h = Harness::new(0.0);
    let mut tool = PasteTool::new();

    // Seed a stale preview, then drop the selection.
    tool.select_stamp(&mut h.ctx(), Some(test_stamp(0)));
    tool.select_stamp(&mut h.ctx(), None);
    assert!(h.scene.stamp_preview.is_none());

    assert!(!tool.handle_mouse_move(&mut h.ctx(), &hit_at(5.0, 5.0, 0.0)));
    let mut down = hit_at(5.0, 5.0, 0.0);
    down.left_pressed = true;
    assert!(!tool.handle_mouse_down(&mut h.ctx(), &down));
    assert!(h.world.pastes.is_empty());
    assert!(h.scene.stamp_preview.is_none());
}

#[test]
fn paste_positioning_requires_a_terrain_hit() {
    let mut h = Harness::new(12.0);
    let mut tool = PasteTool::new();
    tool.select_stamp(&mut h.ctx(), Some(test_stamp(2)));

    let off_terrain = MouseState {
        position: Vec2::new(10.0, 10.0),
        ..MouseState::default()
    };
    assert!(!tool.handle_mouse_move(&mut h.ctx(), &off_terrain));
    assert_eq!(tool.stage(), PlacementStage::Positioning);
}

#[test]
fn rotation_rederives_from_base_and_resets_cycle() {
    let mut h = Harness::new(0.0);
    let mut tool = PasteTool::new();

    // 2x3 stamp so quarter turns are visible in the preview dimensions.
    let stamp = TerrainStamp::new(2, 3, vec![1; 6], vec![0; 6], "ramp").unwrap();
    tool.select_stamp(&mut h.ctx(), Some(stamp));

    // Enter blending, then rotate: the cycle must reset.
    let mut down = hit_at(0.0, 0.0, 0.0);
    down.left_pressed = true;
    assert!(tool.handle_mouse_move(&mut h.ctx(), &down));
    assert!(tool.handle_mouse_down(&mut h.ctx(), &down));
    assert_eq!(tool.stage(), PlacementStage::Blending);

    tool.rotate_clockwise(&mut h.ctx());
    assert_eq!(tool.rotation_degrees(), 90);
    assert_eq!(tool.stage(), PlacementStage::Positioning);

    // Four clockwise turns land back on the base orientation.
    tool.rotate_clockwise(&mut h.ctx());
    tool.rotate_clockwise(&mut h.ctx());
    tool.rotate_clockwise(&mut h.ctx());
    assert_eq!(tool.rotation_degrees(), 0);

    // Counter-clockwise wraps the other way.
    tool.rotate_counterclockwise(&mut h.ctx());
    assert_eq!(tool.rotation_degrees(), 270);
}

#[test]
fn paste_deactivation_clears_preview_and_stage() {
    let mut h = Harness::new(0.0);
    let mut tool = PasteTool::new();
    tool.select_stamp(&mut h.ctx(), Some(test_stamp(3)));

    let mut down = hit_at(30.0, 30.0, 0.0);
    assert!(tool.handle_mouse_move(&mut h.ctx(), &down));
    down.left_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &down));
    assert_eq!(tool.stage(), PlacementStage::Blending);

    tool.on_deactivated(&mut h.ctx());
    assert_eq!(tool.stage(), PlacementStage::Positioning);
    assert!(h.scene.stamp_preview.is_none());
    assert!(h.world.pastes.is_empty());
}

// ─── Line tool ──────────────────────────────────────────────────────

#[test]
fn line_draw_and_commit_carries_snapped_endpoints() {
    let mut h = Harness::new(7.0);
    let mut tool = RoadLineTool::new();
    tool.on_activated(&mut h.ctx());
    assert!(!tool.is_drawing());

    // Start: (50, 30.5) snaps to the nearest vertex (48, 24).
    let mut down = hit_at(50.0, 30.5, 7.0);
    down.left_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &down));
    assert!(tool.is_drawing());

    // Drag out to (98, 121): nearest vertex (96, 120), i.e. 2 cells
    // over and 4 up. Diagonal-first walk: 4 segments after the start.
    assert!(tool.handle_mouse_move(&mut h.ctx(), &hit_at(98.0, 121.0, 7.0)));
    assert_eq!(tool.preview_vertices().len(), 5);
    tool.update(&mut h.ctx(), 1.0 / 60.0);
    assert_eq!(h.scene.active_vertices.len(), 5);
    assert_eq!(h.scene.active_vertices[0], Vec2::new(48.0, 24.0));

    // Second click commits only the endpoints; the in-between strategy
    // belongs to the command's executor.
    let mut commit = hit_at(98.0, 121.0, 7.0);
    commit.left_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &commit));
    assert_eq!(h.world.roads.len(), 1);
    let (start, end) = h.world.roads[0];
    assert_eq!(start, Vec3::new(48.0, 24.0, 7.0));
    assert_eq!(end, Vec3::new(96.0, 120.0, 7.0));

    assert!(!tool.is_drawing());
    assert!(tool.preview_vertices().is_empty());
    // Back to the idle hover highlight: just the vertex under the
    // pointer, not the old path.
    tool.update(&mut h.ctx(), 1.0 / 60.0);
    assert_eq!(h.scene.active_vertices, vec![Vec2::new(96.0, 120.0)]);
}

#[test]
fn line_idle_hover_highlights_nearest_vertex() {
    let mut h = Harness::new(0.0);
    let mut tool = RoadLineTool::new();
    tool.on_activated(&mut h.ctx());

    // No pointer yet: nothing highlighted.
    tool.update(&mut h.ctx(), 1.0 / 60.0);
    assert!(h.scene.active_vertices.is_empty());

    // Hovering (not drawing) highlights the single nearest vertex.
    assert!(!tool.handle_mouse_move(&mut h.ctx(), &hit_at(50.0, 30.5, 0.0)));
    tool.update(&mut h.ctx(), 1.0 / 60.0);
    assert_eq!(h.scene.active_vertices, vec![Vec2::new(48.0, 24.0)]);

    // Deactivation drops both the hover highlight and the hit.
    tool.on_deactivated(&mut h.ctx());
    assert!(h.scene.active_vertices.is_empty());
    tool.update(&mut h.ctx(), 1.0 / 60.0);
    assert!(h.scene.active_vertices.is_empty());
}

#[test]
fn line_right_click_cancels_without_a_command() {
    let mut h = Harness::new(0.0);
    let mut tool = RoadLineTool::new();
    tool.on_activated(&mut h.ctx());

    let mut down = hit_at(0.0, 0.0, 0.0);
    down.left_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &down));
    assert!(tool.handle_mouse_move(&mut h.ctx(), &hit_at(100.0, 0.0, 0.0)));
    assert!(tool.is_drawing());

    let mut cancel = hit_at(100.0, 0.0, 0.0);
    cancel.right_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &cancel));
    assert!(!tool.is_drawing());
    assert!(tool.preview_vertices().is_empty());
    assert!(h.world.roads.is_empty());
}

#[test]
fn line_deactivation_behaves_like_cancel() {
    let mut h = Harness::new(0.0);
    let mut tool = RoadLineTool::new();
    tool.on_activated(&mut h.ctx());

    let mut down = hit_at(24.0, 24.0, 0.0);
    down.left_pressed = true;
    assert!(tool.handle_mouse_down(&mut h.ctx(), &down));
    assert!(tool.is_drawing());

    tool.on_deactivated(&mut h.ctx());
    assert!(!tool.is_drawing());
    assert!(h.world.roads.is_empty());
    assert!(h.scene.active_vertices.is_empty());
}

#[test]
fn line_ignores_input_off_terrain() {
    let mut h = Harness::new(0.0);
    let mut tool = RoadLineTool::new();
    tool.on_activated(&mut h.ctx());

    let off = MouseState {
        left_pressed: true,
        ..MouseState::default()
    };
    assert!(!tool.handle_mouse_down(&mut h.ctx(), &off));
    assert!(!tool.is_drawing());
    assert!(!tool.handle_mouse_move(&mut h.ctx(), &off));
}
