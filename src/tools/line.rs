//! Line tool: traces a connected road skeleton between two grid
//! vertices.
//!
//! The preview path is a diagonal-first 8-connected grid walk, *not* a
//! Bresenham line: each step moves diagonally while both axes still
//! differ from the target, then finishes along the remaining axis.
//! For strongly non-square deltas the walk drifts from the geometric
//! straight line. Downstream road-mesh generation depends on this exact
//! vertex sequence, so changing the stepping rule is a behavior change,
//! not a bug fix.

use crate::grid::{cell_to_world, snap_nearest, world_to_cell, HeightSampler, Vec2, Vec3};
use crate::history::RoadLineCommand;
use crate::tools::{MouseState, TerrainHit, Tool, ToolContext};
use tracing::debug;

#[derive(Default)]
pub struct RoadLineTool {
    drawing: bool,
    start: Option<Vec3>,
    end: Option<Vec3>,
    preview_vertices: Vec<Vec3>,
    current_hit: Option<TerrainHit>,
}

impl RoadLineTool {
    pub fn new() -> Self {
        RoadLineTool::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn preview_vertices(&self) -> &[Vec3] {
        &self.preview_vertices
    }

    fn cancel(&mut self) {
        self.drawing = false;
        self.start = None;
        self.end = None;
        self.preview_vertices.clear();
    }

    /// Snaps a world point to the nearest grid vertex and re-samples
    /// its elevation there.
    fn snap_to_nearest_vertex(position: Vec3, oracle: &dyn HeightSampler) -> Vec3 {
        let x = snap_nearest(position.x);
        let y = snap_nearest(position.y);
        Vec3::new(x, y, oracle.height_at(x, y))
    }

    fn regenerate_preview(&mut self, oracle: &dyn HeightSampler) {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return;
        };
        self.preview_vertices = generate_optimal_path(
            world_to_cell(start.x),
            world_to_cell(start.y),
            world_to_cell(end.x),
            world_to_cell(end.y),
            oracle,
        );
    }
}

/// Walks the grid from the start cell to the end cell, stepping
/// diagonally while both axes still have remaining delta and straight
/// along the last axis otherwise. Produces `max(|dx|, |dy|)` segments
/// after the start point, each advancing at least one axis by exactly
/// one cell; no axis ever overshoots its target.
pub fn generate_optimal_path(
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
    oracle: &dyn HeightSampler,
) -> Vec<Vec3> {
    let mut current_x = start_x;
    let mut current_y = start_y;

    let sample = |cx: i32, cy: i32| {
        let x = cell_to_world(cx);
        let y = cell_to_world(cy);
        Vec3::new(x, y, oracle.height_at(x, y))
    };

    let mut path = vec![sample(current_x, current_y)];

    while current_x != end_x || current_y != end_y {
        let delta_x = (end_x - current_x).signum();
        let delta_y = (end_y - current_y).signum();

        if delta_x != 0 && delta_y != 0 {
            current_x += delta_x;
            current_y += delta_y;
        } else if delta_x != 0 {
            current_x += delta_x;
        } else {
            current_y += delta_y;
        }

        path.push(sample(current_x, current_y));
    }

    path
}

impl Tool for RoadLineTool {
    fn on_activated(&mut self, ctx: &mut ToolContext<'_>) {
        self.cancel();
        self.current_hit = None;
        ctx.scene.set_active_vertices(&[]);
    }

    fn on_deactivated(&mut self, ctx: &mut ToolContext<'_>) {
        // Switching tools mid-draw behaves as a right-click cancel.
        self.cancel();
        self.current_hit = None;
        ctx.scene.set_active_vertices(&[]);
    }

    fn update(&mut self, ctx: &mut ToolContext<'_>, _delta_seconds: f64) {
        if self.drawing && !self.preview_vertices.is_empty() {
            let highlights: Vec<Vec2> =
                self.preview_vertices.iter().map(|v| v.xy()).collect();
            ctx.scene.set_active_vertices(&highlights);
        } else if let Some(hit) = self.current_hit {
            // Not drawing yet: highlight the grid vertex under the
            // pointer so the operator can see where a line would start.
            ctx.scene.set_active_vertices(&[hit.nearest_vertex]);
        } else {
            ctx.scene.set_active_vertices(&[]);
        }
    }

    fn handle_mouse_move(&mut self, ctx: &mut ToolContext<'_>, mouse: &MouseState) -> bool {
        let Some(hit) = mouse.terrain_hit else {
            return false;
        };
        self.current_hit = Some(hit);

        if self.drawing {
            self.end = Some(Self::snap_to_nearest_vertex(hit.position, ctx.oracle));
            self.regenerate_preview(ctx.oracle);
            return true;
        }
        false
    }

    fn handle_mouse_down(&mut self, ctx: &mut ToolContext<'_>, mouse: &MouseState) -> bool {
        let Some(hit) = mouse.terrain_hit else {
            return false;
        };

        if mouse.left_pressed {
            if !self.drawing {
                let snapped = Self::snap_to_nearest_vertex(hit.position, ctx.oracle);
                self.start = Some(snapped);
                self.end = Some(snapped);
                self.drawing = true;
                self.preview_vertices.clear();
                return true;
            } else if let (Some(start), Some(_)) = (self.start, self.end) {
                let end = Self::snap_to_nearest_vertex(hit.position, ctx.oracle);
                debug!(
                    start_x = start.x,
                    start_y = start.y,
                    end_x = end.x,
                    end_y = end.y,
                    "committing road line"
                );
                ctx.history
                    .execute(Box::new(RoadLineCommand::new(start, end)), ctx.world);
                self.cancel();
                return true;
            }
        }

        if mouse.right_pressed && self.drawing {
            self.cancel();
            return true;
        }

        false
    }

    fn handle_mouse_up(&mut self, _ctx: &mut ToolContext<'_>, _mouse: &MouseState) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatOracle(f32);

    impl HeightSampler for FlatOracle {
        fn height_at(&self, _x: f32, _y: f32) -> f32 {
            self.0
        }
    }

    #[test]
    fn path_length_is_chebyshev_distance() {
        let oracle = FlatOracle(1.5);
        let path = generate_optimal_path(0, 0, 3, 5, &oracle);
        // Start plus max(3, 5) steps.
        assert_eq!(path.len(), 6);
        assert_eq!(path[0], Vec3::new(0.0, 0.0, 1.5));
        assert_eq!(path.last().unwrap().xy(), Vec2::new(72.0, 120.0));
    }

    #[test]
    fn each_step_moves_one_cell_without_overshoot() {
        let oracle = FlatOracle(0.0);
        let path = generate_optimal_path(2, -1, -4, 7, &oracle);
        for pair in path.windows(2) {
            let dx = (world_to_cell(pair[1].x) - world_to_cell(pair[0].x)).abs();
            let dy = (world_to_cell(pair[1].y) - world_to_cell(pair[0].y)).abs();
            assert!(dx <= 1 && dy <= 1);
            assert!(dx + dy >= 1);
        }
        for p in &path {
            // X runs from 2 down to -4, Y from -1 up to 7; neither axis
            // may leave its interval.
            let cx = world_to_cell(p.x);
            let cy = world_to_cell(p.y);
            assert!((-4..=2).contains(&cx));
            assert!((-1..=7).contains(&cy));
        }
    }

    #[test]
    fn diagonal_first_walk_drifts_from_bresenham() {
        // (0,0) -> (1,10): the diagonal step happens immediately, then
        // the walk runs straight up the Y axis. A Bresenham line would
        // defer the X step toward the middle. This sequence is
        // load-bearing for road meshing; keep it.
        let oracle = FlatOracle(0.0);
        let path = generate_optimal_path(0, 0, 1, 10, &oracle);
        assert_eq!(path.len(), 11);
        assert_eq!(world_to_cell(path[1].x), 1);
        assert_eq!(world_to_cell(path[1].y), 1);
        for (i, p) in path.iter().enumerate().skip(1) {
            assert_eq!(world_to_cell(p.x), 1);
            assert_eq!(world_to_cell(p.y), i as i32);
        }
    }

    #[test]
    fn equal_deltas_step_diagonally_every_iteration() {
        let oracle = FlatOracle(0.0);
        let path = generate_optimal_path(0, 0, 4, 4, &oracle);
        assert_eq!(path.len(), 5);
        for (i, p) in path.iter().enumerate() {
            assert_eq!(world_to_cell(p.x), i as i32);
            assert_eq!(world_to_cell(p.y), i as i32);
        }
    }

    #[test]
    fn degenerate_path_is_single_point() {
        let oracle = FlatOracle(3.0);
        let path = generate_optimal_path(5, 5, 5, 5, &oracle);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].z, 3.0);
    }
}
