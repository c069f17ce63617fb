//! Grid geometry shared by the editing tools.
//!
//! The world is a heightmapped grid with a fixed cell size of 24 world
//! units. Stamp placement anchors to the minimum corner of a cell
//! (floor snapping); road tracing anchors to the nearest grid vertex
//! (round snapping). Both helpers live here so the two tools cannot
//! drift apart on the cell size.

use serde::{Deserialize, Serialize};

/// Edge length of one terrain grid cell, in world units.
pub const CELL_SIZE: f32 = 24.0;

/// A 2D world- or screen-space point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

/// A 3D world-space point (z is elevation).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    /// Drops the elevation component.
    pub const fn xy(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }
}

/// Snaps a coordinate down to the cell's minimum corner.
///
/// Used by stamp placement: the preview anchor is always the lower-left
/// corner of the hovered cell, never the closest corner.
pub fn snap_floor(v: f32) -> f32 {
    (v / CELL_SIZE).floor() * CELL_SIZE
}

/// Snaps a coordinate to the nearest grid vertex.
///
/// Used by road tracing. Exactly-halfway coordinates round away from
/// zero, so repeated calls with the same input always agree.
pub fn snap_nearest(v: f32) -> f32 {
    (v / CELL_SIZE).round() * CELL_SIZE
}

/// Converts a world coordinate to its nearest grid-cell index.
pub fn world_to_cell(v: f32) -> i32 {
    (v / CELL_SIZE).round() as i32
}

/// Converts a grid-cell index back to a world coordinate.
pub fn cell_to_world(c: i32) -> f32 {
    c as f32 * CELL_SIZE
}

/// Interpolated terrain-height query, answered by the surrounding
/// terrain system. The tools only ever read from it.
pub trait HeightSampler {
    /// Interpolated terrain elevation at world (x, y).
    fn height_at(&self, x: f32, y: f32) -> f32;
}

/// Fixed lookup table converting a discretized height index (as stored
/// per-vertex in a stamp) into a world-space elevation.
#[derive(Debug, Clone)]
pub struct HeightTable {
    entries: Box<[f32; 256]>,
}

impl HeightTable {
    pub fn new(entries: [f32; 256]) -> Self {
        HeightTable {
            entries: Box::new(entries),
        }
    }

    /// A table where each index maps to `index * step`. Handy for tests
    /// and for worlds with uniform height quantization.
    pub fn linear(step: f32) -> Self {
        let mut entries = [0.0f32; 256];
        for (i, e) in entries.iter_mut().enumerate() {
            *e = i as f32 * step;
        }
        HeightTable {
            entries: Box::new(entries),
        }
    }

    pub fn elevation(&self, index: u8) -> f32 {
        self.entries[index as usize]
    }
}
