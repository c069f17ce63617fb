//! Pure rotation transforms over [`TerrainStamp`] patches.
//!
//! Rotations always derive from the canonical 0-degree source: callers
//! track "degrees applied" themselves and call back in here whenever
//! the base stamp or the angle changes, rather than composing
//! incremental rotations (which would accumulate nothing but bugs in
//! the parallel arrays).
//!
//! The defining correctness property: four 90-degree rotations, or any
//! combination summing to 360, reproduce the source element-for-element.

use crate::stamp::TerrainStamp;

/// Quarter-turn rotation angles, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Maps a degree count (multiple of 90, mod 360) to a rotation.
    /// Returns `None` for 0, which is the identity.
    pub fn from_degrees(degrees: u32) -> Option<Rotation> {
        match degrees % 360 {
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// Returns a rotated copy of `stamp`. The input is never mutated.
pub fn rotate(stamp: &TerrainStamp, rotation: Rotation) -> TerrainStamp {
    match rotation {
        Rotation::Deg90 => rotate_90(stamp),
        Rotation::Deg180 => rotate_180(stamp),
        Rotation::Deg270 => rotate_270(stamp),
    }
}

/// Convenience wrapper taking raw degrees; 0 (or any non-quarter-turn
/// value) returns an unrotated clone.
pub fn rotated(stamp: &TerrainStamp, degrees: u32) -> TerrainStamp {
    match Rotation::from_degrees(degrees) {
        Some(r) => rotate(stamp, r),
        None => stamp.clone(),
    }
}

/// Remaps both parallel arrays with a single index function: the
/// geometry of the rotation is decided once and applied identically to
/// heights and terrain-type words.
fn remap(
    stamp: &TerrainStamp,
    new_w: u32,
    new_h: u32,
    src_index: impl Fn(u32, u32) -> usize,
) -> TerrainStamp {
    let count = (new_w as usize) * (new_h as usize);
    let mut heights = Vec::with_capacity(count);
    let mut terrain_types = Vec::with_capacity(count);

    let old_heights = stamp.heights();
    let old_types = stamp.terrain_types();

    // Column-major fill: x outer, y inner.
    for x in 0..new_w {
        for y in 0..new_h {
            let src = src_index(x, y);
            heights.push(old_heights[src]);
            terrain_types.push(old_types[src]);
        }
    }

    let mut out = TerrainStamp::new(new_w, new_h, heights, terrain_types, stamp.name.clone())
        .expect("remap preserves the per-vertex array invariant");
    out.description = stamp.description.clone();
    out.created = stamp.created;
    out
}

/// 90 degrees clockwise: width and height swap; destination (x, y)
/// reads source (y, h - 1 - x).
fn rotate_90(stamp: &TerrainStamp) -> TerrainStamp {
    let h = stamp.height_in_vertices();
    remap(
        stamp,
        stamp.height_in_vertices(),
        stamp.width_in_vertices(),
        |x, y| (y as usize) * (h as usize) + (h - 1 - x) as usize,
    )
}

/// 180 degrees: dimensions unchanged; every vertex maps to its point
/// reflection across the patch center.
fn rotate_180(stamp: &TerrainStamp) -> TerrainStamp {
    let w = stamp.width_in_vertices();
    let h = stamp.height_in_vertices();
    remap(stamp, w, h, |x, y| {
        ((w - 1 - x) as usize) * (h as usize) + (h - 1 - y) as usize
    })
}

/// 270 degrees clockwise (90 counter-clockwise): the inverse mapping
/// of [`rotate_90`], written directly rather than as three quarter
/// turns.
fn rotate_270(stamp: &TerrainStamp) -> TerrainStamp {
    let w = stamp.width_in_vertices();
    let h = stamp.height_in_vertices();
    remap(
        stamp,
        h,
        w,
        |x, y| ((w - 1 - y) as usize) * (h as usize) + x as usize,
    )
}
