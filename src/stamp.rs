//! Terrain stamps: rectangular patches of height and terrain-type data.
//!
//! A stamp stores one height index and one terrain-type word per grid
//! vertex, column-major (`index = x * height + y`). Stamps are
//! immutable once loaded; the transform engine in [`crate::transforms`]
//! produces rotated *copies* and never mutates the source.
//!
//! # File format (`.stamp`)
//!
//! ```text
//! Header (12 bytes):
//!   magic:   [u8; 4] = b"LSST"
//!   version: u32 LE  = 1
//!   raw_len: u32 LE  (uncompressed payload size)
//!
//! Payload: deflate-compressed bincode of the stamp.
//! ```
//!
//! Height/terrain arrays are mostly flat runs of repeated bytes, so
//! deflate typically shrinks a stamp file by an order of magnitude.

use chrono::{DateTime, Utc};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"LSST";
const FORMAT_VERSION: u32 = 1;

/// Number of bits the terrain-type field is shifted within a terrain
/// word, and its width.
const TERRAIN_TYPE_SHIFT: u16 = 2;
const TERRAIN_TYPE_MASK: u16 = 0x1F;

/// Errors raised while constructing or loading a stamp.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error("stamp dimensions must be positive (got {width}x{height})")]
    EmptyStamp { width: u32, height: u32 },
    #[error("stamp arrays must hold one entry per vertex: expected {expected}, got {heights} heights and {terrain_types} terrain types")]
    SizeMismatch {
        expected: usize,
        heights: usize,
        terrain_types: usize,
    },
    #[error("invalid magic bytes (expected LSST)")]
    InvalidMagic,
    #[error("unsupported stamp version: {0} (expected {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("invalid stamp data: {0}")]
    InvalidData(String),
    #[error("stamp I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rectangular patch of terrain data, applied onto the world grid by
/// the paste tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainStamp {
    width_in_vertices: u32,
    height_in_vertices: u32,
    /// Height index per vertex, column-major.
    heights: Vec<u8>,
    /// Terrain-type word per vertex, parallel to `heights`.
    terrain_types: Vec<u16>,
    pub name: String,
    pub description: String,
    pub created: DateTime<Utc>,
    /// Path the stamp was loaded from (assigned by the library).
    #[serde(skip)]
    pub filename: Option<PathBuf>,
}

impl TerrainStamp {
    /// Builds a stamp, validating the one structural invariant: both
    /// data arrays hold exactly `width * height` entries.
    pub fn new(
        width_in_vertices: u32,
        height_in_vertices: u32,
        heights: Vec<u8>,
        terrain_types: Vec<u16>,
        name: impl Into<String>,
    ) -> Result<Self, StampError> {
        if width_in_vertices == 0 || height_in_vertices == 0 {
            return Err(StampError::EmptyStamp {
                width: width_in_vertices,
                height: height_in_vertices,
            });
        }
        let expected = (width_in_vertices as usize) * (height_in_vertices as usize);
        if heights.len() != expected || terrain_types.len() != expected {
            return Err(StampError::SizeMismatch {
                expected,
                heights: heights.len(),
                terrain_types: terrain_types.len(),
            });
        }
        Ok(TerrainStamp {
            width_in_vertices,
            height_in_vertices,
            heights,
            terrain_types,
            name: name.into(),
            description: String::new(),
            created: Utc::now(),
            filename: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn width_in_vertices(&self) -> u32 {
        self.width_in_vertices
    }

    pub fn height_in_vertices(&self) -> u32 {
        self.height_in_vertices
    }

    pub fn heights(&self) -> &[u8] {
        &self.heights
    }

    pub fn terrain_types(&self) -> &[u16] {
        &self.terrain_types
    }

    /// Flat column-major index of vertex (x, y).
    #[inline]
    pub fn vertex_index(&self, x: u32, y: u32) -> usize {
        (x as usize) * (self.height_in_vertices as usize) + y as usize
    }

    pub fn height_index_at(&self, x: u32, y: u32) -> u8 {
        self.heights[self.vertex_index(x, y)]
    }

    /// The 5-bit terrain-type field of vertex (x, y).
    pub fn terrain_type_at(&self, x: u32, y: u32) -> u8 {
        ((self.terrain_types[self.vertex_index(x, y)] >> TERRAIN_TYPE_SHIFT) & TERRAIN_TYPE_MASK)
            as u8
    }

    /// Packs a terrain type into the word layout used per-vertex.
    pub fn encode_terrain_word(terrain_type: u8) -> u16 {
        (terrain_type as u16 & TERRAIN_TYPE_MASK) << TERRAIN_TYPE_SHIFT
    }

    // ─── File format ────────────────────────────────────────────────

    /// Serializes the stamp to the binary `.stamp` format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StampError> {
        let raw =
            bincode::serialize(self).map_err(|e| StampError::InvalidData(e.to_string()))?;

        let mut out = Vec::with_capacity(12 + raw.len() / 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(raw.len() as u32).to_le_bytes());

        let mut encoder = DeflateEncoder::new(out, Compression::fast());
        encoder.write_all(&raw)?;
        Ok(encoder.finish()?)
    }

    /// Parses a stamp from the binary `.stamp` format, re-validating
    /// the size invariant so a hand-edited file cannot smuggle in a
    /// mismatched patch.
    pub fn from_bytes(data: &[u8]) -> Result<Self, StampError> {
        if data.len() < 12 {
            return Err(StampError::InvalidData("truncated header".into()));
        }
        if &data[0..4] != MAGIC {
            return Err(StampError::InvalidMagic);
        }
        let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(StampError::UnsupportedVersion(version));
        }
        let raw_len = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;

        let mut decoder = DeflateDecoder::new(&data[12..]);
        let mut raw = Vec::with_capacity(raw_len);
        decoder.read_to_end(&mut raw)?;
        if raw.len() != raw_len {
            return Err(StampError::InvalidData(format!(
                "payload size mismatch: expected {}, got {}",
                raw_len,
                raw.len()
            )));
        }

        let stamp: TerrainStamp =
            bincode::deserialize(&raw).map_err(|e| StampError::InvalidData(e.to_string()))?;

        let expected =
            (stamp.width_in_vertices as usize) * (stamp.height_in_vertices as usize);
        if stamp.width_in_vertices == 0
            || stamp.height_in_vertices == 0
            || stamp.heights.len() != expected
            || stamp.terrain_types.len() != expected
        {
            return Err(StampError::InvalidData(
                "stamp arrays do not match declared dimensions".into(),
            ));
        }
        Ok(stamp)
    }

    pub fn save(&self, path: &Path) -> Result<(), StampError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, StampError> {
        let data = std::fs::read(path)?;
        let mut stamp = Self::from_bytes(&data)?;
        stamp.filename = Some(path.to_path_buf());
        Ok(stamp)
    }
}
