//! Interactive terrain-editing toolkit for heightmapped worlds.
//!
//! `landsculpt` provides the algorithmic core of a world-building
//! editor:
//!
//! - **Stamps** ([`stamp`], [`transforms`], [`library`]): rectangular
//!   height/terrain-type patches, quarter-turn rotation transforms,
//!   and a directory-backed stamp library.
//! - **Tools** ([`tools`]): the two-phase paste tool for stamping a
//!   rotated patch with automatic and manual vertical alignment, and
//!   the line tool for tracing a connected road skeleton across the
//!   grid.
//! - **History** ([`history`]): undoable edit commands, executed
//!   against a narrow world-mutation contract.
//! - **Cache** ([`cache`]): a two-tier (memory + disk) cache for
//!   processed per-surface texture data.
//!
//! Rendering, asset decoding, and project persistence are host
//! concerns, reached only through the collaborator traits
//! ([`grid::HeightSampler`], [`tools::ScenePreview`],
//! [`history::TerrainWorld`]).

pub mod cache;
pub mod grid;
pub mod history;
pub mod library;
pub mod stamp;
pub mod tools;
pub mod transforms;

pub use cache::{CacheError, TextureDiskCache};
pub use grid::{HeightSampler, HeightTable, Vec2, Vec3, CELL_SIZE};
pub use history::{
    CommandHistory, EditCommand, PasteStampCommand, RoadLineCommand, TerrainWorld, WorldSnapshot,
};
pub use library::{LibraryError, StampLibrary};
pub use stamp::{StampError, TerrainStamp};
pub use tools::{
    MouseState, PasteTool, PlacementStage, RoadLineTool, ScenePreview, TerrainHit, Tool,
    ToolContext,
};
pub use transforms::{rotate, rotated, Rotation};
