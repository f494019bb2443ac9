//! Streaming tiled terrain core.
//!
//! Tracks which terrain tiles should exist around a moving viewpoint,
//! generates their height and color data on background workers, builds
//! simplified seam-free meshes per level of detail, and swaps displayed
//! geometry as the viewer moves. Rendering, input, and asset handling stay
//! outside; results leave through a [`PresentationSink`].
//!
//! Typical wiring:
//!
//! ```no_run
//! use glam::Vec2;
//! use terrastream::{NullSink, TerrainConfig, TileManager};
//!
//! let config = TerrainConfig::default();
//! let mut manager = TileManager::new(config, Box::new(NullSink)).unwrap();
//! loop {
//!     let viewer = Vec2::ZERO; // wherever the camera is this frame
//!     manager.update(viewer);
//! }
//! ```

pub mod config;
pub mod error;
pub mod terrain;
pub mod threading;

pub use config::terrain_config::{LodLevel, TerrainConfig};
pub use error::{ConfigError, GenerationError};
pub use terrain::color_banding::{BandComparison, TerrainRegion};
pub use terrain::height_curve::HeightCurve;
pub use terrain::height_field::{ColorMap, HeightField, TileData};
pub use terrain::mesh_builder::{build_terrain_mesh, MeshParams, TerrainMesh};
pub use terrain::noise::NoiseParameters;
pub use terrain::presentation::{NullSink, PresentationSink};
pub use terrain::tile::{Tile, TileCoord, TileState};
pub use terrain::tile_manager::TileManager;
pub use threading::generation_pipeline::{Completion, GenerationPipeline};
