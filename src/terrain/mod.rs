// Export all components from the terrain module
pub mod color_banding;
pub mod eviction;
pub mod falloff;
pub mod height_curve;
pub mod height_field;
pub mod mesh_builder;
pub mod noise;
pub mod presentation;
pub mod tile;
pub mod tile_manager;

// Re-export main types for easier access
pub use height_field::{ColorMap, HeightField, TileData};
pub use mesh_builder::{build_terrain_mesh, MeshParams, TerrainMesh};
pub use presentation::{NullSink, PresentationSink};
pub use tile::{Tile, TileCoord, TileState};
pub use tile_manager::TileManager;
