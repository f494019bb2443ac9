pub mod terrain_config;

pub use terrain_config::{LodLevel, TerrainConfig};
