use thiserror::Error;

use crate::terrain::tile::TileCoord;

/// Fatal configuration problems. These are checked once at startup; none of
/// them are recoverable at runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LOD table must not be empty")]
    EmptyLodTable,

    #[error("duplicate LOD level {0} in LOD table")]
    DuplicateLod(u32),

    #[error("LOD thresholds must be strictly increasing: lod {lod} has threshold {threshold}, previous was {previous}")]
    ThresholdNotIncreasing { lod: u32, threshold: f32, previous: f32 },

    #[error("LOD {lod} stride {stride} does not evenly divide the simplified mesh line ({line} steps)")]
    StrideDoesNotDivide { lod: u32, stride: usize, line: usize },

    #[error("LOD {lod} stride {stride} leaves no interior vertices at {samples} samples per edge")]
    StrideTooCoarse { lod: u32, stride: usize, samples: usize },

    #[error("samples per edge must be at least 2, got {0}")]
    InvalidSamplesPerEdge(usize),

    #[error("height curve control points must be sorted by input with non-decreasing outputs")]
    NonMonotonicCurve,

    #[error("height curve must cover the [0, 1] input domain")]
    CurveDomain,

    #[error("noise scale must be positive and finite, got {0}")]
    InvalidNoiseScale(f32),

    #[error("noise octaves must be at least 1")]
    InvalidOctaves,

    #[error("noise lacunarity must be at least 1, got {0}")]
    InvalidLacunarity(f32),

    #[error("noise persistence must be in (0, 1], got {0}")]
    InvalidPersistence(f32),

    #[error("viewer move threshold must not be negative, got {0}")]
    InvalidMoveThreshold(f32),

    #[error("region table must not be empty")]
    EmptyRegionTable,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A background generation request that failed. Carries enough identity to
/// attribute the failure to a tile (and LOD, for mesh requests); the pipeline
/// itself keeps running.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("generation failed for tile ({}, {}) lod {lod:?}: {message}", .coord.x, .coord.y)]
pub struct GenerationError {
    pub coord: TileCoord,
    pub lod: Option<u32>,
    pub message: String,
}

impl GenerationError {
    pub fn height_field(coord: TileCoord, message: impl Into<String>) -> Self {
        GenerationError {
            coord,
            lod: None,
            message: message.into(),
        }
    }

    pub fn mesh(coord: TileCoord, lod: u32, message: impl Into<String>) -> Self {
        GenerationError {
            coord,
            lod: Some(lod),
            message: message.into(),
        }
    }
}
