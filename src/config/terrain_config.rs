use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::terrain::color_banding::{default_regions, BandComparison, TerrainRegion};
use crate::terrain::height_curve::HeightCurve;
use crate::terrain::height_field::FIELD_MARGIN;
use crate::terrain::mesh_builder::{lod_stride, MeshParams};
use crate::terrain::noise::noise_parameters::NoiseParameters;

/// One entry of the LOD table. Thresholds are viewer distances; the table
/// must be ordered by strictly increasing threshold, and the last threshold
/// doubles as the overall view distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    pub lod: u32,
    pub visible_distance_threshold: f32,
}

// Defaults mirror the reference setup: a 241-sample bordered grid and three
// detail levels.
fn default_samples_per_edge() -> usize {
    239
}

fn default_lod_table() -> Vec<LodLevel> {
    vec![
        LodLevel { lod: 0, visible_distance_threshold: 200.0 },
        LodLevel { lod: 1, visible_distance_threshold: 400.0 },
        LodLevel { lod: 2, visible_distance_threshold: 600.0 },
    ]
}

fn default_height_multiplier() -> f32 {
    30.0
}

fn default_viewer_move_threshold() -> f32 {
    25.0
}

fn default_band_comparison() -> BandComparison {
    BandComparison::AtLeast
}

fn default_max_threads() -> usize {
    std::cmp::max(1, num_cpus::get().saturating_sub(1))
}

/// Full configuration surface of the streaming core. Loadable from TOML with
/// per-field defaults; `validate` must pass before the configuration is used
/// (the manager enforces this at construction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Usable height samples along one tile edge (margin excluded).
    #[serde(default = "default_samples_per_edge")]
    pub samples_per_edge: usize,

    #[serde(default = "default_lod_table")]
    pub lod_table: Vec<LodLevel>,

    #[serde(default = "default_height_multiplier")]
    pub height_multiplier: f32,

    #[serde(default)]
    pub height_curve: HeightCurve,

    #[serde(default)]
    pub flat_shading: bool,

    /// The visible window is only recomputed once the viewer has moved this
    /// far from where it was last computed.
    #[serde(default = "default_viewer_move_threshold")]
    pub viewer_move_threshold: f32,

    #[serde(default)]
    pub noise: NoiseParameters,

    #[serde(default = "default_regions")]
    pub regions: Vec<TerrainRegion>,

    #[serde(default = "default_band_comparison")]
    pub band_comparison: BandComparison,

    /// Subtract the island falloff mask from every tile's heights.
    #[serde(default)]
    pub use_falloff: bool,

    #[serde(default = "default_max_threads")]
    pub max_threads: usize,

    /// Bounded tile cache capacity. `None` keeps the reference behavior:
    /// tiles persist once generated.
    #[serde(default)]
    pub tile_cache_capacity: Option<usize>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            samples_per_edge: default_samples_per_edge(),
            lod_table: default_lod_table(),
            height_multiplier: default_height_multiplier(),
            height_curve: HeightCurve::default(),
            flat_shading: false,
            viewer_move_threshold: default_viewer_move_threshold(),
            noise: NoiseParameters::default(),
            regions: default_regions(),
            band_comparison: default_band_comparison(),
            use_falloff: false,
            max_threads: default_max_threads(),
            tile_cache_capacity: None,
        }
    }
}

impl TerrainConfig {
    pub fn from_toml_str(raw: &str) -> Result<TerrainConfig, ConfigError> {
        let config: TerrainConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<TerrainConfig, ConfigError> {
        let raw = fs::read_to_string(path)?;
        TerrainConfig::from_toml_str(&raw)
    }

    /// Check every startup invariant. A configuration that passes can never
    /// make mesh construction or LOD selection fail mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_edge < 2 {
            return Err(ConfigError::InvalidSamplesPerEdge(self.samples_per_edge));
        }
        if self.lod_table.is_empty() {
            return Err(ConfigError::EmptyLodTable);
        }
        let mut previous: Option<f32> = None;
        for (i, level) in self.lod_table.iter().enumerate() {
            if self.lod_table[..i].iter().any(|l| l.lod == level.lod) {
                return Err(ConfigError::DuplicateLod(level.lod));
            }
            if let Some(prev) = previous {
                if level.visible_distance_threshold <= prev {
                    return Err(ConfigError::ThresholdNotIncreasing {
                        lod: level.lod,
                        threshold: level.visible_distance_threshold,
                        previous: prev,
                    });
                }
            }
            previous = Some(level.visible_distance_threshold);

            let stride = lod_stride(level.lod);
            let bordered = self.bordered_size();
            // The simplified mesh must keep at least a quad of interior
            // vertices, and its line length must land exactly on the far
            // border so the margin ring survives at this stride.
            if bordered < 2 * stride + 2 {
                return Err(ConfigError::StrideTooCoarse {
                    lod: level.lod,
                    stride,
                    samples: self.samples_per_edge,
                });
            }
            let line = bordered - 2 * stride - 1;
            if line % stride != 0 {
                return Err(ConfigError::StrideDoesNotDivide {
                    lod: level.lod,
                    stride,
                    line,
                });
            }
        }
        self.height_curve.validate()?;
        self.noise.validate()?;
        if !self.viewer_move_threshold.is_finite() || self.viewer_move_threshold < 0.0 {
            return Err(ConfigError::InvalidMoveThreshold(self.viewer_move_threshold));
        }
        if self.regions.is_empty() {
            return Err(ConfigError::EmptyRegionTable);
        }
        Ok(())
    }

    /// Height-field grid edge including the seam margin.
    pub fn bordered_size(&self) -> usize {
        self.samples_per_edge + 2 * FIELD_MARGIN
    }

    /// World-space edge length of one tile.
    pub fn tile_edge_length(&self) -> f32 {
        (self.samples_per_edge - 1) as f32
    }

    /// The coarsest LOD's threshold: nothing draws beyond this.
    pub fn max_view_distance(&self) -> f32 {
        self.lod_table
            .last()
            .map(|l| l.visible_distance_threshold)
            .unwrap_or(0.0)
    }

    /// Half-width, in tiles, of the square visible window.
    pub fn visible_range_in_tiles(&self) -> i32 {
        (self.max_view_distance() / self.tile_edge_length()).round() as i32
    }

    pub fn mesh_params(&self) -> MeshParams {
        MeshParams {
            height_multiplier: self.height_multiplier,
            height_curve: self.height_curve.clone(),
            flat_shading: self.flat_shading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(TerrainConfig::default().validate().is_ok());
    }

    #[test]
    fn derived_sizes_match_the_reference_grid() {
        let config = TerrainConfig::default();
        assert_eq!(config.bordered_size(), 241);
        assert_eq!(config.tile_edge_length(), 238.0);
        assert_eq!(config.max_view_distance(), 600.0);
        assert_eq!(config.visible_range_in_tiles(), 3);
    }

    #[test]
    fn empty_lod_table_is_rejected() {
        let config = TerrainConfig {
            lod_table: vec![],
            ..TerrainConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLodTable)));
    }

    #[test]
    fn non_increasing_thresholds_are_rejected() {
        let config = TerrainConfig {
            lod_table: vec![
                LodLevel { lod: 0, visible_distance_threshold: 300.0 },
                LodLevel { lod: 1, visible_distance_threshold: 300.0 },
            ],
            ..TerrainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdNotIncreasing { lod: 1, .. })
        ));
    }

    #[test]
    fn duplicate_lod_levels_are_rejected() {
        let config = TerrainConfig {
            lod_table: vec![
                LodLevel { lod: 1, visible_distance_threshold: 100.0 },
                LodLevel { lod: 1, visible_distance_threshold: 200.0 },
            ],
            ..TerrainConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateLod(1))));
    }

    #[test]
    fn uneven_stride_is_rejected_at_validation_time() {
        // 10 usable samples -> bordered 12, lod 2 stride 4: line = 12-8-1 = 3,
        // not divisible by 4.
        let config = TerrainConfig {
            samples_per_edge: 10,
            lod_table: vec![
                LodLevel { lod: 0, visible_distance_threshold: 100.0 },
                LodLevel { lod: 2, visible_distance_threshold: 200.0 },
            ],
            ..TerrainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StrideDoesNotDivide { lod: 2, .. })
                | Err(ConfigError::StrideTooCoarse { lod: 2, .. })
        ));
    }

    #[test]
    fn production_grid_supports_every_even_stride() {
        // 239 usable samples: strides 2, 4, 6, 8, 10, 12 all divide the
        // simplified line.
        for lod in 1..=6u32 {
            let config = TerrainConfig {
                lod_table: vec![LodLevel {
                    lod,
                    visible_distance_threshold: 100.0,
                }],
                ..TerrainConfig::default()
            };
            assert!(config.validate().is_ok(), "lod {lod} should validate");
        }
    }

    #[test]
    fn toml_round_trip_with_partial_fields() {
        let raw = r#"
            samples_per_edge = 47
            height_multiplier = 12.5
            use_falloff = true

            [[lod_table]]
            lod = 0
            visible_distance_threshold = 90.0

            [[lod_table]]
            lod = 1
            visible_distance_threshold = 180.0

            [noise]
            seed = 77
            scale = 30.0
            octaves = 5
            persistence = 0.45
            lacunarity = 2.1
            offset = [10.0, -4.0]
        "#;
        let config = TerrainConfig::from_toml_str(raw).expect("config should parse");
        assert_eq!(config.samples_per_edge, 47);
        assert_eq!(config.noise.seed, 77);
        assert_eq!(config.lod_table.len(), 2);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.viewer_move_threshold, 25.0);
        assert!(!config.regions.is_empty());
    }

    #[test]
    fn bad_toml_surfaces_a_parse_error() {
        let result = TerrainConfig::from_toml_str("samples_per_edge = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
