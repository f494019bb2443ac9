use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters for fractal height-field generation. Deterministic: the same
/// parameters and tile center always reproduce the same field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParameters {
    pub seed: u64,
    /// World-space feature size divisor. Larger values zoom out.
    pub scale: f32,
    pub octaves: u32,
    /// Amplitude falloff per octave, in (0, 1].
    pub persistence: f32,
    /// Frequency growth per octave, at least 1.
    pub lacunarity: f32,
    /// Global sampling offset added on top of each tile's center.
    pub offset: [f32; 2],
}

impl Default for NoiseParameters {
    fn default() -> Self {
        NoiseParameters {
            seed: 0,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
        }
    }
}

impl NoiseParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidNoiseScale(self.scale));
        }
        if self.octaves == 0 {
            return Err(ConfigError::InvalidOctaves);
        }
        if self.lacunarity < 1.0 {
            return Err(ConfigError::InvalidLacunarity(self.lacunarity));
        }
        if self.persistence <= 0.0 || self.persistence > 1.0 {
            return Err(ConfigError::InvalidPersistence(self.persistence));
        }
        Ok(())
    }
}
