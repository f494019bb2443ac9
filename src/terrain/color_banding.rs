use serde::{Deserialize, Serialize};

use crate::terrain::height_field::{ColorMap, HeightField, FIELD_MARGIN};

/// One entry of the ordered biome region table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainRegion {
    pub name: String,
    /// Band threshold this region is anchored at, in [0, 1].
    pub height: f32,
    pub color: [u8; 4],
}

/// Which direction the region thresholds are compared in. The two historical
/// variants of this system disagreed (`<=` with first match vs `>=` with last
/// match), so the choice is explicit configuration rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandComparison {
    /// First region whose threshold the sample does not exceed
    /// (`height <= region.height`). Thresholds read as band upper bounds.
    UpTo,
    /// Last region whose threshold the sample meets or exceeds
    /// (`height >= region.height`). Thresholds read as band lower bounds.
    AtLeast,
}

/// Map one height sample to a region color.
pub fn classify(height: f32, regions: &[TerrainRegion], comparison: BandComparison) -> [u8; 4] {
    match comparison {
        BandComparison::UpTo => {
            for region in regions {
                if height <= region.height {
                    return region.color;
                }
            }
            regions.last().map(|r| r.color).unwrap_or([0; 4])
        }
        BandComparison::AtLeast => {
            let mut color = regions.first().map(|r| r.color).unwrap_or([0; 4]);
            for region in regions {
                if height >= region.height {
                    color = region.color;
                } else {
                    break;
                }
            }
            color
        }
    }
}

/// Band the usable part of a height field into a color map. The margin ring
/// only exists for normals and never gets a color.
pub fn build_color_map(
    field: &HeightField,
    regions: &[TerrainRegion],
    comparison: BandComparison,
) -> ColorMap {
    let usable = field.usable_size();
    let mut pixels = Vec::with_capacity(usable * usable);
    for y in 0..usable {
        for x in 0..usable {
            let height = field.sample(x + FIELD_MARGIN, y + FIELD_MARGIN);
            pixels.push(classify(height, regions, comparison));
        }
    }
    ColorMap::from_pixels(usable, pixels)
}

/// Stock water-to-snow banding, usable as-is for island style maps.
pub fn default_regions() -> Vec<TerrainRegion> {
    fn region(name: &str, height: f32, color: [u8; 4]) -> TerrainRegion {
        TerrainRegion {
            name: name.to_string(),
            height,
            color,
        }
    }
    vec![
        region("deep water", 0.0, [12, 41, 133, 255]),
        region("shallow water", 0.3, [30, 80, 190, 255]),
        region("sand", 0.4, [210, 199, 139, 255]),
        region("grass", 0.45, [86, 152, 23, 255]),
        region("forest", 0.55, [62, 107, 18, 255]),
        region("rock", 0.6, [90, 69, 60, 255]),
        region("mountain", 0.7, [75, 60, 53, 255]),
        region("snow", 0.9, [236, 236, 236, 255]),
    ]
}
