// Immutable per-tile sample data: a bordered height grid plus the color map
// derived from it. Produced once per tile and shared into mesh workers.

/// Width of the margin ring around the usable grid. The margin exists so that
/// normals at a tile's edge can be computed from the same samples the
/// neighboring tile would use, which keeps lighting continuous across seams.
pub const FIELD_MARGIN: usize = 1;

/// Square grid of height samples in [0, 1], including a one-sample margin on
/// every side. Row-major, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    bordered_size: usize,
    samples: Vec<f32>,
}

impl HeightField {
    pub fn from_samples(bordered_size: usize, samples: Vec<f32>) -> HeightField {
        assert_eq!(
            samples.len(),
            bordered_size * bordered_size,
            "height field sample count does not match its declared size"
        );
        HeightField {
            bordered_size,
            samples,
        }
    }

    /// Edge length of the full grid, margin included.
    pub fn bordered_size(&self) -> usize {
        self.bordered_size
    }

    /// Edge length of the usable tile grid (margin excluded).
    pub fn usable_size(&self) -> usize {
        self.bordered_size - 2 * FIELD_MARGIN
    }

    /// Sample at bordered-grid coordinates.
    pub fn sample(&self, x: usize, y: usize) -> f32 {
        self.samples[y * self.bordered_size + x]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// RGBA8 color per usable sample, row-major. Same footprint as the usable
/// part of the height field; the margin never gets a color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    size: usize,
    pixels: Vec<[u8; 4]>,
}

impl ColorMap {
    pub fn from_pixels(size: usize, pixels: Vec<[u8; 4]>) -> ColorMap {
        assert_eq!(
            pixels.len(),
            size * size,
            "color map pixel count does not match its declared size"
        );
        ColorMap { size, pixels }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        self.pixels[y * self.size + x]
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }
}

/// Everything a tile needs once its background data generation finished.
/// Reused for every LOD mesh of the tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileData {
    pub height_field: HeightField,
    pub color_map: ColorMap,
}
