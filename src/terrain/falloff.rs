// Island-style falloff: pushes heights down toward the tile border so a lone
// tile reads as an island. Computed once per grid size, in tile-local space,
// and shared by every tile that uses it.

/// Square mask of [0, 1] values, 0 at the center and approaching 1 at the
/// corners. Subtract from a height field of the same size.
#[derive(Debug, Clone, PartialEq)]
pub struct FalloffMask {
    size: usize,
    values: Vec<f32>,
}

impl FalloffMask {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn value(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.size + x]
    }
}

pub fn generate_falloff_mask(size: usize) -> FalloffMask {
    let mut values = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            // Normalized [-1, 1] position within the grid.
            let nx = x as f32 / size as f32 * 2.0 - 1.0;
            let ny = y as f32 / size as f32 * 2.0 - 1.0;
            let v = nx.abs().max(ny.abs());
            values.push(ease(v));
        }
    }
    FalloffMask { size, values }
}

// Sharpening curve from the original generator: keeps the interior mostly
// untouched and ramps hard near the border.
fn ease(v: f32) -> f32 {
    const A: f32 = 3.0;
    const B: f32 = 2.2;
    let va = v.powf(A);
    va / (va + (B - B * v).powf(A))
}

/// Apply the mask in place to a row-major grid of the same size, clamping the
/// result back into [0, 1].
pub fn apply_falloff(samples: &mut [f32], mask: &FalloffMask) {
    debug_assert_eq!(samples.len(), mask.values.len());
    for (sample, falloff) in samples.iter_mut().zip(&mask.values) {
        *sample = (*sample - falloff).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_values_stay_in_unit_range() {
        let mask = generate_falloff_mask(31);
        assert!(mask
            .values
            .iter()
            .all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn center_is_low_and_corner_is_high() {
        let mask = generate_falloff_mask(31);
        assert!(mask.value(15, 15) < 0.05);
        assert!(mask.value(0, 0) > 0.9);
    }

    #[test]
    fn apply_falloff_sinks_the_border() {
        let mask = generate_falloff_mask(9);
        let mut samples = vec![0.6; 81];
        apply_falloff(&mut samples, &mask);
        assert!(samples[0] < 0.05, "corner should drop toward zero");
        assert!((samples[4 * 9 + 4] - 0.6).abs() < 0.05, "center mostly kept");
    }
}
