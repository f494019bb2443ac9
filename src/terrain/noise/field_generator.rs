use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::terrain::height_field::HeightField;
use crate::terrain::noise::noise_parameters::NoiseParameters;

// Octave offsets are drawn from this range so distinct octaves sample
// uncorrelated regions of the noise domain.
const OCTAVE_OFFSET_RANGE: f32 = 100_000.0;

/// Generate a `width * height` grid of height samples in [0, 1], row-major.
///
/// `center` is the world-space center of the requested footprint; adjacent
/// footprints whose sample spacing matches therefore agree on shared samples,
/// which is what makes tile seams line up. Pure and deterministic for
/// identical arguments.
pub fn generate_height_field(
    width: usize,
    height: usize,
    params: &NoiseParameters,
    center: [f32; 2],
) -> Vec<f32> {
    let perlin = Perlin::new(params.seed as u32);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    let mut octave_offsets = Vec::with_capacity(params.octaves as usize);
    let mut max_possible_height = 0.0f32;
    let mut amplitude = 1.0f32;
    for _ in 0..params.octaves {
        let ox = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE)
            + center[0]
            + params.offset[0];
        let oy = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE)
            - center[1]
            - params.offset[1];
        octave_offsets.push((ox, oy));
        max_possible_height += amplitude;
        amplitude *= params.persistence;
    }

    let scale = params.scale.max(f32::MIN_POSITIVE);
    let half_width = width as f32 / 2.0;
    let half_height = height as f32 / 2.0;

    let mut samples = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f32;
            let mut noise_height = 0.0f32;

            for &(ox, oy) in &octave_offsets {
                let sample_x = (x as f32 - half_width + ox) / scale * frequency;
                let sample_y = (y as f32 - half_height + oy) / scale * frequency;
                let value = perlin.get([sample_x as f64, sample_y as f64]) as f32;
                noise_height += value * amplitude;
                amplitude *= params.persistence;
                frequency *= params.lacunarity;
            }

            // Normalize against the amplitude-sum bound rather than the
            // per-grid min/max: a local normalization would give every tile
            // its own scale and break continuity across tile seams.
            let normalized = (noise_height + max_possible_height) / (2.0 * max_possible_height);
            samples.push(normalized.clamp(0.0, 1.0));
        }
    }
    samples
}

/// Square bordered field for a tile footprint.
pub fn generate_bordered_field(
    bordered_size: usize,
    params: &NoiseParameters,
    center: [f32; 2],
) -> HeightField {
    let samples = generate_height_field(bordered_size, bordered_size, params, center);
    HeightField::from_samples(bordered_size, samples)
}
