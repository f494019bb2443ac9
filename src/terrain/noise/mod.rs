pub mod field_generator;
pub mod noise_parameters;

pub use field_generator::{generate_bordered_field, generate_height_field};
pub use noise_parameters::NoiseParameters;
