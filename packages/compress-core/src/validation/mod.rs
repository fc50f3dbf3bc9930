pub mod filename;
pub mod params;

pub use filename::{derive_output_filename, sanitize_filename};
pub use params::{parse_params, parse_quality, parse_width, validate_params};
