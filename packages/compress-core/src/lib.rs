pub mod constants;
pub mod errors;
pub mod transform;
pub mod validation;

// 公開API
pub use constants::{
    ACCEPTED_CONTENT_TYPES, ARCHIVE_NAME, DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, MAX_PIXELS,
    MAX_QUALITY, MAX_TARGET_WIDTH, MIN_QUALITY, QUALITY_STEP,
};
pub use errors::{MediaError, TransformError};
pub use transform::{
    CompressParams, Orientation, OutputFormat, calculate_target_dimensions, decode_image,
    encode_image, probe_dimensions, resize_image,
};
pub use validation::{derive_output_filename, parse_params, sanitize_filename, validate_params};
