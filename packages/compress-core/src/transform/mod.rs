pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod params;
pub mod resize;

pub use decode::{Orientation, decode_image, probe_dimensions, read_orientation};
pub use dimensions::{
    calculate_capped_dimensions, calculate_target_dimensions, calculate_width_dimensions,
};
pub use encode::encode_image;
pub use params::{CompressParams, OutputFormat};
pub use resize::resize_image;
