mod types;

pub use types::{MediaError, TransformError};
