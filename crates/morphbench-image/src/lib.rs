#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image error types.
pub mod error;
pub use error::ImageError;

/// image types and operations.
pub mod image;
pub use image::{Image, ImageSize};
