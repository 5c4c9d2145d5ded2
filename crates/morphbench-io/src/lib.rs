#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// io error types.
pub mod error;
pub use error::IoError;

/// jpeg read and write functions.
pub mod jpeg;

/// png write functions.
pub mod png;
