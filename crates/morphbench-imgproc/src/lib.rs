#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image comparison metrics module.
pub mod metrics;

/// morphological operations module.
pub mod morphology;

/// module containing parallelization utilities.
pub mod parallel;
