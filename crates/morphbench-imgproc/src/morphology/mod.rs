// Morphological dilation backends compared by the benchmark harness.

/// Error types used for morphological operations.
pub mod error;
pub use error::MorphologyError;

/// Kernel (structuring element) utilities.
pub mod kernel;
pub use kernel::{KernelShape, StructuringElement};

/// CPU dilation backend.
pub mod cpu;

/// GPU dilation backend (wgpu compute).
pub mod gpu;
pub use gpu::{GpuDilate, GpuError};

/// Flat-buffer dilation backend shaped like generated code.
pub mod pencil;
