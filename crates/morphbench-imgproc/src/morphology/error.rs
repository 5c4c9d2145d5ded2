use morphbench_image::ImageError;

/// Errors related to morphological operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MorphologyError {
    /// The provided structuring element has zero width or height.
    #[error("The structuring element is empty")]
    EmptyKernel,

    /// All elements in the structuring element are inactive.
    #[error("All structuring element entries are inactive")]
    InactiveKernel,

    /// The anchor point falls outside the structuring element.
    #[error("Anchor ({0}, {1}) is outside the {2}x{3} structuring element")]
    AnchorOutOfBounds(usize, usize, usize, usize),

    /// An underlying image error.
    #[error(transparent)]
    Image(#[from] ImageError),
}
