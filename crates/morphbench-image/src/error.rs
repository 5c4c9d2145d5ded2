/// An error type for image operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Error when the pixel data length does not match the image shape.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images are expected to have the same size.
    #[error("Image size mismatch: expected {0}x{1}, got {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel coordinate is outside the image.
    #[error("Pixel index out of bounds: ({0}, {1}) for image {2}x{3}")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a channel index is outside the image channels.
    #[error("Channel index out of bounds: {0} for image with {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a pixel value cannot be represented in the target type.
    #[error("Failed to cast the pixel value")]
    CastError,
}
