use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use morphbench_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an image with pixel data.
///
/// The pixel data is stored as a flat row-major buffer with interleaved
/// channels, i.e. shape (H, W, C).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image<T, const C: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const C: usize> Image<T, C> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an
    /// error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use morphbench_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.width * size.height * C {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.width * size.height * C,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size, filled with a default value.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.width * size.height * C];
        Image::new(size, data)
    }

    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// The number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// The number of channels of the image.
    pub fn num_channels(&self) -> usize {
        C
    }

    /// The total number of elements in the pixel buffer.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to the pixel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get a mutable reference to the pixel data as a flat slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return the pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get the pixel value at the given coordinates.
    ///
    /// # Arguments
    ///
    /// * `x` - The column of the pixel.
    /// * `y` - The row of the pixel.
    /// * `c` - The channel of the pixel.
    pub fn get_pixel(&self, x: usize, y: usize, c: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        if x >= self.size.width || y >= self.size.height {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.size.width,
                self.size.height,
            ));
        }

        if c >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(c, C));
        }

        Ok(self.data[(y * self.size.width + x) * C + c])
    }

    /// Set the pixel value at the given coordinates.
    pub fn set_pixel(&mut self, x: usize, y: usize, c: usize, val: T) -> Result<(), ImageError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.size.width,
                self.size.height,
            ));
        }

        if c >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(c, C));
        }

        self.data[(y * self.size.width + x) * C + c] = val;

        Ok(())
    }

    /// Cast the pixel data to a different type.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in the target type.
    pub fn cast<U>(&self) -> Result<Image<U, C>, ImageError>
    where
        T: Copy,
        U: num_traits::NumCast,
        T: num_traits::NumCast,
    {
        let data = self
            .data
            .iter()
            .map(|&v| num_traits::cast(v).ok_or(ImageError::CastError))
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, data)
    }
}
