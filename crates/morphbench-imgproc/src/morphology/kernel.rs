use super::MorphologyError;

/// Shapes of morphological structuring elements.
///
/// All shapes are generated as a flat binary mask where 1 marks pixels
/// included in the operation and 0 marks excluded pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelShape {
    /// A rectangular box structuring element with all pixels included.
    Box {
        /// The side length of the square kernel (size x size).
        size: usize,
    },

    /// A cross (plus) shaped structuring element: only pixels along the
    /// horizontal and vertical center lines are included.
    Cross {
        /// The side length of the square cross kernel (size x size).
        size: usize,
    },

    /// An ellipse (or circle) shaped structuring element: pixels inside
    /// the elliptical boundary are included.
    Ellipse {
        /// The width of the ellipse.
        width: usize,
        /// The height of the ellipse.
        height: usize,
    },
}

/// A morphological structuring element.
///
/// Stores the binary neighborhood mask together with the anchor point,
/// the position inside the mask that is aligned with the output pixel.
/// The anchor defaults to the geometric center of the mask.
///
/// # Example
///
/// ```rust
/// use morphbench_imgproc::morphology::{KernelShape, StructuringElement};
///
/// let se = StructuringElement::new(KernelShape::Box { size: 3 }).unwrap();
/// assert_eq!(se.width(), 3);
/// assert_eq!(se.height(), 3);
/// assert_eq!(se.anchor(), (1, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    data: Vec<u8>,
    width: usize,
    height: usize,
    anchor: (usize, usize),
}

impl StructuringElement {
    /// Create a structuring element from a shape, anchored at its center.
    pub fn new(shape: KernelShape) -> Result<Self, MorphologyError> {
        let (data, width, height) = match shape {
            KernelShape::Box { size } => (box_mask(size), size, size),
            KernelShape::Cross { size } => (cross_mask(size), size, size),
            KernelShape::Ellipse { width, height } => {
                (ellipse_mask(width, height), width, height)
            }
        };

        Self::from_mask(data, width, height, (width / 2, height / 2))
    }

    /// Create a structuring element from a shape with an explicit anchor.
    ///
    /// # Arguments
    ///
    /// * `shape` - The shape of the mask.
    /// * `anchor` - The anchor point as (x, y) inside the mask.
    pub fn with_anchor(
        shape: KernelShape,
        anchor: (usize, usize),
    ) -> Result<Self, MorphologyError> {
        let se = Self::new(shape)?;
        Self::from_mask(se.data, se.width, se.height, anchor)
    }

    fn from_mask(
        data: Vec<u8>,
        width: usize,
        height: usize,
        anchor: (usize, usize),
    ) -> Result<Self, MorphologyError> {
        if width == 0 || height == 0 {
            return Err(MorphologyError::EmptyKernel);
        }

        if data.iter().all(|&v| v == 0) {
            return Err(MorphologyError::InactiveKernel);
        }

        if anchor.0 >= width || anchor.1 >= height {
            return Err(MorphologyError::AnchorOutOfBounds(
                anchor.0, anchor.1, width, height,
            ));
        }

        Ok(Self {
            data,
            width,
            height,
            anchor,
        })
    }

    /// Get a reference to the mask data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the width of the mask.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of the mask.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the anchor point as (x, y).
    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }
}

fn box_mask(size: usize) -> Vec<u8> {
    vec![1u8; size * size]
}

fn cross_mask(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size * size];
    let mid = size / 2;

    // fill horizontal line
    for j in 0..size {
        data[mid * size + j] = 1;
    }

    // fill vertical line
    for i in 0..size {
        data[i * size + mid] = 1;
    }

    data
}

fn ellipse_mask(width: usize, height: usize) -> Vec<u8> {
    let mut data = vec![0u8; width * height];
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;
    let rx = (((width.saturating_sub(1)) as f64) / 2.0).max(0.5);
    let ry = (((height.saturating_sub(1)) as f64) / 2.0).max(0.5);

    for i in 0..height {
        for j in 0..width {
            let x = j as f64 - cx;
            let y = i as f64 - cy;
            if (x * x) / (rx * rx) + (y * y) / (ry * ry) <= 1.0 {
                data[i * width + j] = 1;
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_kernel() {
        let se = StructuringElement::new(KernelShape::Box { size: 3 }).unwrap();
        assert_eq!(se.width(), 3);
        assert_eq!(se.height(), 3);
        assert!(se.data().iter().all(|&x| x == 1));
        assert_eq!(se.anchor(), (1, 1));
    }

    #[test]
    fn cross_kernel() {
        let se = StructuringElement::new(KernelShape::Cross { size: 3 }).unwrap();
        let data = se.data();
        // center row
        assert_eq!(data[3], 1);
        assert_eq!(data[4], 1);
        assert_eq!(data[5], 1);
        // center column
        assert_eq!(data[1], 1);
        assert_eq!(data[7], 1);
        // corners
        assert_eq!(data[0], 0);
        assert_eq!(data[2], 0);
        assert_eq!(data[6], 0);
        assert_eq!(data[8], 0);
    }

    #[test]
    fn ellipse_kernel_3x3_is_cross() {
        let se = StructuringElement::new(KernelShape::Ellipse {
            width: 3,
            height: 3,
        })
        .unwrap();
        let cross = StructuringElement::new(KernelShape::Cross { size: 3 }).unwrap();
        assert_eq!(se.data(), cross.data());
    }

    #[test]
    fn ellipse_kernel_5x5() {
        let se = StructuringElement::new(KernelShape::Ellipse {
            width: 5,
            height: 5,
        })
        .unwrap();
        assert_eq!(se.width(), 5);
        assert_eq!(se.height(), 5);
        // center is active, corners are not
        assert_eq!(se.data()[2 * 5 + 2], 1);
        assert_eq!(se.data()[0], 0);
        assert_eq!(se.data()[4], 0);
        assert_eq!(se.data()[20], 0);
        assert_eq!(se.data()[24], 0);
        // center row is fully active
        assert!(se.data()[2 * 5..2 * 5 + 5].iter().all(|&v| v == 1));
    }

    #[test]
    fn empty_kernel() {
        let result = StructuringElement::new(KernelShape::Box { size: 0 });
        assert_eq!(result, Err(MorphologyError::EmptyKernel));
    }

    #[test]
    fn anchor_out_of_bounds() {
        let result = StructuringElement::with_anchor(KernelShape::Box { size: 3 }, (3, 1));
        assert_eq!(result, Err(MorphologyError::AnchorOutOfBounds(3, 1, 3, 3)));
    }
}
