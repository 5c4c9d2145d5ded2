use morphbench_image::{Image, ImageError};

/// Compute the L2 norm of the pixelwise difference between two images.
///
/// The norm is defined as:
///
/// $ L2 = \sqrt{\sum_{i=1}^{n} (I_1 - I_2)^2} $
///
/// where `I_1` and `I_2` are the two images and `n` is the number of pixels.
/// This is the check used to decide whether two backend results are
/// numerically equivalent.
///
/// # Arguments
///
/// * `image1` - The first input image with shape (H, W, C).
/// * `image2` - The second input image with shape (H, W, C).
///
/// # Returns
///
/// The L2 norm of the difference between the two images.
pub fn l2_norm_diff<const C: usize>(
    image1: &Image<u8, C>,
    image2: &Image<u8, C>,
) -> Result<f64, ImageError> {
    if image1.size() != image2.size() {
        return Err(ImageError::InvalidImageSize(
            image1.cols(),
            image1.rows(),
            image2.cols(),
            image2.rows(),
        ));
    }

    let sum_sq = image1
        .as_slice()
        .iter()
        .zip(image2.as_slice().iter())
        .map(|(&a, &b)| {
            let diff = a as f64 - b as f64;
            diff * diff
        })
        .sum::<f64>();

    Ok(sum_sq.sqrt())
}

/// Compute the mean squared error (MSE) between two images.
///
/// # Arguments
///
/// * `image1` - The first input image with shape (H, W, C).
/// * `image2` - The second input image with shape (H, W, C).
///
/// # Returns
///
/// The mean squared error between the two images.
pub fn mse<const C: usize>(
    image1: &Image<u8, C>,
    image2: &Image<u8, C>,
) -> Result<f64, ImageError> {
    if image1.size() != image2.size() {
        return Err(ImageError::InvalidImageSize(
            image1.cols(),
            image1.rows(),
            image2.cols(),
            image2.rows(),
        ));
    }

    let sum_sq = image1
        .as_slice()
        .iter()
        .zip(image2.as_slice().iter())
        .map(|(&a, &b)| {
            let diff = a as f64 - b as f64;
            diff * diff
        })
        .sum::<f64>();

    Ok(sum_sq / image1.numel() as f64)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use morphbench_image::{Image, ImageError, ImageSize};

    #[test]
    fn l2_norm_equal() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 3,
        };
        let image1 = Image::<u8, 1>::new(size, vec![0, 1, 2, 3, 4, 5])?;
        let image2 = image1.clone();

        let norm = crate::metrics::l2_norm_diff(&image1, &image2)?;
        assert_eq!(norm, 0.0);

        Ok(())
    }

    #[test]
    fn l2_norm_not_equal() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let image1 = Image::<u8, 1>::new(size, vec![0, 1, 2, 3])?;
        let image2 = Image::<u8, 1>::new(size, vec![0, 4, 2, 7])?;

        // sqrt(3^2 + 4^2)
        let norm = crate::metrics::l2_norm_diff(&image1, &image2)?;
        assert_relative_eq!(norm, 5.0);

        Ok(())
    }

    #[test]
    fn mse_values() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let image1 = Image::<u8, 1>::new(size, vec![0, 1, 2, 3])?;
        let image2 = Image::<u8, 1>::new(size, vec![0, 3, 2, 3])?;

        let mse = crate::metrics::mse(&image1, &image2)?;
        assert_relative_eq!(mse, 1.0);

        Ok(())
    }

    #[test]
    fn l2_norm_size_mismatch() {
        let image1 = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )
        .unwrap();
        let image2 = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0,
        )
        .unwrap();

        let result = crate::metrics::l2_norm_diff(&image1, &image2);
        assert!(matches!(result, Err(ImageError::InvalidImageSize(..))));
    }
}
