use morphbench_image::{Image, ImageError};

use crate::parallel;

/// Convert an RGB8 image to grayscale using the formula:
///
/// Y = 77 * R + 150 * G + 29 * B
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] as u16;
        let g = src_pixel[1] as u16;
        let b = src_pixel[2] as u16;
        dst_pixel[0] = ((r * 77 + g * 150 + b * 29) >> 8) as u8;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphbench_image::ImageSize;

    #[test]
    fn gray_from_rgb_u8_values() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let src = Image::<u8, 3>::new(size, vec![0, 0, 0, 255, 255, 255])?;
        let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;

        gray_from_rgb_u8(&src, &mut gray)?;

        assert_eq!(gray.get_pixel(0, 0, 0)?, 0);
        // 255 * (77 + 150 + 29) >> 8 = 255 * 256 >> 8
        assert_eq!(gray.get_pixel(1, 0, 0)?, 255);

        Ok(())
    }

    #[test]
    fn gray_from_rgb_u8_size_mismatch() {
        let src = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )
        .unwrap();
        let mut gray = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0,
        )
        .unwrap();

        let result = gray_from_rgb_u8(&src, &mut gray);
        assert!(matches!(result, Err(ImageError::InvalidImageSize(..))));
    }
}
