use rayon::prelude::*;

use morphbench_image::{Image, ImageError};

use super::kernel::StructuringElement;
use super::MorphologyError;

/// Dilate an image using a [`StructuringElement`].
///
/// Dilation expands bright regions in the image. Each output pixel is the
/// maximum source value over the neighborhood defined by the active mask
/// elements, aligned at the anchor. Neighbors outside the image are
/// skipped, so border pixels never win the maximum; if no active element
/// falls inside the image the output pixel is `T::min_value()`.
///
/// Output rows are processed in parallel on the rayon thread pool.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `se` - The morphological structuring element.
///
/// # Returns
///
/// Ok(()) on success, or [`MorphologyError`] if shapes don't match.
pub fn dilate<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Copy + Ord + Send + Sync + num_traits::Bounded,
{
    if src.size() != dst.size() {
        return Err(MorphologyError::Image(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        )));
    }

    let width = src.width();
    let height = src.height();
    let se_width = se.width();
    let se_height = se.height();
    let se_data = se.data();
    let (anchor_x, anchor_y) = se.anchor();

    let src_slice = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(width * C)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for x in 0..width {
                for c in 0..C {
                    let mut max_val = T::min_value();

                    for r in 0..se_height {
                        for k in 0..se_width {
                            if se_data[r * se_width + k] == 0 {
                                continue;
                            }

                            let sy = y as isize + r as isize - anchor_y as isize;
                            let sx = x as isize + k as isize - anchor_x as isize;

                            if sy >= 0
                                && sy < height as isize
                                && sx >= 0
                                && sx < width as isize
                            {
                                let val =
                                    src_slice[(sy as usize * width + sx as usize) * C + c];
                                max_val = max_val.max(val);
                            }
                        }
                    }

                    dst_row[x * C + c] = max_val;
                }
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::KernelShape;
    use morphbench_image::ImageSize;

    fn gray(data: &[u8], width: usize, height: usize) -> Image<u8, 1> {
        Image::new(ImageSize { width, height }, data.to_vec()).unwrap()
    }

    #[test]
    fn dilate_single_bright_pixel() -> Result<(), MorphologyError> {
        let src = gray(&[0, 0, 0, 0, 255, 0, 0, 0, 0], 3, 3);
        let mut dst = Image::from_size_val(src.size(), 0u8)?;

        let se = StructuringElement::new(KernelShape::Box { size: 3 })?;
        dilate(&src, &mut dst, &se)?;

        assert!(dst.as_slice().iter().all(|&v| v == 255));

        Ok(())
    }

    #[test]
    fn dilate_identity_kernel() -> Result<(), MorphologyError> {
        let src = gray(&[10, 20, 30, 40, 50, 60, 70, 80, 90], 3, 3);
        let mut dst = Image::from_size_val(src.size(), 0u8)?;

        let se = StructuringElement::new(KernelShape::Box { size: 1 })?;
        dilate(&src, &mut dst, &se)?;

        assert_eq!(dst.as_slice(), src.as_slice());

        Ok(())
    }

    #[test]
    fn dilate_cross_kernel() -> Result<(), MorphologyError> {
        let src = gray(&[0, 0, 0, 0, 9, 0, 0, 0, 0], 3, 3);
        let mut dst = Image::from_size_val(src.size(), 0u8)?;

        let se = StructuringElement::new(KernelShape::Cross { size: 3 })?;
        dilate(&src, &mut dst, &se)?;

        let expected = [0, 9, 0, 9, 9, 9, 0, 9, 0];
        assert_eq!(dst.as_slice(), &expected);

        Ok(())
    }

    #[test]
    fn dilate_border_is_skipped() -> Result<(), MorphologyError> {
        // bright corner pixel expands into the image, the outside never
        // contributes
        let src = gray(&[200, 0, 0, 0], 2, 2);
        let mut dst = Image::from_size_val(src.size(), 0u8)?;

        let se = StructuringElement::new(KernelShape::Box { size: 3 })?;
        dilate(&src, &mut dst, &se)?;

        assert_eq!(dst.as_slice(), &[200, 200, 200, 200]);

        Ok(())
    }

    #[test]
    fn dilate_size_mismatch() {
        let src = gray(&[0, 0, 0, 0], 2, 2);
        let mut dst = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0,
        )
        .unwrap();

        let se = StructuringElement::new(KernelShape::Box { size: 3 }).unwrap();
        let result = dilate(&src, &mut dst, &se);
        assert!(matches!(result, Err(MorphologyError::Image(_))));
    }
}
