//! Flat-buffer dilation entry point.
//!
//! This backend keeps the calling convention of a generated kernel: raw
//! row/column counts, row steps and flat buffers, with the structuring
//! element passed as its own strided buffer plus an anchor point. The body
//! is a plain serial loop nest over the strided data.

/// Dilate a grayscale image given as a flat strided buffer.
///
/// Semantics match [`super::cpu::dilate`]: every output pixel is the
/// maximum source value over the active structuring element entries,
/// aligned at the anchor, with out-of-bounds neighbors skipped.
///
/// # Arguments
///
/// * `rows` - Number of image rows.
/// * `cols` - Number of image columns.
/// * `src_step` - Row stride of the source buffer, in elements.
/// * `src` - Source pixel buffer covering `rows` rows of `src_step` elements.
/// * `dst_step` - Row stride of the destination buffer, in elements.
/// * `dst` - Destination pixel buffer covering `rows` rows of `dst_step` elements.
/// * `se_rows` - Number of structuring element rows.
/// * `se_cols` - Number of structuring element columns.
/// * `se_step` - Row stride of the structuring element buffer.
/// * `se` - Structuring element mask, nonzero entries are active.
/// * `anchor_x` - Anchor column inside the structuring element.
/// * `anchor_y` - Anchor row inside the structuring element.
#[allow(clippy::too_many_arguments)]
pub fn dilate(
    rows: usize,
    cols: usize,
    src_step: usize,
    src: &[u8],
    dst_step: usize,
    dst: &mut [u8],
    se_rows: usize,
    se_cols: usize,
    se_step: usize,
    se: &[u8],
    anchor_x: usize,
    anchor_y: usize,
) {
    debug_assert!(src.len() >= rows.saturating_sub(1) * src_step + cols);
    debug_assert!(dst.len() >= rows.saturating_sub(1) * dst_step + cols);
    debug_assert!(se.len() >= se_rows.saturating_sub(1) * se_step + se_cols);

    for q in 0..rows {
        for w in 0..cols {
            let mut max_val = 0u8;

            for e in 0..se_rows {
                for f in 0..se_cols {
                    if se[e * se_step + f] == 0 {
                        continue;
                    }

                    let y = q as isize + e as isize - anchor_y as isize;
                    let x = w as isize + f as isize - anchor_x as isize;

                    if y >= 0 && y < rows as isize && x >= 0 && x < cols as isize {
                        let val = src[y as usize * src_step + x as usize];
                        if val > max_val {
                            max_val = val;
                        }
                    }
                }
            }

            dst[q * dst_step + w] = max_val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{cpu, KernelShape, StructuringElement};
    use morphbench_image::{Image, ImageSize};

    #[test]
    fn dilate_single_bright_pixel() {
        let src = [0u8, 0, 0, 0, 255, 0, 0, 0, 0];
        let mut dst = [0u8; 9];
        let se = [1u8; 9];

        dilate(3, 3, 3, &src, 3, &mut dst, 3, 3, 3, &se, 1, 1);

        assert!(dst.iter().all(|&v| v == 255));
    }

    #[test]
    fn dilate_respects_stride() {
        // 2x2 image embedded in buffers with step 4
        let src = [9u8, 0, 0xAA, 0xAA, 0, 0, 0xAA, 0xAA];
        let mut dst = [0u8; 8];
        let se = [1u8; 9];

        dilate(2, 2, 4, &src, 4, &mut dst, 3, 3, 3, &se, 1, 1);

        assert_eq!(&dst[0..2], &[9, 9]);
        assert_eq!(&dst[4..6], &[9, 9]);
        // bytes past the row are untouched
        assert_eq!(&dst[2..4], &[0, 0]);
    }

    #[test]
    fn dilate_matches_cpu_backend() {
        let size = ImageSize {
            width: 17,
            height: 11,
        };
        let data = (0..size.width * size.height)
            .map(|i| ((i * 31 + 7) % 256) as u8)
            .collect::<Vec<_>>();
        let src = Image::<u8, 1>::new(size, data).unwrap();

        for elem_size in [3usize, 5, 7, 9] {
            let se = StructuringElement::new(KernelShape::Ellipse {
                width: elem_size,
                height: elem_size,
            })
            .unwrap();

            let mut expected = Image::from_size_val(size, 0u8).unwrap();
            cpu::dilate(&src, &mut expected, &se).unwrap();

            let mut dst = Image::<u8, 1>::from_size_val(size, 0u8).unwrap();
            let (anchor_x, anchor_y) = se.anchor();
            dilate(
                size.height,
                size.width,
                size.width,
                src.as_slice(),
                size.width,
                dst.as_slice_mut(),
                se.height(),
                se.width(),
                se.width(),
                se.data(),
                anchor_x,
                anchor_y,
            );

            assert_eq!(dst.as_slice(), expected.as_slice(), "size {elem_size}");
        }
    }
}
