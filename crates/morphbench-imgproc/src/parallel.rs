use rayon::prelude::*;

use morphbench_image::Image;

/// Apply a function to each pixel in the image in parallel, by rows.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    src.as_slice()
        .par_chunks_exact(C1 * src.cols())
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * src.cols()))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphbench_image::ImageSize;

    #[test]
    fn par_iter_rows_invert() {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let src = Image::<u8, 1>::new(size, vec![0, 64, 128, 255]).unwrap();
        let mut dst = Image::<u8, 1>::from_size_val(size, 0).unwrap();

        par_iter_rows(&src, &mut dst, |src_pixel, dst_pixel| {
            dst_pixel[0] = 255 - src_pixel[0];
        });

        assert_eq!(dst.as_slice(), &[255, 191, 127, 0]);
    }
}
