use std::path::Path;
use std::time::{Duration, Instant};

use morphbench_image::Image;
use morphbench_imgproc::color;
use morphbench_imgproc::metrics;
use morphbench_imgproc::morphology::{
    cpu, pencil, GpuDilate, GpuError, KernelShape, MorphologyError, StructuringElement,
};
use morphbench_io::{png, IoError};

use crate::pool::{PoolError, PoolRecord};
use crate::timing::Timing;

/// Maximum L2 norm between two backend results considered equivalent.
pub const EQUIVALENCE_TOLERANCE: f64 = 0.01;

/// Errors raised by the benchmark run.
#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    /// The backend results diverged beyond the tolerance.
    #[error(
        "The backend results are not equivalent: cpu/gpu norm {cpu_gpu}, cpu/pencil norm {cpu_pencil}"
    )]
    ResultMismatch {
        /// L2 norm between the CPU and GPU results.
        cpu_gpu: f64,
        /// L2 norm between the CPU and generated results.
        cpu_pencil: f64,
    },

    /// Error while loading the image pool.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Error in a morphological operation.
    #[error(transparent)]
    Morphology(#[from] MorphologyError),

    /// Error in the GPU backend.
    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// Error in an image operation.
    #[error(transparent)]
    Image(#[from] morphbench_image::ImageError),

    /// Error while dumping diverging results.
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Configuration of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Structuring element sizes to test.
    pub elem_sizes: Vec<usize>,
    /// Number of passes over the pool.
    pub iterations: usize,
    /// Compare only the CPU and generated backends.
    pub skip_gpu: bool,
}

/// Run the dilation benchmark over the pooled images.
///
/// For every iteration, pooled image and structuring element size the
/// three backends are invoked and timed, their results are checked for
/// numerical equivalence and one table row is printed. On divergence the
/// three results are dumped to the current directory and the run stops
/// with an error.
pub fn time_dilate(pool: &[PoolRecord], config: &BenchConfig) -> Result<(), BenchError> {
    let mut timing = Timing::new("dilate image");

    let gpu = if config.skip_gpu {
        None
    } else {
        Some(GpuDilate::new()?)
    };

    if gpu.is_some() {
        Timing::print_header();
    } else {
        Timing::print_short_header();
    }

    for _ in 0..config.iterations {
        for item in pool {
            let rgb = item.load()?;
            let mut gray = Image::from_size_val(rgb.size(), 0u8)?;
            color::gray_from_rgb_u8(&rgb, &mut gray)?;

            for &elem_size in &config.elem_sizes {
                let se = StructuringElement::new(KernelShape::Ellipse {
                    width: elem_size,
                    height: elem_size,
                })?;

                // cpu backend
                let mut cpu_result = Image::from_size_val(gray.size(), 0u8)?;
                let cpu_start = Instant::now();
                cpu::dilate(&gray, &mut cpu_result, &se)?;
                let elapsed_cpu = cpu_start.elapsed();

                // gpu backend, timed with and without the transfers
                let (gpu_result, elapsed_gpu_with_copy, elapsed_gpu_nocopy) =
                    match gpu.as_ref() {
                        Some(gpu) => {
                            let copy_start = Instant::now();
                            let src_gpu = gpu.upload(&gray);
                            let dst_gpu = gpu.alloc_output(gray.size());
                            let kernel_start = Instant::now();
                            gpu.dispatch(&src_gpu, &dst_gpu, &se)?;
                            let elapsed_kernel = kernel_start.elapsed();
                            let result = gpu.download(&dst_gpu)?;
                            (Some(result), copy_start.elapsed(), elapsed_kernel)
                        }
                        None => (None, Duration::ZERO, Duration::ZERO),
                    };

                // generated backend
                let mut pen_result = Image::from_size_val(gray.size(), 0u8)?;
                let (anchor_x, anchor_y) = se.anchor();
                let pencil_start = Instant::now();
                pencil::dilate(
                    gray.height(),
                    gray.width(),
                    gray.width(),
                    gray.as_slice(),
                    gray.width(),
                    pen_result.as_slice_mut(),
                    se.height(),
                    se.width(),
                    se.width(),
                    se.data(),
                    anchor_x,
                    anchor_y,
                );
                let elapsed_pencil = pencil_start.elapsed();

                // verifying the results
                if let Err(e) =
                    check_equivalence(&cpu_result, gpu_result.as_ref(), &pen_result)
                {
                    dump_results(
                        Path::new("."),
                        &cpu_result,
                        gpu_result.as_ref(),
                        &pen_result,
                    )?;
                    return Err(e);
                }

                match gpu_result {
                    Some(_) => {
                        log::debug!(
                            "{}: elem size {}, gpu kernel only {:.6}s",
                            item.path().display(),
                            elem_size,
                            elapsed_gpu_nocopy.as_secs_f64()
                        );
                        timing.print(elapsed_cpu, elapsed_gpu_with_copy, elapsed_pencil);
                    }
                    None => timing.print_short(elapsed_cpu, elapsed_pencil),
                }
            }
        }
    }

    timing.print_summary(gpu.is_some());

    Ok(())
}

/// Check that the backend results agree within [`EQUIVALENCE_TOLERANCE`].
fn check_equivalence(
    cpu_result: &Image<u8, 1>,
    gpu_result: Option<&Image<u8, 1>>,
    pen_result: &Image<u8, 1>,
) -> Result<(), BenchError> {
    let cpu_gpu = match gpu_result {
        Some(gpu_result) => metrics::l2_norm_diff(cpu_result, gpu_result)?,
        None => 0.0,
    };
    let cpu_pencil = metrics::l2_norm_diff(cpu_result, pen_result)?;

    if cpu_gpu > EQUIVALENCE_TOLERANCE || cpu_pencil > EQUIVALENCE_TOLERANCE {
        return Err(BenchError::ResultMismatch {
            cpu_gpu,
            cpu_pencil,
        });
    }

    Ok(())
}

/// Dump the diverging backend results for offline inspection.
fn dump_results(
    dir: &Path,
    cpu_result: &Image<u8, 1>,
    gpu_result: Option<&Image<u8, 1>>,
    pen_result: &Image<u8, 1>,
) -> Result<(), IoError> {
    png::write_image_png_gray8(dir.join("cpu_dilate.png"), cpu_result)?;
    if let Some(gpu_result) = gpu_result {
        png::write_image_png_gray8(dir.join("gpu_dilate.png"), gpu_result)?;
    }
    png::write_image_png_gray8(dir.join("pencil_dilate.png"), pen_result)?;

    Ok(())
}
