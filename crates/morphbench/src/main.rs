use std::path::PathBuf;

use argh::FromArgs;

mod bench;
mod pool;
mod timing;

use bench::BenchConfig;

#[derive(FromArgs)]
/// Benchmark the CPU, GPU and generated dilation backends over a pool of
/// JPEG images, verifying that their results are numerically equivalent.
struct Args {
    /// path to the directory containing the testing images (default: ./pool)
    #[argh(option, short = 'p', default = "PathBuf::from(\"pool\")")]
    pool: PathBuf,

    /// structuring element size to test, repeatable (default: 3 5 7 9)
    #[argh(option, short = 'e')]
    elem_size: Vec<usize>,

    /// number of passes over the pool (default: 6)
    #[argh(option, short = 'n', default = "6")]
    iterations: usize,

    /// run a single experiment: element size 7, one pass
    #[argh(switch)]
    single: bool,

    /// skip the GPU backend and compare only the CPU and generated results
    #[argh(switch)]
    skip_gpu: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    println!(
        "This executable is iterating over all the files which are present in the directory `{}'.",
        args.pool.display()
    );

    let pool = pool::get_pool(&args.pool)?;
    if pool.is_empty() {
        log::warn!("no .jpg/.jpeg files found in `{}'", args.pool.display());
    }

    let config = if args.single {
        BenchConfig {
            elem_sizes: vec![7],
            iterations: 1,
            skip_gpu: args.skip_gpu,
        }
    } else {
        BenchConfig {
            elem_sizes: if args.elem_size.is_empty() {
                vec![3, 5, 7, 9]
            } else {
                args.elem_size.clone()
            },
            iterations: args.iterations,
            skip_gpu: args.skip_gpu,
        }
    };

    bench::time_dilate(&pool, &config)?;

    Ok(())
}
