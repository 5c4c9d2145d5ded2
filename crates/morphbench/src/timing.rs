use std::time::Duration;

/// Formatted timing table with a cumulated speed-improvement summary.
///
/// One row is printed per test case; the per-case quotients are
/// accumulated so the averages can be printed once the run finishes.
#[derive(Debug)]
pub struct Timing {
    name: String,
    cpu_gpu_quotient: f64,
    pencil_gpu_quotient: f64,
    pencil_cpu_quotient: f64,
    nums: i64,
}

impl Timing {
    /// Create a timing table for the named operator.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cpu_gpu_quotient: 0.0,
            pencil_gpu_quotient: 0.0,
            pencil_cpu_quotient: 0.0,
            nums: 0,
        }
    }

    /// Print the three-backend table header.
    pub fn print_header() {
        println!("    Operator - CPU Time - GPU Time - Pencil Time - Pencil/GPU speedup");
    }

    /// Print the two-backend table header used when the GPU is skipped.
    pub fn print_short_header() {
        println!("    Operator - CPU Time - Pencil Time - CPU/Pencil speedup");
    }

    /// Record one three-backend test case and print its row.
    pub fn print(&mut self, cpu: Duration, gpu: Duration, pencil: Duration) {
        let cpu = cpu.as_secs_f64();
        let gpu = gpu.as_secs_f64();
        let pencil = pencil.as_secs_f64();

        self.cpu_gpu_quotient += cpu / gpu;
        self.pencil_gpu_quotient += pencil / gpu;
        self.pencil_cpu_quotient += pencil / cpu;
        self.nums += 1;

        let speedup = pencil / gpu;
        println!(
            "{:>12} - {:>9.6}s - {:>9.6}s - {:>9.6}s - {:>7.3}x",
            self.name, cpu, gpu, pencil, speedup
        );
    }

    /// Record one two-backend test case and print its row.
    pub fn print_short(&mut self, cpu: Duration, pencil: Duration) {
        let cpu = cpu.as_secs_f64();
        let pencil = pencil.as_secs_f64();

        self.pencil_cpu_quotient += pencil / cpu;
        self.nums += 1;

        let speedup = cpu / pencil;
        println!(
            "{:>12} - {:>9.6}s - {:>9.6}s - {:>7.3}x",
            self.name, cpu, pencil, speedup
        );
    }

    /// Print the cumulated speed improvement over all recorded cases.
    pub fn print_summary(&self, with_gpu: bool) {
        if self.nums == 0 {
            return;
        }

        let nums = self.nums as f64;
        println!("Cumulated Speed Improvement:");
        if with_gpu {
            println!(
                "    cpu time    / gpu time: {}x",
                self.cpu_gpu_quotient / nums
            );
            println!(
                "    pencil time / cpu time: {}x",
                self.pencil_cpu_quotient / nums
            );
            println!(
                "    pencil time / gpu time: {}x",
                self.pencil_gpu_quotient / nums
            );
        } else {
            println!(
                "    pencil time / cpu time: {}x",
                self.pencil_cpu_quotient / nums
            );
        }
    }
}
