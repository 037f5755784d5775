//! Бенчмарк умножения матриц: ядро OpenCL против однопоточного CPU

use opencl_matmul_bench::{run_and_report, BenchmarkConfig, OpenClRuntime};

fn main() {
    env_logger::init();

    let config = BenchmarkConfig::default();
    let runtime = OpenClRuntime::new();
    let code = run_and_report(&runtime, &config, &mut std::io::stdout());
    std::process::exit(code);
}
