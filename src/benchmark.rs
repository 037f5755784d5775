//! Конвейер бенчмарка: генерация данных, GPU, эталон на CPU, сравнение

use crate::config::BenchmarkConfig;
use crate::dispatcher::DeviceSession;
use crate::matrix::{compare_results, cpu_matrix_multiply, Matrix};
use crate::opencl::runtime::ComputeRuntime;
use crate::report::{BenchmarkReport, MatrixSummary, Performance};
use crate::utils::{as_millis_f64, measure_time};
use anyhow::{Context, Result};
use std::io::Write;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Результат одного прогона
#[derive(Debug, Clone)]
pub struct BenchmarkOutcome {
    /// Произведение, посчитанное на устройстве
    pub product: Matrix,
    pub report: BenchmarkReport,
}

/// Полный прогон на случайных квадратных матрицах размера `config.size`
pub fn run_benchmark<R: ComputeRuntime>(runtime: &R, config: &BenchmarkConfig) -> Result<BenchmarkOutcome> {
    let a = Matrix::random(config.size, config.size).context("выделение памяти для host_A")?;
    let b = Matrix::random(config.size, config.size).context("выделение памяти для host_B")?;
    run_with_inputs(runtime, config, &a, &b)
}

/// Прогон на заданных входных матрицах
pub fn run_with_inputs<R: ComputeRuntime>(
    runtime: &R,
    config: &BenchmarkConfig,
    a: &Matrix,
    b: &Matrix,
) -> Result<BenchmarkOutcome> {
    a.ensure_multipliable(b)?;
    log::debug!("Входная матрица A ({}x{}):\n{}", a.rows(), a.cols(), a.preview(config.preview));
    log::debug!("Входная матрица B ({}x{}):\n{}", b.rows(), b.cols(), b.preview(config.preview));

    // Сессия освобождается до начала вычислений на CPU
    let (product, gpu_time, device) = {
        let mut session = DeviceSession::open(runtime)?;
        let (c, elapsed) = session.multiply(a, b)?;
        (c, elapsed, session.device_name().to_string())
    };
    log::debug!("Результирующая матрица C (GPU):\n{}", product.preview(config.preview));

    log::info!("Запуск вычислений на CPU...");
    let (gold, cpu_time) = measure_time(|| cpu_matrix_multiply(a, b));
    let gold = gold.context("эталонное умножение на CPU")?;
    log::debug!("Результирующая матрица C (CPU):\n{}", gold.preview(config.preview));

    log::info!("Сравнение результатов GPU и CPU...");
    let accuracy = compare_results(&gold, &product, config.epsilon)?;

    let cpu_ms = as_millis_f64(cpu_time);
    let gpu_ms = as_millis_f64(gpu_time);
    let report = BenchmarkReport {
        device,
        matrices: vec![
            MatrixSummary::of("A", a),
            MatrixSummary::of("B", b),
            MatrixSummary::of("C", &product),
            MatrixSummary::of("gold", &gold),
        ],
        cpu_ms,
        gpu_ms,
        epsilon: config.epsilon,
        accuracy,
        performance: Performance::from_timings(cpu_ms, gpu_ms),
    };

    Ok(BenchmarkOutcome { product, report })
}

/// Печатает отчет или диагностику и возвращает код завершения процесса
pub fn report_outcome<W: Write>(outcome: Result<BenchmarkOutcome>, out: &mut W) -> i32 {
    match outcome {
        Ok(outcome) => match writeln!(out, "{}", outcome.report) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                log::error!("не удалось вывести отчет: {}", e);
                EXIT_FAILURE
            }
        },
        Err(e) => {
            // Ресурсы устройства к этому моменту уже освобождены сессией
            if let Err(write_err) = writeln!(out, "Ошибка: {:#}", e) {
                log::error!("не удалось вывести диагностику ({:#}): {}", e, write_err);
            }
            EXIT_FAILURE
        }
    }
}

/// Точка входа процесса: прогон, вывод в `out`, код завершения
pub fn run_and_report<R: ComputeRuntime, W: Write>(runtime: &R, config: &BenchmarkConfig, out: &mut W) -> i32 {
    if let Err(e) = writeln!(out, "Умножение матриц на GPU: {0}x{0}", config.size) {
        log::error!("не удалось вывести заголовок: {}", e);
    }
    let outcome = run_benchmark(runtime, config);
    report_outcome(outcome, out)
}
