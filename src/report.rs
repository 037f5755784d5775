//! Итоговый отчет: точность и производительность GPU относительно CPU

use crate::matrix::Matrix;
use prettytable::{row, Table};
use std::fmt;

/// Результат сравнения GPU и CPU
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accuracy {
    WithinTolerance,
    /// Первый (в построчном порядке) элемент за пределами допуска
    Mismatch { row: usize, col: usize, expected: f32, actual: f32 },
}

impl Accuracy {
    pub fn is_accurate(&self) -> bool {
        matches!(self, Accuracy::WithinTolerance)
    }

    pub fn describe(&self, epsilon: f32) -> String {
        match self {
            Accuracy::WithinTolerance => {
                format!("Все результаты GPU отличаются от результатов CPU не более чем на {:.6}", epsilon)
            }
            Accuracy::Mismatch { row, col, expected, actual } => format!(
                "GPU выдал как минимум один результат, отличающийся от CPU более чем на {:.6}, \
                 в позиции ({}, {}): CPU = {}, GPU = {}",
                epsilon, row, col, expected, actual
            ),
        }
    }
}

/// Сравнение времени выполнения; множитель всегда >= 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Performance {
    GpuFaster(f64),
    CpuFaster(f64),
}

impl Performance {
    /// Строит вердикт по отношению CPU / GPU.
    ///
    /// Нулевое время GPU при ненулевом CPU дает бесконечный множитель в пользу GPU,
    /// два нулевых времени считаются равенством.
    pub fn from_timings(cpu_ms: f64, gpu_ms: f64) -> Self {
        let ratio = if gpu_ms > 0.0 {
            cpu_ms / gpu_ms
        } else if cpu_ms > 0.0 {
            f64::INFINITY
        } else {
            1.0
        };

        if ratio < 1.0 {
            Performance::CpuFaster(1.0 / ratio)
        } else {
            Performance::GpuFaster(ratio)
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            Performance::GpuFaster(f) | Performance::CpuFaster(f) => *f,
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Performance::GpuFaster(x) => write!(f, "GPU быстрее CPU в {:.6} раз", x),
            Performance::CpuFaster(x) => write!(f, "CPU быстрее GPU в {:.6} раз", x),
        }
    }
}

/// Размерность и объем одной матрицы в отчете
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixSummary {
    pub name: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub bytes: usize,
}

impl MatrixSummary {
    pub fn of(name: &'static str, matrix: &Matrix) -> Self {
        Self {
            name,
            rows: matrix.rows(),
            cols: matrix.cols(),
            bytes: matrix.byte_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub device: String,
    /// A, B, C и эталон в этом порядке
    pub matrices: Vec<MatrixSummary>,
    pub cpu_ms: f64,
    pub gpu_ms: f64,
    pub epsilon: f32,
    pub accuracy: Accuracy,
    pub performance: Performance,
}

impl BenchmarkReport {
    fn matrix_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Матрица", "Размерность", "Размер (байт)"]);
        for m in &self.matrices {
            table.add_row(row![m.name, format!("{} x {}", m.rows, m.cols), m.bytes]);
        }
        table
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Устройство: {}", self.device)?;
        writeln!(f)?;
        write!(f, "{}", self.matrix_table())?;
        writeln!(f)?;
        writeln!(f, "\tВремя выполнения на CPU: {:.6} мс", self.cpu_ms)?;
        writeln!(f, "\tВремя выполнения на GPU: {:.6} мс", self.gpu_ms)?;
        writeln!(f)?;
        writeln!(f, "Точность (CPU vs GPU):")?;
        writeln!(f, "\t{}", self.accuracy.describe(self.epsilon))?;
        writeln!(f, "Производительность (CPU vs GPU):")?;
        writeln!(f, "\t{}", self.performance)
    }
}
