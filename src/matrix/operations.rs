//! Операции над матрицами

use super::types::{Matrix, MatrixError};
use crate::report::Accuracy;
use rand::Rng;

/// Верхняя граница целочисленного источника случайных чисел.
///
/// 24 бита помещаются в мантиссу f32 без округления, поэтому
/// `x * (1 / RAND_MAX)` для `x < RAND_MAX` всегда строго меньше 1.
pub const RAND_MAX: u32 = (1 << 24) - 1;

/// Заполняет матрицу равномерно распределенными значениями из [0, 1)
pub fn fill_random(matrix: &mut Matrix) {
    let scalar = 1.0f32 / RAND_MAX as f32;
    let mut rng = rand::thread_rng();
    for value in matrix.as_mut_slice() {
        *value = scalar * rng.gen_range(0..RAND_MAX) as f32;
    }
}

impl Matrix {
    /// Выделяет матрицу и заполняет ее случайными значениями из [0, 1)
    pub fn random(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        let mut m = Self::zeros(rows, cols)?;
        fill_random(&mut m);
        Ok(m)
    }
}

/// CPU реализация матричного умножения (эталон для сравнения).
///
/// Накопление идет в f32 в порядке возрастания k, как в ядре `multMat_GPU`.
pub fn cpu_matrix_multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    a.ensure_multipliable(b)?;

    let (m, k_dim, n) = (a.rows(), a.cols(), b.cols());
    let mut c = Matrix::zeros(m, n)?;
    let (a, b) = (a.as_slice(), b.as_slice());
    let out = c.as_mut_slice();

    for row in 0..m {
        for col in 0..n {
            let mut sum = 0.0f32;
            for k in 0..k_dim {
                sum += a[row * k_dim + k] * b[k * n + col];
            }
            out[row * n + col] = sum;
        }
    }

    Ok(c)
}

/// Сравнивает результаты GPU и CPU вычислений.
///
/// Просмотр идет построчно и останавливается на первом элементе, для которого
/// `|gold - computed| > epsilon`. NaN считается расхождением.
pub fn compare_results(gold: &Matrix, computed: &Matrix, epsilon: f32) -> Result<Accuracy, MatrixError> {
    if gold.shape() != computed.shape() {
        return Err(MatrixError::ShapeMismatch {
            a_rows: gold.rows(),
            a_cols: gold.cols(),
            b_rows: computed.rows(),
            b_cols: computed.cols(),
        });
    }

    let cols = gold.cols();
    let pairs = gold.as_slice().iter().zip(computed.as_slice());
    for (idx, (&expected, &actual)) in pairs.enumerate() {
        let within = (expected - actual).abs() <= epsilon;
        if !within {
            return Ok(Accuracy::Mismatch {
                row: idx / cols,
                col: idx % cols,
                expected,
                actual,
            });
        }
    }

    Ok(Accuracy::WithinTolerance)
}
