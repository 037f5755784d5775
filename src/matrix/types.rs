//! Типы матриц и связанные структуры

use std::fmt::Write as _;
use thiserror::Error;

/// Ошибки работы с матрицами на хосте
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("failed to allocate host memory for a {rows}x{cols} matrix ({bytes} bytes)")]
    Allocation { rows: usize, cols: usize, bytes: usize },

    #[error("dimension mismatch: [{a_rows}x{a_cols}] x [{b_rows}x{b_cols}]")]
    ShapeMismatch { a_rows: usize, a_cols: usize, b_rows: usize, b_cols: usize },

    #[error("{len} elements do not form a {rows}x{cols} matrix")]
    LengthMismatch { rows: usize, cols: usize, len: usize },
}

/// Плотная матрица f32, хранимая построчно
///
/// Элемент (r, c) лежит по индексу `r * cols + c`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Выделяет нулевую матрицу. Нехватка памяти возвращается как ошибка, а не abort.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        let alloc_error = || MatrixError::Allocation {
            rows,
            cols,
            bytes: rows.saturating_mul(cols).saturating_mul(std::mem::size_of::<f32>()),
        };

        let len = rows.checked_mul(cols).ok_or_else(alloc_error)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| alloc_error())?;
        data.resize(len, 0.0);

        Ok(Self { rows, cols, data })
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, MatrixError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(MatrixError::LengthMismatch { rows, cols, len: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Единичная матрица n x n
    pub fn identity(n: usize) -> Result<Self, MatrixError> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Размер данных в байтах (ровно столько выделяется на устройстве)
    pub fn byte_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Проверяет, что `self * rhs` определено
    pub fn ensure_multipliable(&self, rhs: &Matrix) -> Result<(), MatrixError> {
        if self.cols != rhs.rows {
            return Err(MatrixError::ShapeMismatch {
                a_rows: self.rows,
                a_cols: self.cols,
                b_rows: rhs.rows,
                b_cols: rhs.cols,
            });
        }
        Ok(())
    }

    /// Левый верхний угол n x n для отладочного вывода
    pub fn preview(&self, n: usize) -> String {
        let mut out = String::new();
        for i in 0..n.min(self.rows) {
            for j in 0..n.min(self.cols) {
                let _ = write!(out, "{:.3} ", self.data[i * self.cols + j]);
            }
            if self.cols > n {
                out.push_str("...");
            }
            out.push('\n');
        }
        if self.rows > n {
            out.push_str("...\n");
        }
        out
    }
}
