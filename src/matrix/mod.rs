//! Модуль для работы с матрицами
//!
//! Предоставляет:
//! - Тип матрицы
//! - Генерацию входных данных, эталонное умножение на CPU и сравнение результатов
//! - Исходный код ядра для GPU

mod types;
pub mod operations;
pub mod kernels;

pub use types::{Matrix, MatrixError};
pub use operations::{compare_results, cpu_matrix_multiply, fill_random, RAND_MAX};
pub use kernels::{MULT_MAT_ENTRY_POINT, MULT_MAT_KERNEL};
