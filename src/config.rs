//! Параметры бенчмарка (задаются при компиляции)

/// Размер квадратных матриц и глобальной сетки ядра
pub const BLOCK_SIZE: usize = 1024;

/// Допустимое расхождение GPU и CPU на элемент
pub const EPSILON: f32 = 1e-6;

/// Размер угла матрицы в отладочном выводе
pub const PREVIEW_SIZE: usize = 4;

/// Набор параметров одного прогона
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkConfig {
    /// Размер квадратных матриц A, B и C
    pub size: usize,
    pub epsilon: f32,
    pub preview: usize,
}

impl BenchmarkConfig {
    pub fn with_size(size: usize) -> Self {
        Self { size, ..Self::default() }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            size: BLOCK_SIZE,
            epsilon: EPSILON,
            preview: PREVIEW_SIZE,
        }
    }
}
