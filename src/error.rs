//! Ошибки вычислительного рантайма

use thiserror::Error;

/// Ошибка вызова OpenCL (или его заглушки)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClError {
    /// Вызов API вернул код, отличный от CL_SUCCESS
    #[error("{call}: failed with code {code}")]
    Runtime { call: &'static str, code: i32 },

    #[error("clSetKernelArg: failed for argument {index} with code {code}")]
    KernelArg { index: u32, code: i32 },

    /// Компиляция ядра не удалась; `log` содержит вывод компилятора
    #[error("clBuildProgram: failed with code {code}\nbuild log:\n{log}")]
    Build { code: i32, log: String },

    #[error("no OpenCL {what} found")]
    NotFound { what: &'static str },

    /// Значение не помещается в аргумент ядра или размер буфера
    #[error("{what} = {value} does not fit the device argument type")]
    OutOfRange { what: &'static str, value: usize },
}

impl ClError {
    /// Код статуса OpenCL, если он есть
    pub fn code(&self) -> Option<i32> {
        match self {
            ClError::Runtime { code, .. }
            | ClError::KernelArg { code, .. }
            | ClError::Build { code, .. } => Some(*code),
            ClError::NotFound { .. } | ClError::OutOfRange { .. } => None,
        }
    }

    /// Ошибка сборки; код статуса сохраняется, даже если лог прочитать не удалось
    pub fn build_failure(code: i32, build_log: ClResult<String>) -> ClError {
        let log = build_log.unwrap_or_else(|e| {
            log::warn!("лог компиляции недоступен: {}", e);
            String::new()
        });
        ClError::Build { code, log }
    }
}

pub type ClResult<T> = std::result::Result<T, ClError>;
