//! OpenCL matrix multiplication benchmark: GPU kernel vs CPU reference

pub mod benchmark;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod matrix;
pub mod opencl;
pub mod report;
pub mod utils;

// Реэкспортируем макросы на уровень крейта
#[macro_use]
mod macros {
    /// Макрос для обработки кодов возврата OpenCL
    #[macro_export]
    macro_rules! cl_check {
        ($func:ident($($arg:expr),* $(,)?)) => {{
            let code = unsafe { $func($($arg),*) };
            if code != $crate::opencl::types::CL_SUCCESS {
                Err($crate::error::ClError::Runtime { call: stringify!($func), code })
            } else {
                Ok(())
            }
        }};
    }

    /// Макрос для функций OpenCL, создающих объект.
    /// Последний аргумент (`errcode_ret`) подставляется сам.
    #[macro_export]
    macro_rules! cl_create {
        ($func:ident($($arg:expr),* $(,)?)) => {{
            let mut code: $crate::opencl::types::cl_int = $crate::opencl::types::CL_SUCCESS;
            let obj = unsafe { $func($($arg,)* &mut code) };
            if code != $crate::opencl::types::CL_SUCCESS || obj.is_null() {
                Err($crate::error::ClError::Runtime { call: stringify!($func), code })
            } else {
                Ok(obj)
            }
        }};
    }
}

// Реэкспорт основных типов для удобства
pub use benchmark::{run_and_report, run_benchmark, run_with_inputs, BenchmarkOutcome};
pub use config::BenchmarkConfig;
pub use dispatcher::DeviceSession;
pub use error::ClError;
pub use matrix::{Matrix, MatrixError};
pub use opencl::runtime::{ComputeRuntime, KernelArg, MemAccess};
#[cfg(feature = "opencl")]
pub use opencl::device::OpenClRuntime;
pub use report::{Accuracy, BenchmarkReport, Performance};
