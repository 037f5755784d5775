//! Модуль для работы с OpenCL
//!
//! Содержит типы, трейт рантайма и (с фичей `opencl`) низкоуровневые
//! привязки вместе с реальной реализацией поверх них

pub mod runtime;
pub mod types;

#[cfg(feature = "opencl")]
pub mod bindings;
#[cfg(feature = "opencl")]
pub mod device;
