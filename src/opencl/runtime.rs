//! Абстракция вычислительного рантайма
//!
//! Методы повторяют вызовы OpenCL, которые нужны конвейеру умножения.
//! Реальная реализация живет в [`super::device`], тесты подставляют
//! свою заглушку с учетом ресурсов.

use crate::error::ClResult;

/// Режим доступа ядра к буферу устройства
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccess {
    ReadOnly,
    WriteOnly,
}

/// Значение аргумента ядра
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArg<B> {
    Buffer(B),
    Int(i32),
}

/// Вычислительный рантайм (платформа, устройство, очередь команд)
pub trait ComputeRuntime {
    type Platform: Copy;
    type Device: Copy;
    type Context: Copy;
    type Queue: Copy;
    type Program: Copy;
    type Kernel: Copy;
    type Buffer: Copy;

    /// Первая доступная платформа
    fn platform(&self) -> ClResult<Self::Platform>;

    /// Первое GPU-устройство платформы. Другие классы устройств не рассматриваются.
    fn gpu_device(&self, platform: Self::Platform) -> ClResult<Self::Device>;

    fn device_name(&self, device: Self::Device) -> ClResult<String>;

    fn create_context(&self, device: Self::Device) -> ClResult<Self::Context>;

    fn create_queue(&self, context: Self::Context, device: Self::Device) -> ClResult<Self::Queue>;

    fn create_program(&self, context: Self::Context, source: &str) -> ClResult<Self::Program>;

    /// Компилирует программу. При ошибке возвращает `ClError::Build` с логом компилятора.
    fn build_program(&self, program: Self::Program, device: Self::Device) -> ClResult<()>;

    fn create_kernel(&self, program: Self::Program, entry_point: &str) -> ClResult<Self::Kernel>;

    fn create_buffer(&self, context: Self::Context, access: MemAccess, size: usize) -> ClResult<Self::Buffer>;

    fn set_kernel_arg(&self, kernel: Self::Kernel, index: u32, arg: KernelArg<Self::Buffer>) -> ClResult<()>;

    /// Неблокирующая запись в буфер устройства.
    ///
    /// `data` должна оставаться живой до `finish` на той же очереди, в том
    /// числе когда последующий шаг завершился ошибкой.
    fn enqueue_write(&self, queue: Self::Queue, buffer: Self::Buffer, data: &[f32]) -> ClResult<()>;

    /// Двумерный запуск ядра; локальный размер группы выбирает драйвер
    fn enqueue_kernel_2d(&self, queue: Self::Queue, kernel: Self::Kernel, global: [usize; 2]) -> ClResult<()>;

    /// Блокирует до опустошения очереди
    fn finish(&self, queue: Self::Queue) -> ClResult<()>;

    /// Блокирующее чтение буфера устройства
    fn enqueue_read(&self, queue: Self::Queue, buffer: Self::Buffer, out: &mut [f32]) -> ClResult<()>;

    fn release_buffer(&self, buffer: Self::Buffer);
    fn release_kernel(&self, kernel: Self::Kernel);
    fn release_program(&self, program: Self::Program);
    fn release_queue(&self, queue: Self::Queue);
    fn release_context(&self, context: Self::Context);
}
