//! Запуск ядра умножения на устройстве
//!
//! [`DeviceSession`] владеет всеми объектами рантайма: контекстом, очередью,
//! программой, ядром и буферами. Каждый объект сохраняется сразу после
//! создания, а освобождение выполняется один раз, в обратном порядке,
//! при `release` или `Drop`. Поэтому ошибка на любом шаге, пробрасываемая
//! через `?`, не оставляет утечек.

use crate::error::ClError;
use crate::matrix::{Matrix, MULT_MAT_ENTRY_POINT, MULT_MAT_KERNEL};
use crate::opencl::runtime::{ComputeRuntime, KernelArg, MemAccess};
use crate::utils::StopWatch;
use anyhow::{Context, Result};
use std::time::Duration;

/// Сессия устройства на один запуск ядра
pub struct DeviceSession<'r, R: ComputeRuntime> {
    runtime: &'r R,
    device_name: String,
    context: Option<R::Context>,
    queue: Option<R::Queue>,
    program: Option<R::Program>,
    kernel: Option<R::Kernel>,
    buffer_a: Option<R::Buffer>,
    buffer_b: Option<R::Buffer>,
    buffer_c: Option<R::Buffer>,
}

impl<'r, R: ComputeRuntime> DeviceSession<'r, R> {
    /// Находит GPU, создает контекст и очередь, компилирует ядро `multMat_GPU`
    pub fn open(runtime: &'r R) -> Result<Self> {
        log::info!("Инициализация OpenCL...");
        let platform = runtime.platform().context("поиск платформы OpenCL")?;
        let device = runtime.gpu_device(platform).context("поиск GPU устройства")?;
        let device_name = runtime.device_name(device).context("чтение имени устройства")?;
        log::info!("Устройство: {}", device_name);

        let mut session = Self {
            runtime,
            device_name,
            context: None,
            queue: None,
            program: None,
            kernel: None,
            buffer_a: None,
            buffer_b: None,
            buffer_c: None,
        };

        let context = runtime.create_context(device).context("создание контекста")?;
        session.context = Some(context);

        log::info!("Создание очереди команд...");
        session.queue = Some(runtime.create_queue(context, device).context("создание очереди команд")?);

        log::info!("Компиляция OpenCL программы...");
        let program = runtime
            .create_program(context, MULT_MAT_KERNEL)
            .context("создание программы")?;
        session.program = Some(program);
        runtime.build_program(program, device).context("компиляция программы")?;

        log::info!("Создание ядра {}...", MULT_MAT_ENTRY_POINT);
        session.kernel = Some(
            runtime
                .create_kernel(program, MULT_MAT_ENTRY_POINT)
                .context("создание ядра")?,
        );

        Ok(session)
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Умножает `a * b` на устройстве.
    ///
    /// Возвращает C и время «запуск ядра + ожидание очереди»; загрузка
    /// и выгрузка данных в замер не входят.
    pub fn multiply(&mut self, a: &Matrix, b: &Matrix) -> Result<(Matrix, Duration)> {
        a.ensure_multipliable(b)?;
        if self.buffer_a.is_some() || self.buffer_b.is_some() || self.buffer_c.is_some() {
            anyhow::bail!("буферы устройства не переиспользуются: сессия рассчитана на один запуск ядра");
        }
        let mut c = Matrix::zeros(a.rows(), b.cols()).context("выделение памяти для C")?;

        let runtime = self.runtime;
        let (context, queue, kernel) = match (self.context, self.queue, self.kernel) {
            (Some(context), Some(queue), Some(kernel)) => (context, queue, kernel),
            _ => anyhow::bail!("сессия устройства уже освобождена"),
        };

        log::info!("Создание буферов OpenCL...");
        let buffer_a = runtime
            .create_buffer(context, MemAccess::ReadOnly, a.byte_size())
            .context("выделение памяти устройства для device_A")?;
        self.buffer_a = Some(buffer_a);
        let buffer_b = runtime
            .create_buffer(context, MemAccess::ReadOnly, b.byte_size())
            .context("выделение памяти устройства для device_B")?;
        self.buffer_b = Some(buffer_b);
        let buffer_c = runtime
            .create_buffer(context, MemAccess::WriteOnly, c.byte_size())
            .context("выделение памяти устройства для device_C")?;
        self.buffer_c = Some(buffer_c);

        let buffers = [buffer_a, buffer_b, buffer_c];
        match run_kernel(runtime, queue, kernel, buffers, a, b, &mut c) {
            Ok(elapsed) => Ok((c, elapsed)),
            Err(e) => {
                // Незавершенные записи читают срезы `a` и `b`
                if let Err(finish_err) = runtime.finish(queue) {
                    log::warn!("очередь не опустошена после ошибки: {}", finish_err);
                }
                Err(e)
            }
        }
    }

    /// Освобождает ресурсы в порядке, обратном созданию.
    ///
    /// Уже освобожденные (или не созданные) объекты пропускаются.
    pub fn release(&mut self) {
        let runtime = self.runtime;

        // Ожидающие записи не должны пережить буферы
        if let Some(queue) = self.queue {
            if let Err(e) = runtime.finish(queue) {
                log::warn!("очередь не опустошена перед освобождением: {}", e);
            }
        }

        if let Some(buffer) = self.buffer_c.take() {
            runtime.release_buffer(buffer);
        }
        if let Some(buffer) = self.buffer_b.take() {
            runtime.release_buffer(buffer);
        }
        if let Some(buffer) = self.buffer_a.take() {
            runtime.release_buffer(buffer);
        }
        if let Some(kernel) = self.kernel.take() {
            runtime.release_kernel(kernel);
        }
        if let Some(program) = self.program.take() {
            runtime.release_program(program);
        }
        if let Some(queue) = self.queue.take() {
            runtime.release_queue(queue);
        }
        if let Some(context) = self.context.take() {
            runtime.release_context(context);
        }
    }
}

impl<R: ComputeRuntime> Drop for DeviceSession<'_, R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Загрузка входов, аргументы, запуск ядра и чтение C.
///
/// При ошибке очередь может содержать незавершенные записи из `a` и `b`.
fn run_kernel<R: ComputeRuntime>(
    runtime: &R,
    queue: R::Queue,
    kernel: R::Kernel,
    [buffer_a, buffer_b, buffer_c]: [R::Buffer; 3],
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
) -> Result<Duration> {
    runtime
        .enqueue_write(queue, buffer_a, a.as_slice())
        .context("загрузка device_A")?;
    runtime
        .enqueue_write(queue, buffer_b, b.as_slice())
        .context("загрузка device_B")?;

    log::info!("Установка аргументов ядра...");
    let args = [
        KernelArg::Buffer(buffer_a),
        KernelArg::Buffer(buffer_b),
        KernelArg::Buffer(buffer_c),
        KernelArg::Int(device_int("num_rows_A", a.rows())?),
        KernelArg::Int(device_int("num_cols_A", a.cols())?),
        KernelArg::Int(device_int("num_cols_B", b.cols())?),
        KernelArg::Int(device_int("num_cols_C", c.cols())?),
    ];
    for (index, arg) in (0u32..).zip(args) {
        runtime.set_kernel_arg(kernel, index, arg)?;
    }

    log::info!("Запуск вычислений на GPU...");
    let global = [a.rows(), b.cols()];
    let mut timer = StopWatch::new();
    timer.start();
    runtime
        .enqueue_kernel_2d(queue, kernel, global)
        .context("запуск ядра")?;
    runtime.finish(queue).context("ожидание завершения ядра")?;
    timer.stop();
    log::info!("GPU вычисления завершены за {:.3} мс", timer.elapsed_ms());

    log::info!("Чтение результатов GPU...");
    runtime
        .enqueue_read(queue, buffer_c, c.as_mut_slice())
        .context("чтение device_C")?;

    Ok(timer.elapsed())
}

/// Размерность как `int` аргумент ядра
fn device_int(what: &'static str, value: usize) -> Result<i32, ClError> {
    i32::try_from(value).map_err(|_| ClError::OutOfRange { what, value })
}
