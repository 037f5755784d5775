//! Заглушка вычислительного рантайма для интеграционных тестов.
//!
//! Эмулирует ядро `multMat_GPU` на хосте, учитывает каждый созданный и
//! освобожденный объект и умеет провалить заданный вызов.

#![allow(dead_code)]

use opencl_matmul_bench::error::ClResult;
use opencl_matmul_bench::{ClError, ComputeRuntime, KernelArg, MemAccess};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Вызовы, которые могут завершиться ошибкой, в порядке конвейера
pub const FALLIBLE_CALLS: &[(&str, usize)] = &[
    ("clGetPlatformIDs", 1),
    ("clGetDeviceIDs", 1),
    ("clGetDeviceInfo", 1),
    ("clCreateContext", 1),
    ("clCreateCommandQueue", 1),
    ("clCreateProgramWithSource", 1),
    ("clBuildProgram", 1),
    ("clCreateKernel", 1),
    ("clCreateBuffer", 1),
    ("clCreateBuffer", 2),
    ("clCreateBuffer", 3),
    ("clEnqueueWriteBuffer", 1),
    ("clEnqueueWriteBuffer", 2),
    ("clSetKernelArg", 1),
    ("clSetKernelArg", 4),
    ("clSetKernelArg", 7),
    ("clEnqueueNDRangeKernel", 1),
    ("clFinish", 1),
    ("clEnqueueReadBuffer", 1),
];

const CL_OUT_OF_RESOURCES: i32 = -5;
const CL_BUILD_PROGRAM_FAILURE: i32 = -11;
const CL_INVALID_VALUE: i32 = -30;
const CL_INVALID_KERNEL_NAME: i32 = -46;
const CL_INVALID_KERNEL_ARGS: i32 = -52;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Context,
    Queue,
    Program,
    Kernel,
    Buffer,
}

#[derive(Debug)]
struct DeviceBuffer {
    access: MemAccess,
    data: Vec<f32>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    live: BTreeMap<u64, Kind>,
    released: Vec<(Kind, u64)>,
    double_releases: usize,
    calls: Vec<&'static str>,
    buffers: BTreeMap<u64, DeviceBuffer>,
    programs: BTreeMap<u64, (String, bool)>,
    kernel_args: BTreeMap<u64, BTreeMap<u32, KernelArg<u64>>>,
    dispatches: Vec<[usize; 2]>,
}

#[derive(Default)]
pub struct TrackingRuntime {
    state: RefCell<State>,
    fail: Option<(&'static str, usize)>,
    build_log: Option<String>,
}

impl TrackingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Провалить `occurrence`-й (с единицы) вызов `call`
    pub fn failing_at(call: &'static str, occurrence: usize) -> Self {
        Self { fail: Some((call, occurrence)), ..Self::default() }
    }

    /// Компиляция программы завершится ошибкой с этим логом
    pub fn with_build_error(log: &str) -> Self {
        Self { build_log: Some(log.to_string()), ..Self::default() }
    }

    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn released_kinds(&self) -> Vec<Kind> {
        self.state.borrow().released.iter().map(|(kind, _)| *kind).collect()
    }

    /// Идентификаторы в порядке освобождения (выдаются по возрастанию при создании)
    pub fn released_ids(&self) -> Vec<u64> {
        self.state.borrow().released.iter().map(|(_, id)| *id).collect()
    }

    pub fn double_releases(&self) -> usize {
        self.state.borrow().double_releases
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn dispatches(&self) -> Vec<[usize; 2]> {
        self.state.borrow().dispatches.clone()
    }

    /// Размеры всех буферов, созданных за время жизни рантайма
    pub fn buffer_sizes(&self) -> Vec<(MemAccess, usize)> {
        self.state
            .borrow()
            .buffers
            .values()
            .map(|b| (b.access, b.data.len() * std::mem::size_of::<f32>()))
            .collect()
    }

    /// Целочисленные аргументы последнего ядра по индексам
    pub fn int_args(&self) -> BTreeMap<u32, i32> {
        let state = self.state.borrow();
        state
            .kernel_args
            .values()
            .last()
            .map(|args| {
                args.iter()
                    .filter_map(|(i, arg)| match arg {
                        KernelArg::Int(v) => Some((*i, *v)),
                        KernelArg::Buffer(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn call(&self, name: &'static str) -> ClResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(name);
        let occurrence = state.calls.iter().filter(|c| **c == name).count();
        match self.fail {
            Some((call, n)) if call == name && n == occurrence => {
                Err(ClError::Runtime { call: name, code: CL_OUT_OF_RESOURCES })
            }
            _ => Ok(()),
        }
    }

    fn acquire(&self, kind: Kind) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id, kind);
        id
    }

    fn release(&self, kind: Kind, id: u64) {
        let mut state = self.state.borrow_mut();
        match state.live.remove(&id) {
            Some(live_kind) if live_kind == kind => {}
            _ => state.double_releases += 1,
        }
        state.released.push((kind, id));
    }

    fn buffer_arg(args: &BTreeMap<u32, KernelArg<u64>>, index: u32) -> ClResult<u64> {
        match args.get(&index) {
            Some(KernelArg::Buffer(id)) => Ok(*id),
            _ => Err(ClError::Runtime { call: "clEnqueueNDRangeKernel", code: CL_INVALID_KERNEL_ARGS }),
        }
    }

    fn int_arg(args: &BTreeMap<u32, KernelArg<u64>>, index: u32) -> ClResult<usize> {
        match args.get(&index) {
            Some(KernelArg::Int(v)) if *v >= 0 => Ok(*v as usize),
            _ => Err(ClError::Runtime { call: "clEnqueueNDRangeKernel", code: CL_INVALID_KERNEL_ARGS }),
        }
    }
}

impl ComputeRuntime for TrackingRuntime {
    type Platform = u64;
    type Device = u64;
    type Context = u64;
    type Queue = u64;
    type Program = u64;
    type Kernel = u64;
    type Buffer = u64;

    fn platform(&self) -> ClResult<u64> {
        self.call("clGetPlatformIDs")?;
        Ok(0)
    }

    fn gpu_device(&self, _platform: u64) -> ClResult<u64> {
        self.call("clGetDeviceIDs")?;
        Ok(0)
    }

    fn device_name(&self, _device: u64) -> ClResult<String> {
        self.call("clGetDeviceInfo")?;
        Ok("Tracking GPU".to_string())
    }

    fn create_context(&self, _device: u64) -> ClResult<u64> {
        self.call("clCreateContext")?;
        Ok(self.acquire(Kind::Context))
    }

    fn create_queue(&self, _context: u64, _device: u64) -> ClResult<u64> {
        self.call("clCreateCommandQueue")?;
        Ok(self.acquire(Kind::Queue))
    }

    fn create_program(&self, _context: u64, source: &str) -> ClResult<u64> {
        self.call("clCreateProgramWithSource")?;
        let id = self.acquire(Kind::Program);
        self.state.borrow_mut().programs.insert(id, (source.to_string(), false));
        Ok(id)
    }

    fn build_program(&self, program: u64, _device: u64) -> ClResult<()> {
        self.call("clBuildProgram")?;
        if let Some(log) = &self.build_log {
            return Err(ClError::Build { code: CL_BUILD_PROGRAM_FAILURE, log: log.clone() });
        }
        if let Some(entry) = self.state.borrow_mut().programs.get_mut(&program) {
            entry.1 = true;
        }
        Ok(())
    }

    fn create_kernel(&self, program: u64, entry_point: &str) -> ClResult<u64> {
        self.call("clCreateKernel")?;
        let declared = match self.state.borrow().programs.get(&program) {
            Some((source, true)) => source.contains(&format!("__kernel void {}(", entry_point)),
            _ => false,
        };
        if !declared {
            return Err(ClError::Runtime { call: "clCreateKernel", code: CL_INVALID_KERNEL_NAME });
        }
        Ok(self.acquire(Kind::Kernel))
    }

    fn create_buffer(&self, _context: u64, access: MemAccess, size: usize) -> ClResult<u64> {
        self.call("clCreateBuffer")?;
        let id = self.acquire(Kind::Buffer);
        let data = vec![0.0; size / std::mem::size_of::<f32>()];
        self.state.borrow_mut().buffers.insert(id, DeviceBuffer { access, data });
        Ok(id)
    }

    fn set_kernel_arg(&self, kernel: u64, index: u32, arg: KernelArg<u64>) -> ClResult<()> {
        let failed = self.call("clSetKernelArg");
        if let Err(ClError::Runtime { code, .. }) = failed {
            return Err(ClError::KernelArg { index, code });
        }
        self.state
            .borrow_mut()
            .kernel_args
            .entry(kernel)
            .or_default()
            .insert(index, arg);
        Ok(())
    }

    fn enqueue_write(&self, _queue: u64, buffer: u64, data: &[f32]) -> ClResult<()> {
        self.call("clEnqueueWriteBuffer")?;
        let mut state = self.state.borrow_mut();
        match state.buffers.get_mut(&buffer) {
            Some(b) if b.data.len() >= data.len() => {
                b.data[..data.len()].copy_from_slice(data);
                Ok(())
            }
            _ => Err(ClError::Runtime { call: "clEnqueueWriteBuffer", code: CL_INVALID_VALUE }),
        }
    }

    fn enqueue_kernel_2d(&self, _queue: u64, kernel: u64, global: [usize; 2]) -> ClResult<()> {
        self.call("clEnqueueNDRangeKernel")?;
        let mut state = self.state.borrow_mut();
        state.dispatches.push(global);

        let args = state.kernel_args.get(&kernel).cloned().unwrap_or_default();
        let (a_id, b_id, c_id) = (
            Self::buffer_arg(&args, 0)?,
            Self::buffer_arg(&args, 1)?,
            Self::buffer_arg(&args, 2)?,
        );
        let (rows_a, cols_a, cols_b, cols_c) = (
            Self::int_arg(&args, 3)?,
            Self::int_arg(&args, 4)?,
            Self::int_arg(&args, 5)?,
            Self::int_arg(&args, 6)?,
        );

        let a = state.buffers.get(&a_id).map(|b| b.data.clone()).unwrap_or_default();
        let b = state.buffers.get(&b_id).map(|b| b.data.clone()).unwrap_or_default();
        let c = match state.buffers.get_mut(&c_id) {
            Some(c) => &mut c.data,
            None => return Err(ClError::Runtime { call: "clEnqueueNDRangeKernel", code: CL_INVALID_KERNEL_ARGS }),
        };

        // Каждая ячейка сетки независимо считает один элемент C
        for row in 0..global[0] {
            for col in 0..global[1] {
                if row < rows_a && col < cols_b {
                    let mut sum = 0.0f32;
                    for k in 0..cols_a {
                        sum += a[row * cols_a + k] * b[k * cols_b + col];
                    }
                    c[row * cols_c + col] = sum;
                }
            }
        }
        Ok(())
    }

    fn finish(&self, _queue: u64) -> ClResult<()> {
        self.call("clFinish")
    }

    fn enqueue_read(&self, _queue: u64, buffer: u64, out: &mut [f32]) -> ClResult<()> {
        self.call("clEnqueueReadBuffer")?;
        let state = self.state.borrow();
        match state.buffers.get(&buffer) {
            Some(b) if b.data.len() >= out.len() => {
                out.copy_from_slice(&b.data[..out.len()]);
                Ok(())
            }
            _ => Err(ClError::Runtime { call: "clEnqueueReadBuffer", code: CL_INVALID_VALUE }),
        }
    }

    fn release_buffer(&self, buffer: u64) {
        self.release(Kind::Buffer, buffer);
    }

    fn release_kernel(&self, kernel: u64) {
        self.release(Kind::Kernel, kernel);
    }

    fn release_program(&self, program: u64) {
        self.release(Kind::Program, program);
    }

    fn release_queue(&self, queue: u64) {
        self.release(Kind::Queue, queue);
    }

    fn release_context(&self, context: u64) {
        self.release(Kind::Context, context);
    }
}
