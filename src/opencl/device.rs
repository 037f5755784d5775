//! Реализация [`ComputeRuntime`] поверх OpenCL

use super::bindings::*;
use super::runtime::{ComputeRuntime, KernelArg, MemAccess};
use super::types::*;
use crate::error::{ClError, ClResult};
use crate::{cl_check, cl_create};
use std::ffi::{c_char, c_void, CString};
use std::ptr;

/// OpenCL рантайм, использующий первую платформу и первое GPU-устройство
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenClRuntime;

impl OpenClRuntime {
    pub fn new() -> Self {
        Self
    }

    /// Читает лог компиляции программы для устройства
    fn build_log(program: cl_program, device: cl_device_id) -> ClResult<String> {
        let mut log_size: usize = 0;
        cl_check!(clGetProgramBuildInfo(
            program,
            device,
            CL_PROGRAM_BUILD_LOG,
            0,
            ptr::null_mut(),
            &mut log_size
        ))?;

        let mut log = vec![0u8; log_size];
        cl_check!(clGetProgramBuildInfo(
            program,
            device,
            CL_PROGRAM_BUILD_LOG,
            log_size,
            log.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        ))?;

        Ok(String::from_utf8_lossy(&log).trim_end_matches('\0').to_string())
    }
}

/// Предупреждает о неудачном освобождении: очистка продолжается в любом случае
fn log_release(call: &'static str, code: cl_int) {
    if code != CL_SUCCESS {
        log::warn!("{}: failed with code {}", call, code);
    }
}

impl ComputeRuntime for OpenClRuntime {
    type Platform = cl_platform_id;
    type Device = cl_device_id;
    type Context = cl_context;
    type Queue = cl_command_queue;
    type Program = cl_program;
    type Kernel = cl_kernel;
    type Buffer = cl_mem;

    fn platform(&self) -> ClResult<cl_platform_id> {
        let mut platform: cl_platform_id = ptr::null_mut();
        let mut num_platforms: cl_uint = 0;

        let code = unsafe { clGetPlatformIDs(1, &mut platform, &mut num_platforms) };
        if code == CL_PLATFORM_NOT_FOUND_KHR || (code == CL_SUCCESS && num_platforms == 0) {
            return Err(ClError::NotFound { what: "platform" });
        }
        if code != CL_SUCCESS {
            return Err(ClError::Runtime { call: "clGetPlatformIDs", code });
        }
        Ok(platform)
    }

    fn gpu_device(&self, platform: cl_platform_id) -> ClResult<cl_device_id> {
        let mut device: cl_device_id = ptr::null_mut();
        let mut num_devices: cl_uint = 0;

        let code = unsafe { clGetDeviceIDs(platform, CL_DEVICE_TYPE_GPU, 1, &mut device, &mut num_devices) };
        if code == CL_DEVICE_NOT_FOUND || (code == CL_SUCCESS && num_devices == 0) {
            return Err(ClError::NotFound { what: "GPU device" });
        }
        if code != CL_SUCCESS {
            return Err(ClError::Runtime { call: "clGetDeviceIDs", code });
        }
        Ok(device)
    }

    fn device_name(&self, device: cl_device_id) -> ClResult<String> {
        let mut name_size: usize = 0;
        cl_check!(clGetDeviceInfo(device, CL_DEVICE_NAME, 0, ptr::null_mut(), &mut name_size))?;

        let mut name = vec![0u8; name_size];
        cl_check!(clGetDeviceInfo(
            device,
            CL_DEVICE_NAME,
            name_size,
            name.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        ))?;

        Ok(String::from_utf8_lossy(&name).trim_end_matches('\0').trim().to_string())
    }

    fn create_context(&self, device: cl_device_id) -> ClResult<cl_context> {
        cl_create!(clCreateContext(ptr::null(), 1, &device, None, ptr::null_mut()))
    }

    fn create_queue(&self, context: cl_context, device: cl_device_id) -> ClResult<cl_command_queue> {
        cl_create!(clCreateCommandQueue(context, device, 0))
    }

    fn create_program(&self, context: cl_context, source: &str) -> ClResult<cl_program> {
        let source_ptr = source.as_ptr() as *const c_char;
        let source_len = source.len();
        cl_create!(clCreateProgramWithSource(context, 1, &source_ptr, &source_len))
    }

    fn build_program(&self, program: cl_program, device: cl_device_id) -> ClResult<()> {
        let status = unsafe { clBuildProgram(program, 1, &device, ptr::null(), None, ptr::null_mut()) };
        if status == CL_SUCCESS {
            return Ok(());
        }

        Err(ClError::build_failure(status, Self::build_log(program, device)))
    }

    fn create_kernel(&self, program: cl_program, entry_point: &str) -> ClResult<cl_kernel> {
        let name = CString::new(entry_point)
            .map_err(|_| ClError::Runtime { call: "clCreateKernel", code: CL_INVALID_VALUE })?;
        cl_create!(clCreateKernel(program, name.as_ptr()))
    }

    fn create_buffer(&self, context: cl_context, access: MemAccess, size: usize) -> ClResult<cl_mem> {
        let flags = match access {
            MemAccess::ReadOnly => CL_MEM_READ_ONLY,
            MemAccess::WriteOnly => CL_MEM_WRITE_ONLY,
        };
        cl_create!(clCreateBuffer(context, flags, size, ptr::null_mut()))
    }

    fn set_kernel_arg(&self, kernel: cl_kernel, index: u32, arg: KernelArg<cl_mem>) -> ClResult<()> {
        let code = match arg {
            KernelArg::Buffer(buffer) => unsafe {
                clSetKernelArg(
                    kernel,
                    index,
                    std::mem::size_of::<cl_mem>(),
                    &buffer as *const cl_mem as *const c_void,
                )
            },
            KernelArg::Int(value) => unsafe {
                clSetKernelArg(
                    kernel,
                    index,
                    std::mem::size_of::<cl_int>(),
                    &value as *const cl_int as *const c_void,
                )
            },
        };

        if code != CL_SUCCESS {
            return Err(ClError::KernelArg { index, code });
        }
        Ok(())
    }

    fn enqueue_write(&self, queue: cl_command_queue, buffer: cl_mem, data: &[f32]) -> ClResult<()> {
        cl_check!(clEnqueueWriteBuffer(
            queue,
            buffer,
            CL_FALSE,
            0,
            std::mem::size_of_val(data),
            data.as_ptr() as *const c_void,
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }

    fn enqueue_kernel_2d(&self, queue: cl_command_queue, kernel: cl_kernel, global: [usize; 2]) -> ClResult<()> {
        cl_check!(clEnqueueNDRangeKernel(
            queue,
            kernel,
            2,
            ptr::null(),
            global.as_ptr(),
            ptr::null(),
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }

    fn finish(&self, queue: cl_command_queue) -> ClResult<()> {
        cl_check!(clFinish(queue))
    }

    fn enqueue_read(&self, queue: cl_command_queue, buffer: cl_mem, out: &mut [f32]) -> ClResult<()> {
        cl_check!(clEnqueueReadBuffer(
            queue,
            buffer,
            CL_TRUE,
            0,
            std::mem::size_of_val(out),
            out.as_mut_ptr() as *mut c_void,
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }

    fn release_buffer(&self, buffer: cl_mem) {
        log_release("clReleaseMemObject", unsafe { clReleaseMemObject(buffer) });
    }

    fn release_kernel(&self, kernel: cl_kernel) {
        log_release("clReleaseKernel", unsafe { clReleaseKernel(kernel) });
    }

    fn release_program(&self, program: cl_program) {
        log_release("clReleaseProgram", unsafe { clReleaseProgram(program) });
    }

    fn release_queue(&self, queue: cl_command_queue) {
        log_release("clReleaseCommandQueue", unsafe { clReleaseCommandQueue(queue) });
    }

    fn release_context(&self, context: cl_context) {
        log_release("clReleaseContext", unsafe { clReleaseContext(context) });
    }
}
