//! OpenCL ядра для матричных операций

/// Имя точки входа ядра умножения
pub const MULT_MAT_ENTRY_POINT: &str = "multMat_GPU";

/// Исходный код наивного ядра умножения: один work-item на элемент C.
///
/// Аргументы: A, B, C, num_rows_A, num_cols_A, num_cols_B, num_cols_C.
pub static MULT_MAT_KERNEL: &str = r#"
#pragma OPENCL FP_CONTRACT OFF

__kernel void multMat_GPU(
    __global const float* A,
    __global const float* B,
    __global float* C,
    const int num_rows_A,
    const int num_cols_A,
    const int num_cols_B,
    const int num_cols_C
) {
    const int row = get_global_id(0);
    const int col = get_global_id(1);

    if (row < num_rows_A && col < num_cols_B) {
        float sum = 0.0f;
        for (int k = 0; k < num_cols_A; k++) {
            sum = sum + A[row * num_cols_A + k] * B[k * num_cols_B + col];
        }
        C[row * num_cols_C + col] = sum;
    }
}
"#;
