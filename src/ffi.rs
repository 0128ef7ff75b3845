//! C ABI over opaque `Mat` handles.
//!
//! Handles come from [`cvmat_new`] or from an operation's `out` parameter and
//! must be released with [`cvmat_free`]. Operations return `0` on success or
//! a negative status: [`CVMAT_ERR_NULL`], [`CVMAT_ERR_INVALID_ARGUMENT`],
//! [`CVMAT_ERR_SHAPE`], [`CVMAT_ERR_NATIVE`].
use crate::error::{BindingError, ErrorKind};
use crate::host::HostValue;
use crate::mat::Mat;
use crate::types::{MatType, CV_64F};
use log::warn;
use std::ptr;

pub const CVMAT_OK: i32 = 0;
pub const CVMAT_ERR_NULL: i32 = -1;
pub const CVMAT_ERR_INVALID_ARGUMENT: i32 = -2;
pub const CVMAT_ERR_SHAPE: i32 = -3;
pub const CVMAT_ERR_NATIVE: i32 = -4;

fn status(err: &BindingError) -> i32 {
    match err.kind() {
        ErrorKind::InvalidArgument => CVMAT_ERR_INVALID_ARGUMENT,
        ErrorKind::Shape => CVMAT_ERR_SHAPE,
        ErrorKind::NativeComputation => CVMAT_ERR_NATIVE,
    }
}

/// Writes the result handle to `out`, or maps the error to a status.
unsafe fn finish(result: Result<Mat, BindingError>, out: *mut *mut Mat) -> i32 {
    match result {
        Ok(mat) => {
            unsafe { *out = Box::into_raw(Box::new(mat)) };
            CVMAT_OK
        }
        Err(err) => {
            warn!("cvmat: {err}");
            status(&err)
        }
    }
}

/// Creates a matrix from `len` bytes of native-endian pixel data. `data` may
/// be null to get a zero-filled matrix. Returns null on invalid input.
///
/// # Safety
/// `data` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn cvmat_new(
    rows: u32,
    cols: u32,
    type_code: i32,
    data: *const u8,
    len: usize,
) -> *mut Mat {
    let Some(mat_type) = MatType::from_code(type_code) else {
        return ptr::null_mut();
    };
    let (rows, cols) = (rows as usize, cols as usize);
    let result = if data.is_null() {
        Mat::new_filled(rows, cols, mat_type, &[0.0])
    } else {
        let bytes = unsafe { std::slice::from_raw_parts(data, len) };
        Mat::from_bytes(rows, cols, mat_type, bytes.to_vec())
    };
    match result {
        Ok(mat) => Box::into_raw(Box::new(mat)),
        Err(err) => {
            warn!("cvmat_new: {err}");
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `mat` must be null or a handle not yet freed.
#[no_mangle]
pub unsafe extern "C" fn cvmat_free(mat: *mut Mat) {
    if !mat.is_null() {
        drop(unsafe { Box::from_raw(mat) });
    }
}

/// # Safety
/// `mat` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn cvmat_rows(mat: *const Mat) -> u32 {
    unsafe { mat.as_ref() }.map_or(0, |m| m.rows() as u32)
}

/// # Safety
/// `mat` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn cvmat_cols(mat: *const Mat) -> u32 {
    unsafe { mat.as_ref() }.map_or(0, |m| m.cols() as u32)
}

/// Type code, or `-1` for a null handle.
///
/// # Safety
/// `mat` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn cvmat_type(mat: *const Mat) -> i32 {
    unsafe { mat.as_ref() }.map_or(-1, |m| m.mat_type().code())
}

/// # Safety
/// `mat` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn cvmat_data_len(mat: *const Mat) -> usize {
    unsafe { mat.as_ref() }
        .and_then(|m| m.header().byte_len())
        .unwrap_or(0)
}

/// Copies the pixel bytes into `out`, which must hold `cvmat_data_len` bytes.
///
/// # Safety
/// `mat` must be a live handle and `out` must point to `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn cvmat_copy_data(mat: *const Mat, out: *mut u8, len: usize) -> i32 {
    let Some(mat) = (unsafe { mat.as_ref() }) else {
        return CVMAT_ERR_NULL;
    };
    if out.is_null() {
        return CVMAT_ERR_NULL;
    }
    let bytes = match mat.to_bytes() {
        Ok(bytes) => bytes,
        Err(err) => return status(&err),
    };
    if len < bytes.len() {
        return CVMAT_ERR_SHAPE;
    }
    let dst = unsafe { std::slice::from_raw_parts_mut(out, bytes.len()) };
    dst.copy_from_slice(&bytes);
    CVMAT_OK
}

unsafe fn call(
    name: &str,
    mat: *const Mat,
    options: impl FnOnce() -> Vec<HostValue>,
    out: *mut *mut Mat,
) -> i32 {
    let Some(mat) = (unsafe { mat.as_ref() }) else {
        return CVMAT_ERR_NULL;
    };
    if out.is_null() {
        return CVMAT_ERR_NULL;
    }
    unsafe { finish(mat_call(name, mat, &options()), out) }
}

fn mat_call(name: &str, mat: &Mat, args: &[HostValue]) -> Result<Mat, BindingError> {
    crate::dispatch::Dispatcher::global()?.call(name, mat, args)
}

/// # Safety
/// `mat` must be a live handle; `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn cvmat_cvt_color(mat: *const Mat, code: i32, out: *mut *mut Mat) -> i32 {
    unsafe {
        call(
            "cvtColor",
            mat,
            || vec![HostValue::object([("code", code)])],
            out,
        )
    }
}

unsafe fn morphology(
    name: &str,
    mat: *const Mat,
    kernel: *const Mat,
    iterations: i32,
    out: *mut *mut Mat,
) -> i32 {
    let Some(kernel) = (unsafe { kernel.as_ref() }) else {
        return CVMAT_ERR_NULL;
    };
    unsafe {
        call(
            name,
            mat,
            || {
                vec![HostValue::object([
                    ("kernel", HostValue::from(kernel.clone())),
                    ("iterations", HostValue::from(iterations)),
                ])]
            },
            out,
        )
    }
}

/// # Safety
/// `mat` and `kernel` must be live handles; `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn cvmat_erode(
    mat: *const Mat,
    kernel: *const Mat,
    iterations: i32,
    out: *mut *mut Mat,
) -> i32 {
    unsafe { morphology("erode", mat, kernel, iterations, out) }
}

/// # Safety
/// `mat` and `kernel` must be live handles; `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn cvmat_dilate(
    mat: *const Mat,
    kernel: *const Mat,
    iterations: i32,
    out: *mut *mut Mat,
) -> i32 {
    unsafe { morphology("dilate", mat, kernel, iterations, out) }
}

/// Warps with a row-major 3x3 matrix of nine doubles. The output keeps the
/// input size.
///
/// # Safety
/// `mat` must be a live handle, `matrix_ptr` must point to 9 doubles and
/// `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn cvmat_warp_perspective(
    mat: *const Mat,
    matrix_ptr: *const f64,
    out: *mut *mut Mat,
) -> i32 {
    if matrix_ptr.is_null() {
        return CVMAT_ERR_NULL;
    }
    let input = unsafe { std::slice::from_raw_parts(matrix_ptr, 9) };
    let rows = input
        .chunks(3)
        .map(|row| HostValue::array(row.iter().copied()))
        .collect::<Vec<_>>();
    let matrix = match Mat::new(&HostValue::Array(rows), CV_64F) {
        Ok(m) => m,
        Err(err) => return status(&err),
    };
    unsafe {
        call(
            "warpPerspective",
            mat,
            || vec![HostValue::object([("transformationMatrix", matrix)])],
            out,
        )
    }
}
