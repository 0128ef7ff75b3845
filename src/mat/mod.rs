//! The `Mat` handle: a typed, shaped matrix owning native pixel storage.
//!
//! Ownership is singular. `Clone` allocates a fresh buffer; the shared handle
//! inside is only ever duplicated by the dispatcher while a non-blocking
//! operation reads the receiver. [`Mat::release`] frees the storage
//! deterministically; a released `Mat` behaves as an empty placeholder and is
//! rejected by every operation before any native call.
mod data;
pub mod native;

pub use self::native::{MatHeader, NativeImage, NativeView};

use self::native::{try_filled, write_sample, NativeBuffer};
use crate::error::BindingError;
use crate::host::HostValue;
use crate::types::{Depth, MatType, CV_8U};
use log::debug;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

pub struct Mat {
    inner: Arc<RwLock<NativeBuffer>>,
}

impl Mat {
    fn from_buffer(buffer: NativeBuffer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }

    /// Wraps the output of a native routine.
    pub fn from_native(image: NativeImage) -> Self {
        Self::from_buffer(NativeBuffer::from_image(image))
    }

    /// Zero-shape placeholder of the given type.
    pub fn empty_of(mat_type: MatType) -> Self {
        Self::from_buffer(NativeBuffer {
            header: MatHeader::empty(mat_type),
            bytes: Some(Vec::new()),
        })
    }

    /// Builds a matrix from nested host arrays: `rows × cols` numbers, or
    /// `rows × cols × channels` for multi-channel types.
    pub fn new(data: &HostValue, mat_type: MatType) -> Result<Self, BindingError> {
        let (header, samples) = data::parse_nested(data, mat_type)?;
        Ok(Self::from_native(NativeImage::from_samples(header, &samples)))
    }

    /// Matrix filled with `fill`, one value per channel or a single value for
    /// all channels.
    pub fn new_filled(
        rows: usize,
        cols: usize,
        mat_type: MatType,
        fill: &[f64],
    ) -> Result<Self, BindingError> {
        let channels = mat_type.channels();
        if fill.len() != 1 && fill.len() != channels {
            return Err(BindingError::invalid_argument(
                "fill",
                format!("1 or {channels} values"),
                format!("expected 1 or {channels} fill values, got {}", fill.len()),
            ));
        }
        let header = MatHeader::new(rows, cols, mat_type);
        let len = header
            .byte_len()
            .ok_or_else(|| BindingError::shape(format!("{rows}x{cols} overflows")))?;
        let depth = mat_type.depth();
        let mut pixel = vec![0u8; mat_type.elem_size()];
        for (ch, chunk) in pixel.chunks_exact_mut(depth.size()).enumerate() {
            write_sample(depth, fill[ch % fill.len()], chunk);
        }
        let mut bytes = try_filled("Mat", len, 0u8)?;
        for chunk in bytes.chunks_exact_mut(pixel.len()) {
            chunk.copy_from_slice(&pixel);
        }
        Ok(Self::from_buffer(NativeBuffer {
            header,
            bytes: Some(bytes),
        }))
    }

    /// Adopts raw native-endian bytes, e.g. from an external image decoder.
    pub fn from_bytes(
        rows: usize,
        cols: usize,
        mat_type: MatType,
        bytes: Vec<u8>,
    ) -> Result<Self, BindingError> {
        let header = MatHeader::new(rows, cols, mat_type);
        let expected = header.byte_len();
        let actual = bytes.len();
        NativeImage::from_raw(header, bytes)
            .map(Self::from_native)
            .ok_or_else(|| {
                BindingError::shape(format!(
                    "buffer of {actual} bytes does not match {rows}x{cols} {mat_type} ({})",
                    expected.map_or("overflow".to_string(), |n| format!("{n} bytes"))
                ))
            })
    }

    pub fn header(&self) -> MatHeader {
        self.inner.read().header
    }

    pub fn rows(&self) -> usize {
        self.header().rows
    }

    pub fn cols(&self) -> usize {
        self.header().cols
    }

    pub fn mat_type(&self) -> MatType {
        self.header().mat_type
    }

    pub fn channels(&self) -> usize {
        self.mat_type().channels()
    }

    pub fn depth(&self) -> Depth {
        self.mat_type().depth()
    }

    pub fn elem_size(&self) -> usize {
        self.mat_type().elem_size()
    }

    pub fn empty(&self) -> bool {
        self.header().is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.inner.read().bytes.is_none()
    }

    /// Frees the native storage now instead of at drop.
    pub fn release(&self) {
        let freed = self.inner.write().release();
        debug!("Mat::release freed {freed} bytes");
    }

    /// Runs `f` over the live storage under a read lock.
    pub fn with_view<R>(&self, f: impl FnOnce(NativeView<'_>) -> R) -> Result<R, BindingError> {
        let guard = self.inner.read();
        let view = guard.view().ok_or_else(released_error)?;
        Ok(f(view))
    }

    /// Copy of the raw native-endian bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BindingError> {
        self.with_view(|v| v.bytes().to_vec())
    }

    /// Deep snapshot as nested host arrays. Never mutates the matrix.
    pub fn get_data(&self) -> Result<HostValue, BindingError> {
        self.with_view(|v| data::to_nested(&v))
    }

    /// Pixel at `(row, col)`: a number, or an array of channel values.
    pub fn at(&self, row: usize, col: usize) -> Result<HostValue, BindingError> {
        self.with_view(|v| {
            if row >= v.rows() || col >= v.cols() {
                return Err(BindingError::invalid_argument(
                    "index",
                    format!("row < {} and col < {}", v.rows(), v.cols()),
                    format!("Index out of bounds: Mat at({row}, {col})"),
                ));
            }
            Ok(data::pixel(&v, row, col))
        })?
    }

    /// Deep copy into a new allocation.
    pub fn copy(&self) -> Self {
        let guard = self.inner.read();
        Self::from_buffer(NativeBuffer {
            header: guard.header,
            bytes: guard.bytes.clone(),
        })
    }

    /// Second handle to the same storage, held by in-flight operations only.
    pub(crate) fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn released_error() -> BindingError {
    BindingError::invalid_argument("this", "live Mat", "Mat has been released")
}

impl Default for Mat {
    fn default() -> Self {
        Self::empty_of(CV_8U)
    }
}

impl Clone for Mat {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl PartialEq for Mat {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let a = self.inner.read();
        let b = other.inner.read();
        a.header == b.header && a.bytes == b.bytes
    }
}

impl fmt::Debug for Mat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.read();
        f.debug_struct("Mat")
            .field("rows", &guard.header.rows)
            .field("cols", &guard.header.cols)
            .field("type", &guard.header.mat_type.to_string())
            .field("released", &guard.bytes.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{CV_32FC2, CV_64F, CV_8UC3};
    use serde_json::json;

    fn host(v: serde_json::Value) -> HostValue {
        HostValue::from(v)
    }

    #[test]
    fn nested_data_round_trips_single_channel() {
        let data = host(json!([[0, 255, 0], [255, 0, 255]]));
        let mat = Mat::new(&data, CV_8U).expect("valid data");
        assert_eq!((mat.rows(), mat.cols(), mat.mat_type()), (2, 3, CV_8U));
        assert_eq!(mat.get_data().expect("live"), data);
    }

    #[test]
    fn nested_data_round_trips_multi_channel() {
        let data = host(json!([[[255, 125, 0], [0, 0, 0]], [[125, 75, 125], [75, 255, 75]]]));
        let mat = Mat::new(&data, CV_8UC3).expect("valid data");
        assert_eq!((mat.rows(), mat.cols(), mat.channels()), (2, 2, 3));
        assert_eq!(mat.get_data().expect("live"), data);
        let again = Mat::new(&mat.get_data().expect("live"), CV_8UC3).expect("valid");
        assert_eq!(again, mat);
    }

    #[test]
    fn float_data_round_trips() {
        let data = host(json!([[0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 1.0]]));
        let mat = Mat::new(&data, CV_64F).expect("valid data");
        assert_eq!(mat.get_data().expect("live"), data);
        assert_eq!(mat.at(1, 1).expect("in range"), HostValue::Number(0.5));
    }

    #[test]
    fn ragged_rows_are_shape_errors() {
        let err = Mat::new(&host(json!([[1, 2], [3]])), CV_8U).expect_err("ragged");
        assert_eq!(err.kind(), ErrorKind::Shape);
        let err = Mat::new(&host(json!([[[1, 2], [3, 4]]])), CV_8UC3).expect_err("short pixel");
        assert_eq!(err.kind(), ErrorKind::Shape);
        let err = Mat::new(&host(json!([1, 2, 3])), CV_8U).expect_err("flat");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn non_numeric_leaf_is_an_argument_error() {
        let err = Mat::new(&host(json!([[1, "x"]])), CV_8U).expect_err("string leaf");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.field(), Some("data"));
    }

    #[test]
    fn empty_outer_array_is_a_placeholder() {
        let mat = Mat::new(&host(json!([])), CV_8UC3).expect("empty ok");
        assert!(mat.empty());
        assert_eq!(mat.mat_type(), CV_8UC3);
        assert_eq!(mat.get_data().expect("live"), host(json!([])));
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let mat = Mat::new_filled(2, 2, CV_8U, &[7.0]).expect("filled");
        let copy = mat.clone();
        mat.release();
        assert!(mat.is_released());
        assert!(!copy.is_released());
        assert_eq!(copy.at(1, 1).expect("in range"), HostValue::Number(7.0));
    }

    #[test]
    fn released_mat_rejects_access() {
        let mat = Mat::new_filled(1, 1, CV_8U, &[1.0]).expect("filled");
        mat.release();
        assert!(mat.empty());
        let err = mat.get_data().expect_err("released");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn fill_values_per_channel() {
        let mat = Mat::new_filled(1, 2, CV_32FC2, &[1.5, -2.0]).expect("filled");
        assert_eq!(mat.get_data().expect("live"), host(json!([[[1.5, -2.0], [1.5, -2.0]]])));
        let err = Mat::new_filled(1, 1, CV_32FC2, &[1.0, 2.0, 3.0]).expect_err("too many");
        assert_eq!(err.field(), Some("fill"));
    }

    #[test]
    fn from_bytes_checks_length() {
        let mat = Mat::from_bytes(2, 2, CV_8UC3, vec![9; 12]).expect("sized");
        assert_eq!(mat.to_bytes().expect("live").len(), 12);
        let err = Mat::from_bytes(2, 2, CV_8UC3, vec![9; 11]).expect_err("short");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn integer_types_saturate_on_construction() {
        let mat = Mat::new(&host(json!([[300, -5, 12.5]])), CV_8U).expect("valid");
        assert_eq!(mat.get_data().expect("live"), host(json!([[255, 0, 12]])));
    }

    #[test]
    fn integer_writes_round_half_to_even() {
        let mat = Mat::new(&host(json!([[12.5, 13.5, 0.5, -0.5]])), CV_8U).expect("valid");
        assert_eq!(mat.get_data().expect("live"), host(json!([[12, 14, 0, 0]])));
    }

    #[test]
    fn unallocatable_fill_is_a_native_error() {
        let err = Mat::new_filled(1 << 40, 1 << 20, CV_8U, &[0.0]).expect_err("too large");
        assert_eq!(err.kind(), ErrorKind::NativeComputation);
        assert!(err.to_string().contains("cannot allocate"), "{err}");
    }
}
