//! Raw native pixel storage.
//!
//! Samples are stored contiguously in row-major order, channels interleaved,
//! native-endian. Numeric access goes through `f64` with saturating writes for
//! integer depths, the same rounding the native library applies when it casts
//! computed values back into a narrower depth.
use crate::error::NativeError;
use crate::types::{Depth, MatType};

/// Shape and type of a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatHeader {
    pub rows: usize,
    pub cols: usize,
    pub mat_type: MatType,
}

impl MatHeader {
    pub fn new(rows: usize, cols: usize, mat_type: MatType) -> Self {
        Self {
            rows,
            cols,
            mat_type,
        }
    }

    pub fn empty(mat_type: MatType) -> Self {
        Self::new(0, 0, mat_type)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn channels(&self) -> usize {
        self.mat_type.channels()
    }

    pub fn depth(&self) -> Depth {
        self.mat_type.depth()
    }

    /// Number of samples (pixels × channels), `None` on overflow.
    pub fn sample_count(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.cols)?
            .checked_mul(self.mat_type.channels())
    }

    /// Byte length of the backing buffer, `None` on overflow.
    pub fn byte_len(&self) -> Option<usize> {
        self.sample_count()?.checked_mul(self.mat_type.depth().size())
    }
}

/// Rounds half to even and clamps into the depth's range; floats pass through
/// (narrowed to `f32` precision for `F32`).
pub fn saturate(depth: Depth, v: f64) -> f64 {
    match depth {
        Depth::F64 => v,
        Depth::F32 => v as f32 as f64,
        _ => {
            if v.is_nan() {
                return 0.0;
            }
            let (lo, hi) = depth.range();
            v.round_ties_even().clamp(lo, hi)
        }
    }
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// `len` copies of `fill`, or a native error if the allocator refuses.
pub fn try_filled<T: Clone>(
    routine: &'static str,
    len: usize,
    fill: T,
) -> Result<Vec<T>, NativeError> {
    let mut out = Vec::new();
    out.try_reserve_exact(len).map_err(|e| {
        NativeError::new(
            routine,
            format!("cannot allocate {len} x {} bytes: {e}", std::mem::size_of::<T>()),
        )
    })?;
    out.resize(len, fill);
    Ok(out)
}

fn encode(depth: Depth, samples: &[f64], bytes: &mut [u8]) {
    for (chunk, &v) in bytes.chunks_exact_mut(depth.size()).zip(samples) {
        write_sample(depth, v, chunk);
    }
}

/// Decodes one sample; `bytes` must hold at least `depth.size()` bytes.
pub fn read_sample(depth: Depth, bytes: &[u8]) -> f64 {
    match depth {
        Depth::U8 => bytes[0] as f64,
        Depth::S8 => bytes[0] as i8 as f64,
        Depth::U16 => u16::from_ne_bytes(array(bytes)) as f64,
        Depth::S16 => i16::from_ne_bytes(array(bytes)) as f64,
        Depth::S32 => i32::from_ne_bytes(array(bytes)) as f64,
        Depth::F32 => f32::from_ne_bytes(array(bytes)) as f64,
        Depth::F64 => f64::from_ne_bytes(array(bytes)),
    }
}

/// Encodes one sample with saturation into `out[..depth.size()]`.
pub fn write_sample(depth: Depth, v: f64, out: &mut [u8]) {
    let v = saturate(depth, v);
    match depth {
        Depth::U8 => out[0] = v as u8,
        Depth::S8 => out[0] = (v as i8) as u8,
        Depth::U16 => out[..2].copy_from_slice(&(v as u16).to_ne_bytes()),
        Depth::S16 => out[..2].copy_from_slice(&(v as i16).to_ne_bytes()),
        Depth::S32 => out[..4].copy_from_slice(&(v as i32).to_ne_bytes()),
        Depth::F32 => out[..4].copy_from_slice(&(v as f32).to_ne_bytes()),
        Depth::F64 => out[..8].copy_from_slice(&v.to_ne_bytes()),
    }
}

/// Borrowed view of live native storage handed to native routines.
#[derive(Clone, Copy, Debug)]
pub struct NativeView<'a> {
    header: MatHeader,
    bytes: &'a [u8],
}

impl<'a> NativeView<'a> {
    pub(crate) fn new(header: MatHeader, bytes: &'a [u8]) -> Self {
        debug_assert_eq!(header.byte_len(), Some(bytes.len()));
        Self { header, bytes }
    }

    pub fn header(&self) -> MatHeader {
        self.header
    }

    pub fn rows(&self) -> usize {
        self.header.rows
    }

    pub fn cols(&self) -> usize {
        self.header.cols
    }

    pub fn channels(&self) -> usize {
        self.header.channels()
    }

    pub fn depth(&self) -> Depth {
        self.header.depth()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Sample at `(row, col, channel)`; indices must be in range.
    #[inline]
    pub fn sample(&self, row: usize, col: usize, channel: usize) -> f64 {
        let depth = self.depth();
        let idx = (row * self.cols() + col) * self.channels() + channel;
        read_sample(depth, &self.bytes[idx * depth.size()..])
    }

    /// All samples decoded in storage order.
    pub fn samples(&self) -> Vec<f64> {
        let depth = self.depth();
        self.bytes
            .chunks_exact(depth.size())
            .map(|chunk| read_sample(depth, chunk))
            .collect()
    }
}

/// Owned native output of a routine, before it is wrapped into a `Mat`.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeImage {
    header: MatHeader,
    bytes: Vec<u8>,
}

impl NativeImage {
    /// Encodes `samples` (storage order) into a new buffer.
    ///
    /// Panics if `samples.len()` does not match the header.
    pub fn from_samples(header: MatHeader, samples: &[f64]) -> Self {
        assert_eq!(
            header.sample_count(),
            Some(samples.len()),
            "sample count does not match {}x{} {}",
            header.rows,
            header.cols,
            header.mat_type
        );
        let depth = header.depth();
        let mut bytes = vec![0u8; samples.len() * depth.size()];
        encode(depth, samples, &mut bytes);
        Self { header, bytes }
    }

    /// Like [`from_samples`](Self::from_samples), for routines whose output
    /// size comes from the caller: mismatches and allocation failures are
    /// reported as errors of `routine`.
    pub fn try_from_samples(
        routine: &'static str,
        header: MatHeader,
        samples: &[f64],
    ) -> Result<Self, NativeError> {
        let len = match header.sample_count() {
            Some(n) if n == samples.len() => header.byte_len(),
            _ => None,
        }
        .ok_or_else(|| {
            NativeError::new(
                routine,
                format!(
                    "{} samples do not fit {}x{} {}",
                    samples.len(),
                    header.rows,
                    header.cols,
                    header.mat_type
                ),
            )
        })?;
        let mut bytes = try_filled(routine, len, 0u8)?;
        encode(header.depth(), samples, &mut bytes);
        Ok(Self { header, bytes })
    }

    pub(crate) fn from_raw(header: MatHeader, bytes: Vec<u8>) -> Option<Self> {
        (header.byte_len() == Some(bytes.len())).then_some(Self { header, bytes })
    }

    pub fn header(&self) -> MatHeader {
        self.header
    }

    pub fn as_view(&self) -> NativeView<'_> {
        NativeView::new(self.header, &self.bytes)
    }

    pub(crate) fn into_parts(self) -> (MatHeader, Vec<u8>) {
        (self.header, self.bytes)
    }
}

/// Storage owned by exactly one `Mat`. `bytes` is `None` once released.
#[derive(Debug)]
pub(crate) struct NativeBuffer {
    pub(crate) header: MatHeader,
    pub(crate) bytes: Option<Vec<u8>>,
}

impl NativeBuffer {
    pub(crate) fn from_image(image: NativeImage) -> Self {
        let (header, bytes) = image.into_parts();
        Self {
            header,
            bytes: Some(bytes),
        }
    }

    pub(crate) fn view(&self) -> Option<NativeView<'_>> {
        self.bytes
            .as_deref()
            .map(|bytes| NativeView::new(self.header, bytes))
    }

    pub(crate) fn release(&mut self) -> usize {
        let freed = self.bytes.take().map_or(0, |b| b.len());
        self.header = MatHeader::empty(self.header.mat_type);
        freed
    }
}
