//! Perspective warping.
//!
//! Each destination pixel `(x, y)` is mapped through the inverse homography
//! to a source position and sampled there. Pixel centres sit on integer
//! coordinates, so the identity matrix reproduces the input exactly.
use super::border::map_index;
use crate::codes::{BorderType, Interpolation, WarpFlags};
use crate::error::NativeError;
use crate::mat::native::try_filled;
use crate::mat::{MatHeader, NativeImage, NativeView};
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;

const ROUTINE: &str = "warpPerspective";
const EPS: f64 = 1e-12;
// Source coordinates beyond this are treated as outside the image.
const COORD_LIMIT: f64 = (1u64 << 40) as f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpParams {
    pub matrix: Matrix3<f64>,
    /// Output size as `(cols, rows)`.
    pub dsize: (usize, usize),
    pub flags: WarpFlags,
    pub border: BorderType,
    pub border_value: f64,
}

impl WarpParams {
    pub fn new(matrix: Matrix3<f64>, dsize: (usize, usize)) -> Self {
        Self {
            matrix,
            dsize,
            flags: WarpFlags::default(),
            border: BorderType::Constant,
            border_value: 0.0,
        }
    }
}

struct Sampler<'a> {
    samples: &'a [f64],
    rows: usize,
    cols: usize,
    cn: usize,
    border: BorderType,
    border_value: f64,
}

impl Sampler<'_> {
    #[inline]
    fn at(&self, x: isize, y: isize, ch: usize) -> f64 {
        match (
            map_index(x, self.cols, self.border),
            map_index(y, self.rows, self.border),
        ) {
            (Some(sx), Some(sy)) => self.samples[(sy * self.cols + sx) * self.cn + ch],
            _ => self.border_value,
        }
    }

    fn nearest(&self, x: f64, y: f64, out: &mut [f64]) {
        let (xi, yi) = (x.round() as isize, y.round() as isize);
        for (ch, o) in out.iter_mut().enumerate() {
            *o = self.at(xi, yi, ch);
        }
    }

    fn bilinear(&self, x: f64, y: f64, out: &mut [f64]) {
        let x0 = x.floor();
        let y0 = y.floor();
        let dx = x - x0;
        let dy = y - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);
        for (ch, o) in out.iter_mut().enumerate() {
            let p00 = self.at(x0, y0, ch);
            let p10 = self.at(x0 + 1, y0, ch);
            let p01 = self.at(x0, y0 + 1, ch);
            let p11 = self.at(x0 + 1, y0 + 1, ch);
            let top = p00 * (1.0 - dx) + p10 * dx;
            let bottom = p01 * (1.0 - dx) + p11 * dx;
            *o = top * (1.0 - dy) + bottom * dy;
        }
    }
}

pub fn warp_perspective(
    src: &NativeView<'_>,
    params: &WarpParams,
) -> Result<NativeImage, NativeError> {
    let inverse = if params.flags.inverse_map {
        params.matrix
    } else {
        params
            .matrix
            .try_inverse()
            .ok_or_else(|| NativeError::new(ROUTINE, "transformation matrix is singular"))?
    };
    if !inverse.iter().all(|v| v.is_finite()) {
        return Err(NativeError::new(
            ROUTINE,
            "transformation matrix has non-finite entries",
        ));
    }

    let (dcols, drows) = params.dsize;
    let header = MatHeader::new(drows, dcols, src.header().mat_type);
    let cn = header.channels();
    let count = header.sample_count().ok_or_else(|| {
        NativeError::new(ROUTINE, format!("output size {dcols}x{drows} overflows"))
    })?;
    let mut out = try_filled(ROUTINE, count, params.border_value)?;
    if count == 0 {
        return NativeImage::try_from_samples(ROUTINE, header, &out);
    }

    let samples = src.samples();
    let sampler = Sampler {
        samples: &samples,
        rows: src.rows(),
        cols: src.cols(),
        cn,
        border: params.border,
        border_value: params.border_value,
    };

    out.par_chunks_mut(dcols * cn)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..dcols {
                let p = inverse * Vector3::new(x as f64, y as f64, 1.0);
                if p.z.abs() <= EPS {
                    continue;
                }
                let (sx, sy) = (p.x / p.z, p.y / p.z);
                if !(sx.abs() < COORD_LIMIT && sy.abs() < COORD_LIMIT) {
                    continue;
                }
                let px = &mut row[x * cn..(x + 1) * cn];
                match params.flags.interpolation {
                    Interpolation::Nearest => sampler.nearest(sx, sy, px),
                    Interpolation::Linear => sampler.bilinear(sx, sy, px),
                }
            }
        });

    NativeImage::try_from_samples(ROUTINE, header, &out)
}
