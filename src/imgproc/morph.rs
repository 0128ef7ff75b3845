//! Grayscale morphology with an arbitrary structuring element.
//!
//! Non-zero kernel cells form the structuring element. Erosion takes the
//! minimum and dilation the maximum over the element placed at each pixel,
//! per channel. Under `BorderType::Constant` without an explicit border value,
//! taps outside the image are ignored, which is equivalent to padding with
//! `+inf` for erosion and `-inf` for dilation.
use super::border::map_index;
use crate::codes::BorderType;
use crate::error::NativeError;
use crate::mat::{MatHeader, NativeImage, NativeView};
use log::debug;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphOp {
    Erode,
    Dilate,
}

impl MorphOp {
    pub fn name(self) -> &'static str {
        match self {
            MorphOp::Erode => "erode",
            MorphOp::Dilate => "dilate",
        }
    }

    fn identity(self) -> f64 {
        match self {
            MorphOp::Erode => f64::INFINITY,
            MorphOp::Dilate => f64::NEG_INFINITY,
        }
    }

    #[inline]
    fn combine(self, acc: f64, v: f64) -> f64 {
        match self {
            MorphOp::Erode => acc.min(v),
            MorphOp::Dilate => acc.max(v),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphParams {
    pub op: MorphOp,
    /// Anchor inside the kernel as `(x, y)`; `-1` selects the centre.
    pub anchor: (i32, i32),
    pub iterations: usize,
    pub border: BorderType,
    /// Fill for constant borders; `None` ignores out-of-image taps.
    pub border_value: Option<f64>,
}

impl MorphParams {
    pub fn new(op: MorphOp) -> Self {
        Self {
            op,
            anchor: (-1, -1),
            iterations: 1,
            border: BorderType::Constant,
            border_value: None,
        }
    }
}

/// Resolves `-1` to the kernel centre; `None` if the anchor lies outside.
pub fn resolve_anchor(anchor: (i32, i32), kcols: usize, krows: usize) -> Option<(usize, usize)> {
    let resolve = |a: i32, len: usize| -> Option<usize> {
        if a == -1 {
            Some(len / 2)
        } else {
            usize::try_from(a).ok().filter(|&a| a < len)
        }
    };
    Some((resolve(anchor.0, kcols)?, resolve(anchor.1, krows)?))
}

pub fn morphology(
    src: &NativeView<'_>,
    kernel: &NativeView<'_>,
    params: &MorphParams,
) -> Result<NativeImage, NativeError> {
    let routine = params.op.name();
    if kernel.channels() != 1 {
        return Err(NativeError::new(
            routine,
            "structuring element must be single-channel",
        ));
    }
    let (ax, ay) = resolve_anchor(params.anchor, kernel.cols(), kernel.rows()).ok_or_else(|| {
        NativeError::new(
            routine,
            format!(
                "anchor ({}, {}) lies outside the {}x{} kernel",
                params.anchor.0,
                params.anchor.1,
                kernel.cols(),
                kernel.rows()
            ),
        )
    })?;

    let mut taps = Vec::new();
    for ky in 0..kernel.rows() {
        for kx in 0..kernel.cols() {
            if kernel.sample(ky, kx, 0) != 0.0 {
                taps.push((kx as isize - ax as isize, ky as isize - ay as isize));
            }
        }
    }

    let header = src.header();
    let mut current = src.samples();
    if header.is_empty() || taps.is_empty() {
        return Ok(NativeImage::from_samples(header, &current));
    }
    for done in 0..params.iterations {
        let next = morph_pass(&current, header, &taps, params);
        // Further passes would reproduce the same image.
        if next == current {
            debug!("{routine}: stable after {done} of {} iteration(s)", params.iterations);
            break;
        }
        current = next;
    }
    Ok(NativeImage::from_samples(header, &current))
}

fn morph_pass(
    src: &[f64],
    header: MatHeader,
    taps: &[(isize, isize)],
    params: &MorphParams,
) -> Vec<f64> {
    let (rows, cols, cn) = (header.rows, header.cols, header.channels());
    let mut out = vec![0.0; src.len()];
    out.par_chunks_mut(cols * cn)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..cols {
                for ch in 0..cn {
                    let mut acc = params.op.identity();
                    for &(dx, dy) in taps {
                        let sx = map_index(x as isize + dx, cols, params.border);
                        let sy = map_index(y as isize + dy, rows, params.border);
                        let v = match (sx, sy, params.border_value) {
                            (Some(sx), Some(sy), _) => src[(sy * cols + sx) * cn + ch],
                            (_, _, Some(fill)) => fill,
                            _ => continue,
                        };
                        acc = params.op.combine(acc, v);
                    }
                    row[x * cn + ch] = acc;
                }
            }
        });
    out
}
