//! Color-space conversions.
//!
//! Channel order follows the conversion code (`BGR` unless the code names
//! `RGB`). Integer inputs are scaled to `[0, 1]` where the target space needs
//! it and scaled back on output:
//!
//! - HSV: 8-bit `H` is halved to fit `[0, 180)`; float `H` is in degrees.
//! - Lab: 8-bit `L` is scaled by `255 / 100` and `a`, `b` are offset by 128;
//!   sRGB gamma is applied before the XYZ transform.
//! - YCrCb: chroma offset is 128 for 8-bit and 0.5 for float.
use crate::codes::{ColorConversionCode, ColorFamily};
use crate::error::NativeError;
use crate::mat::{MatHeader, NativeImage, NativeView};
use crate::types::Depth;

const ROUTINE: &str = "cvtColor";

const GRAY_R: f64 = 0.299;
const GRAY_G: f64 = 0.587;
const GRAY_B: f64 = 0.114;

// D65 white point.
const XN: f64 = 0.950456;
const ZN: f64 = 1.088754;
const LAB_EPS: f64 = 0.008856;

pub fn cvt_color(
    src: &NativeView<'_>,
    code: ColorConversionCode,
) -> Result<NativeImage, NativeError> {
    let scn = src.channels();
    if scn != code.src_channels() {
        return Err(NativeError::new(
            ROUTINE,
            format!(
                "{} expects {} input channels, got {scn}",
                code.name(),
                code.src_channels()
            ),
        ));
    }
    let depth = src.depth();
    let needs_unit_range = !matches!(
        code.family(),
        ColorFamily::Shuffle | ColorFamily::ToGray | ColorFamily::FromGray
    );
    if needs_unit_range && !matches!(depth, Depth::U8 | Depth::F32) {
        return Err(NativeError::new(
            ROUTINE,
            format!("{} is not supported for depth {depth}", code.name()),
        ));
    }

    let dcn = code.dst_channels();
    let dst_type = src
        .header()
        .mat_type
        .with_channels(dcn as u8)
        .ok_or_else(|| NativeError::new(ROUTINE, format!("invalid output channel count {dcn}")))?;
    let header = MatHeader::new(src.rows(), src.cols(), dst_type);

    let samples = src.samples();
    let mut out = Vec::with_capacity(src.rows() * src.cols() * dcn);
    let mut dst = [0.0f64; 4];
    for px in samples.chunks_exact(scn) {
        convert_pixel(code, depth, px, &mut dst[..dcn]);
        out.extend_from_slice(&dst[..dcn]);
    }
    Ok(NativeImage::from_samples(header, &out))
}

fn read_rgb(code: ColorConversionCode, px: &[f64]) -> (f64, f64, f64) {
    if code.src_is_rgb() {
        (px[0], px[1], px[2])
    } else {
        (px[2], px[1], px[0])
    }
}

fn write_rgb(code: ColorConversionCode, (r, g, b): (f64, f64, f64), dst: &mut [f64]) {
    if code.dst_is_rgb() {
        dst[..3].copy_from_slice(&[r, g, b]);
    } else {
        dst[..3].copy_from_slice(&[b, g, r]);
    }
}

fn convert_pixel(code: ColorConversionCode, depth: Depth, px: &[f64], dst: &mut [f64]) {
    let full = depth.full_scale();
    // 8-bit color spaces work on [0, 1] internally; float input already is.
    let unit = if depth.is_float() { 1.0 } else { 255.0 };
    match code.family() {
        ColorFamily::Shuffle => {
            write_rgb(code, read_rgb(code, px), dst);
            if dst.len() == 4 {
                dst[3] = px.get(3).copied().unwrap_or(full);
            }
        }
        ColorFamily::ToGray => {
            let (r, g, b) = read_rgb(code, px);
            dst[0] = GRAY_R * r + GRAY_G * g + GRAY_B * b;
        }
        ColorFamily::FromGray => {
            dst[..3].fill(px[0]);
            if dst.len() == 4 {
                dst[3] = full;
            }
        }
        ColorFamily::ToYCrCb => {
            let delta = if depth.is_float() { 0.5 } else { 128.0 };
            let (r, g, b) = read_rgb(code, px);
            let y = GRAY_R * r + GRAY_G * g + GRAY_B * b;
            dst[0] = y;
            dst[1] = (r - y) * 0.713 + delta;
            dst[2] = (b - y) * 0.564 + delta;
        }
        ColorFamily::FromYCrCb => {
            let delta = if depth.is_float() { 0.5 } else { 128.0 };
            let (y, cr, cb) = (px[0], px[1] - delta, px[2] - delta);
            let r = y + 1.403 * cr;
            let g = y - 0.714 * cr - 0.344 * cb;
            let b = y + 1.773 * cb;
            write_rgb(code, (r, g, b), dst);
        }
        ColorFamily::ToHsv => {
            let (r, g, b) = read_rgb(code, px);
            let (h, s, v) = rgb_to_hsv(r / unit, g / unit, b / unit);
            if depth.is_float() {
                dst[..3].copy_from_slice(&[h, s, v]);
            } else {
                dst[..3].copy_from_slice(&[h / 2.0, s * 255.0, v * 255.0]);
            }
        }
        ColorFamily::FromHsv => {
            let (h, s, v) = if depth.is_float() {
                (px[0], px[1], px[2])
            } else {
                (px[0] * 2.0, px[1] / 255.0, px[2] / 255.0)
            };
            let (r, g, b) = hsv_to_rgb(h, s, v);
            write_rgb(code, (r * unit, g * unit, b * unit), dst);
        }
        ColorFamily::ToLab => {
            let (r, g, b) = read_rgb(code, px);
            let (l, a, bb) = rgb_to_lab(r / unit, g / unit, b / unit);
            if depth.is_float() {
                dst[..3].copy_from_slice(&[l, a, bb]);
            } else {
                dst[..3].copy_from_slice(&[l * 255.0 / 100.0, a + 128.0, bb + 128.0]);
            }
        }
        ColorFamily::FromLab => {
            let (l, a, bb) = if depth.is_float() {
                (px[0], px[1], px[2])
            } else {
                (px[0] * 100.0 / 255.0, px[1] - 128.0, px[2] - 128.0)
            };
            let (r, g, b) = lab_to_rgb(l, a, bb);
            write_rgb(code, (r * unit, g * unit, b * unit), dst);
        }
    }
}

/// `h` in degrees `[0, 360)`, `s` and `v` in `[0, 1]`.
fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;
    let s = if v > 0.0 { diff / v } else { 0.0 };
    if diff == 0.0 {
        return (0.0, s, v);
    }
    let mut h = if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }
    (h, s, v)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s <= 0.0 {
        return (v, v, v);
    }
    let h = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPS {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    let t3 = t * t * t;
    if t3 > LAB_EPS {
        t3
    } else {
        (t - 16.0 / 116.0) / 7.787
    }
}

fn rgb_to_lab(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (r, g, b) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
    let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / XN;
    let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
    let z = (0.019334 * r + 0.119193 * g + 0.950227 * b) / ZN;
    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let l = if y > LAB_EPS { 116.0 * fy - 16.0 } else { 903.3 * y };
    (l, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

fn lab_to_rgb(l: f64, a: f64, b: f64) -> (f64, f64, f64) {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let y = if l > 903.3 * LAB_EPS {
        fy * fy * fy
    } else {
        l / 903.3
    };
    let x = lab_f_inv(fx) * XN;
    let z = lab_f_inv(fz) * ZN;
    let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
    let g = -0.969256 * x + 1.875991 * y + 0.041556 * z;
    let bl = 0.055648 * x - 0.204043 * y + 1.057311 * z;
    (linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(bl))
}
