//! Closed sets of native enumeration codes.
//!
//! Numeric values match the native library so codes can be passed through
//! untouched. Several host-visible names alias the same value
//! (`COLOR_RGB2RGBA == COLOR_BGR2BGRA`); the alias tables list them all.
use serde::{Deserialize, Serialize};

/// Color-space conversion selector for `cvtColor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ColorConversionCode {
    Bgr2Bgra = 0,
    Bgra2Bgr = 1,
    Bgr2Rgba = 2,
    Rgba2Bgr = 3,
    Bgr2Rgb = 4,
    Bgra2Rgba = 5,
    Bgr2Gray = 6,
    Rgb2Gray = 7,
    Gray2Bgr = 8,
    Gray2Bgra = 9,
    Bgra2Gray = 10,
    Rgba2Gray = 11,
    Bgr2YCrCb = 36,
    Rgb2YCrCb = 37,
    YCrCb2Bgr = 38,
    YCrCb2Rgb = 39,
    Bgr2Hsv = 40,
    Rgb2Hsv = 41,
    Bgr2Lab = 44,
    Rgb2Lab = 45,
    Hsv2Bgr = 54,
    Hsv2Rgb = 55,
    Lab2Bgr = 56,
    Lab2Rgb = 57,
}

/// Pixel layout family a conversion operates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorFamily {
    /// Reorders, drops or adds channels.
    Shuffle,
    ToGray,
    FromGray,
    ToYCrCb,
    FromYCrCb,
    ToHsv,
    FromHsv,
    ToLab,
    FromLab,
}

impl ColorConversionCode {
    pub const ALL: [ColorConversionCode; 24] = [
        Self::Bgr2Bgra,
        Self::Bgra2Bgr,
        Self::Bgr2Rgba,
        Self::Rgba2Bgr,
        Self::Bgr2Rgb,
        Self::Bgra2Rgba,
        Self::Bgr2Gray,
        Self::Rgb2Gray,
        Self::Gray2Bgr,
        Self::Gray2Bgra,
        Self::Bgra2Gray,
        Self::Rgba2Gray,
        Self::Bgr2YCrCb,
        Self::Rgb2YCrCb,
        Self::YCrCb2Bgr,
        Self::YCrCb2Rgb,
        Self::Bgr2Hsv,
        Self::Rgb2Hsv,
        Self::Bgr2Lab,
        Self::Rgb2Lab,
        Self::Hsv2Bgr,
        Self::Hsv2Rgb,
        Self::Lab2Bgr,
        Self::Lab2Rgb,
    ];

    /// Host-visible names, aliases included.
    pub const NAMES: [(&'static str, ColorConversionCode); 32] = [
        ("COLOR_BGR2BGRA", Self::Bgr2Bgra),
        ("COLOR_RGB2RGBA", Self::Bgr2Bgra),
        ("COLOR_BGRA2BGR", Self::Bgra2Bgr),
        ("COLOR_RGBA2RGB", Self::Bgra2Bgr),
        ("COLOR_BGR2RGBA", Self::Bgr2Rgba),
        ("COLOR_RGB2BGRA", Self::Bgr2Rgba),
        ("COLOR_RGBA2BGR", Self::Rgba2Bgr),
        ("COLOR_BGRA2RGB", Self::Rgba2Bgr),
        ("COLOR_BGR2RGB", Self::Bgr2Rgb),
        ("COLOR_RGB2BGR", Self::Bgr2Rgb),
        ("COLOR_BGRA2RGBA", Self::Bgra2Rgba),
        ("COLOR_RGBA2BGRA", Self::Bgra2Rgba),
        ("COLOR_BGR2GRAY", Self::Bgr2Gray),
        ("COLOR_RGB2GRAY", Self::Rgb2Gray),
        ("COLOR_GRAY2BGR", Self::Gray2Bgr),
        ("COLOR_GRAY2RGB", Self::Gray2Bgr),
        ("COLOR_GRAY2BGRA", Self::Gray2Bgra),
        ("COLOR_GRAY2RGBA", Self::Gray2Bgra),
        ("COLOR_BGRA2GRAY", Self::Bgra2Gray),
        ("COLOR_RGBA2GRAY", Self::Rgba2Gray),
        ("COLOR_BGR2YCrCb", Self::Bgr2YCrCb),
        ("COLOR_RGB2YCrCb", Self::Rgb2YCrCb),
        ("COLOR_YCrCb2BGR", Self::YCrCb2Bgr),
        ("COLOR_YCrCb2RGB", Self::YCrCb2Rgb),
        ("COLOR_BGR2HSV", Self::Bgr2Hsv),
        ("COLOR_RGB2HSV", Self::Rgb2Hsv),
        ("COLOR_BGR2Lab", Self::Bgr2Lab),
        ("COLOR_RGB2Lab", Self::Rgb2Lab),
        ("COLOR_HSV2BGR", Self::Hsv2Bgr),
        ("COLOR_HSV2RGB", Self::Hsv2Rgb),
        ("COLOR_Lab2BGR", Self::Lab2Bgr),
        ("COLOR_Lab2RGB", Self::Lab2Rgb),
    ];

    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() as i64 == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, code)| code)
    }

    /// Canonical (first listed) host name.
    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, c)| *c == self)
            .map(|(n, _)| *n)
            .unwrap_or("COLOR_UNKNOWN")
    }

    pub fn family(self) -> ColorFamily {
        use ColorConversionCode::*;
        match self {
            Bgr2Bgra | Bgra2Bgr | Bgr2Rgba | Rgba2Bgr | Bgr2Rgb | Bgra2Rgba => ColorFamily::Shuffle,
            Bgr2Gray | Rgb2Gray | Bgra2Gray | Rgba2Gray => ColorFamily::ToGray,
            Gray2Bgr | Gray2Bgra => ColorFamily::FromGray,
            Bgr2YCrCb | Rgb2YCrCb => ColorFamily::ToYCrCb,
            YCrCb2Bgr | YCrCb2Rgb => ColorFamily::FromYCrCb,
            Bgr2Hsv | Rgb2Hsv => ColorFamily::ToHsv,
            Hsv2Bgr | Hsv2Rgb => ColorFamily::FromHsv,
            Bgr2Lab | Rgb2Lab => ColorFamily::ToLab,
            Lab2Bgr | Lab2Rgb => ColorFamily::FromLab,
        }
    }

    /// Channel count the input must have.
    pub fn src_channels(self) -> usize {
        use ColorConversionCode::*;
        match self {
            Bgra2Bgr | Rgba2Bgr | Bgra2Rgba | Bgra2Gray | Rgba2Gray => 4,
            Gray2Bgr | Gray2Bgra => 1,
            _ => 3,
        }
    }

    pub fn dst_channels(self) -> usize {
        use ColorConversionCode::*;
        match self {
            Bgr2Bgra | Bgr2Rgba | Bgra2Rgba | Gray2Bgra => 4,
            Bgr2Gray | Rgb2Gray | Bgra2Gray | Rgba2Gray => 1,
            _ => 3,
        }
    }

    /// True when the first input channel holds red rather than blue.
    pub fn src_is_rgb(self) -> bool {
        use ColorConversionCode::*;
        matches!(
            self,
            Rgb2Gray | Rgba2Gray | Rgb2YCrCb | Rgb2Hsv | Rgb2Lab | Rgba2Bgr
        )
    }

    /// True when the first output channel holds red rather than blue.
    pub fn dst_is_rgb(self) -> bool {
        use ColorConversionCode::*;
        matches!(
            self,
            Bgr2Rgba | Bgr2Rgb | Bgra2Rgba | YCrCb2Rgb | Hsv2Rgb | Lab2Rgb
        )
    }
}

/// Pixel extrapolation policy for taps that fall outside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum BorderType {
    /// `iiiiii|abcdefgh|iiiiiii` with a caller-chosen `i`.
    Constant = 0,
    /// `aaaaaa|abcdefgh|hhhhhhh`
    Replicate = 1,
    /// `fedcba|abcdefgh|hgfedcb`
    Reflect = 2,
    /// `cdefgh|abcdefgh|abcdefg`
    Wrap = 3,
    /// `gfedcb|abcdefgh|gfedcba`
    Reflect101 = 4,
}

impl BorderType {
    pub const ALL: [BorderType; 5] = [
        Self::Constant,
        Self::Replicate,
        Self::Reflect,
        Self::Wrap,
        Self::Reflect101,
    ];

    pub const NAMES: [(&'static str, BorderType); 6] = [
        ("BORDER_CONSTANT", Self::Constant),
        ("BORDER_REPLICATE", Self::Replicate),
        ("BORDER_REFLECT", Self::Reflect),
        ("BORDER_WRAP", Self::Wrap),
        ("BORDER_REFLECT_101", Self::Reflect101),
        ("BORDER_DEFAULT", Self::Reflect101),
    ];

    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.code() as i64 == code)
    }
}

/// Interpolation selector, the low bits of the warp `flags` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Interpolation {
    Nearest = 0,
    Linear = 1,
}

/// Flag bit: the supplied matrix already maps destination to source.
pub const WARP_INVERSE_MAP: i32 = 16;

/// Decoded warp `flags` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarpFlags {
    pub interpolation: Interpolation,
    pub inverse_map: bool,
}

impl WarpFlags {
    pub const NAMES: [(&'static str, i32); 3] = [
        ("INTER_NEAREST", Interpolation::Nearest as i32),
        ("INTER_LINEAR", Interpolation::Linear as i32),
        ("WARP_INVERSE_MAP", WARP_INVERSE_MAP),
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        let inverse_map = code & WARP_INVERSE_MAP as i64 != 0;
        let interpolation = match code & !(WARP_INVERSE_MAP as i64) {
            0 => Interpolation::Nearest,
            1 => Interpolation::Linear,
            _ => return None,
        };
        Some(Self {
            interpolation,
            inverse_map,
        })
    }
}

impl Default for WarpFlags {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Linear,
            inverse_map: false,
        }
    }
}
