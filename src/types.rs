//! Element depths and matrix type tags.
//!
//! A [`MatType`] pairs an element [`Depth`] with a channel count in `1..=4`.
//! Numeric tags follow the OpenCV encoding `depth + ((channels - 1) << 3)`, so
//! `CV_8UC3 == 16` and `CV_64F == 6`. The set of valid tags is closed:
//! [`MatType::from_code`] rejects anything outside [`MatType::ALL`].
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element depth of a matrix sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Depth {
    U8,
    S8,
    U16,
    S16,
    S32,
    F32,
    F64,
}

impl Depth {
    pub const ALL: [Depth; 7] = [
        Depth::U8,
        Depth::S8,
        Depth::U16,
        Depth::S16,
        Depth::S32,
        Depth::F32,
        Depth::F64,
    ];

    pub const fn code(self) -> i32 {
        match self {
            Depth::U8 => 0,
            Depth::S8 => 1,
            Depth::U16 => 2,
            Depth::S16 => 3,
            Depth::S32 => 4,
            Depth::F32 => 5,
            Depth::F64 => 6,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Depth::U8),
            1 => Some(Depth::S8),
            2 => Some(Depth::U16),
            3 => Some(Depth::S16),
            4 => Some(Depth::S32),
            5 => Some(Depth::F32),
            6 => Some(Depth::F64),
            _ => None,
        }
    }

    /// Size of one sample in bytes.
    pub const fn size(self) -> usize {
        match self {
            Depth::U8 | Depth::S8 => 1,
            Depth::U16 | Depth::S16 => 2,
            Depth::S32 | Depth::F32 => 4,
            Depth::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Depth::F32 | Depth::F64)
    }

    /// Representable range for integer depths; floats report their full range.
    pub fn range(self) -> (f64, f64) {
        match self {
            Depth::U8 => (0.0, u8::MAX as f64),
            Depth::S8 => (i8::MIN as f64, i8::MAX as f64),
            Depth::U16 => (0.0, u16::MAX as f64),
            Depth::S16 => (i16::MIN as f64, i16::MAX as f64),
            Depth::S32 => (i32::MIN as f64, i32::MAX as f64),
            Depth::F32 => (f32::MIN as f64, f32::MAX as f64),
            Depth::F64 => (f64::MIN, f64::MAX),
        }
    }

    /// Value of a fully-set channel: the integer maximum, or `1.0` for floats.
    pub fn full_scale(self) -> f64 {
        if self.is_float() {
            1.0
        } else {
            self.range().1
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Depth::U8 => "8U",
            Depth::S8 => "8S",
            Depth::U16 => "16U",
            Depth::S16 => "16S",
            Depth::S32 => "32S",
            Depth::F32 => "32F",
            Depth::F64 => "64F",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CV_{}", self.suffix())
    }
}

pub const MAX_CHANNELS: u8 = 4;

/// Depth × channel-count tag of a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct MatType {
    depth: Depth,
    channels: u8,
}

impl MatType {
    const fn make(depth: Depth, channels: u8) -> Self {
        Self { depth, channels }
    }

    pub const fn new(depth: Depth, channels: u8) -> Option<Self> {
        if channels == 0 || channels > MAX_CHANNELS {
            None
        } else {
            Some(Self::make(depth, channels))
        }
    }

    pub const fn depth(self) -> Depth {
        self.depth
    }

    pub const fn channels(self) -> usize {
        self.channels as usize
    }

    pub const fn code(self) -> i32 {
        self.depth.code() + (((self.channels as i32) - 1) << 3)
    }

    pub fn from_code(code: i32) -> Option<Self> {
        if code < 0 {
            return None;
        }
        let depth = Depth::from_code(code & 7)?;
        let channels = (code >> 3) + 1;
        u8::try_from(channels)
            .ok()
            .and_then(|cn| Self::new(depth, cn))
    }

    /// Bytes occupied by one pixel (all channels).
    pub const fn elem_size(self) -> usize {
        self.depth.size() * self.channels as usize
    }

    /// Same depth, different channel count.
    pub const fn with_channels(self, channels: u8) -> Option<Self> {
        Self::new(self.depth, channels)
    }

    pub const ALL: [MatType; 28] = {
        let mut all = [CV_8U; 28];
        let mut i = 0;
        while i < 28 {
            all[i] = Self::make(Depth::ALL[i / 4], (i % 4) as u8 + 1);
            i += 1;
        }
        all
    };
}

impl fmt::Display for MatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}C{}", self.depth, self.channels)
    }
}

impl TryFrom<i32> for MatType {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown mat type code {code}"))
    }
}

impl From<MatType> for i32 {
    fn from(t: MatType) -> Self {
        t.code()
    }
}

pub const CV_8U: MatType = MatType::make(Depth::U8, 1);
pub const CV_8UC1: MatType = MatType::make(Depth::U8, 1);
pub const CV_8UC2: MatType = MatType::make(Depth::U8, 2);
pub const CV_8UC3: MatType = MatType::make(Depth::U8, 3);
pub const CV_8UC4: MatType = MatType::make(Depth::U8, 4);
pub const CV_8S: MatType = MatType::make(Depth::S8, 1);
pub const CV_8SC1: MatType = MatType::make(Depth::S8, 1);
pub const CV_8SC2: MatType = MatType::make(Depth::S8, 2);
pub const CV_8SC3: MatType = MatType::make(Depth::S8, 3);
pub const CV_8SC4: MatType = MatType::make(Depth::S8, 4);
pub const CV_16U: MatType = MatType::make(Depth::U16, 1);
pub const CV_16UC1: MatType = MatType::make(Depth::U16, 1);
pub const CV_16UC2: MatType = MatType::make(Depth::U16, 2);
pub const CV_16UC3: MatType = MatType::make(Depth::U16, 3);
pub const CV_16UC4: MatType = MatType::make(Depth::U16, 4);
pub const CV_16S: MatType = MatType::make(Depth::S16, 1);
pub const CV_16SC1: MatType = MatType::make(Depth::S16, 1);
pub const CV_16SC2: MatType = MatType::make(Depth::S16, 2);
pub const CV_16SC3: MatType = MatType::make(Depth::S16, 3);
pub const CV_16SC4: MatType = MatType::make(Depth::S16, 4);
pub const CV_32S: MatType = MatType::make(Depth::S32, 1);
pub const CV_32SC1: MatType = MatType::make(Depth::S32, 1);
pub const CV_32SC2: MatType = MatType::make(Depth::S32, 2);
pub const CV_32SC3: MatType = MatType::make(Depth::S32, 3);
pub const CV_32SC4: MatType = MatType::make(Depth::S32, 4);
pub const CV_32F: MatType = MatType::make(Depth::F32, 1);
pub const CV_32FC1: MatType = MatType::make(Depth::F32, 1);
pub const CV_32FC2: MatType = MatType::make(Depth::F32, 2);
pub const CV_32FC3: MatType = MatType::make(Depth::F32, 3);
pub const CV_32FC4: MatType = MatType::make(Depth::F32, 4);
pub const CV_64F: MatType = MatType::make(Depth::F64, 1);
pub const CV_64FC1: MatType = MatType::make(Depth::F64, 1);
pub const CV_64FC2: MatType = MatType::make(Depth::F64, 2);
pub const CV_64FC3: MatType = MatType::make(Depth::F64, 3);
pub const CV_64FC4: MatType = MatType::make(Depth::F64, 4);
