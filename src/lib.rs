#![doc = include_str!("../README.md")]

// Public modules (stable surface)
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod mat;
pub mod tables;
pub mod types;

// Code enumerations and native routines. Public, but the dispatcher is the
// supported way to reach the routines.
pub mod codes;
pub mod ffi;
pub mod imgproc;
pub mod marshal;

// --- High-level re-exports -------------------------------------------------

pub use crate::codes::{BorderType, ColorConversionCode, Interpolation, WarpFlags};
pub use crate::config::{load_config, BindingConfig};
pub use crate::dispatch::{Dispatcher, HostLoop, Outcome, PendingOperation};
pub use crate::error::{BindingError, ErrorKind};
pub use crate::host::{HostObject, HostValue};
pub use crate::mat::Mat;
pub use crate::tables::{border_and_warp_flags, color_conversion_codes, mat_types};
pub use crate::types::{Depth, MatType};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for host-style code.
///
/// ```no_run
/// use cv_mat_binding::prelude::*;
///
/// # fn main() -> Result<(), BindingError> {
/// let img = Mat::new_filled(4, 4, CV_8UC3, &[255.0, 125.0, 0.0])?;
/// let lab = img.cvt_color(&[HostValue::object([(
///     "code",
///     ColorConversionCode::Bgr2Lab.code(),
/// )])])?;
/// assert_eq!(lab.mat_type(), CV_8UC3);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::types::*;
    pub use crate::{
        BindingError, ColorConversionCode, HostLoop, HostValue, Mat, PendingOperation,
    };
}
