//! Native image-processing routines.
//!
//! These operate on borrowed [`NativeView`](crate::mat::NativeView)s and
//! report failures as [`NativeError`](crate::error::NativeError). They know
//! nothing about host values; the dispatcher validates and marshals arguments
//! before calling in.
pub mod border;
pub mod color;
pub mod morph;
pub mod warp;

pub use self::color::cvt_color;
pub use self::morph::{morphology, MorphOp, MorphParams};
pub use self::warp::{warp_perspective, WarpParams};
