//! Operation methods on `Mat`, routed through the process-wide dispatcher.
//!
//! Each method takes the host's argument list as-is, so the single option
//! object convention is enforced exactly as for [`Dispatcher::call`].
use super::{Dispatcher, PendingOperation};
use crate::error::BindingError;
use crate::host::HostValue;
use crate::mat::Mat;

impl Mat {
    fn dispatch(&self, name: &str, args: &[HostValue]) -> Result<Mat, BindingError> {
        Dispatcher::global()?.call(name, self, args)
    }

    fn dispatch_async(
        &self,
        name: &str,
        args: &[HostValue],
    ) -> Result<PendingOperation, BindingError> {
        Dispatcher::global()?.call_async(name, self, args)
    }

    pub fn bgr_to_gray(&self) -> Result<Mat, BindingError> {
        self.dispatch("bgrToGray", &[])
    }

    pub fn bgr_to_gray_async(&self) -> Result<PendingOperation, BindingError> {
        self.dispatch_async("bgrToGray", &[])
    }

    /// `cvtColor({ code })`.
    pub fn cvt_color(&self, args: &[HostValue]) -> Result<Mat, BindingError> {
        self.dispatch("cvtColor", args)
    }

    pub fn cvt_color_async(&self, args: &[HostValue]) -> Result<PendingOperation, BindingError> {
        self.dispatch_async("cvtColor", args)
    }

    /// `erode({ kernel, anchor?, iterations?, borderType?, borderValue? })`.
    pub fn erode(&self, args: &[HostValue]) -> Result<Mat, BindingError> {
        self.dispatch("erode", args)
    }

    pub fn erode_async(&self, args: &[HostValue]) -> Result<PendingOperation, BindingError> {
        self.dispatch_async("erode", args)
    }

    /// `dilate`, same options as [`erode`](Self::erode).
    pub fn dilate(&self, args: &[HostValue]) -> Result<Mat, BindingError> {
        self.dispatch("dilate", args)
    }

    pub fn dilate_async(&self, args: &[HostValue]) -> Result<PendingOperation, BindingError> {
        self.dispatch_async("dilate", args)
    }

    /// `warpPerspective({ transformationMatrix, outputSize?, flags?,
    /// borderType?, borderValue? })`.
    pub fn warp_perspective(&self, args: &[HostValue]) -> Result<Mat, BindingError> {
        self.dispatch("warpPerspective", args)
    }

    pub fn warp_perspective_async(
        &self,
        args: &[HostValue],
    ) -> Result<PendingOperation, BindingError> {
        self.dispatch_async("warpPerspective", args)
    }
}
