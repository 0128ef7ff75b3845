//! The operations exposed through the dispatcher.
//!
//! Each operation declares its option schema, checks operand shapes against
//! the receiver before any native call, and finally runs the native routine
//! over a borrowed view of the receiver.
use crate::codes::{BorderType, ColorConversionCode, Interpolation, WarpFlags};
use crate::error::BindingError;
use crate::imgproc::{self, MorphOp, MorphParams, WarpParams};
use crate::marshal::{CodeSet, DefaultValue, MarshalledArgs, OptionSchema, ParamKind, ParamSpec};
use crate::mat::{Mat, MatHeader, NativeImage, NativeView};
use crate::types::Depth;
use nalgebra::Matrix3;

pub trait Operation: Send + Sync {
    fn schema(&self) -> &'static OptionSchema;

    fn name(&self) -> &'static str {
        self.schema().operation
    }

    /// Shape and operand checks against the receiver. Runs before the
    /// completion strategy, so failures are always synchronous.
    fn check(&self, _src: &MatHeader, _args: &MarshalledArgs) -> Result<(), BindingError> {
        Ok(())
    }

    fn run(
        &self,
        src: &NativeView<'_>,
        args: &MarshalledArgs,
    ) -> Result<NativeImage, BindingError>;
}

static BGR_TO_GRAY: OptionSchema = OptionSchema::new("bgrToGray", &[]);

static CVT_COLOR: OptionSchema = OptionSchema::new(
    "cvtColor",
    &[ParamSpec::required(
        "code",
        ParamKind::Code(CodeSet::ColorConversion),
    )],
);

const MORPH_PARAMS: [ParamSpec; 5] = [
    ParamSpec::required("kernel", ParamKind::Mat),
    ParamSpec::optional("anchor", ParamKind::Point).or(DefaultValue::Point(-1, -1)),
    ParamSpec::optional("iterations", ParamKind::Int).or(DefaultValue::Int(1)),
    ParamSpec::optional("borderType", ParamKind::Code(CodeSet::Border))
        .or(DefaultValue::Code(BorderType::Constant.code())),
    ParamSpec::optional("borderValue", ParamKind::Number),
];

static ERODE: OptionSchema = OptionSchema::new("erode", &MORPH_PARAMS);
static DILATE: OptionSchema = OptionSchema::new("dilate", &MORPH_PARAMS);

static WARP_PERSPECTIVE: OptionSchema = OptionSchema::new(
    "warpPerspective",
    &[
        ParamSpec::required("transformationMatrix", ParamKind::Mat),
        ParamSpec::optional("outputSize", ParamKind::Size),
        ParamSpec::optional("flags", ParamKind::Code(CodeSet::WarpFlags))
            .or(DefaultValue::Code(Interpolation::Linear as i32)),
        ParamSpec::optional("borderType", ParamKind::Code(CodeSet::Border))
            .or(DefaultValue::Code(BorderType::Constant.code())),
        ParamSpec::optional("borderValue", ParamKind::Number).or(DefaultValue::Number(0.0)),
    ],
);

fn color_code(args: &MarshalledArgs) -> Result<ColorConversionCode, BindingError> {
    let code = args.code("code")?;
    ColorConversionCode::from_code(code.into())
        .ok_or_else(|| BindingError::invalid_type("code", CodeSet::ColorConversion.describe()))
}

fn border(args: &MarshalledArgs) -> Result<BorderType, BindingError> {
    let code = args.code("borderType")?;
    BorderType::from_code(code.into())
        .ok_or_else(|| BindingError::invalid_type("borderType", CodeSet::Border.describe()))
}

/// Operand matrices are private copies, but may have been released before
/// the call.
fn live_operand<'a>(args: &'a MarshalledArgs, field: &str) -> Result<&'a Mat, BindingError> {
    let mat = args.mat(field)?;
    if mat.is_released() {
        return Err(BindingError::invalid_argument(
            field,
            "live Mat",
            format!("{field}: Mat has been released"),
        ));
    }
    Ok(mat)
}

/// `bgrToGray`: BGR or BGRA to a single luma channel.
pub struct BgrToGray;

impl Operation for BgrToGray {
    fn schema(&self) -> &'static OptionSchema {
        &BGR_TO_GRAY
    }

    fn check(&self, src: &MatHeader, _args: &MarshalledArgs) -> Result<(), BindingError> {
        match src.channels() {
            3 | 4 => Ok(()),
            cn => Err(BindingError::shape(format!(
                "bgrToGray: expected a 3 or 4 channel Mat, got {cn} channel(s)"
            ))),
        }
    }

    fn run(
        &self,
        src: &NativeView<'_>,
        _args: &MarshalledArgs,
    ) -> Result<NativeImage, BindingError> {
        let code = if src.channels() == 4 {
            ColorConversionCode::Bgra2Gray
        } else {
            ColorConversionCode::Bgr2Gray
        };
        Ok(imgproc::cvt_color(src, code)?)
    }
}

pub struct CvtColor;

impl Operation for CvtColor {
    fn schema(&self) -> &'static OptionSchema {
        &CVT_COLOR
    }

    fn check(&self, src: &MatHeader, args: &MarshalledArgs) -> Result<(), BindingError> {
        let code = color_code(args)?;
        if src.channels() != code.src_channels() {
            return Err(BindingError::shape(format!(
                "cvtColor: {} expects {} channel(s), Mat has {}",
                code.name(),
                code.src_channels(),
                src.channels()
            )));
        }
        Ok(())
    }

    fn run(
        &self,
        src: &NativeView<'_>,
        args: &MarshalledArgs,
    ) -> Result<NativeImage, BindingError> {
        Ok(imgproc::cvt_color(src, color_code(args)?)?)
    }
}

/// `erode` and `dilate`.
pub struct Morphology(pub MorphOp);

impl Morphology {
    fn params(&self, args: &MarshalledArgs) -> Result<MorphParams, BindingError> {
        let anchor = args.point("anchor")?;
        let iterations = args.int("iterations")?;
        // Same range as the native `int` parameter.
        let iterations = i32::try_from(iterations)
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                BindingError::invalid_argument(
                    "iterations",
                    "integer in 0..=2147483647",
                    format!(
                        "{}: iterations must be in 0..=2147483647, got {iterations}",
                        self.0.name()
                    ),
                )
            })?;
        Ok(MorphParams {
            op: self.0,
            anchor: (anchor.x, anchor.y),
            iterations,
            border: border(args)?,
            border_value: args.opt_number("borderValue"),
        })
    }
}

impl Operation for Morphology {
    fn schema(&self) -> &'static OptionSchema {
        match self.0 {
            MorphOp::Erode => &ERODE,
            MorphOp::Dilate => &DILATE,
        }
    }

    fn check(&self, _src: &MatHeader, args: &MarshalledArgs) -> Result<(), BindingError> {
        let params = self.params(args)?;
        let kernel = live_operand(args, "kernel")?.header();
        let name = self.name();
        if kernel.is_empty() || kernel.channels() != 1 {
            return Err(BindingError::shape(format!(
                "{name}: kernel must be a non-empty single-channel Mat, got {}x{} {}",
                kernel.rows, kernel.cols, kernel.mat_type
            )));
        }
        if imgproc::morph::resolve_anchor(params.anchor, kernel.cols, kernel.rows).is_none() {
            return Err(BindingError::shape(format!(
                "{name}: anchor ({}, {}) lies outside the {}x{} kernel",
                params.anchor.0, params.anchor.1, kernel.cols, kernel.rows
            )));
        }
        Ok(())
    }

    fn run(
        &self,
        src: &NativeView<'_>,
        args: &MarshalledArgs,
    ) -> Result<NativeImage, BindingError> {
        let params = self.params(args)?;
        live_operand(args, "kernel")?
            .with_view(|kernel| imgproc::morphology(src, &kernel, &params))?
            .map_err(BindingError::from)
    }
}

pub struct WarpPerspective;

impl WarpPerspective {
    fn params(&self, src: &MatHeader, args: &MarshalledArgs) -> Result<WarpParams, BindingError> {
        let matrix = live_operand(args, "transformationMatrix")?.with_view(|m| matrix3(&m))??;
        // A zero-area size means the receiver's size.
        let dsize = args
            .opt_size("outputSize")
            .filter(|s| s.width > 0 && s.height > 0)
            .map_or((src.cols, src.rows), |s| (s.width, s.height));
        let flags = WarpFlags::from_code(args.code("flags")?.into())
            .ok_or_else(|| BindingError::invalid_type("flags", CodeSet::WarpFlags.describe()))?;
        Ok(WarpParams {
            matrix,
            dsize,
            flags,
            border: border(args)?,
            border_value: args.number("borderValue")?,
        })
    }
}

/// Reads a 3x3 single-channel floating matrix.
fn matrix3(view: &NativeView<'_>) -> Result<Matrix3<f64>, BindingError> {
    let header = view.header();
    let floating = matches!(header.depth(), Depth::F32 | Depth::F64);
    if header.rows != 3 || header.cols != 3 || header.channels() != 1 || !floating {
        return Err(BindingError::shape(format!(
            "warpPerspective: transformationMatrix must be a 3x3 CV_32FC1 or CV_64FC1 Mat, got {}x{} {}",
            header.rows, header.cols, header.mat_type
        )));
    }
    Ok(Matrix3::from_fn(|r, c| view.sample(r, c, 0)))
}

impl Operation for WarpPerspective {
    fn schema(&self) -> &'static OptionSchema {
        &WARP_PERSPECTIVE
    }

    fn check(&self, src: &MatHeader, args: &MarshalledArgs) -> Result<(), BindingError> {
        self.params(src, args).map(|_| ())
    }

    fn run(
        &self,
        src: &NativeView<'_>,
        args: &MarshalledArgs,
    ) -> Result<NativeImage, BindingError> {
        let params = self.params(&src.header(), args)?;
        Ok(imgproc::warp_perspective(src, &params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::host::HostValue;
    use crate::marshal::validate;
    use crate::types::{CV_32F, CV_64F, CV_8U, CV_8UC3};

    fn header(cn: u8) -> MatHeader {
        let mat_type = CV_8U.with_channels(cn).expect("channels");
        MatHeader::new(4, 4, mat_type)
    }

    fn morph_args(op: &Morphology, options: HostValue) -> MarshalledArgs {
        validate(op.schema(), &[options]).expect("valid options")
    }

    #[test]
    fn bgr_to_gray_rejects_single_channel() {
        let args = validate(BgrToGray.schema(), &[]).expect("no options");
        assert!(BgrToGray.check(&header(3), &args).is_ok());
        assert!(BgrToGray.check(&header(4), &args).is_ok());
        let err = BgrToGray.check(&header(1), &args).expect_err("gray input");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn cvt_color_checks_source_channels() {
        let options = HostValue::object([("code", ColorConversionCode::Gray2Bgr.code())]);
        let args = validate(CvtColor.schema(), &[options]).expect("valid");
        assert!(CvtColor.check(&header(1), &args).is_ok());
        let err = CvtColor.check(&header(3), &args).expect_err("wrong channels");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn morphology_checks_kernel_and_anchor() {
        let erode = Morphology(MorphOp::Erode);
        let color_kernel = Mat::new_filled(3, 3, CV_8UC3, &[1.0]).expect("kernel");
        let args = morph_args(&erode, HostValue::object([("kernel", color_kernel)]));
        let err = erode.check(&header(1), &args).expect_err("3-channel kernel");
        assert_eq!(err.kind(), ErrorKind::Shape);

        let kernel = Mat::new_filled(3, 3, CV_8U, &[1.0]).expect("kernel");
        let args = morph_args(
            &erode,
            HostValue::object([
                ("kernel", HostValue::from(kernel.clone())),
                ("anchor", HostValue::array([5i32, 0])),
            ]),
        );
        let err = erode.check(&header(1), &args).expect_err("anchor outside");
        assert_eq!(err.kind(), ErrorKind::Shape);

        let args = morph_args(
            &erode,
            HostValue::object([
                ("kernel", HostValue::from(kernel)),
                ("iterations", HostValue::from(-1i32)),
            ]),
        );
        let err = erode.check(&header(1), &args).expect_err("negative iterations");
        assert_eq!(err.field(), Some("iterations"));
    }

    #[test]
    fn iterations_beyond_int_range_are_rejected() {
        let erode = Morphology(MorphOp::Erode);
        let kernel = Mat::new_filled(3, 3, CV_8U, &[1.0]).expect("kernel");
        let args = morph_args(
            &erode,
            HostValue::object([
                ("kernel", HostValue::from(kernel)),
                ("iterations", HostValue::from(1e12)),
            ]),
        );
        let err = erode.check(&header(1), &args).expect_err("too many iterations");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.field(), Some("iterations"));
    }

    #[test]
    fn released_kernel_is_rejected() {
        let dilate = Morphology(MorphOp::Dilate);
        let kernel = Mat::new_filled(3, 3, CV_8U, &[1.0]).expect("kernel");
        let args = morph_args(&dilate, HostValue::object([("kernel", kernel)]));
        args.mat("kernel").expect("kernel").release();
        let err = dilate.check(&header(1), &args).expect_err("released kernel");
        assert_eq!(err.field(), Some("kernel"));
    }

    #[test]
    fn warp_matrix_must_be_3x3_floating() {
        let cases = [
            (Mat::new_filled(3, 3, CV_8U, &[1.0]), false),
            (Mat::new_filled(2, 3, CV_64F, &[1.0]), false),
            (Mat::new_filled(3, 3, CV_32F, &[1.0]), true),
            (Mat::new_filled(3, 3, CV_64F, &[1.0]), true),
        ];
        for (matrix, ok) in cases {
            let matrix = matrix.expect("matrix");
            let options = HostValue::object([("transformationMatrix", matrix)]);
            let args = validate(WarpPerspective.schema(), &[options]).expect("valid");
            assert_eq!(WarpPerspective.check(&header(3), &args).is_ok(), ok);
        }
    }

    #[test]
    fn warp_defaults_to_receiver_size() {
        let matrix = Mat::new_filled(3, 3, CV_64F, &[0.0]).expect("matrix");
        let options = HostValue::object([
            ("transformationMatrix", HostValue::from(matrix)),
            ("outputSize", HostValue::array([7i32, 2])),
        ]);
        let args = validate(WarpPerspective.schema(), &[options]).expect("valid");
        let params = WarpPerspective.params(&header(1), &args).expect("params");
        assert_eq!(params.dsize, (7, 2));

        let matrix = Mat::new_filled(3, 3, CV_64F, &[0.0]).expect("matrix");
        let options = HostValue::object([("transformationMatrix", matrix)]);
        let args = validate(WarpPerspective.schema(), &[options]).expect("valid");
        let params = WarpPerspective.params(&header(1), &args).expect("params");
        assert_eq!(params.dsize, (4, 4));
        assert_eq!(params.flags, WarpFlags::default());
        assert_eq!(params.border, BorderType::Constant);
    }

    #[test]
    fn zero_area_output_size_falls_back_to_receiver() {
        for size in [[0i32, 0], [0, 5], [6, 0]] {
            let matrix = Mat::new_filled(3, 3, CV_64F, &[0.0]).expect("matrix");
            let options = HostValue::object([
                ("transformationMatrix", HostValue::from(matrix)),
                ("outputSize", HostValue::array(size)),
            ]);
            let args = validate(WarpPerspective.schema(), &[options]).expect("valid");
            let params = WarpPerspective.params(&header(1), &args).expect("params");
            assert_eq!(params.dsize, (4, 4), "{size:?}");
        }
    }
}
