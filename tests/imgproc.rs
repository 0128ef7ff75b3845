mod common;

use common::synthetic_image::{
    bgr_fixture, checkerboard_mat, gradient_bgr, ones_kernel, options, striped_5x5,
};
use cv_mat_binding::types::{CV_32F, CV_64F, CV_8U, CV_8UC3};
use cv_mat_binding::{ColorConversionCode, Dispatcher, ErrorKind, HostValue, Mat};
use serde_json::json;

fn host(v: serde_json::Value) -> HostValue {
    HostValue::from(v)
}

fn assert_same_meta(a: &Mat, b: &Mat) {
    assert_eq!(a.rows(), b.rows(), "rows");
    assert_eq!(a.cols(), b.cols(), "cols");
    assert_eq!(a.mat_type(), b.mat_type(), "type");
}

fn matrix(rows: serde_json::Value) -> Mat {
    Mat::new(&host(rows), CV_64F).expect("3x3 matrix")
}

mod bgr_to_gray {
    use super::*;

    #[test]
    fn returns_single_channel_with_same_size() {
        let img = bgr_fixture();
        let gray = img.bgr_to_gray().expect("gray");
        assert_eq!((gray.rows(), gray.cols(), gray.mat_type()), (2, 2, CV_8U));
        assert_ne!(gray.get_data().unwrap(), img.get_data().unwrap());
        assert_eq!(gray.get_data().unwrap(), host(json!([[102, 0], [96, 181]])));
    }

    #[test]
    fn alias_and_async_agree_with_blocking() {
        let img = bgr_fixture();
        let sync = img.bgr_to_gray().expect("gray");
        let alias = Dispatcher::global()
            .unwrap()
            .call("toGrayscale", &img, &[])
            .expect("alias");
        assert_eq!(alias, sync);
        let pending = img.bgr_to_gray_async().expect("spawned");
        assert_eq!(pending.wait().expect("async"), sync);
    }

    #[test]
    fn rejects_single_channel_input() {
        let err = checkerboard_mat(8, 8, 2).bgr_to_gray().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn leaves_receiver_untouched() {
        let img = bgr_fixture();
        let before = img.get_data().unwrap();
        img.bgr_to_gray().expect("gray");
        assert_eq!(img.get_data().unwrap(), before);
    }
}

mod cvt_color {
    use super::*;

    #[test]
    fn requires_an_args_object() {
        let img = Mat::default();
        let err = img.cvt_color(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "cvtColor: expected an object argument");
    }

    #[test]
    fn undefined_code_is_invalid_type() {
        let img = Mat::default();
        let err = img
            .cvt_color(&[options([("code", HostValue::Undefined)])])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid type for code");
    }

    #[test]
    fn null_code_is_invalid_type() {
        let img = Mat::default();
        let err = img
            .cvt_color(&[options([("code", HostValue::Null)])])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid type for code");
    }

    #[test]
    fn bgr_to_lab_keeps_meta_and_changes_data() {
        let img = bgr_fixture();
        let lab = img
            .cvt_color(&[options([("code", ColorConversionCode::Bgr2Lab.code())])])
            .expect("lab");
        assert_same_meta(&lab, &img);
        assert_ne!(lab.get_data().unwrap(), img.get_data().unwrap());
        // Black stays at the neutral chroma point.
        assert_eq!(lab.at(0, 1).unwrap(), host(json!([0, 128, 128])));
    }

    #[test]
    fn convert_color_space_alias() {
        let img = bgr_fixture();
        let args = [options([("code", ColorConversionCode::Bgr2Gray.code())])];
        let via_alias = Dispatcher::global()
            .unwrap()
            .call("convertColorSpace", &img, &args)
            .expect("alias");
        assert_eq!(via_alias, img.bgr_to_gray().expect("gray"));
    }

    #[test]
    fn channel_mismatch_is_a_shape_error() {
        let img = bgr_fixture();
        let err = img
            .cvt_color(&[options([("code", ColorConversionCode::Gray2Bgr.code())])])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn hsv_round_trip_stays_close() {
        let img = gradient_bgr(16, 8);
        let hsv = img
            .cvt_color(&[options([("code", ColorConversionCode::Bgr2Hsv.code())])])
            .expect("hsv");
        let back = hsv
            .cvt_color(&[options([("code", ColorConversionCode::Hsv2Bgr.code())])])
            .expect("bgr");
        let (a, b) = (img.to_bytes().unwrap(), back.to_bytes().unwrap());
        assert!(a.iter().zip(&b).all(|(x, y)| x.abs_diff(*y) <= 6));
    }
}

mod morphology {
    use super::*;

    #[test]
    fn erode_requires_an_args_object() {
        let err = Mat::default().erode(&[]).unwrap_err();
        assert_eq!(err.to_string(), "erode: expected an object argument");
    }

    #[test]
    fn dilate_requires_an_args_object() {
        let err = Mat::default().dilate(&[]).unwrap_err();
        assert_eq!(err.to_string(), "dilate: expected an object argument");
    }

    #[test]
    fn kernel_is_required() {
        let err = striped_5x5().erode(&[host(json!({}))]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid type for kernel");
        let err = striped_5x5()
            .dilate(&[host(json!({ "kernel": [[1, 1, 1]] }))])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid type for kernel");
    }

    #[test]
    fn erode_striped_image_to_zero() {
        let img = striped_5x5();
        let out = img
            .erode(&[options([("kernel", ones_kernel(3, 3))])])
            .expect("erode");
        assert_same_meta(&out, &img);
        assert_eq!(out, Mat::new_filled(5, 5, CV_8U, &[0.0]).unwrap());
    }

    #[test]
    fn dilate_striped_image_to_full() {
        let img = striped_5x5();
        let out = img
            .dilate(&[options([("kernel", ones_kernel(3, 3))])])
            .expect("dilate");
        assert_same_meta(&out, &img);
        assert_eq!(out, Mat::new_filled(5, 5, CV_8U, &[255.0]).unwrap());
    }

    #[test]
    fn async_matches_blocking() {
        let img = checkerboard_mat(12, 10, 3);
        let args = [options([("kernel", ones_kernel(3, 3))])];
        let sync = img.dilate(&args).expect("dilate");
        let pending = img.dilate_async(&args).expect("spawned");
        assert_eq!(pending.wait().expect("async"), sync);
    }

    #[test]
    fn explicit_options_are_honoured() {
        let img = striped_5x5();
        let kernel = ones_kernel(1, 3);
        let zero_iterations = img
            .erode(&[options([
                ("kernel", HostValue::from(kernel.clone())),
                ("iterations", HostValue::from(0i32)),
            ])])
            .expect("copy");
        assert_eq!(zero_iterations, img);

        let err = img
            .erode(&[options([
                ("kernel", HostValue::from(kernel)),
                ("borderType", HostValue::from(99i32)),
            ])])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid type for borderType");
    }

    #[test]
    fn iterations_must_fit_a_native_int() {
        let err = striped_5x5()
            .dilate(&[options([
                ("kernel", HostValue::from(ones_kernel(3, 3))),
                ("iterations", HostValue::from(1e12)),
            ])])
            .unwrap_err();
        assert_eq!(err.field(), Some("iterations"));
    }

    #[test]
    fn released_receiver_fails_before_native_call() {
        let img = striped_5x5();
        img.release();
        assert!(img.empty());
        let err = img
            .erode(&[options([("kernel", ones_kernel(3, 3))])])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "Mat has been released");
    }
}

mod warp_perspective {
    use super::*;

    fn half_scale() -> Mat {
        matrix(json!([[0.5, 0, 0], [0, 0.5, 0], [0, 0, 1]]))
    }

    #[test]
    fn requires_an_args_object() {
        let err = Mat::default().warp_perspective(&[]).unwrap_err();
        assert_eq!(err.to_string(), "warpPerspective: expected an object argument");
    }

    #[test]
    fn transformation_matrix_is_required() {
        let err = gradient_bgr(8, 8)
            .warp_perspective(&[host(json!({ "transformationMatrix": null }))])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid type for transformationMatrix");
    }

    #[test]
    fn scaling_keeps_meta_and_changes_data() {
        let img = gradient_bgr(32, 24);
        let out = img
            .warp_perspective(&[options([("transformationMatrix", half_scale())])])
            .expect("warp");
        assert_same_meta(&out, &img);
        assert_ne!(out.get_data().unwrap(), img.get_data().unwrap());
    }

    #[test]
    fn identity_reproduces_input() {
        let img = gradient_bgr(17, 11);
        let identity = matrix(json!([[1, 0, 0], [0, 1, 0], [0, 0, 1]]));
        let out = img
            .warp_perspective(&[options([("transformationMatrix", identity)])])
            .expect("warp");
        assert_eq!(out, img);
    }

    #[test]
    fn output_size_overrides_receiver_size() {
        let img = gradient_bgr(20, 10);
        let out = img
            .warp_perspective(&[options([
                ("transformationMatrix", HostValue::from(half_scale())),
                ("outputSize", host(json!({ "width": 7, "height": 5 }))),
            ])])
            .expect("warp");
        assert_eq!((out.cols(), out.rows(), out.mat_type()), (7, 5, CV_8UC3));
    }

    #[test]
    fn zero_area_output_size_uses_receiver_size() {
        let img = gradient_bgr(20, 10);
        let out = img
            .warp_perspective(&[options([
                ("transformationMatrix", HostValue::from(half_scale())),
                ("outputSize", host(json!([0, 0]))),
            ])])
            .expect("warp");
        assert_same_meta(&out, &img);
    }

    #[test]
    fn unallocatable_output_size_fails_in_native_code() {
        let img = checkerboard_mat(4, 4, 2);
        let args = || {
            [options([
                ("transformationMatrix", HostValue::from(half_scale())),
                ("outputSize", host(json!([1 << 30, 1 << 30]))),
            ])]
        };
        let err = img.warp_perspective(&args()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeComputation);
        assert!(err.to_string().contains("cannot allocate"), "{err}");

        let pending = img.warp_perspective_async(&args()).expect("validation passes");
        let err = pending.wait().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeComputation);
    }

    #[test]
    fn float32_matrix_is_accepted() {
        let img = gradient_bgr(8, 8);
        let m = Mat::new(&host(json!([[1, 0, 0], [0, 1, 0], [0, 0, 1]])), CV_32F).unwrap();
        let out = img
            .warp_perspective(&[options([("transformationMatrix", m)])])
            .expect("warp");
        assert_eq!(out, img);
    }

    #[test]
    fn integer_or_non_square_matrix_is_a_shape_error() {
        let img = gradient_bgr(8, 8);
        for m in [
            Mat::new_filled(3, 3, CV_8U, &[1.0]).unwrap(),
            Mat::new_filled(2, 3, CV_64F, &[1.0]).unwrap(),
        ] {
            let err = img
                .warp_perspective(&[options([("transformationMatrix", m)])])
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Shape);
        }
    }

    #[test]
    fn singular_matrix_fails_in_native_code() {
        let img = gradient_bgr(8, 8);
        let singular = || matrix(json!([[1, 2, 0], [2, 4, 0], [0, 0, 0]]));
        let err = img
            .warp_perspective(&[options([("transformationMatrix", singular())])])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeComputation);

        let pending = img
            .warp_perspective_async(&[options([("transformationMatrix", singular())])])
            .expect("validation passes");
        let err = pending.wait().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeComputation);
        assert!(err.to_string().starts_with("native: warpPerspective"));
    }
}
