use cv_mat_binding::types::{CV_8U, CV_8UC3};
use cv_mat_binding::{HostValue, Mat};

/// Generates a high-contrast single-channel checkerboard.
pub fn checkerboard_u8(width: usize, height: usize, cell: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");

    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let sum = x / cell + y / cell;
            img[y * width + x] = if sum & 1 == 0 { 32 } else { 220 };
        }
    }
    img
}

pub fn checkerboard_mat(width: usize, height: usize, cell: usize) -> Mat {
    Mat::from_bytes(height, width, CV_8U, checkerboard_u8(width, height, cell))
        .expect("checkerboard buffer matches its shape")
}

/// Non-uniform BGR image: blue ramps along x, green along y, red is constant.
pub fn gradient_bgr(width: usize, height: usize) -> Mat {
    let mut bytes = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            bytes.push((x * 255 / width.max(2).saturating_sub(1)).min(255) as u8);
            bytes.push((y * 255 / height.max(2).saturating_sub(1)).min(255) as u8);
            bytes.push(90);
        }
    }
    Mat::from_bytes(height, width, CV_8UC3, bytes).expect("gradient buffer matches its shape")
}

/// The 2x2 BGR fixture used across the color tests.
pub fn bgr_fixture() -> Mat {
    let data = HostValue::from(serde_json::json!([
        [[255, 125, 0], [0, 0, 0]],
        [[125, 75, 125], [75, 255, 75]]
    ]));
    Mat::new(&data, CV_8UC3).expect("valid nested data")
}

/// Rows `[0, 255, 0, 255, 0]`, five times.
pub fn striped_5x5() -> Mat {
    let row = HostValue::array([0i32, 255, 0, 255, 0]);
    let data = HostValue::array(vec![row; 5]);
    Mat::new(&data, CV_8U).expect("valid nested data")
}

pub fn ones_kernel(rows: usize, cols: usize) -> Mat {
    Mat::new_filled(rows, cols, CV_8U, &[255.0]).expect("kernel")
}

pub fn options<V>(entries: impl IntoIterator<Item = (&'static str, V)>) -> HostValue
where
    V: Into<HostValue>,
{
    HostValue::object(entries)
}
