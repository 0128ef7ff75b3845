//! Named constant tables as host objects (`cv.COLOR_*`, `cv.CV_*`, ...).
use crate::codes::{BorderType, ColorConversionCode, WarpFlags};
use crate::host::HostValue;
use crate::types::MatType;

/// `{ "COLOR_BGR2GRAY": 6, "COLOR_BGR2Lab": 44, ... }`, aliases included.
pub fn color_conversion_codes() -> HostValue {
    HostValue::object(
        ColorConversionCode::NAMES
            .iter()
            .map(|&(name, code)| (name, code.code())),
    )
}

/// `{ "CV_8U": 0, "CV_8UC1": 0, "CV_8UC3": 16, ... }`.
pub fn mat_types() -> HostValue {
    let mut entries = Vec::with_capacity(MatType::ALL.len() + 7);
    for t in MatType::ALL {
        if t.channels() == 1 {
            entries.push((t.depth().to_string(), t.code()));
        }
        entries.push((t.to_string(), t.code()));
    }
    HostValue::object(entries)
}

/// `BORDER_*`, `INTER_*` and `WARP_INVERSE_MAP`.
pub fn border_and_warp_flags() -> HostValue {
    let borders = BorderType::NAMES.iter().map(|&(name, b)| (name, b.code()));
    HostValue::object(borders.chain(WarpFlags::NAMES.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_codes_expose_opencv_values() {
        let table = color_conversion_codes();
        assert_eq!(table.get("COLOR_BGR2GRAY"), &HostValue::Number(6.0));
        assert_eq!(table.get("COLOR_BGR2Lab"), &HostValue::Number(44.0));
        assert_eq!(table.get("COLOR_RGB2BGR"), &HostValue::Number(4.0));
        assert_eq!(table.get("COLOR_BGR2Luv"), &HostValue::Undefined);
    }

    #[test]
    fn mat_types_include_bare_depth_names() {
        let table = mat_types();
        assert_eq!(table.get("CV_8U"), &HostValue::Number(0.0));
        assert_eq!(table.get("CV_8UC1"), &HostValue::Number(0.0));
        assert_eq!(table.get("CV_8UC3"), &HostValue::Number(16.0));
        assert_eq!(table.get("CV_64FC4"), &HostValue::Number(30.0));
        assert_eq!(table.as_object().map(|o| o.len()), Some(35));
    }

    #[test]
    fn flag_table_lists_border_and_interpolation() {
        let table = border_and_warp_flags();
        assert_eq!(table.get("BORDER_REPLICATE"), &HostValue::Number(1.0));
        assert_eq!(table.get("BORDER_DEFAULT"), &HostValue::Number(4.0));
        assert_eq!(table.get("INTER_LINEAR"), &HostValue::Number(1.0));
        assert_eq!(table.get("WARP_INVERSE_MAP"), &HostValue::Number(16.0));
    }
}
