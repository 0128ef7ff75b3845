use super::native::{MatHeader, NativeView};
use crate::error::BindingError;
use crate::host::HostValue;
use crate::types::MatType;

/// Flattens nested host arrays into storage-order samples.
pub(super) fn parse_nested(
    data: &HostValue,
    mat_type: MatType,
) -> Result<(MatHeader, Vec<f64>), BindingError> {
    let rows = data.as_array().ok_or_else(|| {
        BindingError::shape(format!(
            "Mat data must be an array of rows, got {}",
            data.kind_name()
        ))
    })?;
    let Some(first) = rows.first() else {
        return Ok((MatHeader::empty(mat_type), Vec::new()));
    };
    let cols = row_items(first, 0)?.len();
    let channels = mat_type.channels();

    let mut samples = Vec::with_capacity(rows.len() * cols * channels);
    for (r, row) in rows.iter().enumerate() {
        let items = row_items(row, r)?;
        if items.len() != cols {
            return Err(BindingError::shape(format!(
                "Mat rows must have equal length: row {r} has {} columns, expected {cols}",
                items.len()
            )));
        }
        for (c, item) in items.iter().enumerate() {
            if channels == 1 {
                samples.push(leaf(item, r, c)?);
                continue;
            }
            let pixel = item.as_array().ok_or_else(|| {
                BindingError::shape(format!(
                    "pixel ({r}, {c}) must be an array of {channels} channel values"
                ))
            })?;
            if pixel.len() != channels {
                return Err(BindingError::shape(format!(
                    "pixel ({r}, {c}) has {} channels, {mat_type} requires {channels}",
                    pixel.len()
                )));
            }
            for value in pixel {
                samples.push(leaf(value, r, c)?);
            }
        }
    }

    Ok((MatHeader::new(rows.len(), cols, mat_type), samples))
}

fn row_items(row: &HostValue, r: usize) -> Result<&[HostValue], BindingError> {
    row.as_array().ok_or_else(|| {
        BindingError::shape(format!("row {r} must be an array, got {}", row.kind_name()))
    })
}

fn leaf(value: &HostValue, r: usize, c: usize) -> Result<f64, BindingError> {
    match value {
        HostValue::Number(n) => Ok(*n),
        HostValue::Array(_) => Err(BindingError::shape(format!(
            "pixel ({r}, {c}) is nested deeper than the Mat type allows"
        ))),
        other => Err(BindingError::invalid_argument(
            "data",
            "number",
            format!("Invalid type for data: pixel ({r}, {c}) is {}", other.kind_name()),
        )),
    }
}

/// Pixel value at `(row, col)`; indices must be in range.
pub(super) fn pixel(view: &NativeView<'_>, row: usize, col: usize) -> HostValue {
    if view.channels() == 1 {
        HostValue::Number(view.sample(row, col, 0))
    } else {
        HostValue::Array(
            (0..view.channels())
                .map(|ch| HostValue::Number(view.sample(row, col, ch)))
                .collect(),
        )
    }
}

pub(super) fn to_nested(view: &NativeView<'_>) -> HostValue {
    HostValue::Array(
        (0..view.rows())
            .map(|r| HostValue::Array((0..view.cols()).map(|c| pixel(view, r, c)).collect()))
            .collect(),
    )
}
