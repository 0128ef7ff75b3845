use crate::codes::BorderType;

/// Maps a possibly out-of-range index into `[0, len)` according to `border`.
///
/// Returns `None` when the tap has no source pixel: constant borders outside
/// the image, or an empty axis.
pub fn map_index(i: isize, len: usize, border: BorderType) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }
    let n = len as isize;
    match border {
        BorderType::Constant => None,
        BorderType::Replicate => Some(if i < 0 { 0 } else { len - 1 }),
        BorderType::Wrap => Some(i.rem_euclid(n) as usize),
        BorderType::Reflect => {
            let r = i.rem_euclid(2 * n);
            let mapped = if r < n { r } else { 2 * n - 1 - r };
            Some(mapped as usize)
        }
        BorderType::Reflect101 => {
            if len == 1 {
                return Some(0);
            }
            let period = 2 * n - 2;
            let r = i.rem_euclid(period);
            let mapped = if r < n { r } else { period - r };
            Some(mapped as usize)
        }
    }
}
