//! Splitting of oversized tile rectangles into budget-sized pieces.

use crate::bounds::TileRect;

/// Splits `rect` into sub-rectangles holding at most `job_check_limit` tiles each.
///
/// A rectangle that already fits is returned unchanged. Otherwise the longer axis is cut
/// into strips of `job_check_limit / short_side` (at least one) tiles, and when a single
/// row along the short axis already overflows the budget, that axis is cut into runs of
/// `job_check_limit` tiles too. The last strip of each axis may be narrower than the rest.
///
/// Pieces are emitted row-major (top to bottom, then left to right), tile the input exactly
/// and never overlap. Ties between equally long axes are cut along x.
///
/// # Panics
///
/// Panics if `job_check_limit` is zero; callers validate it beforehand.
pub fn partition(rect: TileRect, job_check_limit: u64) -> Vec<TileRect> {
    assert!(job_check_limit >= 1, "job_check_limit must be at least 1");

    if rect.is_empty() {
        return Vec::new();
    }
    if rect.tile_count() <= job_check_limit {
        return vec![rect];
    }

    let width = u64::from(rect.width());
    let height = u64::from(rect.height());
    let (long, short) = if width >= height {
        (width, height)
    } else {
        (height, width)
    };

    let short_step = short.min(job_check_limit);
    let long_step = (job_check_limit / short_step).clamp(1, long);

    let (x_step, y_step) = if width >= height {
        (long_step, short_step)
    } else {
        (short_step, long_step)
    };

    // Steps are bounded by the rectangle's own u32 extents
    let x_step = x_step as u32;
    let y_step = y_step as u32;

    let columns = rect.width().div_ceil(x_step) as usize;
    let rows = rect.height().div_ceil(y_step) as usize;
    let mut pieces = Vec::with_capacity(columns * rows);

    for y_start in (rect.y_start..rect.y_end).step_by(y_step as usize) {
        let y_end = y_start.saturating_add(y_step).min(rect.y_end);
        for x_start in (rect.x_start..rect.x_end).step_by(x_step as usize) {
            let x_end = x_start.saturating_add(x_step).min(rect.x_end);
            pieces.push(TileRect::new(x_start, y_start, x_end, y_end));
        }
    }

    pieces
}
