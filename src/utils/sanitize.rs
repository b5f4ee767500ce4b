//! Non-finite sample handling and range statistics

use ndarray::ArrayD;
use rayon::prelude::*;

/// Replace NaN and +/-Inf with 0 in place
pub fn sanitize_in_place(data: &mut ArrayD<f64>) {
    data.par_mapv_inplace(|v| if v.is_finite() { v } else { 0.0 });
}

/// Copy of `data` with NaN and +/-Inf replaced by 0
///
/// Already finite arrays come back unchanged.
pub fn sanitized(data: &ArrayD<f64>) -> ArrayD<f64> {
    let mut out = data.to_owned();
    sanitize_in_place(&mut out);
    out
}

/// Minimum and maximum of the samples, `None` for an empty array
///
/// Expects finite input; NaN samples are skipped.
pub fn min_max(data: &ArrayD<f64>) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }
    let (min, max) = data
        .par_iter()
        .fold(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        )
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)),
        );
    Some((min, max))
}
