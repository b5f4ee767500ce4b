//! Linear intensity rescaling into an integer band
//!
//! ```text
//!        (hi - lo)(x - min(x))
//! f(x) = ---------------------  + lo
//!          max(x) - min(x)
//! ```
//!
//! rounded half away from zero. Non-finite samples are replaced by 0 before
//! the range is measured, so one corrupt voxel cannot turn the whole output
//! into NaN.

use ndarray::ArrayD;

use crate::bands::Band;
use crate::utils::{min_max, sanitized};

/// Rescale a volume's value range onto `band`
///
/// A constant volume (zero range) maps every voxel to `band.lo()`. Any other
/// finite volume sends its minimum to `band.lo()` and its maximum to
/// `band.hi()`, even when `max - min` exceeds `f64::MAX`. An empty array
/// yields an empty array.
///
/// # Arguments
/// * `data` - Input samples, may contain NaN/Inf
/// * `band` - Target integer range
///
/// # Returns
/// Integer codes with the shape of `data`, every value within `band`
pub fn rescale(data: &ArrayD<f64>, band: Band) -> ArrayD<u16> {
    let clean = sanitized(data);
    let lo = band.lo() as f64;
    let hi = band.hi() as f64;

    let Some((vmin, vmax)) = min_max(&clean) else {
        return ArrayD::zeros(clean.raw_dim());
    };
    // halved operands keep the range finite for any finite input
    let half_min = vmin / 2.0;
    let half_ptp = vmax / 2.0 - half_min;

    if half_ptp == 0.0 {
        log::debug!("constant volume (value {}), mapping every voxel to {}", vmin, band.lo());
        return ArrayD::from_elem(clean.raw_dim(), band.lo());
    }

    let span = hi - lo;
    let mut scaled = clean;
    scaled.par_mapv_inplace(|v| {
        let t = (v / 2.0 - half_min) / half_ptp;
        (span * t + lo).round().clamp(lo, hi)
    });
    scaled.mapv(|v| v as u16)
}
