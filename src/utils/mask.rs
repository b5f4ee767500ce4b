//! Threshold masks
//!
//! Provides the boolean selection used to decide which voxels of the
//! composited volume are taken from the map.

use ndarray::{ArrayD, Zip};

/// Create a boolean mask selecting voxels at or above a threshold
///
/// The comparison is inclusive: a voxel exactly equal to `threshold` is
/// selected. NaN samples are never selected, so callers that want NaN
/// treated as 0 must sanitize first.
///
/// # Arguments
/// * `data` - Input volume
/// * `threshold` - Lower bound for selection
///
/// # Returns
/// Mask with the same shape as `data`
pub fn threshold_mask(data: &ArrayD<f64>, threshold: f64) -> ArrayD<bool> {
    Zip::from(data).par_map_collect(|&v| v >= threshold)
}

/// Number of selected voxels
pub fn count_selected(mask: &ArrayD<bool>) -> usize {
    mask.iter().filter(|&&m| m).count()
}
