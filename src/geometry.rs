//! Geometric compatibility of two volumes
//!
//! No resampling is ever attempted: two volumes can only be combined when they
//! sit on the same voxel grid in the same world space.

use crate::volume::Volume;

/// Relative tolerance used when comparing affines
pub const AFFINE_RTOL: f64 = 1e-5;
/// Absolute tolerance used when comparing affines
pub const AFFINE_ATOL: f64 = 1e-8;

/// Element-wise closeness test: `|a - b| <= atol + rtol * |b|`
///
/// NaN is never close to anything. Infinities are close only to an equal
/// infinity.
pub fn allclose(a: &[f64], b: &[f64], rtol: f64, atol: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(&x, &y)| {
            if x.is_nan() || y.is_nan() {
                false
            } else if x.is_infinite() || y.is_infinite() {
                x == y
            } else {
                (x - y).abs() <= atol + rtol * y.abs()
            }
        })
}

/// Check that two volumes share affine and voxel grid
///
/// # Returns
/// `true` if the affines agree within [`AFFINE_RTOL`]/[`AFFINE_ATOL`] and the
/// shapes are identical on every axis
pub fn compatible(a: &Volume, b: &Volume) -> bool {
    allclose(&a.affine, &b.affine, AFFINE_RTOL, AFFINE_ATOL) && a.shape() == b.shape()
}
