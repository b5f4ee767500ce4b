//! In-memory scalar volume
//!
//! A volume is an N-D (N >= 3) array of `f64` samples indexed in NIfTI axis
//! order (x, y, z, ...) together with its voxel-to-world affine.

use ndarray::ArrayD;

/// 4x4 identity affine, row-major.
pub const IDENTITY_AFFINE: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Samples, axis 0 is x
    pub data: ArrayD<f64>,
    /// Affine transformation matrix (4x4, row-major)
    pub affine: [f64; 16],
}

impl Volume {
    pub fn new(data: ArrayD<f64>, affine: [f64; 16]) -> Self {
        Self { data, affine }
    }

    /// Grid dimensions, one entry per axis
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Voxel sizes along x, y and z, taken from the affine column norms
    pub fn voxel_size(&self) -> (f64, f64, f64) {
        voxel_size_from_affine(&self.affine)
    }
}

pub(crate) fn voxel_size_from_affine(affine: &[f64; 16]) -> (f64, f64, f64) {
    let column_norm = |c: usize| {
        (affine[c] * affine[c] + affine[4 + c] * affine[4 + c] + affine[8 + c] * affine[8 + c]).sqrt()
    };
    (column_norm(0), column_norm(1), column_norm(2))
}
