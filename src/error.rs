//! Error type shared by the loader, the compositor and the command line run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// An input path does not point to an existing file.
    #[error("ERROR: {} does not exist, exiting", .0.display())]
    InputMissing(PathBuf),

    /// Base and map differ in affine or voxel grid.
    #[error("base and map images have mismatched geometry, exiting")]
    GeometryMismatch,

    #[error("invalid band [{lo}, {hi}]: lower bound must be below upper bound")]
    InvalidBand { lo: u16, hi: u16 },

    #[error("invalid band layout: base band ends at {base_hi} but map band starts at {map_lo}, need a gap between them")]
    InvalidBandLayout { base_hi: u16, map_lo: u16 },

    #[error("{0}")]
    Nifti(String),

    #[error("unsupported volume dimensions: {0}")]
    Dimensions(String),

    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OverlayError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OverlayError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
