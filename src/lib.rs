//! niioverlay: NIfTI overlay images from a base image and a coregistered map
//!
//! The base image and the map are rescaled into two disjoint integer bands
//! of one uint16 volume, so a viewer with a single intensity range and colour
//! table can show both at once. Map voxels at or above a threshold replace
//! the base voxels; everything else keeps the base intensity.
//!
//! # Modules
//! - `geometry`: affine/shape compatibility check
//! - `bands`: base and map code bands
//! - `rescale`: linear rescaling into a band
//! - `composite`: thresholded merge and calibration
//! - `utils`: sanitization, range and mask helpers
//! - `nifti_io`: NIfTI-1 reading and writing
//! - `cli`, `pipeline`: command line front end

// Core modules
pub mod bands;
pub mod error;
pub mod volume;

// Algorithm modules
pub mod composite;
pub mod geometry;
pub mod rescale;
pub mod utils;

// I/O modules
pub mod nifti_io;

// Command line
pub mod cli;
pub mod pipeline;

pub use bands::{Band, BandLayout, BASE_BAND, MAP_BAND};
pub use composite::{composite, Calibration, CompositedVolume, OverlayOptions};
pub use error::{OverlayError, Result};
pub use geometry::compatible;
pub use rescale::rescale;
pub use volume::Volume;
