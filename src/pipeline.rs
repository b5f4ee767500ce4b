//! One overlay run: check inputs, load, validate, composite, write
//!
//! Every failure is terminal and leaves no output file behind.

use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::composite::composite;
use crate::error::{OverlayError, Result};
use crate::geometry::compatible;
use crate::nifti_io::{read_nifti_file, save_overlay_to_file};

/// Absolute form of `path`, left as given if the working directory is unknown
fn resolve(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Canonical path of an input file, with `..` and symlinks resolved
fn existing_file(path: &Path) -> Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(resolved) if resolved.is_file() => Ok(resolved),
        Ok(resolved) => Err(OverlayError::InputMissing(resolved)),
        Err(_) => Err(OverlayError::InputMissing(resolve(path))),
    }
}

/// Run the overlay pipeline described by `args`
///
/// # Returns
/// The resolved path of the written overlay
pub fn run(args: &Args) -> Result<PathBuf> {
    let base_path = existing_file(&args.base)?;
    let map_path = existing_file(&args.map)?;

    log::info!("* loading data");
    let base = read_nifti_file(&base_path)?;
    let map = read_nifti_file(&map_path)?;
    log::debug!(
        "base {:?} voxels of {:?}, map {:?} voxels of {:?}",
        base.shape(),
        base.voxel_size(),
        map.shape(),
        map.voxel_size()
    );

    if !compatible(&base, &map) {
        return Err(OverlayError::GeometryMismatch);
    }

    let options = args.overlay_options();
    let overlay = composite(&base, &map, &options)?;
    let map_band = options.bands.map();
    log::info!(
        "** {} voxels taken from the map, slope {}, intercept {}, map codes display as {} to {}",
        overlay.selected_voxels,
        overlay.calibration.slope,
        overlay.calibration.intercept,
        overlay.calibration.apply(map_band.lo()),
        overlay.calibration.apply(map_band.hi())
    );

    let output_path = resolve(&args.output);
    log::info!("* writing {}", output_path.display());
    save_overlay_to_file(&output_path, &overlay)?;

    Ok(output_path)
}
