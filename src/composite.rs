//! Compositing of a base image and a thresholded map
//!
//! The base is rescaled into the base band, the map into the map band, and
//! every voxel where the map reaches the threshold takes the map code. The
//! calibration attached to the result lets a viewer turn map codes back into
//! approximate map units.

use ndarray::{ArrayD, Zip};

use crate::bands::BandLayout;
use crate::error::{OverlayError, Result};
use crate::geometry::compatible;
use crate::rescale::rescale;
use crate::utils::{count_selected, min_max, sanitized, threshold_mask};
use crate::volume::Volume;

/// Parameters of a compositing run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    /// Map voxels `>= threshold` are shown in the map band
    pub threshold: f64,
    /// Store a slope/intercept that maps map codes back to map units
    pub rescale_for_display: bool,
    pub bands: BandLayout,
}

impl OverlayOptions {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            rescale_for_display: false,
            bands: BandLayout::default(),
        }
    }

    pub fn with_rescale_for_display(mut self, enabled: bool) -> Self {
        self.rescale_for_display = enabled;
        self
    }

    pub fn with_bands(mut self, bands: BandLayout) -> Self {
        self.bands = bands;
        self
    }
}

/// Linear map from stored codes to physical units, `code * slope + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub slope: f64,
    pub intercept: f64,
    /// Displayed value of the lowest base code
    pub cal_min: f64,
    /// Displayed value of the highest map code
    pub cal_max: f64,
}

impl Calibration {
    fn from_slope_inter(slope: f64, intercept: f64, bands: &BandLayout) -> Self {
        let mut calibration = Self {
            slope,
            intercept,
            cal_min: 0.0,
            cal_max: 0.0,
        };
        calibration.cal_min = calibration.apply(bands.base().lo());
        calibration.cal_max = calibration.apply(bands.map().hi());
        calibration
    }

    /// Codes are displayed as stored
    pub fn identity(bands: &BandLayout) -> Self {
        Self::from_slope_inter(1.0, 0.0, bands)
    }

    /// Map band codes display as map units: the bottom of the map band shows
    /// 0 and the top shows `map_max`.
    ///
    /// Falls back to [`Calibration::identity`] when `map_max` gives a zero or
    /// non-finite slope, since NIfTI readers ignore a zero slope.
    pub fn for_display(map_max: f64, bands: &BandLayout) -> Self {
        let map = bands.map();
        let slope = map_max / map.width() as f64;
        if slope == 0.0 || !slope.is_finite() {
            log::warn!(
                "map maximum is {}, cannot derive a display slope; storing codes unscaled",
                map_max
            );
            return Self::identity(bands);
        }
        let intercept = -(map.lo() as f64) * slope;
        Self::from_slope_inter(slope, intercept, bands)
    }

    /// Displayed value of a stored code
    pub fn apply(&self, code: u16) -> f64 {
        code as f64 * self.slope + self.intercept
    }
}

/// Result of [`composite`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompositedVolume {
    /// Output codes, base band outside the mask and map band inside it
    pub data: ArrayD<u16>,
    /// Copied from the base volume
    pub affine: [f64; 16],
    pub calibration: Calibration,
    /// Number of voxels taken from the map
    pub selected_voxels: usize,
}

impl CompositedVolume {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

/// Combine a base image with a coregistered map
///
/// # Arguments
/// * `base` - Structural image, rescaled into the base band
/// * `map` - Statistical map, thresholded and rescaled into the map band
/// * `options` - Threshold, calibration mode and band layout
///
/// # Errors
/// [`OverlayError::GeometryMismatch`] if the two volumes are not on the same
/// grid; nothing is computed in that case.
pub fn composite(base: &Volume, map: &Volume, options: &OverlayOptions) -> Result<CompositedVolume> {
    if !compatible(base, map) {
        return Err(OverlayError::GeometryMismatch);
    }
    let bands = &options.bands;

    log::info!("* processing base image");
    log::info!("** scaling voxel values from {} to {}", bands.base().lo(), bands.base().hi());
    let base_scaled = rescale(&base.data, bands.base());

    log::info!("* processing map");
    let map_clean = sanitized(&map.data);

    log::info!("** creating mask using threshold of {}", options.threshold);
    let mask = threshold_mask(&map_clean, options.threshold);
    let selected_voxels = count_selected(&mask);
    log::debug!("{} of {} voxels at or above threshold", selected_voxels, mask.len());

    log::info!("** scaling voxel values from {} to {}", bands.map().lo(), bands.map().hi());
    let map_scaled = rescale(&map_clean, bands.map());

    log::info!("* combining map and base image");
    let (gap_lo, gap_hi) = bands.gap();
    log::debug!("codes {} to {} stay unused", gap_lo, gap_hi);
    let mut data = base_scaled;
    Zip::from(&mut data)
        .and(&mask)
        .and(&map_scaled)
        .par_for_each(|out, &selected, &code| {
            if selected {
                *out = code;
            }
        });

    let calibration = if options.rescale_for_display {
        let map_max = min_max(&map_clean).map_or(0.0, |(_, max)| max);
        Calibration::for_display(map_max, bands)
    } else {
        Calibration::identity(bands)
    };

    Ok(CompositedVolume {
        data,
        affine: base.affine,
        calibration,
        selected_voxels,
    })
}
