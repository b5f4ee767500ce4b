//! Integer bands of the composited volume
//!
//! The output code space is split into a band for the base image, a band for
//! the map and a reserved gap between them that no rescaled voxel lands in.

use crate::error::{OverlayError, Result};

/// Closed integer range `[lo, hi]` with `lo < hi`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    lo: u16,
    hi: u16,
}

/// Band the base image is rescaled into
pub const BASE_BAND: Band = Band { lo: 0, hi: 2047 };
/// Band the map is rescaled into
pub const MAP_BAND: Band = Band { lo: 3072, hi: 4095 };

impl Band {
    pub fn new(lo: u16, hi: u16) -> Result<Self> {
        if lo >= hi {
            return Err(OverlayError::InvalidBand { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> u16 {
        self.lo
    }

    pub fn hi(&self) -> u16 {
        self.hi
    }

    /// Distance between the bounds, `hi - lo`
    pub fn width(&self) -> u16 {
        self.hi - self.lo
    }

    #[cfg(test)]
    pub fn contains(&self, code: u16) -> bool {
        (self.lo..=self.hi).contains(&code)
    }
}

/// Placement of the base and map bands in the output code space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandLayout {
    base: Band,
    map: Band,
}

impl BandLayout {
    /// The base band must end strictly before the gap, and the gap must hold
    /// at least one code.
    pub fn new(base: Band, map: Band) -> Result<Self> {
        if base.hi.saturating_add(1) >= map.lo {
            return Err(OverlayError::InvalidBandLayout {
                base_hi: base.hi,
                map_lo: map.lo,
            });
        }
        Ok(Self { base, map })
    }

    pub fn base(&self) -> Band {
        self.base
    }

    pub fn map(&self) -> Band {
        self.map
    }

    /// Codes reserved between the two bands, `(first, last)` inclusive
    pub fn gap(&self) -> (u16, u16) {
        (self.base.hi + 1, self.map.lo - 1)
    }
}

impl Default for BandLayout {
    fn default() -> Self {
        Self {
            base: BASE_BAND,
            map: MAP_BAND,
        }
    }
}
