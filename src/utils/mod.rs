//! Voxel-wise helpers shared by the rescaler and the compositor

pub mod mask;
pub mod sanitize;

pub use mask::{count_selected, threshold_mask};
pub use sanitize::{min_max, sanitize_in_place, sanitized};
