//! Common test utilities for niioverlay integration tests

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use ndarray::{ArrayD, IxDyn};
use nifti::{InMemNiftiObject, NiftiHeader, NiftiObject};

use niioverlay::nifti_io::save_nifti_to_file;
use niioverlay::Volume;

/// Grid of the synthetic base/map pair
pub const DIMS: [usize; 3] = [40, 40, 10];

/// Map values and how many voxels carry each of them
pub const MAP_LEVELS: [(f64, usize); 5] = [(5.0, 100), (4.0, 300), (3.0, 500), (2.0, 700), (1.0, 900)];

pub const AFFINE: [f64; 16] = [
    -2.0, 0.0, 0.0, 40.0,
    0.0, 2.0, 0.0, -40.0,
    0.0, 0.0, 2.5, -12.5,
    0.0, 0.0, 0.0, 1.0,
];

/// Per-test scratch directory under the system temp dir
pub struct Scratch {
    pub dir: PathBuf,
}

impl Scratch {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("niioverlay_{}_{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        Scratch { dir }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

/// Index in NIfTI storage order (x fastest)
pub fn fortran_index(d: &IxDyn, dims: &[usize]) -> usize {
    d[0] + dims[0] * d[1] + dims[0] * dims[1] * d[2]
}

/// Smooth ramp, strictly increasing in storage order
pub fn base_volume(dims: &[usize]) -> Volume {
    let data = ArrayD::from_shape_fn(IxDyn(dims), |d| 100.0 + fortran_index(&d, dims) as f64 * 0.25);
    Volume::new(data, AFFINE)
}

/// Zero everywhere except the last voxels in storage order, which hold the
/// levels of [`MAP_LEVELS`]
pub fn map_volume(dims: &[usize]) -> Volume {
    let n: usize = dims.iter().product();
    let mut values = vec![0.0; n];
    let mut cursor = n;
    for &(value, count) in MAP_LEVELS.iter() {
        for v in values[cursor - count..cursor].iter_mut() {
            *v = value;
        }
        cursor -= count;
    }
    let data = ArrayD::from_shape_fn(IxDyn(dims), |d| values[fortran_index(&d, dims)]);
    Volume::new(data, AFFINE)
}

pub fn write_volume(path: &Path, volume: &Volume) {
    save_nifti_to_file(path, volume).unwrap();
}

fn decompressed(path: &Path) -> Vec<u8> {
    let bytes = fs::read(path).unwrap();
    if bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b {
        let mut out = Vec::new();
        GzDecoder::new(Cursor::new(bytes)).read_to_end(&mut out).unwrap();
        out
    } else {
        bytes
    }
}

/// Header as parsed by the `nifti` crate
pub fn read_header(path: &Path) -> NiftiHeader {
    let bytes = decompressed(path);
    InMemNiftiObject::from_reader(Cursor::new(bytes)).unwrap().header().clone()
}

/// Stored uint16 codes, ignoring scl_slope/scl_inter
pub fn read_codes(path: &Path) -> Vec<u16> {
    let bytes = decompressed(path);
    let vox_offset = f32::from_le_bytes([bytes[108], bytes[109], bytes[110], bytes[111]]) as usize;
    bytes[vox_offset..]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

pub fn count(codes: &[u16], pred: impl Fn(u16) -> bool) -> usize {
    codes.iter().filter(|&&c| pred(c)).count()
}
