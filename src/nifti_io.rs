//! NIfTI-1 file I/O
//!
//! Loads single-file NIfTI images (`.nii` / `.nii.gz`) into [`Volume`]s and
//! writes volumes and composited overlays back out. Reading goes through the
//! `nifti` crate; writing emits the 348-byte header directly.

use std::io::{Cursor, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::ArrayD;
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiHeader, NiftiObject};

use crate::composite::CompositedVolume;
use crate::error::{OverlayError, Result};
use crate::volume::{voxel_size_from_affine, Volume};

const HEADER_SIZE: usize = 348;
/// Header plus the 4-byte extension flag
const VOX_OFFSET: usize = 352;

const DT_FLOAT32: i16 = 16;
const DT_UINT16: i16 = 512;

/// `NIFTI_INTENT_ESTIMATE`
pub const OVERLAY_INTENT_CODE: i16 = 1001;
pub const OVERLAY_INTENT_NAME: &str = "conn index";

/// `NIFTI_XFORM_ALIGNED_ANAT`
const SFORM_ALIGNED: i16 = 2;

/// Check if bytes are gzip compressed
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Get header info for diagnostics
fn get_header_info(bytes: &[u8]) -> String {
    if bytes.len() < HEADER_SIZE {
        return format!("File too small ({} bytes, need at least 348)", bytes.len());
    }

    let sizeof_hdr = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let magic = String::from_utf8_lossy(&bytes[344..348]).to_string();
    let datatype = i16::from_le_bytes([bytes[70], bytes[71]]);

    format!("sizeof_hdr={}, magic='{}', datatype={}", sizeof_hdr, magic, datatype)
}

/// Load a NIfTI volume from bytes
///
/// Supports both .nii and .nii.gz files (gzip is auto-detected). Samples are
/// returned as `f64` with the header's scl_slope/scl_inter applied.
pub fn load_nifti(bytes: &[u8]) -> Result<Volume> {
    let obj: InMemNiftiObject = if is_gzip(bytes) {
        InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes))).map_err(|e| {
            let mut decompressed = Vec::new();
            let mut decoder = GzDecoder::new(Cursor::new(bytes));
            let info = if std::io::Read::read_to_end(&mut decoder, &mut decompressed).is_ok() {
                get_header_info(&decompressed)
            } else {
                "Could not decompress".to_string()
            };
            OverlayError::Nifti(format!("Failed to read gzipped NIfTI: {} ({})", e, info))
        })?
    } else {
        InMemNiftiObject::from_reader(Cursor::new(bytes)).map_err(|e| {
            OverlayError::Nifti(format!("Failed to read NIfTI: {} ({})", e, get_header_info(bytes)))
        })?
    };

    let header = obj.header();
    let ndim = header.dim[0] as usize;
    if ndim < 3 {
        return Err(OverlayError::Dimensions(format!(
            "expected at least 3D volume, got {}D",
            ndim
        )));
    }
    let affine = get_affine(header);

    let data: ArrayD<f64> = obj
        .into_volume()
        .into_ndarray::<f64>()
        .map_err(|e| OverlayError::Nifti(format!("Failed to convert to ndarray: {}", e)))?;

    if data.ndim() < 3 {
        return Err(OverlayError::Dimensions(format!(
            "expected at least 3D array, got {}D",
            data.ndim()
        )));
    }

    Ok(Volume::new(data, affine))
}

/// Read a NIfTI file from a filesystem path
pub fn read_nifti_file(path: &Path) -> Result<Volume> {
    let bytes = std::fs::read(path).map_err(|e| OverlayError::io(path, e))?;
    load_nifti(&bytes)
}

/// Best available affine: sform, then qform, then a grid-centred affine
/// from the voxel sizes
fn get_affine(header: &NiftiHeader) -> [f64; 16] {
    if header.sform_code > 0 {
        let s = &header.srow_x;
        let t = &header.srow_y;
        let u = &header.srow_z;
        [
            s[0] as f64, s[1] as f64, s[2] as f64, s[3] as f64,
            t[0] as f64, t[1] as f64, t[2] as f64, t[3] as f64,
            u[0] as f64, u[1] as f64, u[2] as f64, u[3] as f64,
            0.0, 0.0, 0.0, 1.0,
        ]
    } else if header.qform_code > 0 {
        quaternion_affine(header)
    } else {
        base_affine(header)
    }
}

/// Voxel-size affine with x flipped and the origin at the grid centre
fn base_affine(header: &NiftiHeader) -> [f64; 16] {
    let vsx = -(header.pixdim[1] as f64);
    let vsy = header.pixdim[2] as f64;
    let vsz = header.pixdim[3] as f64;
    let centre = |axis: usize| (header.dim[axis].max(1) as f64 - 1.0) / 2.0;
    [
        vsx, 0.0, 0.0, -centre(1) * vsx,
        0.0, vsy, 0.0, -centre(2) * vsy,
        0.0, 0.0, vsz, -centre(3) * vsz,
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// Affine from the qform quaternion, voxel sizes and qfac
fn quaternion_affine(header: &NiftiHeader) -> [f64; 16] {
    let mut b = header.quatern_b as f64;
    let mut c = header.quatern_c as f64;
    let mut d = header.quatern_d as f64;
    let a2 = 1.0 - (b * b + c * c + d * d);
    let a = if a2 < 1e-7 {
        // 180 degree rotation, renormalise (b, c, d)
        let norm = (b * b + c * c + d * d).sqrt();
        b /= norm;
        c /= norm;
        d /= norm;
        0.0
    } else {
        a2.sqrt()
    };

    let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
    let dx = header.pixdim[1] as f64;
    let dy = header.pixdim[2] as f64;
    let dz = header.pixdim[3] as f64 * qfac;

    let r = [
        [a * a + b * b - c * c - d * d, 2.0 * (b * c - a * d), 2.0 * (b * d + a * c)],
        [2.0 * (b * c + a * d), a * a + c * c - b * b - d * d, 2.0 * (c * d - a * b)],
        [2.0 * (b * d - a * c), 2.0 * (c * d + a * b), a * a + d * d - b * b - c * c],
    ];
    let offset = [header.quatern_x as f64, header.quatern_y as f64, header.quatern_z as f64];

    let mut affine = [0.0; 16];
    for row in 0..3 {
        affine[row * 4] = r[row][0] * dx;
        affine[row * 4 + 1] = r[row][1] * dy;
        affine[row * 4 + 2] = r[row][2] * dz;
        affine[row * 4 + 3] = offset[row];
    }
    affine[15] = 1.0;
    affine
}

/// Fields that differ between the headers this module writes
struct HeaderFields<'a> {
    shape: &'a [usize],
    affine: &'a [f64; 16],
    datatype: i16,
    bitpix: i16,
    scl_slope: f32,
    scl_inter: f32,
    cal_min: f32,
    cal_max: f32,
    intent_code: i16,
    intent_name: &'a str,
}

fn put_i16(header: &mut [u8], offset: usize, value: i16) {
    header[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_f32(header: &mut [u8], offset: usize, value: f32) {
    header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Build a NIfTI-1 single-file header
fn encode_header(fields: &HeaderFields) -> Result<[u8; HEADER_SIZE]> {
    let ndim = fields.shape.len();
    if ndim == 0 || ndim > 7 {
        return Err(OverlayError::Dimensions(format!(
            "NIfTI-1 supports 1 to 7 axes, got {}",
            ndim
        )));
    }

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&(HEADER_SIZE as i32).to_le_bytes());

    // dim[0..7], unused axes are 1
    put_i16(&mut header, 40, ndim as i16);
    for i in 0..7 {
        let extent = fields.shape.get(i).copied().unwrap_or(1);
        let extent = i16::try_from(extent).map_err(|_| {
            OverlayError::Dimensions(format!("axis {} has {} voxels, limit is {}", i, extent, i16::MAX))
        })?;
        put_i16(&mut header, 42 + i * 2, extent);
    }

    put_i16(&mut header, 68, fields.intent_code);
    put_i16(&mut header, 70, fields.datatype);
    put_i16(&mut header, 72, fields.bitpix);

    // pixdim[0] is qfac
    let (vsx, vsy, vsz) = voxel_size_from_affine(fields.affine);
    let pixdim: [f32; 8] = [1.0, vsx as f32, vsy as f32, vsz as f32, 1.0, 1.0, 1.0, 1.0];
    for (i, &p) in pixdim.iter().enumerate() {
        put_f32(&mut header, 76 + i * 4, p);
    }

    put_f32(&mut header, 108, VOX_OFFSET as f32);
    put_f32(&mut header, 112, fields.scl_slope);
    put_f32(&mut header, 116, fields.scl_inter);
    put_f32(&mut header, 124, fields.cal_max);
    put_f32(&mut header, 128, fields.cal_min);

    put_i16(&mut header, 254, SFORM_ALIGNED);
    for row in 0..3 {
        for col in 0..4 {
            put_f32(&mut header, 280 + row * 16 + col * 4, fields.affine[row * 4 + col] as f32);
        }
    }

    // intent_name is 16 bytes, NUL padded
    let name = fields.intent_name.as_bytes();
    let len = name.len().min(15);
    header[328..328 + len].copy_from_slice(&name[..len]);

    header[344..348].copy_from_slice(b"n+1\0");

    Ok(header)
}

/// Header, empty extension flag and payload
fn assemble(header: &[u8; HEADER_SIZE], payload_len: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(VOX_OFFSET + payload_len);
    buffer.extend_from_slice(header);
    buffer.extend_from_slice(&[0u8; 4]);
    buffer
}

/// Encode a volume as an uncompressed float32 NIfTI
pub fn encode_volume(volume: &Volume) -> Result<Vec<u8>> {
    let header = encode_header(&HeaderFields {
        shape: volume.shape(),
        affine: &volume.affine,
        datatype: DT_FLOAT32,
        bitpix: 32,
        scl_slope: 1.0,
        scl_inter: 0.0,
        cal_min: 0.0,
        cal_max: 0.0,
        intent_code: 0,
        intent_name: "",
    })?;

    let mut buffer = assemble(&header, volume.len() * 4);
    // NIfTI stores x fastest
    for &val in volume.data.t().iter() {
        buffer.extend_from_slice(&(val as f32).to_le_bytes());
    }
    Ok(buffer)
}

/// Encode a composited overlay as an uncompressed uint16 NIfTI
///
/// The calibration goes into scl_slope/scl_inter and cal_min/cal_max, and the
/// intent marks the image as a connectivity index overlay.
pub fn encode_overlay(overlay: &CompositedVolume) -> Result<Vec<u8>> {
    let cal = &overlay.calibration;
    let header = encode_header(&HeaderFields {
        shape: overlay.shape(),
        affine: &overlay.affine,
        datatype: DT_UINT16,
        bitpix: 16,
        scl_slope: cal.slope as f32,
        scl_inter: cal.intercept as f32,
        cal_min: cal.cal_min as f32,
        cal_max: cal.cal_max as f32,
        intent_code: OVERLAY_INTENT_CODE,
        intent_name: OVERLAY_INTENT_NAME,
    })?;

    let mut buffer = assemble(&header, overlay.data.len() * 2);
    for &code in overlay.data.t().iter() {
        buffer.extend_from_slice(&code.to_le_bytes());
    }
    Ok(buffer)
}

fn gzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Write encoded bytes, gzip compressing when the path ends with .nii.gz
fn write_encoded(path: &Path, bytes: Vec<u8>) -> Result<()> {
    let bytes = if path.to_string_lossy().ends_with(".nii.gz") {
        gzip(&bytes).map_err(|e| OverlayError::io(path, e))?
    } else {
        bytes
    };
    std::fs::write(path, &bytes).map_err(|e| OverlayError::io(path, e))
}

/// Save a volume as float32 NIfTI
pub fn save_nifti_to_file(path: &Path, volume: &Volume) -> Result<()> {
    write_encoded(path, encode_volume(volume)?)
}

/// Save a composited overlay as uint16 NIfTI
pub fn save_overlay_to_file(path: &Path, overlay: &CompositedVolume) -> Result<()> {
    write_encoded(path, encode_overlay(overlay)?)
}
