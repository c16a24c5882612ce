
use {
    crate::format::{Format, FormatError, format},
    arrayvec::ArrayVec,
    thiserror::Error,
};

pub const MAX_PLANES: usize = 4;

pub type PlaneVec<T> = ArrayVec<T, MAX_PLANES>;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum LayoutError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Format {0} has too many planes")]
    TooManyPlanes(&'static str),
    #[error("Stride alignment {0} is not a power of two")]
    StrideAlign(u32),
    #[error("Size calculation overflowed")]
    Overflow,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PlaneLayout {
    pub stride: u32,
    pub size: u32,
    pub offset: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub format: &'static Format,
    pub width: u32,
    pub height: u32,
    pub planes: PlaneVec<PlaneLayout>,
    pub total_size: u32,
}

pub fn compute_layout(drm: u32, width: u32, height: u32) -> Result<Layout, LayoutError> {
    compute_aligned_layout(drm, width, height, 1)
}

/// Lays out the planes of `drm` back to back. Row pitches are rounded up to
/// `stride_align`, which must be a power of two.
pub fn compute_aligned_layout(
    drm: u32,
    width: u32,
    height: u32,
    stride_align: u32,
) -> Result<Layout, LayoutError> {
    let format = format(drm)?;
    if format.num_planes() > MAX_PLANES {
        return Err(LayoutError::TooManyPlanes(format.name));
    }
    let mut planes = PlaneVec::new();
    let mut offset = 0u32;
    for plane in 0..format.num_planes() {
        let stride = stride_from_format(format, width, plane, stride_align)?;
        let size = size_from_format(format, stride, height, plane)?;
        planes.push(PlaneLayout {
            stride,
            size,
            offset,
        });
        offset = offset.checked_add(size).ok_or(LayoutError::Overflow)?;
    }
    let last = planes[planes.len() - 1];
    Ok(Layout {
        format,
        width,
        height,
        planes,
        total_size: last.offset + last.size,
    })
}

pub fn stride_from_format(
    format: &Format,
    width: u32,
    plane: usize,
    stride_align: u32,
) -> Result<u32, LayoutError> {
    let p = match format.planes.get(plane) {
        Some(p) => p,
        None => {
            return Err(FormatError::InvalidPlane {
                name: format.name,
                plane,
            }
            .into());
        }
    };
    if !stride_align.is_power_of_two() {
        return Err(LayoutError::StrideAlign(stride_align));
    }
    let samples = width.div_ceil(p.h_sub) as u64;
    let stride = (samples * p.bpp as u64)
        .div_ceil(8)
        .next_multiple_of(stride_align as u64);
    u32::try_from(stride).map_err(|_| LayoutError::Overflow)
}

pub fn size_from_format(
    format: &Format,
    stride: u32,
    height: u32,
    plane: usize,
) -> Result<u32, LayoutError> {
    let p = match format.planes.get(plane) {
        Some(p) => p,
        None => {
            return Err(FormatError::InvalidPlane {
                name: format.name,
                plane,
            }
            .into());
        }
    };
    stride
        .checked_mul(height.div_ceil(p.v_sub))
        .ok_or(LayoutError::Overflow)
}

/// The integer base 2 logarithm, rounded down. `log_base2(0)` is 0.
pub fn log_base2(value: u32) -> u32 {
    value.checked_ilog2().unwrap_or(0)
}

impl Layout {
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }
}
