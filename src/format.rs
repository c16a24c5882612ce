#[cfg(test)]
mod tests;

use {
    ahash::AHashMap,
    once_cell::sync::Lazy,
    std::fmt::{Debug, Write},
    thiserror::Error,
};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum FormatError {
    #[error("Unknown format {:?}", debug(*.0))]
    UnknownFormat(u32),
    #[error("Format {name} has no plane {plane}")]
    InvalidPlane { name: &'static str, plane: usize },
}

/// One plane of a format.
///
/// `h_sub` and `v_sub` are the horizontal and vertical subsampling factors relative to
/// the luma plane. A plane with `h_sub == 2` covers two pixels of a row with one
/// `bpp`-sized sample.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FormatPlane {
    pub bpp: u32,
    pub h_sub: u32,
    pub v_sub: u32,
}

#[derive(Copy, Clone, Debug)]
pub struct Format {
    pub name: &'static str,
    pub drm: u32,
    pub planes: &'static [FormatPlane],
}

impl PartialEq for Format {
    fn eq(&self, other: &Self) -> bool {
        self.drm == other.drm
    }
}

impl Eq for Format {}

impl Format {
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    pub fn bpp(&self, plane: usize) -> Result<u32, FormatError> {
        match self.planes.get(plane) {
            Some(p) => Ok(p.bpp),
            _ => Err(FormatError::InvalidPlane {
                name: self.name,
                plane,
            }),
        }
    }
}

static FORMATS_MAP: Lazy<AHashMap<u32, &'static Format>> = Lazy::new(|| {
    let mut map = AHashMap::new();
    for format in FORMATS {
        assert!(map.insert(format.drm, format).is_none());
    }
    map
});

pub fn formats() -> &'static AHashMap<u32, &'static Format> {
    &FORMATS_MAP
}

pub fn format(drm: u32) -> Result<&'static Format, FormatError> {
    match formats().get(&drm) {
        Some(f) => Ok(*f),
        None => {
            log::warn!("Unknown format {:?}", debug(drm));
            Err(FormatError::UnknownFormat(drm))
        }
    }
}

pub fn num_planes_from_format(drm: u32) -> Result<usize, FormatError> {
    format(drm).map(|f| f.num_planes())
}

pub fn bpp_from_format(drm: u32, plane: usize) -> Result<u32, FormatError> {
    format(drm)?.bpp(plane)
}

pub const fn fourcc_code(a: char, b: char, c: char, d: char) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

pub fn debug(fourcc: u32) -> impl Debug {
    struct Fourcc(u32);
    impl Debug for Fourcc {
        fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            for shift in [0, 8, 16, 24] {
                let c = (self.0 >> shift) as u8;
                if c.is_ascii_graphic() || c == b' ' {
                    fmt.write_char(c as char)?;
                } else {
                    write!(fmt, "\\x{:02x}", c)?;
                }
            }
            Ok(())
        }
    }
    Fourcc(fourcc)
}

const fn full(bpp: u32) -> FormatPlane {
    FormatPlane {
        bpp,
        h_sub: 1,
        v_sub: 1,
    }
}

const PACKED_8: &[FormatPlane] = &[full(8)];
const PACKED_16: &[FormatPlane] = &[full(16)];
const PACKED_24: &[FormatPlane] = &[full(24)];
const PACKED_32: &[FormatPlane] = &[full(32)];

const fn packed(name: &'static str, drm: u32, bpp: u32) -> Format {
    let planes = match bpp {
        8 => PACKED_8,
        16 => PACKED_16,
        24 => PACKED_24,
        _ => PACKED_32,
    };
    Format { name, drm, planes }
}

pub static C8: &Format = &packed("c8", fourcc_code('C', '8', ' ', ' '), 8);
pub static R8: &Format = &packed("r8", fourcc_code('R', '8', ' ', ' '), 8);
pub static RGB565: &Format = &packed("rgb565", fourcc_code('R', 'G', '1', '6'), 16);
pub static YUYV: &Format = &packed("yuyv", fourcc_code('Y', 'U', 'Y', 'V'), 16);
pub static RGB888: &Format = &packed("rgb888", fourcc_code('R', 'G', '2', '4'), 24);
pub static XRGB8888: &Format = &packed("xrgb8888", fourcc_code('X', 'R', '2', '4'), 32);
pub static ARGB8888: &Format = &packed("argb8888", fourcc_code('A', 'R', '2', '4'), 32);

/// The fully planar 4:2:0 format is accounted as one 8 bpp plane. Allocators that
/// need the separate chroma planes lay them out themselves.
pub static YVU420: &Format = &packed("yvu420", fourcc_code('Y', 'V', '1', '2'), 8);

/// Full resolution 8 bit luma followed by interleaved CbCr at half resolution in both
/// directions. Each CbCr sample pair is 16 bits and covers two pixels of two rows.
pub static NV12: &Format = &Format {
    name: "nv12",
    drm: fourcc_code('N', 'V', '1', '2'),
    planes: &[
        full(8),
        FormatPlane {
            bpp: 16,
            h_sub: 2,
            v_sub: 2,
        },
    ],
};

pub static FORMATS: &[Format] = &[
    *C8,
    *R8,
    packed("rgb332", fourcc_code('R', 'G', 'B', '8'), 8),
    packed("bgr233", fourcc_code('B', 'G', 'R', '8'), 8),
    *YVU420,
    *NV12,
    packed("rg88", fourcc_code('R', 'G', '8', '8'), 16),
    packed("gr88", fourcc_code('G', 'R', '8', '8'), 16),
    packed("xrgb4444", fourcc_code('X', 'R', '1', '2'), 16),
    packed("xbgr4444", fourcc_code('X', 'B', '1', '2'), 16),
    packed("rgbx4444", fourcc_code('R', 'X', '1', '2'), 16),
    packed("bgrx4444", fourcc_code('B', 'X', '1', '2'), 16),
    packed("argb4444", fourcc_code('A', 'R', '1', '2'), 16),
    packed("abgr4444", fourcc_code('A', 'B', '1', '2'), 16),
    packed("rgba4444", fourcc_code('R', 'A', '1', '2'), 16),
    packed("bgra4444", fourcc_code('B', 'A', '1', '2'), 16),
    packed("xrgb1555", fourcc_code('X', 'R', '1', '5'), 16),
    packed("xbgr1555", fourcc_code('X', 'B', '1', '5'), 16),
    packed("rgbx5551", fourcc_code('R', 'X', '1', '5'), 16),
    packed("bgrx5551", fourcc_code('B', 'X', '1', '5'), 16),
    packed("argb1555", fourcc_code('A', 'R', '1', '5'), 16),
    packed("abgr1555", fourcc_code('A', 'B', '1', '5'), 16),
    packed("rgba5551", fourcc_code('R', 'A', '1', '5'), 16),
    packed("bgra5551", fourcc_code('B', 'A', '1', '5'), 16),
    *RGB565,
    packed("bgr565", fourcc_code('B', 'G', '1', '6'), 16),
    *YUYV,
    packed("yvyu", fourcc_code('Y', 'V', 'Y', 'U'), 16),
    packed("uyvy", fourcc_code('U', 'Y', 'V', 'Y'), 16),
    packed("vyuy", fourcc_code('V', 'Y', 'U', 'Y'), 16),
    *RGB888,
    packed("bgr888", fourcc_code('B', 'G', '2', '4'), 24),
    *XRGB8888,
    packed("xbgr8888", fourcc_code('X', 'B', '2', '4'), 32),
    packed("rgbx8888", fourcc_code('R', 'X', '2', '4'), 32),
    packed("bgrx8888", fourcc_code('B', 'X', '2', '4'), 32),
    *ARGB8888,
    packed("abgr8888", fourcc_code('A', 'B', '2', '4'), 32),
    packed("rgba8888", fourcc_code('R', 'A', '2', '4'), 32),
    packed("bgra8888", fourcc_code('B', 'A', '2', '4'), 32),
    packed("xrgb2101010", fourcc_code('X', 'R', '3', '0'), 32),
    packed("xbgr2101010", fourcc_code('X', 'B', '3', '0'), 32),
    packed("rgbx1010102", fourcc_code('R', 'X', '3', '0'), 32),
    packed("bgrx1010102", fourcc_code('B', 'X', '3', '0'), 32),
    packed("argb2101010", fourcc_code('A', 'R', '3', '0'), 32),
    packed("abgr2101010", fourcc_code('A', 'B', '3', '0'), 32),
    packed("rgba1010102", fourcc_code('R', 'A', '3', '0'), 32),
    packed("bgra1010102", fourcc_code('B', 'A', '3', '0'), 32),
    packed("ayuv", fourcc_code('A', 'Y', 'U', 'V'), 32),
];
