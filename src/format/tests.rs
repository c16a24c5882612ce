use crate::format::{
    ARGB8888, C8, FormatError, FORMATS, NV12, R8, RGB565, RGB888, XRGB8888, YUYV, YVU420,
    bpp_from_format, format, formats, fourcc_code, num_planes_from_format,
};

#[test]
fn formats_dont_panic() {
    assert_eq!(formats().len(), FORMATS.len());
}

#[test]
fn every_format_has_planes() {
    for format in FORMATS {
        assert!(format.num_planes() >= 1, "{}", format.name);
        for plane in format.planes {
            assert_ne!(plane.bpp, 0, "{}", format.name);
        }
    }
}

#[test]
fn bpp_table() {
    let expected: &[(u32, &[u32])] = &[
        (C8.drm, &[8]),
        (R8.drm, &[8]),
        (fourcc_code('R', 'G', 'B', '8'), &[8]),
        (fourcc_code('B', 'G', 'R', '8'), &[8]),
        (YVU420.drm, &[8]),
        (NV12.drm, &[8, 16]),
        (fourcc_code('G', 'R', '8', '8'), &[16]),
        (fourcc_code('A', 'B', '1', '2'), &[16]),
        (fourcc_code('B', 'A', '1', '5'), &[16]),
        (RGB565.drm, &[16]),
        (YUYV.drm, &[16]),
        (fourcc_code('V', 'Y', 'U', 'Y'), &[16]),
        (RGB888.drm, &[24]),
        (fourcc_code('B', 'G', '2', '4'), &[24]),
        (XRGB8888.drm, &[32]),
        (ARGB8888.drm, &[32]),
        (fourcc_code('R', 'A', '3', '0'), &[32]),
        (fourcc_code('A', 'Y', 'U', 'V'), &[32]),
    ];
    for &(drm, bpps) in expected {
        assert_eq!(num_planes_from_format(drm).unwrap(), bpps.len());
        for (plane, &bpp) in bpps.iter().enumerate() {
            assert_eq!(bpp_from_format(drm, plane).unwrap(), bpp);
        }
    }
}

#[test]
fn unknown_format() {
    let drm = fourcc_code('Q', 'Q', 'Q', 'Q');
    assert_eq!(format(drm), Err(FormatError::UnknownFormat(drm)));
    assert_eq!(
        bpp_from_format(drm, 0),
        Err(FormatError::UnknownFormat(drm))
    );
}

#[test]
fn plane_out_of_range() {
    assert_eq!(
        bpp_from_format(XRGB8888.drm, 1),
        Err(FormatError::InvalidPlane {
            name: "xrgb8888",
            plane: 1,
        })
    );
    assert!(bpp_from_format(NV12.drm, 2).is_err());
}

#[test]
fn unknown_format_message() {
    let err = FormatError::UnknownFormat(fourcc_code('Q', 'Q', '1', '2'));
    assert_eq!(err.to_string(), "Unknown format QQ12");
}
