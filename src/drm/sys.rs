#![allow(non_camel_case_types)]

use {
    crate::utils::{compat::IoctlNumber, oserror::OsError},
    uapi::c,
};

pub unsafe fn ioctl<T>(fd: c::c_int, request: u64, t: &mut T) -> Result<c::c_int, OsError> {
    let mut ret;
    loop {
        ret = unsafe { c::ioctl(fd, request as IoctlNumber, &mut *t) };
        if ret != -1 {
            return Ok(ret);
        }
        let err = uapi::get_errno();
        if !matches!(err, c::EINTR | c::EAGAIN) {
            return Err(OsError(err));
        }
    }
}

pub const DRM_IOCTL_BASE: u64 = b'd' as u64;

pub const fn drm_iow<T>(nr: u64) -> u64 {
    uapi::_IOW::<T>(DRM_IOCTL_BASE, nr)
}

pub const fn drm_iowr<T>(nr: u64) -> u64 {
    uapi::_IOWR::<T>(DRM_IOCTL_BASE, nr)
}

#[repr(C)]
struct drm_gem_close {
    handle: u32,
    pad: u32,
}

const DRM_IOCTL_GEM_CLOSE: u64 = drm_iow::<drm_gem_close>(0x09);

pub fn gem_close(fd: c::c_int, handle: u32) -> Result<(), OsError> {
    let mut res = drm_gem_close { handle, pad: 0 };
    unsafe {
        ioctl(fd, DRM_IOCTL_GEM_CLOSE, &mut res)?;
    }
    Ok(())
}

#[repr(C)]
struct drm_mode_create_dumb {
    height: u32,
    width: u32,
    bpp: u32,
    flags: u32,
    handle: u32,
    pitch: u32,
    size: u64,
}

const DRM_IOCTL_MODE_CREATE_DUMB: u64 = drm_iowr::<drm_mode_create_dumb>(0xb2);

pub struct DumbCreate {
    pub handle: u32,
    pub pitch: u32,
    pub size: u64,
}

pub fn mode_create_dumb(
    fd: c::c_int,
    width: u32,
    height: u32,
    bpp: u32,
) -> Result<DumbCreate, OsError> {
    let mut res = drm_mode_create_dumb {
        height,
        width,
        bpp,
        flags: 0,
        handle: 0,
        pitch: 0,
        size: 0,
    };
    unsafe {
        ioctl(fd, DRM_IOCTL_MODE_CREATE_DUMB, &mut res)?;
    }
    Ok(DumbCreate {
        handle: res.handle,
        pitch: res.pitch,
        size: res.size,
    })
}

#[repr(C)]
struct drm_mode_map_dumb {
    handle: u32,
    pad: u32,
    offset: u64,
}

const DRM_IOCTL_MODE_MAP_DUMB: u64 = drm_iowr::<drm_mode_map_dumb>(0xb3);

pub fn mode_map_dumb(fd: c::c_int, handle: u32) -> Result<u64, OsError> {
    let mut res = drm_mode_map_dumb {
        handle,
        pad: 0,
        offset: 0,
    };
    unsafe {
        ioctl(fd, DRM_IOCTL_MODE_MAP_DUMB, &mut res)?;
    }
    Ok(res.offset)
}

#[repr(C)]
struct drm_mode_destroy_dumb {
    handle: u32,
}

const DRM_IOCTL_MODE_DESTROY_DUMB: u64 = drm_iowr::<drm_mode_destroy_dumb>(0xb4);

pub fn mode_destroy_dumb(fd: c::c_int, handle: u32) -> Result<(), OsError> {
    let mut res = drm_mode_destroy_dumb { handle };
    unsafe {
        ioctl(fd, DRM_IOCTL_MODE_DESTROY_DUMB, &mut res)?;
    }
    Ok(())
}
