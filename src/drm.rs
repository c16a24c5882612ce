mod sys;
#[cfg(test)]
pub mod test_device;

use {
    crate::utils::oserror::OsError,
    std::fmt::Debug,
    thiserror::Error,
    uapi::{OwnedFd, c},
};

#[derive(Debug, Error)]
pub enum DrmError {
    #[error("Could not open {0}")]
    Open(String, #[source] OsError),
}

/// The result of a successful dumb buffer allocation.
///
/// `pitch` and `size` are chosen by the kernel and can be larger than what the format
/// and dimensions require.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DumbAlloc {
    pub handle: u32,
    pub pitch: u32,
    pub size: u64,
}

/// The buffer-management calls of a DRM device.
pub trait DumbDevice {
    /// The file descriptor that dumb buffer map offsets refer to.
    fn fd(&self) -> c::c_int;
    fn create_dumb(&self, width: u32, height: u32, bpp: u32) -> Result<DumbAlloc, OsError>;
    fn destroy_dumb(&self, handle: u32) -> Result<(), OsError>;
    fn map_dumb(&self, handle: u32) -> Result<u64, OsError>;
    fn gem_close(&self, handle: u32) -> Result<(), OsError>;
}

pub struct DrmDevice {
    fd: OwnedFd,
}

impl Debug for DrmDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrmDevice")
            .field("fd", &self.fd.raw())
            .finish()
    }
}

impl DrmDevice {
    pub fn open(path: &str) -> Result<Self, DrmError> {
        match uapi::open(path, c::O_RDWR | c::O_CLOEXEC, 0) {
            Ok(fd) => Ok(Self { fd }),
            Err(e) => Err(DrmError::Open(path.to_string(), e.into())),
        }
    }

    pub fn from_fd(fd: OwnedFd) -> Self {
        Self { fd }
    }
}

impl DumbDevice for DrmDevice {
    fn fd(&self) -> c::c_int {
        self.fd.raw()
    }

    fn create_dumb(&self, width: u32, height: u32, bpp: u32) -> Result<DumbAlloc, OsError> {
        let res = sys::mode_create_dumb(self.fd.raw(), width, height, bpp)?;
        Ok(DumbAlloc {
            handle: res.handle,
            pitch: res.pitch,
            size: res.size,
        })
    }

    fn destroy_dumb(&self, handle: u32) -> Result<(), OsError> {
        sys::mode_destroy_dumb(self.fd.raw(), handle)
    }

    fn map_dumb(&self, handle: u32) -> Result<u64, OsError> {
        sys::mode_map_dumb(self.fd.raw(), handle)
    }

    fn gem_close(&self, handle: u32) -> Result<(), OsError> {
        sys::gem_close(self.fd.raw(), handle)
    }
}
