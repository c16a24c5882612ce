use {
    crate::utils::{errorfmt::ErrorFmt, oserror::OsError},
    std::ptr,
    uapi::c,
};

/// A shared read/write mapping. Unmapped on drop.
#[derive(Debug)]
pub struct Mmapped {
    ptr: *mut u8,
    len: usize,
}

pub fn mmap_shared(len: usize, fd: c::c_int, offset: u64) -> Result<Mmapped, OsError> {
    let offset = c::off_t::try_from(offset).map_err(|_| OsError(c::EOVERFLOW))?;
    let res = unsafe {
        c::mmap(
            ptr::null_mut(),
            len,
            c::PROT_READ | c::PROT_WRITE,
            c::MAP_SHARED,
            fd,
            offset,
        )
    };
    if res == c::MAP_FAILED {
        return Err(OsError::default());
    }
    Ok(Mmapped {
        ptr: res.cast(),
        len,
    })
}

impl Mmapped {
    pub fn ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Safety
    ///
    /// Nobody else may write to the mapping while the slice is alive.
    pub unsafe fn data(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// # Safety
    ///
    /// Nobody else may access the mapping while the slice is alive.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn data_mut(&self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl Drop for Mmapped {
    fn drop(&mut self) {
        let res = unsafe { c::munmap(self.ptr.cast(), self.len) };
        if res != 0 {
            log::error!("Could not unmap buffer: {}", ErrorFmt(OsError::default()));
        }
    }
}
