use {
    crate::{
        drm::{DumbAlloc, DumbDevice},
        utils::oserror::OsError,
    },
    ahash::AHashMap,
    std::cell::{Cell, RefCell},
    uapi::{OwnedFd, c},
};

const PITCH_ALIGN: u32 = 64;
const OFFSET_ALIGN: u64 = 1 << 16;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Call {
    CreateDumb { width: u32, height: u32, bpp: u32 },
    DestroyDumb(u32),
    MapDumb(u32),
    GemClose(u32),
}

/// A device whose buffers live in a memfd.
pub struct TestDevice {
    memfd: OwnedFd,
    len: Cell<u64>,
    next_handle: Cell<u32>,
    offsets: RefCell<AHashMap<u32, u64>>,
    pub calls: RefCell<Vec<Call>>,
    pub fail_create: Cell<bool>,
    pub fail_destroy: Cell<bool>,
    pub fail_map: Cell<bool>,
    pub fail_close: Cell<bool>,
}

impl TestDevice {
    pub fn new() -> Self {
        let memfd = uapi::memfd_create("test-device", c::MFD_CLOEXEC).unwrap();
        Self {
            memfd,
            len: Cell::new(0),
            next_handle: Cell::new(1),
            offsets: Default::default(),
            calls: Default::default(),
            fail_create: Cell::new(false),
            fail_destroy: Cell::new(false),
            fail_map: Cell::new(false),
            fail_close: Cell::new(false),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn gem_closes(&self, handle: u32) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| **c == Call::GemClose(handle))
            .count()
    }

    /// Allocates a buffer without going through a driver, like a handle imported from
    /// another process would be.
    pub fn raw_handle(&self, size: u64) -> u32 {
        self.alloc(size).handle
    }

    fn alloc(&self, size: u64) -> DumbAlloc {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        let offset = self.len.get();
        let len = offset + size.next_multiple_of(OFFSET_ALIGN);
        uapi::ftruncate(self.memfd.raw(), len as _).unwrap();
        self.len.set(len);
        self.offsets.borrow_mut().insert(handle, offset);
        DumbAlloc {
            handle,
            pitch: 0,
            size,
        }
    }
}

impl DumbDevice for TestDevice {
    fn fd(&self) -> c::c_int {
        self.memfd.raw()
    }

    fn create_dumb(&self, width: u32, height: u32, bpp: u32) -> Result<DumbAlloc, OsError> {
        self.calls
            .borrow_mut()
            .push(Call::CreateDumb { width, height, bpp });
        if self.fail_create.get() {
            return Err(OsError(c::ENOMEM));
        }
        let pitch = (width * bpp.div_ceil(8)).next_multiple_of(PITCH_ALIGN);
        let mut alloc = self.alloc(pitch as u64 * height as u64);
        alloc.pitch = pitch;
        Ok(alloc)
    }

    fn destroy_dumb(&self, handle: u32) -> Result<(), OsError> {
        self.calls.borrow_mut().push(Call::DestroyDumb(handle));
        if self.fail_destroy.get() {
            return Err(OsError(c::EBUSY));
        }
        match self.offsets.borrow_mut().remove(&handle) {
            Some(_) => Ok(()),
            None => Err(OsError(c::ENOENT)),
        }
    }

    fn map_dumb(&self, handle: u32) -> Result<u64, OsError> {
        self.calls.borrow_mut().push(Call::MapDumb(handle));
        if self.fail_map.get() {
            return Err(OsError(c::EINVAL));
        }
        match self.offsets.borrow().get(&handle) {
            Some(offset) => Ok(*offset),
            None => Err(OsError(c::ENOENT)),
        }
    }

    fn gem_close(&self, handle: u32) -> Result<(), OsError> {
        self.calls.borrow_mut().push(Call::GemClose(handle));
        if self.fail_close.get() {
            return Err(OsError(c::EINVAL));
        }
        match self.offsets.borrow_mut().remove(&handle) {
            Some(_) => Ok(()),
            None => Err(OsError(c::ENOENT)),
        }
    }
}
