use {
    crate::{
        driver::Driver,
        drm::DumbDevice,
        dumb::DumbError,
        format::Format,
        layout::{LayoutError, PlaneLayout, PlaneVec},
        refcount::HandleRefs,
        utils::{errorfmt::ErrorFmt, mmap::Mmapped, oserror::OsError},
    },
    smallvec::SmallVec,
    std::{
        cell::Cell,
        fmt::{Debug, Formatter},
        rc::{Rc, Weak},
    },
    thiserror::Error,
};

linear_ids!(BoIds, BoId);

#[derive(Debug, Error)]
pub enum BoError {
    #[error("The driver has been closed")]
    DriverClosed,
    #[error("The buffer object is {0:?}")]
    InvalidState(BoState),
    #[error("The buffer object is still mapped")]
    StillMapped,
    #[error("The buffer object has no plane {0}")]
    InvalidPlane(usize),
    #[error("Format {format} has {planes} planes but {handles} handles were supplied")]
    HandleCount {
        format: &'static str,
        planes: usize,
        handles: usize,
    },
    #[error("Could not close GEM handle {0}")]
    GemClose(u32, #[source] OsError),
    #[error(transparent)]
    Dumb(#[from] DumbError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BoState {
    Allocated,
    Mapped,
    Unmapped,
    Destroyed,
    /// A release call failed. The handles must not be released again.
    Indeterminate,
}

/// Who allocated the memory behind the handles.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BoBackend {
    Dumb,
    Gem,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoPlane {
    pub handle: u32,
    pub layout: PlaneLayout,
}

pub struct BufferObject {
    pub id: BoId,
    pub(crate) drv: Weak<Driver>,
    pub format: &'static Format,
    pub width: u32,
    pub height: u32,
    pub backend: BoBackend,
    pub(crate) planes: PlaneVec<BoPlane>,
    pub total_size: u32,
    pub(crate) state: Cell<BoState>,
    pub(crate) maps: Cell<usize>,
}

impl Debug for BufferObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferObject")
            .field("id", &self.id)
            .field("format", &self.format.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("backend", &self.backend)
            .field("planes", &self.planes)
            .field("total_size", &self.total_size)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl BufferObject {
    pub fn state(&self) -> BoState {
        self.state.get()
    }

    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    pub fn planes(&self) -> &[BoPlane] {
        &self.planes
    }

    pub fn plane(&self, plane: usize) -> Result<&BoPlane, BoError> {
        self.planes.get(plane).ok_or(BoError::InvalidPlane(plane))
    }

    pub fn handle(&self, plane: usize) -> Result<u32, BoError> {
        self.plane(plane).map(|p| p.handle)
    }

    /// The number of bytes a mapping of `plane` must cover: all planes that live in the
    /// same kernel buffer.
    pub fn map_len(&self, plane: usize) -> Result<usize, BoError> {
        self.handle(plane).map(|h| self.handle_len(h))
    }

    pub(crate) fn handle_len(&self, handle: u32) -> usize {
        self.planes
            .iter()
            .filter(|p| p.handle == handle)
            .map(|p| p.layout.size as usize)
            .sum()
    }

    pub(crate) fn driver(&self) -> Result<Rc<Driver>, BoError> {
        self.drv.upgrade().ok_or(BoError::DriverClosed)
    }

    pub fn map(self: &Rc<Self>, plane: usize) -> Result<MapInfo, BoError> {
        self.driver()?.map_bo(self, plane)
    }

    pub fn destroy(&self) -> Result<(), BoError> {
        self.driver()?.destroy_bo(self)
    }

    /// Closes every distinct handle of this buffer object that has no owners left. Keeps
    /// going after a failure and returns the last error.
    pub(crate) fn close_unreferenced_handles(
        &self,
        dev: &dyn DumbDevice,
        refs: &HandleRefs,
    ) -> Result<(), BoError> {
        let mut closed = SmallVec::<[u32; 4]>::new();
        let mut res = Ok(());
        for plane in &self.planes {
            if closed.contains(&plane.handle) {
                continue;
            }
            closed.push(plane.handle);
            if refs.get(plane.handle) > 0 {
                log::debug!(
                    "Handle {} of buffer object {} is still shared",
                    plane.handle,
                    self.id
                );
                continue;
            }
            if let Err(e) = dev.gem_close(plane.handle) {
                let e = BoError::GemClose(plane.handle, e);
                log::error!("{}", ErrorFmt(&e));
                res = Err(e);
            }
        }
        res
    }
}

/// An outstanding mapping of a buffer object. Unmapped when dropped.
pub struct MapInfo {
    pub(crate) bo: Rc<BufferObject>,
    pub(crate) plane: usize,
    pub(crate) map: Mmapped,
}

impl Debug for MapInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapInfo")
            .field("bo", &self.bo.id)
            .field("plane", &self.plane)
            .field("map", &self.map)
            .finish()
    }
}

impl MapInfo {
    pub fn bo(&self) -> &Rc<BufferObject> {
        &self.bo
    }

    pub fn plane(&self) -> usize {
        self.plane
    }

    pub fn ptr(&self) -> *mut u8 {
        self.map.ptr()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// # Safety
    ///
    /// Nobody else may write to the buffer while the slice is alive.
    pub unsafe fn data(&self) -> &[u8] {
        unsafe { self.map.data() }
    }

    /// # Safety
    ///
    /// Nobody else may access the buffer while the slice is alive.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn data_mut(&self) -> &mut [u8] {
        unsafe { self.map.data_mut() }
    }

    pub fn unmap(self) {
        drop(self);
    }
}

impl Drop for MapInfo {
    fn drop(&mut self) {
        let maps = self.bo.maps.get() - 1;
        self.bo.maps.set(maps);
        if maps == 0 && self.bo.state.get() == BoState::Mapped {
            self.bo.state.set(BoState::Unmapped);
        }
    }
}
